//! Error types for the upstream API client and the startup configuration.

use reqwest::StatusCode;

/// Failure of a single upstream GraphQL request.
///
/// Every variant is non-fatal for the poll loop: the cycle logs it, counts it
/// and leaves the affected series at their last known value.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// Connection, TLS or request-building failure.
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The configured per-request timeout elapsed.
    #[error("request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    /// Upstream answered with a non-2xx status.
    #[error("unexpected status {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// Body is not valid JSON or does not match the expected shape.
    #[error("malformed response body: {0}")]
    Decode(String),

    /// A field the exporter relies on is null or absent.
    #[error("missing field '{path}' in response")]
    MissingField { path: &'static str },

    /// The GraphQL layer reported errors and returned no usable data.
    #[error("graphql errors: {}", .messages.join("; "))]
    GraphQl { messages: Vec<String> },
}

impl UpstreamError {
    /// Short, bounded label value used for the failure counter.
    pub fn reason(&self) -> &'static str {
        match self {
            UpstreamError::Transport(_) => "transport",
            UpstreamError::Timeout(_) => "timeout",
            UpstreamError::Status { .. } => "status",
            UpstreamError::Decode(_) => "decode",
            UpstreamError::MissingField { .. } => "missing_field",
            UpstreamError::GraphQl { .. } => "graphql",
        }
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout(err)
        } else if err.is_decode() {
            UpstreamError::Decode(err.to_string())
        } else {
            UpstreamError::Transport(err)
        }
    }
}

/// Invalid startup parameters.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config format: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("api token is required (--api-token, PIXAI_API_TOKEN or settings.api.token)")]
    MissingApiToken,

    #[error("invalid configuration:\n  - {}", .0.join("\n  - "))]
    Invalid(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_labels_are_stable() {
        assert_eq!(UpstreamError::Decode("x".into()).reason(), "decode");
        assert_eq!(UpstreamError::MissingField { path: "data.me" }.reason(), "missing_field");
        assert_eq!(
            UpstreamError::GraphQl { messages: vec!["unauthorized".into()] }.reason(),
            "graphql"
        );
        assert_eq!(
            UpstreamError::Status { status: StatusCode::BAD_GATEWAY, body: String::new() }.reason(),
            "status"
        );
    }

    #[test]
    fn invalid_config_lists_every_issue() {
        let err = ConfigurationError::Invalid(vec!["a".into(), "b".into()]);
        let msg = err.to_string();
        assert!(msg.contains("- a"));
        assert!(msg.contains("- b"));
    }
}
