use std::time::Duration;

use http::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::settings::ApiConfig;
use crate::error::UpstreamError;
use crate::helpers::time::parse_expire_time;
use crate::sources::fetch::AccountSource;
use crate::sources::queries::{access_tokens_request, quota_request, GraphQlRequest};
use crate::sources::types::{
    AccessToken, AccessTokenPage, AccessTokensData, GraphQlResponse, QuotaData,
};

/// longest slice of an error body kept in `UpstreamError::Status`
const ERROR_BODY_LIMIT: usize = 512;

/// GraphQL client for the PixAI account API.
///
/// Every request carries `Accept: */*`, the bearer token and the configured
/// timeout; `Accept-Encoding` and transparent decompression come from the
/// reqwest compression features.
#[derive(Debug, Clone)]
pub struct PixaiClient {
    client: Client,
    url: String,
}

impl PixaiClient {
    pub fn new(api: &ApiConfig) -> Result<Self, UpstreamError> {
        let token = api.token.as_deref().unwrap_or_default();

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| UpstreamError::Decode(format!("api token is not a valid header value: {}", e)))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(api.timeout_seconds))
            .build()
            .map_err(UpstreamError::Transport)?;

        Ok(Self {
            client,
            url: api.url.clone(),
        })
    }

    async fn post<T: DeserializeOwned>(&self, request: &GraphQlRequest) -> Result<T, UpstreamError> {
        let response = self.client.post(&self.url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > ERROR_BODY_LIMIT {
                let mut cut = ERROR_BODY_LIMIT;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            return Err(UpstreamError::Status { status, body });
        }

        let bytes = response.bytes().await?;
        let envelope: GraphQlResponse<T> =
            serde_json::from_slice(&bytes).map_err(|e| UpstreamError::Decode(e.to_string()))?;

        let messages: Vec<String> = envelope.errors.into_iter().map(|e| e.message).collect();
        match envelope.data {
            Some(data) => {
                if !messages.is_empty() {
                    warn!("graphql returned data with errors: {}", messages.join("; "));
                }
                Ok(data)
            }
            None if !messages.is_empty() => Err(UpstreamError::GraphQl { messages }),
            None => Err(UpstreamError::MissingField { path: "data" }),
        }
    }
}

impl AccountSource for PixaiClient {
    async fn fetch_quota(&self) -> Result<i64, UpstreamError> {
        let data: QuotaData = self.post(&quota_request()).await?;
        let quota = data
            .me
            .ok_or(UpstreamError::MissingField { path: "data.me" })?
            .quota_amount
            .ok_or(UpstreamError::MissingField { path: "data.me.quotaAmount" })?;
        debug!("quota fetched: {}", quota);
        Ok(quota)
    }

    async fn fetch_access_tokens(&self) -> Result<AccessTokenPage, UpstreamError> {
        let data: AccessTokensData = self.post(&access_tokens_request()).await?;
        let connection = data
            .me
            .ok_or(UpstreamError::MissingField { path: "data.me" })?
            .access_tokens
            .ok_or(UpstreamError::MissingField { path: "data.me.accessTokens" })?;
        let edges = connection
            .edges
            .ok_or(UpstreamError::MissingField { path: "data.me.accessTokens.edges" })?;

        let mut tokens = Vec::with_capacity(edges.len());
        for edge in edges {
            let node = edge
                .node
                .ok_or(UpstreamError::MissingField { path: "data.me.accessTokens.edges.node" })?;
            let name = node
                .name
                .ok_or(UpstreamError::MissingField { path: "data.me.accessTokens.edges.node.name" })?;
            let raw_expire_time = node.expire_time.ok_or(UpstreamError::MissingField {
                path: "data.me.accessTokens.edges.node.expireTime",
            })?;
            tokens.push(AccessToken {
                name,
                expire_time: parse_expire_time(&raw_expire_time)?,
            });
        }
        debug!("access tokens fetched: {}", tokens.len());

        Ok(AccessTokenPage {
            tokens,
            has_next_page: connection.page_info.is_some_and(|p| p.has_next_page),
            total_count: connection.total_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::Method::POST;
    use httpmock::MockServer;
    use serde_json::json;

    fn client_for(server: &MockServer, timeout_seconds: u64) -> PixaiClient {
        PixaiClient::new(&ApiConfig {
            url: server.url("/graphql"),
            token: Some("secret-token".into()),
            timeout_seconds,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn quota_request_carries_required_headers() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/graphql")
                .header("authorization", "Bearer secret-token")
                .header("accept", "*/*")
                .header("content-type", "application/json")
                .header_exists("accept-encoding");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({"data": {"me": {"quotaAmount": 12345}}}));
        });

        let quota = client_for(&server, 5).fetch_quota().await.unwrap();
        assert_eq!(quota, 12345);
        mock.assert();
    }

    #[tokio::test]
    async fn access_tokens_are_parsed_per_edge() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/graphql");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({"data": {"me": {"accessTokens": {
                    "edges": [
                        {"node": {"id": "1", "userId": "u", "name": "ci", "secret": "s",
                                  "expireTime": "2024-01-15T00:00:00.000Z",
                                  "lastUsedAt": null, "createdAt": "2023-01-01T00:00:00.000Z"},
                         "cursor": "a"},
                        {"node": {"id": "2", "userId": "u", "name": "laptop", "secret": "s",
                                  "expireTime": "2024-01-05T00:00:00.000Z",
                                  "lastUsedAt": null, "createdAt": "2023-01-01T00:00:00.000Z"},
                         "cursor": "b"}
                    ],
                    "pageInfo": {"hasNextPage": true, "hasPreviousPage": false,
                                 "endCursor": "b", "startCursor": "a"},
                    "totalCount": 12
                }}}}));
        });

        let page = client_for(&server, 5).fetch_access_tokens().await.unwrap();
        assert_eq!(page.tokens.len(), 2);
        assert_eq!(page.tokens[0].name, "ci");
        assert_eq!(page.tokens[0].expire_time, parse_expire_time("2024-01-15T00:00:00Z").unwrap());
        assert_eq!(page.tokens[1].name, "laptop");
        assert!(page.has_next_page);
        assert_eq!(page.total_count, Some(12));
    }

    #[tokio::test]
    async fn non_success_status_is_upstream_error() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/graphql");
            then.status(502).body("bad gateway");
        });

        let err = client_for(&server, 5).fetch_quota().await.unwrap_err();
        match err {
            UpstreamError::Status { status, body } => {
                assert_eq!(status.as_u16(), 502);
                assert_eq!(body, "bad gateway");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn missing_field_path_is_reported() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/graphql");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({"data": {"me": {}}}));
        });

        let err = client_for(&server, 5).fetch_quota().await.unwrap_err();
        assert!(matches!(err, UpstreamError::MissingField { path: "data.me.quotaAmount" }));
    }

    #[tokio::test]
    async fn graphql_errors_without_data() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/graphql");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({"data": null, "errors": [{"message": "unauthorized"}]}));
        });

        let err = client_for(&server, 5).fetch_access_tokens().await.unwrap_err();
        match err {
            UpstreamError::GraphQl { messages } => assert_eq!(messages, vec!["unauthorized".to_string()]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_decode_error() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/graphql");
            then.status(200).body("<html>maintenance</html>");
        });

        let err = client_for(&server, 5).fetch_quota().await.unwrap_err();
        assert_eq!(err.reason(), "decode");
    }

    #[tokio::test]
    async fn slow_upstream_times_out() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/graphql");
            then.status(200)
                .delay(Duration::from_secs(3))
                .json_body(json!({"data": {"me": {"quotaAmount": 1}}}));
        });

        let err = client_for(&server, 1).fetch_quota().await.unwrap_err();
        assert!(matches!(err, UpstreamError::Timeout(_)), "got {err}");
    }
}
