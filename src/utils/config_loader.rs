use std::path::Path;

use crate::config::proc_loader::{file_to_config, validate};
use crate::config::settings::{LogFormat, LoggingConfig, ServiceConfig};
use crate::error::ConfigurationError;

/// Command-line values layered over the optional config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub api_token: Option<String>,
    pub api_url: Option<String>,
    pub port: Option<u16>,
    pub interval_seconds: Option<u64>,
    pub timeout_seconds: Option<u64>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
    pub disable_token_expiration: bool,
    pub prune_stale_tokens: bool,
}

/// Load the config file when given, apply overrides, then validate.
pub fn run(config_path: Option<&str>, overrides: ConfigOverrides) -> Result<ServiceConfig, ConfigurationError> {
    let base = match config_path {
        Some(path) => file_to_config(Path::new(path))?,
        None => ServiceConfig::default(),
    };
    let merged = apply_overrides(base, overrides);

    let has_token = merged
        .settings
        .api
        .token
        .as_deref()
        .is_some_and(|t| !t.trim().is_empty());
    if !has_token {
        return Err(ConfigurationError::MissingApiToken);
    }

    validate(&merged)?;
    Ok(merged)
}

pub fn apply_overrides(mut config: ServiceConfig, overrides: ConfigOverrides) -> ServiceConfig {
    let settings = &mut config.settings;
    if let Some(token) = overrides.api_token {
        settings.api.token = Some(token);
    }
    if let Some(url) = overrides.api_url {
        settings.api.url = url;
    }
    if let Some(timeout) = overrides.timeout_seconds {
        settings.api.timeout_seconds = timeout;
    }
    if let Some(port) = overrides.port {
        settings.server.port = port;
    }
    if let Some(interval) = overrides.interval_seconds {
        settings.poll.interval_seconds = interval;
    }
    if overrides.disable_token_expiration {
        settings.poll.token_expiration_enabled = false;
    }
    if overrides.prune_stale_tokens {
        settings.poll.prune_stale_tokens = true;
    }
    if overrides.log_level.is_some() || overrides.log_format.is_some() {
        let current = settings.logging.take().unwrap_or_default();
        settings.logging = Some(LoggingConfig::new(
            overrides.log_level.unwrap_or(current.level),
            overrides.log_format.unwrap_or(current.format),
        ));
    }
    config
}
