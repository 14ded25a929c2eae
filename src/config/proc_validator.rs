//! Configuration validation with aggregated errors.
//! - Aggregates all issues into Vec<String>
//! - Checks api, poll, server, metrics and logging invariants

use tracing::{error, info};

use crate::config::settings::{ApiConfig, PollConfig, ServiceConfig, SettingsConfig};
use crate::utils::constants::HEALTH_PATH;

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_settings(&cfg.settings, &mut errors);

    if errors.is_empty() {
        info!("config validation passed");
        Ok(())
    } else {
        for e in &errors {
            error!("config validation: {}", e);
        }
        Err(errors)
    }
}

fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    validate_api(&settings.api, errors);
    validate_poll(&settings.poll, errors);

    if settings.server.host.trim().is_empty() {
        errors.push("settings.server.host must not be empty".to_string());
    }
    if settings.server.port == 0 {
        errors.push("settings.server.port must be in range 1-65535".to_string());
    }

    // metrics endpoint start with '/'
    let metrics = &settings.metrics;
    if !metrics.path.starts_with('/') {
        errors.push(format!(
            "settings.metrics.path '{}' must start with '/'",
            metrics.path
        ));
    }
    if metrics.path == HEALTH_PATH {
        errors.push(format!(
            "settings.metrics.path '{}' collides with the health route",
            metrics.path
        ));
    }

    // logging level
    if let Some(logging) = &settings.logging {
        let valid = ["trace", "debug", "info", "warn", "error"];
        if !valid.contains(&logging.level.to_lowercase().as_str()) {
            errors.push(format!(
                "settings.logging.level '{}' invalid; allowed: {:?}",
                logging.level, valid
            ));
        }
    }
}

fn validate_api(api: &ApiConfig, errors: &mut Vec<String>) {
    match api.token.as_deref().map(str::trim) {
        None | Some("") => errors.push("settings.api.token is required".to_string()),
        Some(_) => {}
    }
    if !(api.url.starts_with("http://") || api.url.starts_with("https://")) {
        errors.push(format!(
            "settings.api.url '{}' must use http or https scheme",
            api.url
        ));
    }
    if api.timeout_seconds == 0 {
        errors.push("settings.api.timeout_seconds must be >= 1".to_string());
    }
}

fn validate_poll(poll: &PollConfig, errors: &mut Vec<String>) {
    if poll.interval_seconds == 0 {
        errors.push("settings.poll.interval_seconds must be >= 1".to_string());
    }
    if poll.prune_stale_tokens && !poll.token_expiration_enabled {
        errors.push(
            "settings.poll.prune_stale_tokens requires token_expiration_enabled".to_string(),
        );
    }
}
