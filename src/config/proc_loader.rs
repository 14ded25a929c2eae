use std::{fs, path::Path};

use regex::Regex;
use tracing::{debug, error};

use crate::config::proc_validator;
use crate::config::settings::ServiceConfig;
use crate::error::ConfigurationError;

/// Load and validate config from YAML file
pub fn file_to_config(path: &Path) -> Result<ServiceConfig, ConfigurationError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigurationError::Read {
        path: path.display().to_string(),
        source,
    })?;

    let expanded = expand_env_vars(&content);
    parse_config(&expanded)
}

/// Parse the document without validating it; the caller validates once
/// command-line overrides are merged in.
pub fn parse_config(content: &str) -> Result<ServiceConfig, ConfigurationError> {
    let service_config: ServiceConfig = serde_yaml::from_str(content).inspect_err(|e| {
        error!("parse config error: {}", e);
    })?;
    debug!("config parsed: {:?}", service_config);
    Ok(service_config)
}

/// Validate the merged configuration, aggregating every issue.
pub fn validate(service_config: &ServiceConfig) -> Result<(), ConfigurationError> {
    debug!("validation config ...");
    proc_validator::validate_service_config(service_config).map_err(ConfigurationError::Invalid)
}

/// Replace `${VAR}` and `${VAR:default}` with environment values.
pub fn expand_env_vars(input: &str) -> String {
    let re = Regex::new(r"\$\{(\w+)(?::([^\}]+))?\}").expect("static regex");
    re.replace_all(input, |caps: &regex::Captures| {
        let var = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        std::env::var(var).unwrap_or_else(|_| default.to_string())
    })
    .to_string()
}
