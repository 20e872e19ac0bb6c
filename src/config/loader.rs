//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ServerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value {value:?} for environment variable {var}")]
    Env { var: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load, apply environment overrides and validate a TOML config file.
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    load_with(path, |var| std::env::var(var).ok())
}

fn load_with<F>(path: &Path, lookup: F) -> Result<ServerConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let content = fs::read_to_string(path)?;
    let config: ServerConfig = toml::from_str(&content)?;
    finish(config, lookup)
}

/// Load from `path` when given, otherwise start from defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<ServerConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => finish(ServerConfig::default(), |var| std::env::var(var).ok()),
    }
}

fn finish<F>(mut config: ServerConfig, lookup: F) -> Result<ServerConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    apply_env_overrides(&mut config, lookup)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply `HOST` and `PORT` overrides using the given variable lookup.
pub fn apply_env_overrides<F>(config: &mut ServerConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(host) = lookup("HOST") {
        config.listener.host = host;
    }
    if let Some(port) = lookup("PORT") {
        config.listener.port = port.trim().parse().map_err(|_| ConfigError::Env {
            var: "PORT",
            value: port.clone(),
        })?;
    }
    Ok(())
}
