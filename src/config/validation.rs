//! Configuration validation.
//!
//! Serde handles syntax; this checks value ranges and the staging directory
//! name. All errors are collected, not just the first.

use std::net::{IpAddr, SocketAddr};
use std::path::{Component, Path};

use thiserror::Error;

use crate::config::schema::ServerConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.host {0:?} is not an IP address")]
    InvalidHost(String),

    #[error("staging.dir_name {0:?} must be a single plain directory name")]
    InvalidStagingName(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("observability.metrics_address {0:?} is not a socket address")]
    InvalidMetricsAddress(String),

    #[error("listener.tls.{0} must be set when TLS is enabled")]
    MissingTlsPath(&'static str),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.host.parse::<IpAddr>().is_err() {
        errors.push(ValidationError::InvalidHost(config.listener.host.clone()));
    }

    if config.listener.tls.enabled {
        if config.listener.tls.cert_path.trim().is_empty() {
            errors.push(ValidationError::MissingTlsPath("cert_path"));
        }
        if config.listener.tls.key_path.trim().is_empty() {
            errors.push(ValidationError::MissingTlsPath("key_path"));
        }
    }

    if !is_plain_dir_name(&config.staging.dir_name) {
        errors.push(ValidationError::InvalidStagingName(
            config.staging.dir_name.clone(),
        ));
    }

    if config.staging.teardown_timeout_secs == 0 {
        errors.push(ValidationError::Zero("staging.teardown_timeout_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }
    if config.limits.max_body_size == 0 {
        errors.push(ValidationError::Zero("limits.max_body_size"));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Exactly one normal path component: no separators, `.` or `..`.
fn is_plain_dir_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}
