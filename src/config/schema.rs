//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use std::net::{AddrParseError, IpAddr, SocketAddr};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::staging::DEFAULT_DIR_NAME;

/// Root configuration for the staging server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (host, port, TLS).
    pub listener: ListenerConfig,

    /// Upload staging directory settings.
    pub staging: StagingConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// IP address to bind, overridden by `HOST`.
    pub host: String,

    /// Port to bind, overridden by `PORT`.
    pub port: u16,

    /// TLS certificate settings.
    pub tls: TlsConfig,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 443,
            tls: TlsConfig::default(),
        }
    }
}

impl ListenerConfig {
    /// Socket address built from `host` and `port`.
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        let ip: IpAddr = self.host.parse()?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// TLS configuration for the listener.
///
/// Paths are relative to the process root unless absolute.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TlsConfig {
    /// Serve HTTPS. Disable only for local testing.
    pub enabled: bool,

    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cert_path: "ssl/cert.pem".to_string(),
            key_path: "ssl/key.pem".to_string(),
        }
    }
}

/// Upload staging directory configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StagingConfig {
    /// Process root. Defaults to the working directory at startup.
    pub root: Option<PathBuf>,

    /// Name of the staging directory under the root.
    pub dir_name: String,

    /// Upper bound on recursive removal during shutdown, in seconds.
    pub teardown_timeout_secs: u64,
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            root: None,
            dir_name: DEFAULT_DIR_NAME.to_string(),
            teardown_timeout_secs: 10,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,

    /// How long open connections may drain after shutdown starts, in seconds.
    pub shutdown_drain_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 300,
            shutdown_drain_secs: 5,
        }
    }
}

/// Request size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_size: 512 * 1024 * 1024, // 512MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
