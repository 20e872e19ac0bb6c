//! Structured logging.
//!
//! `RUST_LOG` wins when set; otherwise the configured level applies to this
//! crate and `tower_http`.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Default filter directive for the given level.
pub fn default_filter(level: &str) -> String {
    format!("staging_server={level},tower_http={level}")
}

/// Install the global tracing subscriber. Call once, from the binary.
pub fn init_logging(config: &ObservabilityConfig) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(&config.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
