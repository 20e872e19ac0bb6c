//! staging-server
//!
//! A minimal HTTPS API server built with Tokio, Axum and axum-server.
//!
//! # Lifecycle
//!
//! ```text
//!   load config ──▶ load TLS ──▶ bind listener ──▶ ready hook (create <root>/tmp)
//!                                                        │
//!                                                        ▼
//!                                                 serve requests
//!                                                        │
//!     SIGINT / SIGTERM ──▶ Shutdown::trigger ──▶ drain connections
//!     serve error / panic ───────────────────────────────┤
//!                                                        ▼
//!                                   close hook: tear down <root>/tmp (bounded)
//!                                                        │
//!                                                        ▼
//!                                         first report ──▶ process exit
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use staging_server::config::load_or_default;
use staging_server::http::HttpServer;
use staging_server::lifecycle::{signals, Shutdown, ShutdownCoordinator, ShutdownReason};
use staging_server::net::{listener, tls};
use staging_server::observability::{logging, metrics};
use staging_server::staging::StagingArea;

#[derive(Parser, Debug)]
#[command(name = "staging-server", version, about = "HTTPS API server with a managed upload staging directory")]
struct Cli {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_or_default(cli.config.as_deref())?;

    logging::init_logging(&config.observability);

    tracing::info!("staging-server v{} starting", env!("CARGO_PKG_VERSION"));

    let staging = Arc::new(StagingArea::from_config(&config.staging)?);

    tracing::info!(
        host = %config.listener.host,
        port = config.listener.port,
        tls = config.listener.tls.enabled,
        staging_dir = %staging.path().display(),
        teardown_timeout_secs = config.staging.teardown_timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let tls_config = if config.listener.tls.enabled {
        let cert = tls::resolve_path(staging.root(), &config.listener.tls.cert_path);
        let key = tls::resolve_path(staging.root(), &config.listener.tls.key_path);
        Some(tls::load_tls_config(&cert, &key).await?)
    } else {
        tracing::warn!("TLS disabled, serving plain HTTP");
        None
    };

    let coordinator = Arc::new(ShutdownCoordinator::new(
        Arc::clone(&staging),
        Duration::from_secs(config.staging.teardown_timeout_secs),
    ));
    let shutdown = Shutdown::new();
    let _signals = signals::listen(shutdown.clone(), Arc::clone(&coordinator))?;

    let listener = listener::bind(&config.listener)?;
    let server = HttpServer::new(config, staging, Arc::clone(&coordinator));
    let mut server_task = tokio::spawn(server.run(listener, tls_config, shutdown.subscribe()));

    let report = tokio::select! {
        joined = &mut server_task => match joined {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(error = %e, "Server task aborted");
                coordinator.tear_down(ShutdownReason::Fatal(e.to_string())).await
            }
        },
        Some(report) = coordinator.completed() => report,
    };

    tracing::info!(
        reason = %report.reason,
        outcome = report.outcome.label(),
        "Shutdown complete"
    );
    std::process::exit(report.reason.exit_code());
}
