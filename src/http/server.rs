//! HTTP server setup and lifecycle wiring.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, timeout, body limit, request ID)
//! - Run the readiness hook once the listener is bound
//! - Serve HTTPS (or plain HTTP when TLS is disabled) via axum-server
//! - Drain on a shutdown trigger, then run the close hook

use std::io;
use std::net::TcpListener;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use axum_server::{tls_rustls::RustlsConfig, Handle};
use serde_json::json;
use tokio::sync::broadcast::{self, error::RecvError};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServerConfig;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::http::upload::{list_staged, upload_handler};
use crate::lifecycle::{startup, ShutdownCoordinator, ShutdownReason, TeardownReport};
use crate::staging::StagingArea;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub staging: Arc<StagingArea>,
}

/// HTTPS server for the staging API.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
    staging: Arc<StagingArea>,
    coordinator: Arc<ShutdownCoordinator>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(
        config: ServerConfig,
        staging: Arc<StagingArea>,
        coordinator: Arc<ShutdownCoordinator>,
    ) -> Self {
        let state = AppState {
            staging: Arc::clone(&staging),
        };
        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            staging,
            coordinator,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        Router::new()
            .route("/", get(hello_handler))
            .route("/health", get(health_handler))
            .route("/upload", post(upload_handler))
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.limits.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// Run the server on an already bound listener until shutdown.
    ///
    /// Returns the report of the tear-down performed by the close hook.
    pub async fn run(
        self,
        listener: TcpListener,
        tls: Option<RustlsConfig>,
        shutdown: broadcast::Receiver<ShutdownReason>,
    ) -> TeardownReport {
        let addr = listener.local_addr().ok();
        tracing::info!(
            address = ?addr,
            tls = tls.is_some(),
            "HTTP server starting"
        );

        // Ready hook: listener is bound, nothing accepted yet.
        startup::run_ready_hook(&self.staging).await;

        let handle = Handle::new();
        let drain = Duration::from_secs(self.config.timeouts.shutdown_drain_secs);
        let requested = Arc::new(OnceLock::new());
        let watcher = tokio::spawn(watch_for_shutdown(
            shutdown,
            handle.clone(),
            drain,
            Arc::clone(&requested),
        ));

        let app = self.router.into_make_service();
        let served = match tls {
            Some(tls) => {
                axum_server::tls_rustls::from_tcp_rustls(listener, tls)
                    .handle(handle)
                    .serve(app)
                    .await
            }
            None => axum_server::from_tcp(listener).handle(handle).serve(app).await,
        };

        watcher.abort();
        let reason = stop_reason(served, requested.get().cloned());

        tracing::info!(reason = %reason, "HTTP server stopped");

        // Close hook.
        self.coordinator.tear_down(reason).await
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Wait for a shutdown trigger and start a graceful drain.
///
/// The reason lands in `requested` before the drain starts. Returns without
/// touching either if every trigger handle was dropped without firing.
async fn watch_for_shutdown(
    mut shutdown: broadcast::Receiver<ShutdownReason>,
    handle: Handle,
    drain: Duration,
    requested: Arc<OnceLock<ShutdownReason>>,
) {
    let reason = loop {
        match shutdown.recv().await {
            Ok(reason) => break reason,
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => return,
        }
    };

    tracing::info!(
        reason = %reason,
        drain_secs = drain.as_secs(),
        "Stopping accept loop and draining connections"
    );
    let _ = requested.set(reason);
    handle.graceful_shutdown(Some(drain));
}

/// Why serving ended, given the serve result and any requested shutdown.
fn stop_reason(served: io::Result<()>, requested: Option<ShutdownReason>) -> ShutdownReason {
    match served {
        Ok(()) => requested.unwrap_or(ShutdownReason::ServerClosed),
        Err(e) => {
            tracing::error!(error = %e, "HTTP server failed");
            ShutdownReason::Fatal(e.to_string())
        }
    }
}

/// `GET /`
async fn hello_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "hello": "world" })))
}

/// `GET /health`
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let present = state.staging.is_present().await;
    let staged_files = if present {
        list_staged(state.staging.path())
            .await
            .map(|files| files.len())
            .unwrap_or(0)
    } else {
        0
    };

    Json(json!({
        "status": "ok",
        "staging_dir": state.staging.path().display().to_string(),
        "staging_present": present,
        "staged_files": staged_files,
    }))
}
