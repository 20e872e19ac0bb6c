//! OS signal handling.
//!
//! The first SIGINT/SIGTERM starts a graceful shutdown through [`Shutdown`].
//! Any later one tears the staging directory down directly, so a drain that
//! never finishes cannot keep the process alive.

use std::io;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::lifecycle::coordinator::ShutdownCoordinator;
use crate::lifecycle::shutdown::{Shutdown, ShutdownReason};

/// Installed interrupt and terminate handlers.
pub struct ShutdownSignals {
    #[cfg(unix)]
    interrupt: tokio::signal::unix::Signal,
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl ShutdownSignals {
    /// Register the handlers. Must be called inside a Tokio runtime.
    pub fn install() -> io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    /// Wait for the next shutdown signal.
    ///
    /// Returns `None` once no further signals can be delivered.
    pub async fn recv(&mut self) -> Option<ShutdownReason> {
        tokio::select! {
            Some(()) = self.interrupt.recv() => Some(ShutdownReason::Interrupt),
            Some(()) = self.terminate.recv() => Some(ShutdownReason::Terminate),
            else => None,
        }
    }
}

#[cfg(not(unix))]
impl ShutdownSignals {
    pub fn install() -> io::Result<Self> {
        Ok(Self {})
    }

    pub async fn recv(&mut self) -> Option<ShutdownReason> {
        tokio::signal::ctrl_c()
            .await
            .ok()
            .map(|()| ShutdownReason::Interrupt)
    }
}

/// Spawn the signal listener task.
pub fn listen(
    shutdown: Shutdown,
    coordinator: Arc<ShutdownCoordinator>,
) -> io::Result<JoinHandle<()>> {
    let mut signals = ShutdownSignals::install()?;

    let handle = tokio::spawn(async move {
        let Some(reason) = signals.recv().await else {
            return;
        };
        tracing::info!(reason = %reason, "Shutdown signal received");
        shutdown.trigger(reason);

        while let Some(reason) = signals.recv().await {
            tracing::warn!(
                reason = %reason,
                "Shutdown already in progress, tearing down staging directory now"
            );
            coordinator.tear_down(reason).await;
        }
    });

    Ok(handle)
}
