//! Shutdown triggers.

use std::fmt;

use tokio::sync::broadcast;

/// Why the server is shutting down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownReason {
    /// SIGINT / Ctrl+C.
    Interrupt,
    /// SIGTERM.
    Terminate,
    /// The server stopped serving on its own.
    ServerClosed,
    /// An unrecoverable error in the server or one of its tasks.
    Fatal(String),
}

impl ShutdownReason {
    /// Process exit code the binary uses for this reason.
    pub fn exit_code(&self) -> i32 {
        match self {
            ShutdownReason::Fatal(_) => 1,
            _ => 0,
        }
    }
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownReason::Interrupt => write!(f, "interrupt"),
            ShutdownReason::Terminate => write!(f, "terminate"),
            ShutdownReason::ServerClosed => write!(f, "server closed"),
            ShutdownReason::Fatal(msg) => write!(f, "fatal: {msg}"),
        }
    }
}

/// Coordinator for graceful shutdown.
///
/// Provides a broadcast channel that all long-running tasks can subscribe to.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<ShutdownReason>,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(4);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<ShutdownReason> {
        self.tx.subscribe()
    }

    /// Trigger the shutdown signal. A no-op when nobody is subscribed.
    pub fn trigger(&self, reason: ShutdownReason) {
        tracing::info!(reason = %reason, "Shutdown triggered");
        let _ = self.tx.send(reason);
    }

    /// Get the number of active subscribers (tasks still running).
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
