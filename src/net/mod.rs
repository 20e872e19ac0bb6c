//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! ListenerConfig
//!     → listener.rs (bind std listener before the readiness hook)
//!     → tls.rs (load PEM certificate and key for axum-server)
//!     → Hand off to HTTP layer
//! ```

pub mod listener;
pub mod tls;
