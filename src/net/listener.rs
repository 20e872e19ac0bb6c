//! TCP listener binding.
//!
//! The listener is bound up front so the readiness hook runs after the port is
//! taken and before any connection is accepted.

use std::io;
use std::net::{AddrParseError, SocketAddr, TcpListener};

use thiserror::Error;

use crate::config::ListenerConfig;

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("Invalid bind address: {0}")]
    Address(#[from] AddrParseError),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
}

/// Bind a non-blocking listener on the configured host and port.
pub fn bind(config: &ListenerConfig) -> Result<TcpListener, ListenerError> {
    let addr = config.socket_addr()?;
    let bind_err = |source| ListenerError::Bind { addr, source };

    let listener = TcpListener::bind(addr).map_err(bind_err)?;
    listener.set_nonblocking(true).map_err(bind_err)?;
    let local_addr = listener.local_addr().map_err(bind_err)?;

    tracing::info!(
        address = %local_addr,
        tls = config.tls.enabled,
        "Listener bound"
    );

    Ok(listener)
}
