//! HTTPS API server with a managed upload staging directory.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod staging;

pub use config::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::{Shutdown, ShutdownCoordinator, ShutdownReason, TeardownReport};
pub use staging::StagingArea;
