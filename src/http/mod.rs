//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection (axum-server)
//!     → request.rs (set / propagate x-request-id)
//!     → server.rs (router: /, /health)
//!     → upload.rs (multipart → staging directory)
//!     → response.rs (ApiError → JSON error body)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;
pub mod upload;

pub use request::X_REQUEST_ID;
pub use response::ApiError;
pub use server::{AppState, HttpServer};
