// src/server/mod.rs

//! HTTP server wiring.
//!
//! - [`routes`] defines the router, handlers and [`ApiError`].
//! - [`http_server`] binds the listener and serves until shutdown.
//! - [`shutdown`] waits for Ctrl+C / SIGTERM.

pub mod http_server;
pub mod routes;
pub mod shutdown;

pub use http_server::serve_http;
pub use routes::{ApiError, AppState, router};
pub use shutdown::shutdown_signal;
