// src/server/http_server.rs

use std::future::Future;
use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::errors::{BuilddError, Result};

/// Bind `addr` and serve `app` until `shutdown` resolves.
pub async fn serve_http<F>(app: Router, addr: SocketAddr, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(addr).await.map_err(|err| {
        error!(%addr, error = %err, "failed to bind");
        BuilddError::Server(format!("binding to {addr}: {err}"))
    })?;

    let local = listener.local_addr().unwrap_or(addr);
    info!(addr = %local, "listening");
    if local.ip().is_unspecified() {
        warn!("bound to all interfaces; /build runs arbitrary commands, restrict access with a firewall");
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|err| {
            error!(error = %err, "server error");
            BuilddError::Server(err.to_string())
        })?;

    info!("server shut down gracefully");
    Ok(())
}
