//! HTTP transport for the static route table.

use std::net::SocketAddr;

use tokio_util::sync::CancellationToken;
use tracing::info;

use super::router::router;
use crate::{AppError, Result};

/// Serve [`router`] on `0.0.0.0:<port>` until the cancellation token fires.
///
/// # Errors
///
/// Returns `AppError::Http` if the listener cannot bind or the server fails.
pub async fn serve_http(port: u16, ct: CancellationToken) -> Result<()> {
    let bind = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|err| AppError::Http(format!("failed to bind on {bind}: {err}")))?;

    serve_listener(listener, ct).await
}

/// Serve [`router`] on an already-bound listener until the token fires.
///
/// # Errors
///
/// Returns `AppError::Http` if the server fails.
pub async fn serve_listener(listener: tokio::net::TcpListener, ct: CancellationToken) -> Result<()> {
    let local = listener
        .local_addr()
        .map_err(|err| AppError::Http(format!("listener has no local address: {err}")))?;
    info!(%local, "denovibe listening on http://localhost:{}", local.port());

    axum::serve(listener, router())
        .with_graceful_shutdown(async move { ct.cancelled().await })
        .await
        .map_err(|err| AppError::Http(format!("server error: {err}")))?;

    info!("HTTP server shut down");
    Ok(())
}
