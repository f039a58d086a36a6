//! Listener lifecycle: bind, serve, drain on shutdown.

use std::future::Future;

use chatrelay_core::error::{RelayError, Result};

use crate::app_state::AppState;
use crate::config::GatewayConfig;
use crate::router;

/// Bind `server.host:server.port` and serve until `shutdown` resolves.
///
/// A bind failure is returned as `RelayError::Internal`; the caller treats it
/// as fatal.
pub async fn serve<F>(cfg: GatewayConfig, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listen = cfg.listen_addr();

    let state = AppState::new(cfg)?;
    let app = router::build_router(state);

    let listener = tokio::net::TcpListener::bind(&listen)
        .await
        .map_err(|e| RelayError::Internal(format!("bind {listen} failed: {e}")))?;
    tracing::info!(%listen, "chatrelay-gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| RelayError::Internal(format!("server failed: {e}")))?;

    tracing::info!("chatrelay-gateway stopped");
    Ok(())
}
