//! Axum WebSocket upgrade handler.

use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::response::{IntoResponse, Response};

use super::connection::run_connection;
use crate::app_state::AppState;
use crate::error::RelayError;

/// `GET /ws` — Upgrade HTTP connection to WebSocket.
///
/// The connection is admitted only once the upgrade completes, so a failed
/// handshake never leaves an entry behind.
///
/// # Errors
///
/// Returns [`RelayError::CapacityExceeded`] (503) when the relay is full.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> Result<Response, RelayError> {
    let lifecycle = state.hub.lifecycle().clone();
    if !lifecycle.has_capacity().await {
        return Err(RelayError::CapacityExceeded {
            max: lifecycle.max_connections(),
        });
    }
    let router = state.hub.router().clone();

    Ok(ws
        .on_upgrade(move |socket| async move {
            match lifecycle.admit().await {
                Ok(admitted) => run_connection(socket, admitted, router, lifecycle).await,
                Err(err) => tracing::warn!(error = %err, "dropping upgraded socket"),
            }
        })
        .into_response())
}
