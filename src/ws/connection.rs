//! WebSocket connection loop.
//!
//! Handles the read/write loop for a single WebSocket connection: inbound
//! text frames go through the [`EventRouter`], and events queued for this
//! connection are written back out in order.

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};

use crate::service::{AdmittedConnection, EventRouter, LifecycleManager};

/// Runs the read/write loop for a single admitted connection.
///
/// Returns once the client closes, the transport fails, or the connection
/// is disconnected from the relay side. Disconnect cleanup always runs
/// before returning.
pub async fn run_connection(
    socket: WebSocket,
    admitted: AdmittedConnection,
    router: EventRouter,
    lifecycle: LifecycleManager,
) {
    let AdmittedConnection {
        id: connection,
        mut outbound,
    } = admitted;
    let (mut ws_tx, mut ws_rx) = socket.split();

    loop {
        tokio::select! {
            // Incoming frame from client
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        router.route_frame(connection, text.as_str()).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(err)) => {
                        tracing::debug!(%connection, error = %err, "ws receive failed");
                        break;
                    }
                    _ => {}
                }
            }
            // Event queued for this connection
            event = outbound.recv() => {
                let Some(event) = event else {
                    // Queue closed: the relay disconnected us.
                    let _ = ws_tx.send(Message::Close(None)).await;
                    break;
                };
                match event.to_frame() {
                    Ok(json) => {
                        if ws_tx.send(Message::text(json)).await.is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        tracing::warn!(
                            %connection,
                            event = %event.event,
                            error = %err,
                            "unserializable event"
                        );
                    }
                }
            }
        }
    }

    lifecycle.disconnect(connection).await;
    tracing::debug!(%connection, "ws connection closed");
}
