//! # foodie-relay
//!
//! Realtime presence and room-based relay for the food-delivery platform.
//!
//! Clients hold one WebSocket each. They `join` with a user identity,
//! `track_order` to follow an order, and exchange `driver_location` and
//! `send_message` events. The rest of the platform pushes events to users
//! and order rooms over HTTP. Delivery is best-effort and nothing is
//! persisted.
//!
//! ## Architecture
//!
//! ```text
//! Clients (WebSocket)         Platform services (HTTP)
//!     │                            │
//!     ├── WS Handler (ws/)         ├── REST Handlers (api/)
//!     │                            │
//!     ├── EventRouter ─────────────┤
//!     ├── LifecycleManager         │
//!     │                            │
//!     └──────── RelayHub (service/) ┘
//!                  │
//!                  ├── ConnectionRegistry (domain/)
//!                  ├── RoomManager (domain/)
//!                  └── ConnectionTable (domain/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod service;
pub mod ws;

use std::future::Future;

use axum::Router;
use axum::routing::get;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::service::RelayHub;
use crate::ws::handler::ws_handler;

/// Builds the full HTTP application: REST routes, `/ws`, and (with the
/// `swagger-ui` feature) the API docs.
pub fn build_app(state: AppState) -> Router {
    let app = Router::new()
        .merge(api::build_router())
        .route("/ws", get(ws_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state);

    #[cfg(feature = "swagger-ui")]
    let app = {
        use utoipa::OpenApi;
        app.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", api::ApiDoc::openapi()),
        )
    };

    app
}

/// Serves the relay on `listener` until `signal` resolves.
///
/// Sockets are disconnected only after the listener has stopped accepting,
/// so no connection upgraded during shutdown is left open.
///
/// # Errors
///
/// Returns the I/O error that stopped the server.
pub async fn serve<F>(listener: TcpListener, hub: RelayHub, signal: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_app(AppState::new(hub.clone()));
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(signal)
        .await;
    hub.shutdown().await;
    served
}
