//! Presence queries: who is online, who tracks an order.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{OrderPresenceResponse, UserPresenceResponse};
use crate::app_state::AppState;
use crate::domain::{OrderId, UserId};
use crate::error::{ErrorResponse, RelayError};
use crate::service::RelayStats;

/// `GET /presence/users/{user_id}` — Whether a user is connected.
///
/// # Errors
///
/// Returns [`RelayError::InvalidRequest`] for a blank user id.
#[utoipa::path(
    get,
    path = "/api/v1/presence/users/{user_id}",
    tag = "Presence",
    summary = "User presence",
    params(
        ("user_id" = String, Path, description = "User identity"),
    ),
    responses(
        (status = 200, description = "Presence of the user", body = UserPresenceResponse),
        (status = 400, description = "Invalid user id", body = ErrorResponse),
    )
)]
pub async fn user_presence(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, RelayError> {
    let user = UserId::parse(&user_id)?;
    let online = state.hub.is_online(&user).await;
    Ok(Json(UserPresenceResponse {
        user_id: user,
        online,
    }))
}

/// `GET /presence/orders/{order_id}` — How many connections track an order.
///
/// # Errors
///
/// Returns [`RelayError::InvalidRequest`] for a blank order id.
#[utoipa::path(
    get,
    path = "/api/v1/presence/orders/{order_id}",
    tag = "Presence",
    summary = "Order room size",
    params(
        ("order_id" = String, Path, description = "Order identifier"),
    ),
    responses(
        (status = 200, description = "Subscriber count", body = OrderPresenceResponse),
        (status = 400, description = "Invalid order id", body = ErrorResponse),
    )
)]
pub async fn order_presence(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<impl IntoResponse, RelayError> {
    let order = OrderId::parse(&order_id)?;
    let subscribers = state.hub.subscriber_count(&order).await;
    Ok(Json(OrderPresenceResponse {
        order_id: order,
        subscribers,
    }))
}

/// `GET /presence/stats` — Relay counters.
#[utoipa::path(
    get,
    path = "/api/v1/presence/stats",
    tag = "Presence",
    summary = "Relay statistics",
    responses(
        (status = 200, description = "Live counters", body = RelayStats),
    )
)]
pub async fn stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.hub.stats().await)
}

/// Presence routes (nested under `/api/v1`).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/presence/users/{user_id}", get(user_presence))
        .route("/presence/orders/{order_id}", get(order_presence))
        .route("/presence/stats", get(stats))
}
