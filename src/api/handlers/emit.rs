//! Emit handlers: push an event to a user or to an order room.
//!
//! Used by the rest of the platform (order status changes, chat sent over
//! HTTP). Both are fire-and-forget and succeed even when nobody is
//! listening.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{EmitRequest, EmitResponse};
use crate::app_state::AppState;
use crate::domain::{OrderId, TopicId, UserId};
use crate::error::{ErrorResponse, RelayError};

/// `POST /emit/users/{user_id}` — Send an event to one user.
///
/// # Errors
///
/// Returns [`RelayError::InvalidRequest`] for a blank user id or event name.
#[utoipa::path(
    post,
    path = "/api/v1/emit/users/{user_id}",
    tag = "Emit",
    summary = "Emit an event to a user",
    description = "Delivers the event to the connection currently registered for the user. A no-op if the user is offline.",
    params(
        ("user_id" = String, Path, description = "User identity"),
    ),
    request_body = EmitRequest,
    responses(
        (status = 202, description = "Event accepted", body = EmitResponse),
        (status = 400, description = "Invalid user id or event", body = ErrorResponse),
    )
)]
pub async fn emit_to_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(req): Json<EmitRequest>,
) -> Result<impl IntoResponse, RelayError> {
    let user = UserId::parse(&user_id)?;
    let event = req.into_event()?;
    let name = event.event.clone();

    let report = state.hub.emit_to_user(&user, event).await;

    Ok((
        StatusCode::ACCEPTED,
        Json(EmitResponse {
            target: TopicId::user(&user).to_string(),
            event: name,
            report,
        }),
    ))
}

/// `POST /emit/orders/{order_id}` — Send an event to everyone tracking an
/// order.
///
/// # Errors
///
/// Returns [`RelayError::InvalidRequest`] for a blank order id or event name.
#[utoipa::path(
    post,
    path = "/api/v1/emit/orders/{order_id}",
    tag = "Emit",
    summary = "Emit an event to an order room",
    description = "Broadcasts the event to every connection subscribed to `order:<order_id>`. A no-op if nobody tracks the order.",
    params(
        ("order_id" = String, Path, description = "Order identifier"),
    ),
    request_body = EmitRequest,
    responses(
        (status = 202, description = "Event accepted", body = EmitResponse),
        (status = 400, description = "Invalid order id or event", body = ErrorResponse),
    )
)]
pub async fn emit_to_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    Json(req): Json<EmitRequest>,
) -> Result<impl IntoResponse, RelayError> {
    let order = OrderId::parse(&order_id)?;
    let event = req.into_event()?;
    let name = event.event.clone();

    let report = state.hub.emit_to_order(&order, event).await;

    Ok((
        StatusCode::ACCEPTED,
        Json(EmitResponse {
            target: TopicId::order(&order).to_string(),
            event: name,
            report,
        }),
    ))
}

/// Emit routes (nested under `/api/v1`).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/emit/users/{user_id}", post(emit_to_user))
        .route("/emit/orders/{order_id}", post(emit_to_order))
}
