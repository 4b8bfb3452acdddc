//! REST API layer: route handlers, DTOs, and router composition.
//!
//! Collaborator endpoints are mounted under `/api/v1`; `/health` sits at
//! the root.

pub mod dto;
pub mod handlers;

use axum::Router;
use utoipa::OpenApi;

use crate::app_state::AppState;

/// OpenAPI document for every REST endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "foodie-relay",
        description = "Realtime presence and room-based relay for order tracking and chat"
    ),
    paths(
        handlers::system::health_handler,
        handlers::emit::emit_to_user,
        handlers::emit::emit_to_order,
        handlers::presence::user_presence,
        handlers::presence::order_presence,
        handlers::presence::stats,
    ),
    components(schemas(
        dto::EmitRequest,
        dto::EmitResponse,
        dto::UserPresenceResponse,
        dto::OrderPresenceResponse,
        crate::domain::DeliveryReport,
        crate::service::RelayStats,
        crate::error::ErrorResponse,
        crate::error::ErrorBody,
        handlers::system::HealthResponse,
    )),
    tags(
        (name = "System", description = "Health"),
        (name = "Emit", description = "Push events to connected clients"),
        (name = "Presence", description = "Who is connected and what they track"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes())
}
