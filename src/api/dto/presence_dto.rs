//! DTOs for presence queries.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{OrderId, UserId};

/// Response body for `GET /presence/users/{user_id}`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserPresenceResponse {
    /// Queried identity.
    #[schema(value_type = String)]
    pub user_id: UserId,
    /// Whether the user has an active connection.
    pub online: bool,
}

/// Response body for `GET /presence/orders/{order_id}`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderPresenceResponse {
    /// Queried order.
    #[schema(value_type = String)]
    pub order_id: OrderId,
    /// Connections tracking the order.
    pub subscribers: usize,
}
