//! DTOs for the emit endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{DeliveryReport, OutboundEvent};
use crate::error::RelayError;

/// Request body for `POST /emit/users/{user_id}` and
/// `POST /emit/orders/{order_id}`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct EmitRequest {
    /// Event name delivered to clients (e.g. `"order_status"`).
    pub event: String,
    /// Arbitrary JSON payload. Defaults to `null`.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub data: serde_json::Value,
}

impl EmitRequest {
    /// Converts the request into an outbound event.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::InvalidRequest`] if the event name is blank.
    pub fn into_event(self) -> Result<OutboundEvent, RelayError> {
        let name = self.event.trim();
        if name.is_empty() {
            return Err(RelayError::InvalidRequest(
                "event name must not be empty".to_string(),
            ));
        }
        Ok(OutboundEvent::new(name, self.data))
    }
}

/// Response body for the emit endpoints (202 Accepted).
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EmitResponse {
    /// Room or user the event was addressed to.
    pub target: String,
    /// Event name echoed from the request.
    pub event: String,
    /// Delivery counters.
    pub report: DeliveryReport,
}
