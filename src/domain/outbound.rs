//! Events delivered to clients.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Name of the broadcast sent to an order room on every driver location.
pub const DRIVER_LOCATION_UPDATE: &str = "driver_location_update";

/// Name of the direct chat delivery.
pub const NEW_MESSAGE: &str = "new_message";

/// An event frame pushed to a connection: `{ "event": ..., "data": ... }`.
///
/// Never persisted. Shared between recipients of a fan-out behind an
/// `Arc` and serialized by each connection's writer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundEvent {
    /// Event name the client listens on.
    pub event: String,
    /// Arbitrary JSON payload.
    pub data: serde_json::Value,
}

impl OutboundEvent {
    /// Builds an event with an arbitrary payload.
    #[must_use]
    pub fn new(event: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }

    /// Builds a `driver_location_update` stamped with `timestamp`.
    #[must_use]
    pub fn driver_location_update(
        latitude: f64,
        longitude: f64,
        rotation: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self::new(
            DRIVER_LOCATION_UPDATE,
            serde_json::json!({
                "latitude": latitude,
                "longitude": longitude,
                "rotation": rotation,
                "timestamp": timestamp,
            }),
        )
    }

    /// Builds a `new_message` carrying the raw chat payload.
    #[must_use]
    pub fn new_message(message: serde_json::Value) -> Self {
        Self::new(NEW_MESSAGE, message)
    }

    /// Renders the event as a JSON text frame.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if the payload cannot be encoded.
    pub fn to_frame(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Outcome of delivering one event to a set of connections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct DeliveryReport {
    /// Connections the event was addressed to.
    pub targeted: usize,
    /// Connections whose outbound queue accepted the event.
    pub delivered: usize,
}

impl DeliveryReport {
    /// Deliveries that were dropped (queue full or connection gone).
    #[must_use]
    pub const fn dropped(&self) -> usize {
        self.targeted.saturating_sub(self.delivered)
    }
}
