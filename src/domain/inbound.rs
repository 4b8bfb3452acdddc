//! Events sent by clients over a socket.
//!
//! Every text frame is `{ "event": <name>, "data": <payload> }` and decodes
//! into exactly one [`InboundEvent`] variant. Identifiers may arrive as JSON
//! strings or numbers; mobile clients send order ids either way.

use serde::Deserialize;

use super::{OrderId, UserId};
use crate::error::EventError;

/// Identifier as it appears on the wire.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireId {
    /// `"42"`
    Text(String),
    /// `42`
    Number(serde_json::Number),
}

impl WireId {
    /// Canonical text of the id. Integral floats render without a fraction
    /// so `7` and `7.0` name the same room.
    fn text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Number(number) => match number.as_f64() {
                Some(value)
                    if !number.is_i64()
                        && !number.is_u64()
                        && value.is_finite()
                        && value.fract() == 0.0
                        && value.abs() < 1e21 =>
                {
                    if value == 0.0 {
                        "0".to_string()
                    } else {
                        format!("{value:.0}")
                    }
                }
                _ => number.to_string(),
            },
        }
    }
}

/// Payload of `join`: either `{ "userIdentity": .. }` or the bare id.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum JoinPayload {
    /// Object form.
    Object {
        /// Asserted identity.
        #[serde(rename = "userIdentity", alias = "userId")]
        user_identity: WireId,
    },
    /// Bare string or number.
    Bare(WireId),
}

impl JoinPayload {
    /// Validated identity.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::EmptyField`] for a blank identity.
    pub fn user_id(&self) -> Result<UserId, EventError> {
        match self {
            Self::Object { user_identity } | Self::Bare(user_identity) => {
                UserId::parse(&user_identity.text())
            }
        }
    }
}

/// Payload of `track_order` / `untrack_order`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OrderRef {
    /// `{ "orderId": .. }`
    Object {
        /// Order to (un)track.
        #[serde(rename = "orderId")]
        order_id: WireId,
    },
    /// Bare string or number.
    Bare(WireId),
}

impl OrderRef {
    /// Validated order id.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::EmptyField`] for a blank id.
    pub fn order_id(&self) -> Result<OrderId, EventError> {
        match self {
            Self::Object { order_id } | Self::Bare(order_id) => OrderId::parse(&order_id.text()),
        }
    }
}

/// Payload of `driver_location`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverLocation {
    /// Order whose room receives the update.
    pub order_id: WireId,
    /// Degrees, -90..=90.
    pub latitude: f64,
    /// Degrees, -180..=180.
    pub longitude: f64,
    /// Heading of the vehicle.
    pub rotation: f64,
}

/// A validated driver position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    /// Degrees, -90..=90.
    pub latitude: f64,
    /// Degrees, -180..=180.
    pub longitude: f64,
    /// Heading of the vehicle.
    pub rotation: f64,
}

impl DriverLocation {
    /// Validated order id.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::EmptyField`] for a blank id.
    pub fn order_id(&self) -> Result<OrderId, EventError> {
        OrderId::parse(&self.order_id.text())
    }

    /// Validated coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::NonFinite`] or [`EventError::OutOfRange`] when
    /// a field is not a usable number.
    pub fn coordinates(&self) -> Result<Coordinates, EventError> {
        Ok(Coordinates {
            latitude: bounded("latitude", self.latitude, 90.0)?,
            longitude: bounded("longitude", self.longitude, 180.0)?,
            rotation: finite("rotation", self.rotation)?,
        })
    }
}

fn finite(field: &'static str, value: f64) -> Result<f64, EventError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EventError::NonFinite(field))
    }
}

fn bounded(field: &'static str, value: f64, limit: f64) -> Result<f64, EventError> {
    let value = finite(field, value)?;
    if value.abs() > limit {
        return Err(EventError::OutOfRange { field, value });
    }
    Ok(value)
}

/// Payload of `send_message`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// User the message is addressed to.
    pub receiver_id: WireId,
    /// Opaque message body, forwarded untouched.
    pub message: serde_json::Value,
}

impl ChatMessage {
    /// Validated receiver identity.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::EmptyField`] for a blank id.
    pub fn receiver_id(&self) -> Result<UserId, EventError> {
        UserId::parse(&self.receiver_id.text())
    }
}

/// Every event a client may send.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum InboundEvent {
    /// Bind this connection to a user identity.
    Join(JoinPayload),
    /// Subscribe to an order's room.
    TrackOrder(OrderRef),
    /// Leave an order's room.
    UntrackOrder(OrderRef),
    /// Driver position for an order, broadcast to its room.
    DriverLocation(DriverLocation),
    /// Direct chat message to another user.
    SendMessage(ChatMessage),
}

impl InboundEvent {
    /// Decodes one text frame.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::Malformed`] if the frame is not valid JSON or
    /// names an unknown event or carries the wrong payload shape.
    pub fn decode(text: &str) -> Result<Self, EventError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Wire name of the event.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Join(_) => "join",
            Self::TrackOrder(_) => "track_order",
            Self::UntrackOrder(_) => "untrack_order",
            Self::DriverLocation(_) => "driver_location",
            Self::SendMessage(_) => "send_message",
        }
    }
}
