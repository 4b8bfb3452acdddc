//! External identifiers asserted by clients: users and orders.
//!
//! Both are opaque strings issued by other parts of the platform. The relay
//! only requires them to be non-empty after trimming.

use std::fmt;

use serde::Serialize;

use crate::error::EventError;

/// Pre-authenticated user identity supplied by a client on `join`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Parses a user identity, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::EmptyField`] if nothing is left after trimming.
    pub fn parse(raw: &str) -> Result<Self, EventError> {
        non_empty(raw, "userIdentity").map(Self)
    }

    /// Returns the identity as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Order identifier used as the key of an order-tracking room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    /// Parses an order identifier, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::EmptyField`] if nothing is left after trimming.
    pub fn parse(raw: &str) -> Result<Self, EventError> {
        non_empty(raw, "orderId").map(Self)
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn non_empty(raw: &str, field: &'static str) -> Result<String, EventError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EventError::EmptyField(field));
    }
    Ok(trimmed.to_string())
}
