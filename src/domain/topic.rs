//! Room keys.
//!
//! A [`TopicId`] names a room. Order-tracking rooms are `order:<orderId>`
//! and every joined user gets a private room `user:<userId>`.

use std::fmt;

use serde::Serialize;

use super::{OrderId, UserId};

/// Identifier of a room that connections subscribe to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TopicId(String);

impl TopicId {
    /// Room for everyone tracking `order`.
    #[must_use]
    pub fn order(order: &OrderId) -> Self {
        Self(format!("order:{order}"))
    }

    /// Private room of `user`.
    #[must_use]
    pub fn user(user: &UserId) -> Self {
        Self(format!("user:{user}"))
    }

    /// Returns the topic key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
