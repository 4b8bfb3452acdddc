//! The relay's shared state, owned by one subsystem instance.

use std::sync::Arc;

use crate::domain::{
    ConnectionRegistry, ConnectionTable, DeliveryReport, DeliveryStatus, OutboundEvent,
    RoomManager, TopicId, UserId,
};

/// Every collection shared between connection tasks.
///
/// Created once at startup and handed to the lifecycle manager and the
/// event router behind an `Arc`. Dropped at shutdown after all connections
/// have been disconnected.
#[derive(Debug, Default)]
pub struct RelayState {
    registry: ConnectionRegistry,
    rooms: RoomManager,
    connections: ConnectionTable,
}

impl RelayState {
    /// Creates empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// User identity → connection mapping.
    #[must_use]
    pub const fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Topic memberships.
    #[must_use]
    pub const fn rooms(&self) -> &RoomManager {
        &self.rooms
    }

    /// Live connections and their outbound queues.
    #[must_use]
    pub const fn connections(&self) -> &ConnectionTable {
        &self.connections
    }

    /// Sends `event` to the connection currently registered for `user`.
    ///
    /// A no-op when the user has no active connection.
    pub async fn emit_to_user(&self, user: &UserId, event: OutboundEvent) -> DeliveryReport {
        let Some(connection) = self.registry.lookup(user).await else {
            return DeliveryReport::default();
        };
        let status = self
            .connections
            .deliver(connection, &Arc::new(event))
            .await;
        DeliveryReport {
            targeted: 1,
            delivered: usize::from(status == DeliveryStatus::Delivered),
        }
    }

    /// Sends `event` to every member of `topic`.
    ///
    /// A no-op when the topic has no members.
    pub async fn emit_to_topic(&self, topic: &TopicId, event: OutboundEvent) -> DeliveryReport {
        let members = self.rooms.members_of(topic).await;
        if members.is_empty() {
            return DeliveryReport::default();
        }
        self.connections
            .deliver_many(&members, &Arc::new(event))
            .await
    }
}
