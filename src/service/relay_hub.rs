//! Relay hub: the handle shared by the transport and HTTP layers.

use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

use super::{EventRouter, LifecycleManager, RelayState};
use crate::config::RelayConfig;
use crate::domain::{DeliveryReport, OrderId, OutboundEvent, TopicId, UserId};

/// Point-in-time counters of the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct RelayStats {
    /// Live connections.
    pub connections: usize,
    /// Users with an active connection.
    pub registered_users: usize,
    /// Non-empty rooms.
    pub rooms: usize,
}

/// Owns one [`RelayState`] and the components wired to it.
///
/// Cloning is cheap; every clone shares the same state.
#[derive(Debug, Clone)]
pub struct RelayHub {
    state: Arc<RelayState>,
    lifecycle: LifecycleManager,
    router: EventRouter,
}

impl RelayHub {
    /// Creates a hub with fresh state.
    #[must_use]
    pub fn new(outbound_capacity: usize, max_connections: usize) -> Self {
        let state = Arc::new(RelayState::new());
        let lifecycle =
            LifecycleManager::new(Arc::clone(&state), outbound_capacity, max_connections);
        let router = EventRouter::new(Arc::clone(&state), lifecycle.clone());
        Self {
            state,
            lifecycle,
            router,
        }
    }

    /// Creates a hub sized from `config`.
    #[must_use]
    pub fn from_config(config: &RelayConfig) -> Self {
        Self::new(config.outbound_queue_capacity, config.max_connections)
    }

    /// Shared state.
    #[must_use]
    pub fn state(&self) -> &Arc<RelayState> {
        &self.state
    }

    /// Connection lifecycle manager.
    #[must_use]
    pub const fn lifecycle(&self) -> &LifecycleManager {
        &self.lifecycle
    }

    /// Inbound event router.
    #[must_use]
    pub const fn router(&self) -> &EventRouter {
        &self.router
    }

    /// Sends an arbitrary event to `user` if connected. Fire-and-forget.
    pub async fn emit_to_user(&self, user: &UserId, event: OutboundEvent) -> DeliveryReport {
        let report = self.state.emit_to_user(user, event).await;
        tracing::debug!(%user, delivered = report.delivered, "emit to user");
        report
    }

    /// Sends an arbitrary event to every subscriber of `topic`.
    /// Fire-and-forget.
    pub async fn emit_to_topic(&self, topic: &TopicId, event: OutboundEvent) -> DeliveryReport {
        let report = self.state.emit_to_topic(topic, event).await;
        tracing::debug!(
            %topic,
            targeted = report.targeted,
            delivered = report.delivered,
            "emit to topic"
        );
        report
    }

    /// Sends an arbitrary event to everyone tracking `order`.
    pub async fn emit_to_order(&self, order: &OrderId, event: OutboundEvent) -> DeliveryReport {
        self.emit_to_topic(&TopicId::order(order), event).await
    }

    /// Returns `true` if `user` has an active connection.
    pub async fn is_online(&self, user: &UserId) -> bool {
        self.state.registry().lookup(user).await.is_some()
    }

    /// Number of connections tracking `order`.
    pub async fn subscriber_count(&self, order: &OrderId) -> usize {
        self.state
            .rooms()
            .member_count(&TopicId::order(order))
            .await
    }

    /// Current counters.
    pub async fn stats(&self) -> RelayStats {
        RelayStats {
            connections: self.lifecycle.live_count().await,
            registered_users: self.state.registry().len().await,
            rooms: self.state.rooms().room_count().await,
        }
    }

    /// Disconnects every live connection. Called once at shutdown.
    pub async fn shutdown(&self) -> usize {
        let closed = self.lifecycle.disconnect_all().await;
        tracing::info!(closed, "relay shut down");
        closed
    }
}
