//! Inbound event dispatch.
//!
//! [`EventRouter::route`] is the single entry point for client events.
//! It matches exhaustively on [`InboundEvent`], so a new event kind does not
//! compile until it is routed here.

use std::sync::Arc;

use chrono::Utc;

use super::{LifecycleManager, RelayState};
use crate::domain::inbound::{ChatMessage, DriverLocation, JoinPayload, OrderRef};
use crate::domain::{ConnectionId, DeliveryReport, InboundEvent, OutboundEvent, TopicId, UserId};
use crate::error::EventError;

/// Why an event produced no effect.
#[derive(Debug)]
pub enum DropReason {
    /// The frame failed to decode or validate.
    Invalid(EventError),
    /// The sending connection has already disconnected.
    NotLive,
    /// `send_message` named a user with no active connection.
    NoRecipient,
}

/// What routing one event did.
#[derive(Debug)]
pub enum RouteOutcome {
    /// The connection is now bound to this identity.
    Joined(UserId),
    /// The connection is a member of `topic`; `newly` is `false` on repeat.
    Subscribed {
        /// Room joined.
        topic: TopicId,
        /// Whether membership was newly created.
        newly: bool,
    },
    /// The connection left `topic`.
    Unsubscribed {
        /// Room left.
        topic: TopicId,
        /// Whether the connection had been a member.
        was_member: bool,
    },
    /// An event was fanned out to a room.
    Broadcast {
        /// Room the event was sent to.
        topic: TopicId,
        /// Per-recipient result.
        report: DeliveryReport,
    },
    /// An event was sent to a single user's connection.
    Direct {
        /// Recipient identity.
        receiver: UserId,
        /// Delivery result.
        report: DeliveryReport,
    },
    /// Nothing happened.
    Dropped(DropReason),
}

/// Interprets client events against the shared relay state.
#[derive(Debug, Clone)]
pub struct EventRouter {
    state: Arc<RelayState>,
    lifecycle: LifecycleManager,
}

impl EventRouter {
    /// Creates a router over `state`, using `lifecycle` for state
    /// transitions.
    #[must_use]
    pub fn new(state: Arc<RelayState>, lifecycle: LifecycleManager) -> Self {
        Self { state, lifecycle }
    }

    /// Decodes a text frame from `connection` and routes it.
    ///
    /// Malformed frames are logged and dropped.
    pub async fn route_frame(&self, connection: ConnectionId, text: &str) -> RouteOutcome {
        match InboundEvent::decode(text) {
            Ok(event) => self.route(connection, event).await,
            Err(err) => dropped(connection, "frame", err),
        }
    }

    /// Routes one decoded event from `connection`.
    pub async fn route(&self, connection: ConnectionId, event: InboundEvent) -> RouteOutcome {
        if !self.lifecycle.is_live(connection).await {
            tracing::debug!(%connection, event = event.kind(), "event from closed connection");
            return RouteOutcome::Dropped(DropReason::NotLive);
        }

        match event {
            InboundEvent::Join(payload) => self.join(connection, &payload).await,
            InboundEvent::TrackOrder(payload) => self.track_order(connection, &payload).await,
            InboundEvent::UntrackOrder(payload) => self.untrack_order(connection, &payload).await,
            InboundEvent::DriverLocation(payload) => {
                self.driver_location(connection, &payload).await
            }
            InboundEvent::SendMessage(payload) => self.send_message(connection, payload).await,
        }
    }

    async fn join(&self, connection: ConnectionId, payload: &JoinPayload) -> RouteOutcome {
        let user = match payload.user_id() {
            Ok(user) => user,
            Err(err) => return dropped(connection, "join", err),
        };

        let Some(previous) = self.lifecycle.mark_joined(connection, user.clone()).await else {
            return RouteOutcome::Dropped(DropReason::NotLive);
        };
        if let Some(previous) = previous
            && previous != user
        {
            self.state
                .rooms()
                .unsubscribe(connection, &TopicId::user(&previous))
                .await;
        }

        if let Some(displaced) = self.state.registry().register(user.clone(), connection).await {
            tracing::debug!(%connection, %displaced, %user, "replaced older connection for user");
        }
        self.state
            .rooms()
            .subscribe(connection, TopicId::user(&user))
            .await;

        if self.lifecycle.retract_if_gone(connection).await {
            return RouteOutcome::Dropped(DropReason::NotLive);
        }

        tracing::info!(%connection, %user, "user joined");
        RouteOutcome::Joined(user)
    }

    async fn track_order(&self, connection: ConnectionId, payload: &OrderRef) -> RouteOutcome {
        let order = match payload.order_id() {
            Ok(order) => order,
            Err(err) => return dropped(connection, "track_order", err),
        };
        let topic = TopicId::order(&order);
        let newly = self.state.rooms().subscribe(connection, topic.clone()).await;

        if self.lifecycle.retract_if_gone(connection).await {
            return RouteOutcome::Dropped(DropReason::NotLive);
        }

        tracing::info!(%connection, %topic, "tracking order");
        RouteOutcome::Subscribed { topic, newly }
    }

    async fn untrack_order(&self, connection: ConnectionId, payload: &OrderRef) -> RouteOutcome {
        let order = match payload.order_id() {
            Ok(order) => order,
            Err(err) => return dropped(connection, "untrack_order", err),
        };
        let topic = TopicId::order(&order);
        let was_member = self.state.rooms().unsubscribe(connection, &topic).await;
        tracing::debug!(%connection, %topic, was_member, "stopped tracking order");
        RouteOutcome::Unsubscribed { topic, was_member }
    }

    async fn driver_location(
        &self,
        connection: ConnectionId,
        payload: &DriverLocation,
    ) -> RouteOutcome {
        let located = payload
            .order_id()
            .and_then(|order| payload.coordinates().map(|coords| (order, coords)));
        let (order, coords) = match located {
            Ok(located) => located,
            Err(err) => return dropped(connection, "driver_location", err),
        };

        let topic = TopicId::order(&order);
        let update = OutboundEvent::driver_location_update(
            coords.latitude,
            coords.longitude,
            coords.rotation,
            Utc::now(),
        );
        let report = self.state.emit_to_topic(&topic, update).await;

        tracing::debug!(
            %connection,
            %topic,
            delivered = report.delivered,
            dropped = report.dropped(),
            "driver location broadcast"
        );
        RouteOutcome::Broadcast { topic, report }
    }

    async fn send_message(&self, connection: ConnectionId, payload: ChatMessage) -> RouteOutcome {
        let receiver = match payload.receiver_id() {
            Ok(receiver) => receiver,
            Err(err) => return dropped(connection, "send_message", err),
        };
        if self.state.registry().lookup(&receiver).await.is_none() {
            tracing::debug!(%connection, %receiver, "receiver offline, message dropped");
            return RouteOutcome::Dropped(DropReason::NoRecipient);
        }

        let report = self
            .state
            .emit_to_user(&receiver, OutboundEvent::new_message(payload.message))
            .await;
        RouteOutcome::Direct { receiver, report }
    }
}

fn dropped(connection: ConnectionId, event: &'static str, err: EventError) -> RouteOutcome {
    tracing::debug!(%connection, event, error = %err, "dropping inbound event");
    RouteOutcome::Dropped(DropReason::Invalid(err))
}
