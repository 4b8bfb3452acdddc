//! Live connections and their outbound queues.
//!
//! [`ConnectionTable`] is owned by the lifecycle manager. Each entry holds
//! the lifecycle state of a connection and the sending half of its bounded
//! outbound queue. Removing an entry is the `DISCONNECTED` transition.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{RwLock, mpsc};

use super::outbound::{DeliveryReport, OutboundEvent};
use super::{ConnectionId, UserId};

/// Lifecycle state of a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// Transport handshake done, no identity asserted yet.
    Connected,
    /// A `join` event bound the connection to a user identity.
    Joined(UserId),
    /// Terminal. The connection is no longer in the table.
    Disconnected,
}

/// Result of pushing one event onto one connection's queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStatus {
    /// The queue accepted the event.
    Delivered,
    /// The recipient is not draining its queue; the event was dropped.
    QueueFull,
    /// The recipient's writer has gone away.
    Closed,
    /// No live connection with that id.
    Unknown,
}

#[derive(Debug)]
struct ConnectionEntry {
    state: ConnectionState,
    sender: mpsc::Sender<Arc<OutboundEvent>>,
}

/// Table of live connections keyed by [`ConnectionId`].
#[derive(Debug, Default)]
pub struct ConnectionTable {
    entries: RwLock<HashMap<ConnectionId, ConnectionEntry>>,
}

impl ConnectionTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a freshly admitted connection in the `Connected` state,
    /// unless the table already holds `max` connections.
    ///
    /// Returns `false` when the table is full.
    pub async fn insert(
        &self,
        connection: ConnectionId,
        sender: mpsc::Sender<Arc<OutboundEvent>>,
        max: usize,
    ) -> bool {
        let mut entries = self.entries.write().await;
        if entries.len() >= max {
            return false;
        }
        entries.insert(
            connection,
            ConnectionEntry {
                state: ConnectionState::Connected,
                sender,
            },
        );
        true
    }

    /// Moves `connection` to `Joined(user)`.
    ///
    /// Returns `None` if the connection is not live, otherwise the identity
    /// it was joined with before (if any).
    pub async fn mark_joined(
        &self,
        connection: ConnectionId,
        user: UserId,
    ) -> Option<Option<UserId>> {
        let mut entries = self.entries.write().await;
        let entry = entries.get_mut(&connection)?;
        let previous = std::mem::replace(&mut entry.state, ConnectionState::Joined(user));
        match previous {
            ConnectionState::Joined(previous_user) => Some(Some(previous_user)),
            ConnectionState::Connected | ConnectionState::Disconnected => Some(None),
        }
    }

    /// Removes `connection`. Returns `true` only for the call that actually
    /// removed it.
    pub async fn remove(&self, connection: ConnectionId) -> bool {
        self.entries.write().await.remove(&connection).is_some()
    }

    /// Current state of `connection`; `Disconnected` if it is not live.
    pub async fn state(&self, connection: ConnectionId) -> ConnectionState {
        self.entries
            .read()
            .await
            .get(&connection)
            .map_or(ConnectionState::Disconnected, |entry| entry.state.clone())
    }

    /// Returns `true` if `connection` is live.
    pub async fn contains(&self, connection: ConnectionId) -> bool {
        self.entries.read().await.contains_key(&connection)
    }

    /// Ids of every live connection.
    pub async fn ids(&self) -> Vec<ConnectionId> {
        self.entries.read().await.keys().copied().collect()
    }

    /// Number of live connections.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns `true` if there are no live connections.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Enqueues `event` for one connection without waiting.
    pub async fn deliver(
        &self,
        connection: ConnectionId,
        event: &Arc<OutboundEvent>,
    ) -> DeliveryStatus {
        let entries = self.entries.read().await;
        match entries.get(&connection) {
            Some(entry) => try_enqueue(connection, &entry.sender, event),
            None => DeliveryStatus::Unknown,
        }
    }

    /// Enqueues `event` for every connection in `recipients`.
    ///
    /// Each send is independent: a full or closed queue drops that single
    /// delivery and the rest proceed.
    pub async fn deliver_many<'a, I>(
        &self,
        recipients: I,
        event: &Arc<OutboundEvent>,
    ) -> DeliveryReport
    where
        I: IntoIterator<Item = &'a ConnectionId>,
    {
        let entries = self.entries.read().await;
        let mut report = DeliveryReport::default();
        for connection in recipients {
            report.targeted += 1;
            let status = match entries.get(connection) {
                Some(entry) => try_enqueue(*connection, &entry.sender, event),
                None => DeliveryStatus::Unknown,
            };
            if status == DeliveryStatus::Delivered {
                report.delivered += 1;
            }
        }
        report
    }
}

fn try_enqueue(
    connection: ConnectionId,
    sender: &mpsc::Sender<Arc<OutboundEvent>>,
    event: &Arc<OutboundEvent>,
) -> DeliveryStatus {
    match sender.try_send(Arc::clone(event)) {
        Ok(()) => DeliveryStatus::Delivered,
        Err(mpsc::error::TrySendError::Full(_)) => {
            tracing::warn!(%connection, event = %event.event, "outbound queue full, dropping event");
            DeliveryStatus::QueueFull
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            tracing::debug!(%connection, event = %event.event, "outbound queue closed");
            DeliveryStatus::Closed
        }
    }
}
