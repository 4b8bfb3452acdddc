//! Connection lifecycle: admission, join, and disconnect cleanup.
//!
//! Each connection moves `Connected → Joined → Disconnected`. Removal from
//! the [`ConnectionTable`](crate::domain::ConnectionTable) is the
//! disconnect transition and is what makes cleanup run exactly once.

use std::sync::Arc;

use tokio::sync::mpsc;

use super::RelayState;
use crate::domain::{ConnectionId, ConnectionState, OutboundEvent, UserId};
use crate::error::RelayError;

/// A connection that has been admitted and is waiting for its transport
/// loop to start.
#[derive(Debug)]
pub struct AdmittedConnection {
    /// Identifier allocated for this connection.
    pub id: ConnectionId,
    /// Receiving half of the connection's outbound queue.
    pub outbound: mpsc::Receiver<Arc<OutboundEvent>>,
}

/// Owns connection admission and teardown.
#[derive(Debug, Clone)]
pub struct LifecycleManager {
    state: Arc<RelayState>,
    outbound_capacity: usize,
    max_connections: usize,
}

impl LifecycleManager {
    /// Creates a manager over `state`.
    ///
    /// `outbound_capacity` bounds each connection's queue; `max_connections`
    /// caps how many connections may be live at once.
    #[must_use]
    pub fn new(state: Arc<RelayState>, outbound_capacity: usize, max_connections: usize) -> Self {
        Self {
            state,
            outbound_capacity: outbound_capacity.max(1),
            max_connections,
        }
    }

    /// Configured connection limit.
    #[must_use]
    pub const fn max_connections(&self) -> usize {
        self.max_connections
    }

    /// Returns `true` if another connection can be admitted right now.
    pub async fn has_capacity(&self) -> bool {
        self.state.connections().len().await < self.max_connections
    }

    /// Admits a new connection in the `Connected` state.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::CapacityExceeded`] when `max_connections`
    /// connections are already live.
    pub async fn admit(&self) -> Result<AdmittedConnection, RelayError> {
        let id = ConnectionId::new();
        let (sender, outbound) = mpsc::channel(self.outbound_capacity);
        if !self
            .state
            .connections()
            .insert(id, sender, self.max_connections)
            .await
        {
            tracing::warn!(max = self.max_connections, "connection refused, relay at capacity");
            return Err(RelayError::CapacityExceeded {
                max: self.max_connections,
            });
        }
        tracing::info!(connection = %id, "client connected");
        Ok(AdmittedConnection { id, outbound })
    }

    /// Moves `connection` to `Joined(user)`.
    ///
    /// Returns `None` if the connection is no longer live, otherwise the
    /// identity it had joined with before.
    pub async fn mark_joined(
        &self,
        connection: ConnectionId,
        user: UserId,
    ) -> Option<Option<UserId>> {
        self.state.connections().mark_joined(connection, user).await
    }

    /// Returns `true` if `connection` has not disconnected.
    pub async fn is_live(&self, connection: ConnectionId) -> bool {
        self.state.connections().contains(connection).await
    }

    /// Undoes registry and room entries made for `connection` if it
    /// disconnected while they were being written.
    ///
    /// Returns `true` if the connection was gone and its entries were
    /// cleared.
    pub async fn retract_if_gone(&self, connection: ConnectionId) -> bool {
        if self.is_live(connection).await {
            return false;
        }
        self.state.registry().unregister(connection).await;
        self.state.rooms().unsubscribe_all(connection).await;
        true
    }

    /// Disconnects `connection`: unregisters it, then removes it from every
    /// room.
    ///
    /// Only the first call for a given connection does any work; it returns
    /// `true`. Later calls return `false`.
    pub async fn disconnect(&self, connection: ConnectionId) -> bool {
        if !self.state.connections().remove(connection).await {
            return false;
        }
        let user = self.state.registry().identity_of(connection).await;
        let unregistered = self.state.registry().unregister(connection).await;
        let left = self.state.rooms().unsubscribe_all(connection).await;

        match user {
            Some(user) => tracing::info!(
                %connection,
                %user,
                unregistered,
                rooms_left = left.len(),
                "user disconnected"
            ),
            None => tracing::info!(%connection, rooms_left = left.len(), "client disconnected"),
        }
        true
    }

    /// Disconnects every live connection. Returns how many were closed.
    pub async fn disconnect_all(&self) -> usize {
        let mut closed = 0;
        for connection in self.state.connections().ids().await {
            if self.disconnect(connection).await {
                closed += 1;
            }
        }
        closed
    }

    /// Current lifecycle state of `connection`.
    pub async fn state(&self, connection: ConnectionId) -> ConnectionState {
        self.state.connections().state(connection).await
    }

    /// Number of live connections.
    pub async fn live_count(&self) -> usize {
        self.state.connections().len().await
    }
}
