//! User identity → active connection mapping.
//!
//! [`ConnectionRegistry`] keeps a forward index (user → connection) and a
//! reverse index (connection → user) behind one [`tokio::sync::RwLock`], so
//! every mutation updates both atomically and readers never observe one
//! index without the other.

use std::collections::HashMap;

use tokio::sync::RwLock;

use super::{ConnectionId, UserId};

#[derive(Debug, Default)]
struct RegistryIndex {
    by_user: HashMap<UserId, ConnectionId>,
    by_connection: HashMap<ConnectionId, UserId>,
}

/// Maps each user identity to the connection that most recently joined
/// with it.
///
/// A user has at most one active connection. Re-joining from a new
/// connection silently replaces the old mapping, and a late disconnect from
/// the replaced connection never evicts the newer one.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    index: RwLock<RegistryIndex>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Points `user` at `connection`, returning the connection it displaced.
    ///
    /// If `connection` was previously registered under another identity,
    /// that older mapping is dropped when it still points here.
    pub async fn register(&self, user: UserId, connection: ConnectionId) -> Option<ConnectionId> {
        let mut index = self.index.write().await;

        if let Some(previous_user) = index.by_connection.insert(connection, user.clone())
            && previous_user != user
            && index.by_user.get(&previous_user) == Some(&connection)
        {
            index.by_user.remove(&previous_user);
        }

        index
            .by_user
            .insert(user, connection)
            .filter(|displaced| *displaced != connection)
    }

    /// Returns the active connection for `user`, if any.
    pub async fn lookup(&self, user: &UserId) -> Option<ConnectionId> {
        self.index.read().await.by_user.get(user).copied()
    }

    /// Returns the identity `connection` last joined with, if any.
    pub async fn identity_of(&self, connection: ConnectionId) -> Option<UserId> {
        self.index.read().await.by_connection.get(&connection).cloned()
    }

    /// Forgets `connection`.
    ///
    /// The user mapping is removed only if it still points at exactly this
    /// connection. Returns `true` if a user mapping was removed.
    pub async fn unregister(&self, connection: ConnectionId) -> bool {
        let mut index = self.index.write().await;
        let Some(user) = index.by_connection.remove(&connection) else {
            return false;
        };
        if index.by_user.get(&user) == Some(&connection) {
            index.by_user.remove(&user);
            return true;
        }
        false
    }

    /// Number of users with an active connection.
    pub async fn len(&self) -> usize {
        self.index.read().await.by_user.len()
    }

    /// Returns `true` if no user is registered.
    pub async fn is_empty(&self) -> bool {
        self.index.read().await.by_user.is_empty()
    }
}
