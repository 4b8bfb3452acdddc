//! Topic membership sets.
//!
//! [`RoomManager`] tracks which connections are subscribed to which topics.
//! Members per topic and topics per connection are kept in one lock so
//! `unsubscribe_all` never leaves a half-removed connection behind.

use std::collections::{HashMap, HashSet};

use tokio::sync::RwLock;

use super::{ConnectionId, TopicId};

#[derive(Debug, Default)]
struct Rooms {
    members: HashMap<TopicId, HashSet<ConnectionId>>,
    memberships: HashMap<ConnectionId, HashSet<TopicId>>,
}

impl Rooms {
    fn leave(&mut self, connection: ConnectionId, topic: &TopicId) -> bool {
        let Some(members) = self.members.get_mut(topic) else {
            return false;
        };
        let removed = members.remove(&connection);
        if members.is_empty() {
            self.members.remove(topic);
        }
        removed
    }
}

/// Room membership for every topic.
///
/// Rooms are created on first subscribe and dropped as soon as their last
/// member leaves.
#[derive(Debug, Default)]
pub struct RoomManager {
    rooms: RwLock<Rooms>,
}

impl RoomManager {
    /// Creates a manager with no rooms.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `connection` to `topic`. Returns `false` if it was already a
    /// member.
    pub async fn subscribe(&self, connection: ConnectionId, topic: TopicId) -> bool {
        let mut rooms = self.rooms.write().await;
        rooms
            .memberships
            .entry(connection)
            .or_default()
            .insert(topic.clone());
        rooms.members.entry(topic).or_default().insert(connection)
    }

    /// Removes `connection` from a single `topic`. Returns `true` if it was
    /// a member.
    pub async fn unsubscribe(&self, connection: ConnectionId, topic: &TopicId) -> bool {
        let mut rooms = self.rooms.write().await;
        if let Some(topics) = rooms.memberships.get_mut(&connection) {
            topics.remove(topic);
            if topics.is_empty() {
                rooms.memberships.remove(&connection);
            }
        }
        rooms.leave(connection, topic)
    }

    /// Removes `connection` from every topic, returning the topics it left.
    pub async fn unsubscribe_all(&self, connection: ConnectionId) -> Vec<TopicId> {
        let mut rooms = self.rooms.write().await;
        let Some(topics) = rooms.memberships.remove(&connection) else {
            return Vec::new();
        };
        let mut left = Vec::with_capacity(topics.len());
        for topic in topics {
            if rooms.leave(connection, &topic) {
                left.push(topic);
            }
        }
        left
    }

    /// Snapshot of the members of `topic`; empty if the topic is unknown.
    pub async fn members_of(&self, topic: &TopicId) -> HashSet<ConnectionId> {
        self.rooms
            .read()
            .await
            .members
            .get(topic)
            .cloned()
            .unwrap_or_default()
    }

    /// Topics `connection` is currently subscribed to.
    pub async fn topics_of(&self, connection: ConnectionId) -> HashSet<TopicId> {
        self.rooms
            .read()
            .await
            .memberships
            .get(&connection)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of members in `topic`.
    pub async fn member_count(&self, topic: &TopicId) -> usize {
        self.rooms
            .read()
            .await
            .members
            .get(topic)
            .map_or(0, HashSet::len)
    }

    /// Number of non-empty rooms.
    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.members.len()
    }
}
