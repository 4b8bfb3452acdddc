//! Domain layer: identifiers, presence registry, rooms and live connections.
//!
//! These are the shared collections of the relay. Each one guards all of
//! its indices with a single lock so mutations are atomic and reads see a
//! consistent snapshot.

pub mod connection_id;
pub mod connection_registry;
pub mod connection_table;
pub mod identity;
pub mod inbound;
pub mod outbound;
pub mod room_manager;
pub mod topic;

pub use connection_id::ConnectionId;
pub use connection_registry::ConnectionRegistry;
pub use connection_table::{ConnectionState, ConnectionTable, DeliveryStatus};
pub use identity::{OrderId, UserId};
pub use inbound::InboundEvent;
pub use outbound::{DeliveryReport, OutboundEvent};
pub use room_manager::RoomManager;
pub use topic::TopicId;
