//! WebSocket layer: upgrade handler and per-connection loop.
//!
//! The endpoint at `/ws` carries `{ "event", "data" }` JSON frames in both
//! directions. Each connection gets its own task; all of them share the
//! relay state through the [`crate::service::RelayHub`].

pub mod connection;
pub mod handler;
