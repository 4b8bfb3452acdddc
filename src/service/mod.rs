//! Service layer: relay state, connection lifecycle and event routing.
//!
//! [`RelayHub`] wires one [`RelayState`] to a [`LifecycleManager`] and an
//! [`EventRouter`] and exposes the emit operations used by HTTP handlers.

pub mod event_router;
pub mod lifecycle;
pub mod relay_hub;
pub mod relay_state;

pub use event_router::{DropReason, EventRouter, RouteOutcome};
pub use lifecycle::{AdmittedConnection, LifecycleManager};
pub use relay_hub::{RelayHub, RelayStats};
pub use relay_state::RelayState;
