//! Shared application state injected into all Axum handlers.

use crate::service::RelayHub;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The relay subsystem: lifecycle, routing and emit operations.
    pub hub: RelayHub,
}

impl AppState {
    /// Wraps `hub` for use as router state.
    #[must_use]
    pub fn new(hub: RelayHub) -> Self {
        Self { hub }
    }
}
