//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::RelayConfig;
use crate::domain::{BroadcastDispatcher, ConnectionRegistry};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Registry of live connections.
    pub registry: Arc<ConnectionRegistry>,
    /// Fan-out over `registry`.
    pub dispatcher: BroadcastDispatcher,
    /// Capacity of each connection's outbound channel.
    pub outbound_capacity: usize,
}

impl AppState {
    /// Builds the state for a fresh relay with an empty registry.
    #[must_use]
    pub fn new(config: &RelayConfig) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let dispatcher = BroadcastDispatcher::new(Arc::clone(&registry));
        Self {
            registry,
            dispatcher,
            outbound_capacity: config.outbound_capacity,
        }
    }
}
