//! Concurrent connection storage.
//!
//! [`ConnectionRegistry`] stores every live connection in a `HashMap`
//! behind a [`tokio::sync::RwLock`]. Broadcasts never iterate the map
//! itself: they take a [`ConnectionRegistry::snapshot`], which clones the
//! `Arc` handles under a short read lock and releases it before any
//! payload is forwarded.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::{Connection, ConnectionId};
use crate::error::RelayError;

/// The set of connections that are not yet fully closed.
///
/// # Concurrency
///
/// - `add` and `remove` take the write lock for a single map operation.
/// - `snapshot` takes the read lock only long enough to copy handles.
/// - Callers never need their own locking.
#[derive(Debug)]
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<ConnectionId, Arc<Connection>>>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a newly accepted connection.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::DuplicateConnection`] if a connection with the
    /// same identity is already registered (should never happen with UUID
    /// v4). The registry is left unchanged in that case.
    pub async fn add(&self, connection: Arc<Connection>) -> Result<ConnectionId, RelayError> {
        let id = connection.id();
        let mut map = self.connections.write().await;
        if map.contains_key(&id) {
            return Err(RelayError::DuplicateConnection(id));
        }
        map.insert(id, connection);
        Ok(id)
    }

    /// Removes a connection, returning its handle if it was registered.
    ///
    /// Removing an absent connection is a no-op, so duplicate close
    /// notifications are harmless.
    pub async fn remove(&self, id: ConnectionId) -> Option<Arc<Connection>> {
        self.connections.write().await.remove(&id)
    }

    /// Returns the current members as owned handles.
    ///
    /// The lock is released before this returns; iterating the result never
    /// blocks concurrent `add`/`remove`. A connection that closes after the
    /// snapshot was taken stays in the returned vector, so callers must
    /// check [`Connection::is_open`] before using it.
    pub async fn snapshot(&self) -> Vec<Arc<Connection>> {
        self.connections.read().await.values().map(Arc::clone).collect()
    }

    /// Returns `true` if a connection with this identity is registered.
    pub async fn contains(&self, id: ConnectionId) -> bool {
        self.connections.read().await.contains_key(&id)
    }

    /// Returns the number of registered connections.
    pub async fn len(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Returns `true` if no connections are registered.
    pub async fn is_empty(&self) -> bool {
        self.connections.read().await.is_empty()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
