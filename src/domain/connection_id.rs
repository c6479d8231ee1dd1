//! Type-safe connection identifier.
//!
//! [`ConnectionId`] wraps a [`uuid::Uuid`] (v4) so that connection
//! identities cannot be confused with other UUIDs.

use std::fmt;

/// Stable identity of one client connection.
///
/// Assigned when the transport accepts the connection and never changes
/// for its lifetime. Used as the key in [`super::ConnectionRegistry`] and
/// to exclude the sender during a broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(uuid::Uuid);

impl ConnectionId {
    /// Creates a new random `ConnectionId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
