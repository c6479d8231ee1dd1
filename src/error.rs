//! Relay error types.
//!
//! [`RelayError`] is the central error type for the relay. None of these
//! errors ever travel back to a client: per-recipient send failures are
//! logged and swallowed by the dispatcher, and the remaining variants only
//! surface at startup or through the library API.

use crate::domain::ConnectionId;

/// Server-side error enum.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// A send was attempted on a connection that is no longer open.
    #[error("connection {0} is not open")]
    ConnectionClosed(ConnectionId),

    /// The recipient's outbound channel is saturated; the payload was
    /// dropped for that recipient.
    #[error("outbound channel full for connection {0}")]
    OutboundFull(ConnectionId),

    /// A connection with the same identity is already registered.
    #[error("connection {0} already registered")]
    DuplicateConnection(ConnectionId),

    /// A configuration value could not be parsed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Binding or serving the listener failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl RelayError {
    /// Returns `true` for errors that are an expected consequence of a
    /// peer disconnecting or lagging during a broadcast.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::ConnectionClosed(_) | Self::OutboundFull(_))
    }
}
