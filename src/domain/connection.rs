//! Connection handle and its lifecycle state machine.
//!
//! A [`Connection`] is shared as `Arc<Connection>` between the registry and
//! the transport task that owns the socket. Only the transport moves the
//! state forward; the registry and dispatcher only observe it.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

use chrono::{DateTime, Utc};

use super::{ConnectionId, Payload};
use crate::error::RelayError;

/// Lifecycle state of a connection.
///
/// Transitions only move forward: `Open → Closing → Closed`, or straight
/// from `Open` to `Closed` for transports that close atomically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Accepting outbound payloads.
    Open,
    /// The transport has started shutting the connection down.
    Closing,
    /// Terminal state.
    Closed,
}

impl ConnectionState {
    const fn as_u8(self) -> u8 {
        match self {
            Self::Open => 0,
            Self::Closing => 1,
            Self::Closed => 2,
        }
    }

    const fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Open,
            1 => Self::Closing,
            _ => Self::Closed,
        }
    }
}

/// Why a sink refused a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkError {
    /// The outbound buffer is at capacity.
    Full,
    /// The receiving side of the sink is gone.
    Closed,
}

/// The transport's non-blocking send primitive for one connection.
///
/// Implementations must not wait: a payload is either accepted for
/// delivery or refused immediately.
pub trait PayloadSink: Send + Sync + fmt::Debug {
    /// Hands `payload` to the transport.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] if the payload cannot be accepted right now.
    fn try_send(&self, payload: Payload) -> Result<(), SinkError>;
}

/// One client session.
#[derive(Debug)]
pub struct Connection {
    id: ConnectionId,
    state: AtomicU8,
    connected_at: DateTime<Utc>,
    sink: Box<dyn PayloadSink>,
}

impl Connection {
    /// Creates a new OPEN connection with a fresh identity.
    #[must_use]
    pub fn new(sink: Box<dyn PayloadSink>) -> Self {
        Self {
            id: ConnectionId::new(),
            state: AtomicU8::new(ConnectionState::Open.as_u8()),
            connected_at: Utc::now(),
            sink,
        }
    }

    /// Returns the connection identity.
    #[must_use]
    pub const fn id(&self) -> ConnectionId {
        self.id
    }

    /// Returns when the transport accepted this connection.
    #[must_use]
    pub const fn connected_at(&self) -> DateTime<Utc> {
        self.connected_at
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Returns `true` while the connection accepts outbound payloads.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    /// Moves `Open → Closing`. Returns `false` if the connection had
    /// already left the open state.
    pub fn begin_close(&self) -> bool {
        self.state
            .compare_exchange(
                ConnectionState::Open.as_u8(),
                ConnectionState::Closing.as_u8(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Moves to `Closed` from any state. Returns `false` if it was already
    /// closed.
    pub fn mark_closed(&self) -> bool {
        self.state.swap(ConnectionState::Closed.as_u8(), Ordering::AcqRel)
            != ConnectionState::Closed.as_u8()
    }

    /// Forwards `payload` to this connection's transport.
    ///
    /// # Errors
    ///
    /// - [`RelayError::ConnectionClosed`] if the connection is not open or
    ///   the transport has gone away.
    /// - [`RelayError::OutboundFull`] if the transport's buffer is full.
    pub fn send(&self, payload: Payload) -> Result<(), RelayError> {
        if !self.is_open() {
            return Err(RelayError::ConnectionClosed(self.id));
        }
        self.sink.try_send(payload).map_err(|err| match err {
            SinkError::Full => RelayError::OutboundFull(self.id),
            SinkError::Closed => RelayError::ConnectionClosed(self.id),
        })
    }
}
