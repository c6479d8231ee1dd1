//! Domain layer: connection identity, lifecycle, registry, and fan-out.
//!
//! This module holds the relay core. It knows nothing about sockets: the
//! transport plugs in through [`connection::PayloadSink`] and drives the
//! connection state machine.

pub mod connection;
pub mod connection_id;
pub mod dispatcher;
pub mod payload;
pub mod registry;

pub use connection::{Connection, ConnectionState};
pub use connection_id::ConnectionId;
pub use dispatcher::{BroadcastDispatcher, DeliveryReport};
pub use payload::Payload;
pub use registry::ConnectionRegistry;
