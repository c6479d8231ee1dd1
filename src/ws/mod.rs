//! WebSocket transport: upgrade, per-connection tasks, frame mapping.
//!
//! This is the transport collaborator of the relay core. It owns the
//! sockets, drives each connection's lifecycle, and feeds inbound frames
//! to the [`crate::domain::BroadcastDispatcher`].

pub mod connection;
pub mod handler;
pub mod messages;
pub mod outbound;
