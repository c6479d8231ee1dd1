//! # ws-relay
//!
//! A WebSocket relay: every message a client sends is forwarded, unmodified,
//! to every other connected client.
//!
//! ## Architecture
//!
//! ```text
//! Clients (WebSocket)
//!     │
//!     ├── WS Handler + per-connection tasks (ws/)
//!     │
//!     ├── BroadcastDispatcher (domain/)
//!     │
//!     └── ConnectionRegistry (domain/)
//! ```
//!
//! Delivery is fire-and-forget. A message reaches each open peer at most
//! once, a message from one sender keeps its order at every peer, and a
//! slow or broken peer never holds up the others.

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod server;
pub mod ws;
