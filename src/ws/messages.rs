//! Mapping between WebSocket frames and relay payloads.

use axum::extract::ws::Message;

use crate::domain::Payload;

/// What the reader loop should do with an inbound frame.
#[derive(Debug, PartialEq, Eq)]
pub enum Inbound {
    /// A data frame to broadcast.
    Payload(Payload),
    /// The client sent a close frame.
    Close,
    /// Ping/pong; answered by the transport, never relayed.
    Control,
}

impl From<Message> for Inbound {
    fn from(msg: Message) -> Self {
        match msg {
            Message::Text(text) => Self::Payload(Payload::Text(text)),
            Message::Binary(bytes) => Self::Payload(Payload::Binary(bytes)),
            Message::Close(_) => Self::Close,
            Message::Ping(_) | Message::Pong(_) => Self::Control,
        }
    }
}

impl From<Payload> for Message {
    fn from(payload: Payload) -> Self {
        match payload {
            Payload::Text(text) => Self::Text(text),
            Payload::Binary(bytes) => Self::Binary(bytes),
        }
    }
}
