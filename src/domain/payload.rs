//! Opaque message payloads relayed between connections.
//!
//! The relay never inspects payload content. It only remembers whether a
//! payload arrived as a text or a binary frame so the same frame kind is
//! used when forwarding it.

use axum::body::Bytes;
use axum::extract::ws::Utf8Bytes;

/// A message body as received from a client.
///
/// Both variants are reference-counted buffers, so cloning a payload for
/// each recipient of a broadcast does not copy the bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// UTF-8 text frame.
    Text(Utf8Bytes),
    /// Binary frame.
    Binary(Bytes),
}

impl Payload {
    /// Returns the payload size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Text(text) => text.as_str().len(),
            Self::Binary(bytes) => bytes.len(),
        }
    }

    /// Returns `true` if the payload carries no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` for text payloads.
    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Self::Text(text.into())
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Self::Text(text.into())
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Binary(bytes.into())
    }
}
