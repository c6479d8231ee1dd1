//! Bounded per-connection outbound channel.
//!
//! The dispatcher pushes payloads into a [`mpsc::Sender`] with `try_send`;
//! a writer task owned by the connection drains the receiver into the
//! socket. When the channel is full the payload is dropped for that
//! recipient only.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::domain::Payload;
use crate::domain::connection::{PayloadSink, SinkError};

impl PayloadSink for mpsc::Sender<Payload> {
    fn try_send(&self, payload: Payload) -> Result<(), SinkError> {
        mpsc::Sender::try_send(self, payload).map_err(|err| match err {
            TrySendError::Full(_) => SinkError::Full,
            TrySendError::Closed(_) => SinkError::Closed,
        })
    }
}

/// Creates the outbound channel for a new connection.
#[must_use]
pub fn channel(capacity: usize) -> (mpsc::Sender<Payload>, mpsc::Receiver<Payload>) {
    mpsc::channel(capacity.max(1))
}
