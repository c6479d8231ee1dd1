//! Per-connection tasks.
//!
//! Every accepted socket gets a reader loop (this function's task) and a
//! writer task. The reader registers the connection, hands each inbound
//! data frame to the dispatcher in arrival order, and on exit walks the
//! connection through `Closing → Closed` and removes it from the
//! registry. The writer drains the outbound channel into the socket and,
//! when told to stop, flushes what is queued and closes the socket.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::oneshot;
use tokio::time::timeout;

use super::messages::Inbound;
use super::outbound;
use crate::domain::{BroadcastDispatcher, Connection};

/// How long the writer may take to flush queued payloads and the close
/// frame once the client is gone.
const CLOSE_GRACE: Duration = Duration::from_secs(1);

/// Runs the read/write loops for a single WebSocket connection until the
/// client goes away.
pub async fn run_connection(
    socket: WebSocket,
    dispatcher: BroadcastDispatcher,
    outbound_capacity: usize,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (out_tx, mut out_rx) = outbound::channel(outbound_capacity);

    let connection = Arc::new(Connection::new(Box::new(out_tx)));
    let id = connection.id();
    let registry = Arc::clone(dispatcher.registry());

    if let Err(err) = registry.add(Arc::clone(&connection)).await {
        tracing::error!(connection_id = %id, error = %err, "failed to register connection");
        return;
    }
    let connections = registry.len().await;
    tracing::info!(connection_id = %id, connections, "client connected");

    let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
    let mut writer = tokio::spawn(async move {
        loop {
            tokio::select! {
                // Queued payloads win over the stop signal so they are flushed first.
                biased;
                payload = out_rx.recv() => {
                    let Some(payload) = payload else { break };
                    if let Err(err) = ws_tx.send(Message::from(payload)).await {
                        tracing::debug!(connection_id = %id, error = %err, "ws write failed");
                        return;
                    }
                }
                _ = &mut stop_rx => break,
            }
        }
        // Flushes the reply to a client's close frame, or sends our own.
        let _ = ws_tx.close().await;
    });

    let mut writer_done = false;
    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(msg)) => match Inbound::from(msg) {
                        Inbound::Payload(payload) => {
                            let _ = dispatcher.on_message(id, payload).await;
                        }
                        Inbound::Close => break,
                        Inbound::Control => {}
                    },
                    Some(Err(err)) => {
                        tracing::debug!(connection_id = %id, error = %err, "ws read failed");
                        break;
                    }
                    None => break,
                }
            }
            // The writer only stops on its own when the socket is broken.
            _ = &mut writer => {
                writer_done = true;
                break;
            }
        }
    }

    connection.begin_close();
    let _ = registry.remove(id).await;
    if !writer_done {
        let _ = stop_tx.send(());
        if timeout(CLOSE_GRACE, &mut writer).await.is_err() {
            tracing::debug!(connection_id = %id, "writer did not finish closing");
            writer.abort();
        }
    }
    connection.mark_closed();

    let connections = registry.len().await;
    let session_secs = (Utc::now() - connection.connected_at()).num_seconds();
    tracing::info!(
        connection_id = %id,
        connections,
        session_secs,
        "client disconnected"
    );
}
