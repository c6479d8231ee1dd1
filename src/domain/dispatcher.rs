//! Fan-out of one client's message to every other open connection.
//!
//! [`BroadcastDispatcher`] is fire-and-forget: each peer gets exactly one
//! non-blocking send attempt, failures are logged and skipped, and nothing
//! is reported back to the sender.

use std::sync::Arc;

use super::{ConnectionId, ConnectionRegistry, Payload};

/// Outcome counts of a single broadcast.
///
/// Only used for logging and tests; never sent to a client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Peers whose transport accepted the payload.
    pub delivered: usize,
    /// Peers skipped because they were no longer open.
    pub skipped: usize,
    /// Peers whose transport refused the payload.
    pub failed: usize,
}

impl DeliveryReport {
    /// Total number of peers considered (sender excluded).
    #[must_use]
    pub const fn peers(&self) -> usize {
        self.delivered + self.skipped + self.failed
    }
}

/// Forwards inbound payloads to all other registered connections.
#[derive(Debug, Clone)]
pub struct BroadcastDispatcher {
    registry: Arc<ConnectionRegistry>,
}

impl BroadcastDispatcher {
    /// Creates a dispatcher over the given registry.
    #[must_use]
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Returns a reference to the inner [`ConnectionRegistry`].
    #[must_use]
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Forwards `payload` from `sender` to every other open connection.
    ///
    /// Iterates a registry snapshot, so connections joining or leaving
    /// meanwhile neither block nor disturb the broadcast. A failure for one
    /// peer never stops delivery to the rest.
    pub async fn on_message(&self, sender: ConnectionId, payload: Payload) -> DeliveryReport {
        tracing::trace!(
            connection_id = %sender,
            text = payload.is_text(),
            payload = ?payload,
            "received"
        );

        let peers = self.registry.snapshot().await;
        let mut report = DeliveryReport::default();

        for peer in peers.iter().filter(|peer| peer.id() != sender) {
            if !peer.is_open() {
                report.skipped += 1;
                continue;
            }
            match peer.send(payload.clone()) {
                Ok(()) => report.delivered += 1,
                Err(err) if err.is_transient() => {
                    tracing::debug!(
                        connection_id = %peer.id(),
                        error = %err,
                        "dropping payload for peer"
                    );
                    report.failed += 1;
                }
                Err(err) => {
                    tracing::warn!(
                        connection_id = %peer.id(),
                        error = %err,
                        "unexpected send error"
                    );
                    report.failed += 1;
                }
            }
        }

        tracing::debug!(
            connection_id = %sender,
            bytes = payload.len(),
            peers = report.peers(),
            delivered = report.delivered,
            skipped = report.skipped,
            failed = report.failed,
            "broadcast"
        );
        report
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::connection::{PayloadSink, SinkError};
    use crate::domain::Connection;
    use tokio::sync::mpsc;

    #[derive(Debug)]
    struct FailingSink;

    impl PayloadSink for FailingSink {
        fn try_send(&self, _payload: Payload) -> Result<(), SinkError> {
            Err(SinkError::Closed)
        }
    }

    async fn join(
        registry: &ConnectionRegistry,
        capacity: usize,
    ) -> (Arc<Connection>, mpsc::Receiver<Payload>) {
        let (tx, rx) = mpsc::channel(capacity);
        let conn = Arc::new(Connection::new(Box::new(tx)));
        let Ok(_) = registry.add(Arc::clone(&conn)).await else {
            panic!("add failed");
        };
        (conn, rx)
    }

    fn setup() -> (Arc<ConnectionRegistry>, BroadcastDispatcher) {
        let registry = Arc::new(ConnectionRegistry::new());
        let dispatcher = BroadcastDispatcher::new(Arc::clone(&registry));
        (registry, dispatcher)
    }

    #[tokio::test]
    async fn sender_is_excluded() {
        let (registry, dispatcher) = setup();
        let (s, mut s_rx) = join(&registry, 8).await;
        let (_a, mut a_rx) = join(&registry, 8).await;
        let (_b, mut b_rx) = join(&registry, 8).await;

        let report = dispatcher.on_message(s.id(), Payload::from("hi")).await;
        assert_eq!(report.delivered, 2);
        assert_eq!(report.peers(), 2);

        assert_eq!(a_rx.try_recv().ok(), Some(Payload::from("hi")));
        assert_eq!(b_rx.try_recv().ok(), Some(Payload::from("hi")));
        assert!(s_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn failing_peer_does_not_block_others() {
        let (registry, dispatcher) = setup();
        let (s, _s_rx) = join(&registry, 8).await;
        let broken = Arc::new(Connection::new(Box::new(FailingSink)));
        let _ = registry.add(broken).await;
        let (_b, mut b_rx) = join(&registry, 8).await;

        let report = dispatcher.on_message(s.id(), Payload::from("x")).await;
        assert_eq!(report.failed, 1);
        assert_eq!(report.delivered, 1);
        assert_eq!(b_rx.try_recv().ok(), Some(Payload::from("x")));
    }

    #[tokio::test]
    async fn saturated_peer_is_isolated() {
        let (registry, dispatcher) = setup();
        let (s, _s_rx) = join(&registry, 8).await;
        let (_slow, mut slow_rx) = join(&registry, 1).await;
        let (_fast, mut fast_rx) = join(&registry, 8).await;

        let _ = dispatcher.on_message(s.id(), Payload::from("m1")).await;
        let report = dispatcher.on_message(s.id(), Payload::from("m2")).await;
        assert_eq!(report.failed, 1);
        assert_eq!(report.delivered, 1);

        assert_eq!(slow_rx.try_recv().ok(), Some(Payload::from("m1")));
        assert!(slow_rx.try_recv().is_err());
        assert_eq!(fast_rx.try_recv().ok(), Some(Payload::from("m1")));
        assert_eq!(fast_rx.try_recv().ok(), Some(Payload::from("m2")));
    }

    #[tokio::test]
    async fn non_open_peers_are_skipped() {
        let (registry, dispatcher) = setup();
        let (s, _s_rx) = join(&registry, 8).await;
        let (closing, mut closing_rx) = join(&registry, 8).await;
        let (closed, mut closed_rx) = join(&registry, 8).await;
        closing.begin_close();
        closed.mark_closed();

        let report = dispatcher.on_message(s.id(), Payload::from("x")).await;
        assert_eq!(report.skipped, 2);
        assert_eq!(report.delivered, 0);
        assert!(closing_rx.try_recv().is_err());
        assert!(closed_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn per_sender_order_is_preserved() {
        let (registry, dispatcher) = setup();
        let (s, _s_rx) = join(&registry, 8).await;
        let (_a, mut a_rx) = join(&registry, 8).await;
        let (_b, mut b_rx) = join(&registry, 8).await;

        for msg in ["m1", "m2", "m3"] {
            let _ = dispatcher.on_message(s.id(), Payload::from(msg)).await;
        }

        for rx in [&mut a_rx, &mut b_rx] {
            assert_eq!(rx.try_recv().ok(), Some(Payload::from("m1")));
            assert_eq!(rx.try_recv().ok(), Some(Payload::from("m2")));
            assert_eq!(rx.try_recv().ok(), Some(Payload::from("m3")));
        }
    }

    #[tokio::test]
    async fn binary_payload_forwarded_unmodified() {
        let (registry, dispatcher) = setup();
        let (s, _s_rx) = join(&registry, 8).await;
        let (_a, mut a_rx) = join(&registry, 8).await;

        let bytes = vec![0xde, 0xad, 0xbe, 0xef];
        let _ = dispatcher
            .on_message(s.id(), Payload::from(bytes.clone()))
            .await;
        assert_eq!(a_rx.try_recv().ok(), Some(Payload::from(bytes)));
    }

    #[tokio::test]
    async fn lone_sender_reaches_nobody() {
        let (registry, dispatcher) = setup();
        let (s, _s_rx) = join(&registry, 8).await;
        let report = dispatcher.on_message(s.id(), Payload::from("echo?")).await;
        assert_eq!(report, DeliveryReport::default());
    }

    #[tokio::test]
    async fn removed_peer_no_longer_receives() {
        let (registry, dispatcher) = setup();
        let (c1, _c1_rx) = join(&registry, 8).await;
        let (c2, mut c2_rx) = join(&registry, 8).await;
        let (_c3, mut c3_rx) = join(&registry, 8).await;
        assert_eq!(registry.len().await, 3);

        let _ = dispatcher.on_message(c1.id(), Payload::from("hello")).await;
        assert_eq!(c2_rx.try_recv().ok(), Some(Payload::from("hello")));
        assert_eq!(c3_rx.try_recv().ok(), Some(Payload::from("hello")));

        c2.mark_closed();
        let _ = registry.remove(c2.id()).await;
        assert_eq!(registry.len().await, 2);

        let report = dispatcher.on_message(c1.id(), Payload::from("world")).await;
        assert_eq!(report.delivered, 1);
        assert_eq!(c3_rx.try_recv().ok(), Some(Payload::from("world")));
        assert!(c2_rx.try_recv().is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn broadcast_during_churn_keeps_order() {
        const MESSAGES: usize = 2000;
        let (registry, dispatcher) = setup();
        let (s, _s_rx) = join(&registry, 8).await;
        let (_peer, mut peer_rx) = join(&registry, MESSAGES).await;

        let churn = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move {
                for _ in 0..MESSAGES {
                    let (tx, _rx) = mpsc::channel::<Payload>(1);
                    let conn = Arc::new(Connection::new(Box::new(tx)));
                    let _ = registry.add(Arc::clone(&conn)).await;
                    tokio::task::yield_now().await;
                    conn.mark_closed();
                    let _ = registry.remove(conn.id()).await;
                }
            })
        };

        for i in 0..MESSAGES {
            let _ = dispatcher
                .on_message(s.id(), Payload::from(format!("m{i}")))
                .await;
        }
        let Ok(()) = churn.await else {
            panic!("churn task panicked");
        };

        for i in 0..MESSAGES {
            assert_eq!(peer_rx.try_recv().ok(), Some(Payload::from(format!("m{i}"))));
        }
        assert!(peer_rx.try_recv().is_err());
        assert_eq!(registry.len().await, 2);
    }
}
