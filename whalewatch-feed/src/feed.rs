//! Page-local live feed view: one subscription, one bounded buffer.
//!
//! Each UI surface that shows the live stream owns one of these. Views
//! share nothing with each other or with the notification store; two open
//! surfaces mean two transport connections to the same logical feed. That
//! duplication is a deliberate simplicity tradeoff (see DESIGN.md).

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::alert::AlertRecord;
use crate::buffer::BoundedBuffer;
use crate::config::{FeedConfig, LIVE_FEED_CAPACITY};
use crate::stream::{ConnectionState, FeedTransport, SseTransport, StreamClient};

struct FeedShared {
    buffer: Mutex<BoundedBuffer<AlertRecord>>,
    revision: watch::Sender<u64>,
}

/// Live alert view backing one UI surface.
pub struct AlertFeed {
    shared: Arc<FeedShared>,
    client: StreamClient,
    task: Option<JoinHandle<()>>,
}

impl AlertFeed {
    /// Start a view over the production SSE transport. The config's
    /// `symbol` restricts the subscription when present.
    pub fn start(config: FeedConfig) -> Self {
        Self::start_with_transport(config, Arc::new(SseTransport::default()))
    }

    /// Start with a caller-supplied transport.
    pub fn start_with_transport(config: FeedConfig, transport: Arc<dyn FeedTransport>) -> Self {
        Self::start_inner(config, transport, LIVE_FEED_CAPACITY)
    }

    fn start_inner(
        config: FeedConfig,
        transport: Arc<dyn FeedTransport>,
        capacity: usize,
    ) -> Self {
        let mut client = StreamClient::with_transport(config, transport);
        let mut alerts = client.connect();
        let shared = Arc::new(FeedShared {
            buffer: Mutex::new(BoundedBuffer::new(capacity)),
            revision: watch::channel(0).0,
        });

        let pump = Arc::clone(&shared);
        let task = tokio::spawn(async move {
            while let Some(alert) = alerts.recv().await {
                pump.buffer.lock().push(alert);
                pump.revision.send_modify(|rev| *rev += 1);
            }
            debug!("live feed channel closed");
        });

        Self {
            shared,
            client,
            task: Some(task),
        }
    }

    /// Newest-first view of the alerts received so far.
    pub fn snapshot(&self) -> Vec<AlertRecord> {
        self.shared.buffer.lock().snapshot()
    }

    pub fn len(&self) -> usize {
        self.shared.buffer.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.buffer.lock().is_empty()
    }

    /// Stream connectivity, for the live/disconnected indicator.
    pub fn connection(&self) -> watch::Receiver<ConnectionState> {
        self.client.connection()
    }

    /// Revision channel; bumped once per buffered alert.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.shared.revision.subscribe()
    }

    /// Deterministic teardown: close the stream, cancel the pump and any
    /// pending reconnect. Idempotent; also runs on drop.
    pub fn stop(&mut self) {
        self.client.disconnect();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for AlertFeed {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::Side;
    use crate::test_utils::{ScriptItem, ScriptedTransport, settle, whale_event, whale_record};
    use url::Url;

    fn test_config() -> FeedConfig {
        FeedConfig::new(Url::parse("http://localhost:8000/api/").unwrap())
    }

    #[tokio::test(start_paused = true)]
    async fn test_capacity_two_evicts_the_oldest() {
        let transport = ScriptedTransport::new(vec![vec![
            ScriptItem::Event(whale_event("BTC/USD", Side::Buy, 5.0)),
            ScriptItem::Event(whale_event("ETH/USD", Side::Sell, 120.0)),
            ScriptItem::Event(whale_event("BTC/USD", Side::Buy, 2.0)),
            ScriptItem::Hang,
        ]]);
        let feed = AlertFeed::start_inner(test_config(), transport, 2);

        settle().await;
        assert_eq!(
            feed.snapshot(),
            vec![
                whale_record("BTC/USD", Side::Buy, 2.0),
                whale_record("ETH/USD", Side::Sell, 120.0),
            ]
        );
        assert!(feed.connection().borrow().is_open());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_tears_down_the_view() {
        let transport = ScriptedTransport::new(vec![vec![
            ScriptItem::Event(whale_event("BTC/USD", Side::Buy, 5.0)),
            ScriptItem::Hang,
        ]]);
        let mut feed = AlertFeed::start_with_transport(test_config(), transport);

        settle().await;
        assert_eq!(feed.len(), 1);

        feed.stop();
        feed.stop();
        assert_eq!(*feed.connection().borrow(), ConnectionState::Closed);

        // Already-buffered alerts survive the teardown
        assert_eq!(feed.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_revision_bumps_per_alert() {
        let transport = ScriptedTransport::new(vec![vec![
            ScriptItem::Event(whale_event("BTC/USD", Side::Buy, 5.0)),
            ScriptItem::Event(whale_event("ETH/USD", Side::Sell, 1.0)),
            ScriptItem::Hang,
        ]]);
        let feed = AlertFeed::start_with_transport(test_config(), transport);

        let revisions = feed.subscribe();
        settle().await;
        assert_eq!(*revisions.borrow(), 2);
    }
}
