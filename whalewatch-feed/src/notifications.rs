//! Process-wide notification state for whale alerts.
//!
//! [`NotificationStore`] is the single shared source of truth across all
//! UI surfaces: it assigns identity to each alert, tracks read state and
//! publishes a revision on every mutation so subscribed views re-render
//! consistently. [`NotificationService`] wraps the store with its stream
//! subscription and ingest task for an explicit application lifecycle.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::alert::AlertRecord;
use crate::buffer::BoundedBuffer;
use crate::config::{FeedConfig, NOTIFICATION_CAPACITY};
use crate::stream::{ConnectionState, FeedTransport, SseTransport, StreamClient};

/// Opaque, process-unique notification identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NotificationId(String);

impl NotificationId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NotificationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A whale alert with notification bookkeeping attached.
///
/// Owned exclusively by the store; `read` is the only field that ever
/// changes after ingestion.
#[derive(Debug, Clone)]
pub struct NotificationRecord {
    pub id: NotificationId,
    pub read: bool,
    pub alert: AlertRecord,
}

/// Shared source of truth for whale notifications across the process.
pub struct NotificationStore {
    buffer: Mutex<BoundedBuffer<NotificationRecord>>,
    seq: AtomicU64,
    revision: watch::Sender<u64>,
}

impl NotificationStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: Mutex::new(BoundedBuffer::new(capacity)),
            seq: AtomicU64::new(0),
            revision: watch::channel(0).0,
        }
    }

    /// Assign identity to an alert and prepend it unread, evicting the
    /// oldest record beyond capacity.
    pub fn ingest(&self, alert: AlertRecord) -> NotificationId {
        let id = self.next_id();
        self.buffer.lock().push(NotificationRecord {
            id: id.clone(),
            read: false,
            alert,
        });
        self.bump();
        id
    }

    /// Remove one notification; a no-op when the id is absent.
    pub fn dismiss(&self, id: &NotificationId) {
        let removed = {
            let mut buffer = self.buffer.lock();
            let before = buffer.len();
            buffer.retain(|n| n.id != *id);
            buffer.len() != before
        };
        if removed {
            self.bump();
        }
    }

    /// Clear every notification.
    pub fn dismiss_all(&self) {
        self.buffer.lock().clear();
        self.bump();
    }

    /// Mark every current notification read; later ingests stay unread.
    pub fn mark_all_read(&self) {
        for record in self.buffer.lock().iter_mut() {
            record.read = true;
        }
        self.bump();
    }

    /// Count of unread notifications, always derived from record state.
    pub fn unread_count(&self) -> usize {
        self.buffer.lock().iter().filter(|n| !n.read).count()
    }

    pub fn len(&self) -> usize {
        self.buffer.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.lock().is_empty()
    }

    /// Consistent newest-first snapshot of the current records.
    pub fn notifications(&self) -> Vec<NotificationRecord> {
        self.buffer.lock().snapshot()
    }

    /// Revision channel; every mutation bumps the value exactly once.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn next_id(&self) -> NotificationId {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        NotificationId(format!("whale-{}-{}", Utc::now().timestamp_millis(), seq))
    }

    fn bump(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }
}

/// Application-lifetime wrapper owning the shared store, one unfiltered
/// stream subscription and the ingest task.
///
/// Constructed once at startup and handed out as [`Arc<NotificationStore>`]
/// rather than living in an ambient global, so tests can build fresh
/// instances against scripted transports.
pub struct NotificationService {
    store: Arc<NotificationStore>,
    client: StreamClient,
    ingest_task: Option<JoinHandle<()>>,
}

impl NotificationService {
    /// Start with the production SSE transport.
    pub fn start(config: FeedConfig) -> Self {
        Self::start_with_transport(config, Arc::new(SseTransport::default()))
    }

    /// Start with a caller-supplied transport.
    pub fn start_with_transport(config: FeedConfig, transport: Arc<dyn FeedTransport>) -> Self {
        // The shared store observes the global feed, never a filtered one
        let config = FeedConfig {
            symbol: None,
            ..config
        };
        let store = Arc::new(NotificationStore::new(NOTIFICATION_CAPACITY));
        let mut client = StreamClient::with_transport(config, transport);
        let mut alerts = client.connect();

        let ingest_store = Arc::clone(&store);
        let ingest_task = tokio::spawn(async move {
            while let Some(alert) = alerts.recv().await {
                ingest_store.ingest(alert);
            }
            debug!("notification ingest channel closed");
        });

        info!("notification service started");
        Self {
            store,
            client,
            ingest_task: Some(ingest_task),
        }
    }

    /// Shared store handle for consumers.
    pub fn store(&self) -> Arc<NotificationStore> {
        Arc::clone(&self.store)
    }

    /// Stream connectivity, for the status indicator.
    pub fn connection(&self) -> watch::Receiver<ConnectionState> {
        self.client.connection()
    }

    /// Stop the subscription and the ingest task. Idempotent.
    pub fn shutdown(&mut self) {
        self.client.disconnect();
        if let Some(task) = self.ingest_task.take() {
            task.abort();
        }
    }
}

impl Drop for NotificationService {
    fn drop(&mut self) {
        self.shutdown();
    }
}
