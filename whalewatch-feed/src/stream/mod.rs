//! Push-stream client for the whale alert feed.
//!
//! Maintains a single logical subscription with automatic reconnection.
//! Parsed alerts are forwarded on an mpsc channel in arrival order;
//! connectivity is published on a watch channel. Transport failures are
//! absorbed here and never surfaced to consumers as errors.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

use crate::alert::AlertRecord;
use crate::config::FeedConfig;

mod sse;
mod transport;

pub use sse::{SseDecoder, SseEvent};
pub use transport::{FeedConnection, FeedTransport, SseTransport};

/// Connectivity of a stream client, published on a watch channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No connection attempted yet
    #[default]
    Idle,
    Connecting,
    Open,
    Closed,
}

impl ConnectionState {
    pub fn is_open(&self) -> bool {
        matches!(self, ConnectionState::Open)
    }
}

/// Client owning one logical subscription to the push feed.
///
/// `connect` is idempotent (an active connection is torn down first) and
/// reconnection after failure is indefinite with a flat, fixed delay.
/// Dropping the client cancels the connection task and any pending
/// reconnect timer.
pub struct StreamClient {
    config: FeedConfig,
    transport: Arc<dyn FeedTransport>,
    state_tx: watch::Sender<ConnectionState>,
    task: Option<JoinHandle<()>>,
}

impl StreamClient {
    /// Client speaking SSE over HTTP.
    pub fn new(config: FeedConfig) -> Self {
        Self::with_transport(config, Arc::new(SseTransport::default()))
    }

    /// Client with a caller-supplied transport (tests inject scripted feeds).
    pub fn with_transport(config: FeedConfig, transport: Arc<dyn FeedTransport>) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Idle);
        Self {
            config,
            transport,
            state_tx,
            task: None,
        }
    }

    /// Open the subscription, replacing any active one, and return the
    /// alert channel for this connection.
    ///
    /// Returns immediately; results arrive on the channel and on the
    /// connectivity watch. Must be called within a tokio runtime.
    pub fn connect(&mut self) -> mpsc::Receiver<AlertRecord> {
        self.disconnect();
        let (alert_tx, alert_rx) = mpsc::channel(self.config.channel_buffer_size);
        let url = self.config.stream_url();
        let transport = Arc::clone(&self.transport);
        let state_tx = self.state_tx.clone();
        let reconnect_delay = self.config.reconnect_delay;
        self.task = Some(tokio::spawn(run_stream_loop(
            url,
            transport,
            alert_tx,
            state_tx,
            reconnect_delay,
        )));
        alert_rx
    }

    /// Watch handle for connectivity.
    pub fn connection(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    /// Tear down the connection and cancel any pending reconnect.
    ///
    /// Safe to call repeatedly; a no-op when nothing is active.
    pub fn disconnect(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = self.state_tx.send(ConnectionState::Closed);
        }
    }
}

impl Drop for StreamClient {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// Connection loop: open, forward events, reconnect after a fixed delay.
///
/// One loop means one pending reconnect timer at most; aborting the task
/// cancels it.
async fn run_stream_loop(
    url: Url,
    transport: Arc<dyn FeedTransport>,
    alert_tx: mpsc::Sender<AlertRecord>,
    state_tx: watch::Sender<ConnectionState>,
    reconnect_delay: Duration,
) {
    info!("starting whale alert stream for {url}");

    loop {
        let _ = state_tx.send(ConnectionState::Connecting);

        match transport.open(&url).await {
            Ok(mut connection) => {
                info!("whale alert stream connected");
                let _ = state_tx.send(ConnectionState::Open);

                while let Some(event) = connection.next_event().await {
                    match event {
                        Ok(event) => {
                            if !is_whale_event(&event) {
                                debug!(event = ?event.event, "skipping unrelated event");
                                continue;
                            }
                            match serde_json::from_str::<AlertRecord>(&event.data) {
                                Ok(alert) => {
                                    if alert_tx.send(alert).await.is_err() {
                                        debug!("alert receiver dropped, stopping stream");
                                        let _ = state_tx.send(ConnectionState::Closed);
                                        return;
                                    }
                                }
                                Err(e) => {
                                    // Malformed payloads are dropped, never fatal
                                    debug!("discarding malformed alert payload: {e}");
                                }
                            }
                        }
                        Err(e) => {
                            warn!("whale alert stream error: {e}");
                            break;
                        }
                    }
                }

                warn!("whale alert stream closed, will reconnect");
            }
            Err(e) => {
                warn!("failed to open whale alert stream: {e}");
            }
        }

        let _ = state_tx.send(ConnectionState::Closed);
        tokio::time::sleep(reconnect_delay).await;
    }
}

/// The feed names its events `whale`; unnamed events carry the same payload.
fn is_whale_event(event: &SseEvent) -> bool {
    matches!(event.event.as_deref(), None | Some("message") | Some("whale"))
}
