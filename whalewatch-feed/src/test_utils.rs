//! Test doubles shared by the unit tests: scripted feed transports and
//! helpers for driving spawned tasks deterministically under the paused
//! tokio clock.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use url::Url;

use crate::alert::{AlertRecord, Side};
use crate::error::StreamError;
use crate::stream::{FeedConnection, FeedTransport, SseEvent};

/// Scripted behavior for one connection, consumed item by item.
pub enum ScriptItem {
    /// Yield a decoded event
    Event(SseEvent),
    /// Yield a transport error
    Error(StreamError),
    /// Keep the connection open forever
    Hang,
}

/// Transport replaying one script per connection attempt.
///
/// Once the scripts run out, `open` hangs forever so tests can assert the
/// exact number of attempts made.
pub struct ScriptedTransport {
    scripts: Mutex<VecDeque<Vec<ScriptItem>>>,
    attempts: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new(scripts: Vec<Vec<ScriptItem>>) -> Arc<Self> {
        Arc::new(Self {
            scripts: Mutex::new(scripts.into()),
            attempts: AtomicUsize::new(0),
        })
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FeedTransport for ScriptedTransport {
    async fn open(&self, _url: &Url) -> Result<Box<dyn FeedConnection>, StreamError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let script = self.scripts.lock().pop_front();
        match script {
            Some(items) => Ok(Box::new(ScriptedConnection {
                items: items.into(),
            })),
            None => futures::future::pending::<Result<Box<dyn FeedConnection>, StreamError>>().await,
        }
    }
}

struct ScriptedConnection {
    items: VecDeque<ScriptItem>,
}

#[async_trait]
impl FeedConnection for ScriptedConnection {
    async fn next_event(&mut self) -> Option<Result<SseEvent, StreamError>> {
        match self.items.pop_front() {
            Some(ScriptItem::Event(event)) => Some(Ok(event)),
            Some(ScriptItem::Error(e)) => Some(Err(e)),
            Some(ScriptItem::Hang) => {
                futures::future::pending::<Option<Result<SseEvent, StreamError>>>().await
            }
            None => None,
        }
    }
}

/// Transport whose every connection attempt fails.
pub struct FailingTransport {
    attempts: AtomicUsize,
}

impl FailingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            attempts: AtomicUsize::new(0),
        })
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FeedTransport for FailingTransport {
    async fn open(&self, _url: &Url) -> Result<Box<dyn FeedConnection>, StreamError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(StreamError::Http("connection refused".to_string()))
    }
}

/// SSE event carrying a well-formed whale alert payload.
pub fn whale_event(symbol: &str, side: Side, qty: f64) -> SseEvent {
    SseEvent {
        event: Some("whale".to_string()),
        data: format!(
            r#"{{"timestamp":"2025-11-03T12:30:45Z","symbol":"{symbol}","side":"{side}","qty":{qty}}}"#
        ),
    }
}

/// The record `whale_event` parses to.
pub fn whale_record(symbol: &str, side: Side, qty: f64) -> AlertRecord {
    AlertRecord {
        timestamp: "2025-11-03T12:30:45Z".parse().unwrap(),
        symbol: symbol.to_string(),
        side,
        quantity: qty,
    }
}

/// Yield the current-thread scheduler enough times for spawned tasks to
/// reach their next await point.
pub async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}
