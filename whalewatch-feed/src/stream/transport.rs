//! Transport seam between the reconnect loop and the wire.
//!
//! The production implementation speaks SSE over a long-lived `reqwest`
//! streaming GET. Tests substitute scripted transports to drive the
//! reconnect loop deterministically.

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::BoxStream;
use url::Url;

use super::sse::{SseDecoder, SseEvent};
use crate::error::StreamError;

/// Opens push connections against the feed endpoint.
#[async_trait]
pub trait FeedTransport: Send + Sync + 'static {
    async fn open(&self, url: &Url) -> Result<Box<dyn FeedConnection>, StreamError>;
}

/// One live push connection, yielding decoded events until the stream ends.
#[async_trait]
pub trait FeedConnection: Send {
    /// Next event; `None` once the server closes the stream.
    async fn next_event(&mut self) -> Option<Result<SseEvent, StreamError>>;
}

/// `reqwest`-backed SSE transport.
#[derive(Debug, Clone, Default)]
pub struct SseTransport {
    http: reqwest::Client,
}

impl SseTransport {
    /// Transport reusing a caller-supplied HTTP client.
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl FeedTransport for SseTransport {
    async fn open(&self, url: &Url) -> Result<Box<dyn FeedConnection>, StreamError> {
        let response = self
            .http
            .get(url.clone())
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(|e| StreamError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StreamError::Status(status.as_u16()));
        }

        Ok(Box::new(SseConnection {
            body: response.bytes_stream().boxed(),
            decoder: SseDecoder::new(),
        }))
    }
}

struct SseConnection {
    body: BoxStream<'static, reqwest::Result<bytes::Bytes>>,
    decoder: SseDecoder,
}

#[async_trait]
impl FeedConnection for SseConnection {
    async fn next_event(&mut self) -> Option<Result<SseEvent, StreamError>> {
        loop {
            if let Some(event) = self.decoder.next_event() {
                return Some(Ok(event));
            }
            match self.body.next().await? {
                Ok(chunk) => self.decoder.push_chunk(&chunk),
                Err(e) => return Some(Err(StreamError::Transport(e.to_string()))),
            }
        }
    }
}
