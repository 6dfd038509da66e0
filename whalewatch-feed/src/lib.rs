//! Whalewatch Feed - real-time whale-alert ingestion and notifications
//!
//! The data layer behind the dashboard's whale tracker:
//! - A reconnecting SSE stream client surfacing parsed alerts and a
//!   connectivity signal
//! - Bounded, newest-first alert buffers, one per consumer
//! - A process-wide notification store (identity, read state, dismissal)
//! - A toast scheduler deriving short-lived on-screen entries from new
//!   arrivals
//! - A request/response client for historical backfill
//!
//! Rendering stays with the consumers: everything here exposes snapshots
//! plus watch channels to await changes on.

pub mod alert;
pub mod api;
pub mod buffer;
pub mod config;
pub mod error;
pub mod feed;
pub mod notifications;
pub mod stream;
pub mod toast;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-export commonly used types for convenience
pub use alert::{AlertRecord, Side};
pub use api::{ApiClient, WhaleHistory};
pub use buffer::BoundedBuffer;
pub use config::FeedConfig;
pub use error::{ApiError, StreamError};
pub use feed::AlertFeed;
pub use notifications::{
    NotificationId, NotificationRecord, NotificationService, NotificationStore,
};
pub use stream::{
    ConnectionState, FeedConnection, FeedTransport, SseEvent, SseTransport, StreamClient,
};
pub use toast::{ToastEntry, ToastScheduler, spawn_toast_driver};
