//! Ephemeral toast surfacing for newly arrived notifications.
//!
//! The scheduler keeps the visible set (newest three, five-second
//! lifetime, user-muteable); a driver task watches the notification store
//! and registers toasts for genuine arrivals only. Running the detection
//! on its own task defers registration to the tick after the store
//! mutation, so no consumer observes a toast mid-ingest.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tracing::debug;

use crate::config::{MAX_ACTIVE_TOASTS, TOAST_TTL};
use crate::notifications::{NotificationId, NotificationStore};

/// One on-screen toast: a notification reference plus its expiry deadline.
#[derive(Debug, Clone)]
pub struct ToastEntry {
    pub id: NotificationId,
    pub deadline: Instant,
}

#[derive(Debug, Default)]
struct ToastState {
    /// Visible entries, newest first
    active: Vec<ToastEntry>,
    muted: bool,
}

/// Keeps the set of visible toasts.
pub struct ToastScheduler {
    state: Mutex<ToastState>,
    revision: watch::Sender<u64>,
}

impl ToastScheduler {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ToastState::default()),
            revision: watch::channel(0).0,
        }
    }

    /// Currently visible toasts, newest first.
    pub fn active(&self) -> Vec<ToastEntry> {
        self.state.lock().active.clone()
    }

    /// Remove a toast immediately; its timer dies with it. No-op when the
    /// id is not visible.
    pub fn dismiss(&self, id: &NotificationId) {
        let removed = {
            let mut state = self.state.lock();
            let before = state.active.len();
            state.active.retain(|t| t.id != *id);
            state.active.len() != before
        };
        if removed {
            self.bump();
        }
    }

    /// While muted, new notifications spawn no toasts. Existing toasts run
    /// out on their own; unmuting is not retroactive.
    pub fn set_muted(&self, muted: bool) {
        self.state.lock().muted = muted;
    }

    pub fn muted(&self) -> bool {
        self.state.lock().muted
    }

    /// Revision channel for render layers.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Register toasts for freshly ingested notifications, oldest first so
    /// the newest arrival ends up at the front of the visible set.
    fn register(&self, ids: Vec<NotificationId>, now: Instant) {
        let mut changed = false;
        {
            let mut state = self.state.lock();
            if state.muted {
                return;
            }
            for id in ids {
                // At most one toast per notification
                if state.active.iter().any(|t| t.id == id) {
                    continue;
                }
                state.active.insert(
                    0,
                    ToastEntry {
                        id,
                        deadline: now + TOAST_TTL,
                    },
                );
                state.active.truncate(MAX_ACTIVE_TOASTS);
                changed = true;
            }
        }
        if changed {
            self.bump();
        }
    }

    /// Earliest pending deadline, if any toast is visible.
    fn next_deadline(&self) -> Option<Instant> {
        self.state.lock().active.iter().map(|t| t.deadline).min()
    }

    /// Drop every toast whose deadline has passed.
    fn expire_due(&self, now: Instant) {
        let expired = {
            let mut state = self.state.lock();
            let before = state.active.len();
            state.active.retain(|t| t.deadline > now);
            state.active.len() != before
        };
        if expired {
            self.bump();
        }
    }

    fn bump(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }
}

impl Default for ToastScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// Watch the store and surface a toast for each genuine arrival.
///
/// Only a growth in the store's record count counts as an arrival;
/// re-renders, dismissals and mute toggles never re-toast. The driver also
/// owns expiry, sleeping until the earliest deadline.
pub fn spawn_toast_driver(
    store: Arc<NotificationStore>,
    toasts: Arc<ToastScheduler>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut revisions = store.subscribe();
        let mut seen_count = store.len();
        loop {
            let deadline = toasts.next_deadline();
            tokio::select! {
                changed = revisions.changed() => {
                    if changed.is_err() {
                        debug!("notification store dropped, stopping toast driver");
                        break;
                    }
                    let snapshot = store.notifications();
                    if snapshot.len() > seen_count {
                        let fresh = snapshot.len() - seen_count;
                        let ids = snapshot
                            .iter()
                            .take(fresh)
                            .rev()
                            .map(|n| n.id.clone())
                            .collect();
                        toasts.register(ids, Instant::now());
                    }
                    seen_count = snapshot.len();
                }
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    toasts.expire_due(Instant::now());
                }
            }
        }
    })
}
