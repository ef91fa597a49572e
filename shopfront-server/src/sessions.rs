//! Live checkout sessions and their undelivered notices.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use shopfront_core::checkout::{CheckoutStep, SessionHandle};
use shopfront_core::events::CheckoutNotice;
use tokio::sync::RwLock;
use tokio::time::Instant;
use uuid::Uuid;

use crate::config::runtime::SessionLifetime;

struct SessionEntry {
    handle: SessionHandle,
    inbox: VecDeque<CheckoutNotice>,
    last_seen: Instant,
}

/// Process-local session table.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    inner: Arc<RwLock<HashMap<Uuid, SessionEntry>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, id: Uuid, handle: SessionHandle) {
        self.inner.write().await.insert(
            id,
            SessionEntry {
                handle,
                inbox: VecDeque::new(),
                last_seen: Instant::now(),
            },
        );
    }

    /// Look up a session and mark it as seen.
    pub async fn get(&self, id: Uuid) -> Option<SessionHandle> {
        self.inner.write().await.get_mut(&id).map(|entry| {
            entry.last_seen = Instant::now();
            SessionHandle::clone(&entry.handle)
        })
    }

    pub async fn remove(&self, id: Uuid) -> Option<SessionHandle> {
        self.inner.write().await.remove(&id).map(|entry| entry.handle)
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Queue a notice for its session, dropping the oldest beyond
    /// `capacity`. Returns `false` if the session is gone.
    pub async fn push_notice(&self, notice: CheckoutNotice, capacity: usize) -> bool {
        let mut sessions = self.inner.write().await;
        let Some(entry) = sessions.get_mut(&notice.checkout_id) else {
            return false;
        };
        while entry.inbox.len() >= capacity.max(1) {
            entry.inbox.pop_front();
        }
        entry.inbox.push_back(notice);
        true
    }

    pub async fn pending_notices(&self, id: Uuid) -> Option<usize> {
        self.inner.read().await.get(&id).map(|entry| entry.inbox.len())
    }

    /// Drop sessions idle for longer than `lifetime` allows and cancel them.
    ///
    /// Confirmed sessions use the shorter `confirmed` lifetime. Sessions
    /// that are locked or placing an order are kept for the next sweep.
    pub async fn sweep(&self, lifetime: SessionLifetime) -> Vec<Uuid> {
        let now = Instant::now();
        let mut expired = Vec::new();
        self.inner.write().await.retain(|id, entry| {
            let Ok(session) = entry.handle.try_lock() else {
                return true;
            };
            let ttl = if session.step() == CheckoutStep::Confirmation {
                lifetime.confirmed
            } else {
                lifetime.idle
            };
            if session.is_in_flight() || now.saturating_duration_since(entry.last_seen) < ttl {
                return true;
            }
            session.cancel();
            expired.push(*id);
            false
        });
        expired
    }

    /// Take every queued notice of a session, oldest first.
    pub async fn drain_notices(&self, id: Uuid) -> Option<Vec<CheckoutNotice>> {
        self.inner
            .write()
            .await
            .get_mut(&id)
            .map(|entry| entry.inbox.drain(..).collect())
    }
}
