//! Session arena with per-session serialization.

use std::sync::Arc;
use std::time::Duration;

use ahash::AHashMap;
use log::{debug, info};
use parking_lot::RwLock;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::time::Instant;

use crate::dialogue::session::{DialogueSession, DialogueState, SessionId};

type SessionSlot = Arc<Mutex<DialogueSession>>;

/// All live sessions, keyed by id.
///
/// The map lock is held only to look up or insert an entry. Each session has
/// its own async mutex, so turns for one session run one at a time while
/// different sessions proceed concurrently.
///
/// [`lock`](Self::lock) also prunes expired sessions, at most once per idle
/// timeout, so abandoned sessions are dropped even when no sweeper runs.
#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<AHashMap<SessionId, SessionSlot>>,
    idle_timeout: Duration,
    last_prune: parking_lot::Mutex<Instant>,
}

impl SessionStore {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: RwLock::new(AHashMap::new()),
            idle_timeout,
            last_prune: parking_lot::Mutex::new(Instant::now()),
        }
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// Lock a session, creating it on first use.
    ///
    /// A session expired by the sweeper while this call waited for its lock
    /// is dropped from the map and a fresh one is created in its place.
    pub async fn lock(&self, id: &str) -> OwnedMutexGuard<DialogueSession> {
        self.prune_if_due(Instant::now());
        loop {
            let slot = self.slot(id);
            let guard = slot.clone().lock_owned().await;
            if guard.state() != DialogueState::Expired {
                return guard;
            }
            drop(guard);
            self.remove_if_same(id, &slot);
        }
    }

    fn slot(&self, id: &str) -> SessionSlot {
        if let Some(slot) = self.sessions.read().get(id) {
            return slot.clone();
        }
        self.sessions
            .write()
            .entry(id.to_string())
            .or_insert_with(|| {
                debug!("creating session {id}");
                Arc::new(Mutex::new(DialogueSession::new(id, Instant::now())))
            })
            .clone()
    }

    fn remove_if_same(&self, id: &str, slot: &SessionSlot) -> bool {
        let mut sessions = self.sessions.write();
        match sessions.get(id) {
            Some(current) if Arc::ptr_eq(current, slot) => {
                sessions.remove(id);
                true
            }
            _ => false,
        }
    }

    fn prune_if_due(&self, now: Instant) {
        {
            let mut last_prune = self.last_prune.lock();
            if now.saturating_duration_since(*last_prune) < self.idle_timeout {
                return;
            }
            *last_prune = now;
        }
        let pruned = self.sweep_expired(now);
        if pruned > 0 {
            debug!("pruned {pruned} idle session(s)");
        }
    }

    /// Expire and remove every session idle for at least the timeout.
    ///
    /// Sessions whose lock is held are mid-turn and therefore active.
    pub fn sweep_expired(&self, now: Instant) -> usize {
        let candidates: Vec<(SessionId, SessionSlot)> = self
            .sessions
            .read()
            .iter()
            .map(|(id, slot)| (id.clone(), slot.clone()))
            .collect();

        let mut expired = 0;
        for (id, slot) in candidates {
            let Ok(mut session) = slot.try_lock() else {
                continue;
            };
            if session.is_idle_expired(now, self.idle_timeout) {
                session.expire();
                drop(session);
                if self.remove_if_same(&id, &slot) {
                    info!("session {id} expired after {:?} idle", self.idle_timeout);
                    expired += 1;
                }
            }
        }
        expired
    }

    /// Drop a session explicitly. Waits for an in-flight turn to finish.
    pub async fn end_session(&self, id: &str) -> bool {
        let Some(slot) = self.sessions.write().remove(id) else {
            return false;
        };
        slot.lock().await.expire();
        info!("session {id} ended");
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sessions.read().contains_key(id)
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.read().len()
    }
}
