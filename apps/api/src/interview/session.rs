//! Session store — owns every `InterviewSession`, keyed by caller identity.
//!
//! Locking discipline:
//! - the identity → slot map sits behind a short-lived `parking_lot::Mutex`
//!   that is never held across an `.await`;
//! - each slot is an `Arc<tokio::sync::Mutex<_>>`, held for a whole
//!   fetch/submit/reset critical section (generator call included).
//!
//! Different identities never contend on the same slot lock.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tokio::time::Instant;
use tracing::{debug, info};

use crate::models::interview::InterviewSession;

#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error("no active session")]
    NoActiveSession,
}

struct Slot {
    session: Option<InterviewSession>,
    last_active: Instant,
}

impl Slot {
    fn is_idle(&self, ttl: Option<Duration>) -> bool {
        ttl.is_some_and(|ttl| self.last_active.elapsed() >= ttl)
    }
}

/// Exclusive access to one identity's session for the lifetime of the guard.
pub struct SessionEntry {
    guard: OwnedMutexGuard<Slot>,
}

impl SessionEntry {
    pub fn session(&self) -> Option<&InterviewSession> {
        self.guard.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut InterviewSession> {
        self.guard.session.as_mut()
    }

    /// Starts a new session, replacing any existing one.
    pub fn create(&mut self, questions: Vec<String>) -> &mut InterviewSession {
        self.guard.session.insert(InterviewSession::new(questions))
    }
}

pub struct SessionStore {
    slots: Mutex<HashMap<String, Arc<AsyncMutex<Slot>>>>,
    idle_ttl: Option<Duration>,
}

impl SessionStore {
    pub fn new(idle_ttl: Option<Duration>) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            idle_ttl,
        }
    }

    /// Acquires exclusive access to the session for `id`, registering an
    /// empty slot if none exists. Idle sessions are discarded on acquisition.
    pub async fn lock(&self, id: &str) -> SessionEntry {
        loop {
            let slot = self.slot_for(id);
            let mut guard = slot.clone().lock_owned().await;

            // The slot may have been reset or evicted while we waited.
            if !self.is_registered(id, &slot) {
                continue;
            }

            if guard.session.is_some() && guard.is_idle(self.idle_ttl) {
                info!("Session for {id} expired after inactivity");
                guard.session = None;
            }
            guard.last_active = Instant::now();

            return SessionEntry { guard };
        }
    }

    /// Snapshot of the session for `id`, if any.
    pub async fn get(&self, id: &str) -> Option<InterviewSession> {
        if !self.contains(id) {
            return None;
        }
        self.lock(id).await.session().cloned()
    }

    /// Removes the session for `id`. Waits for any in-flight operation on
    /// that identity to finish first. Idempotent.
    pub async fn delete(&self, id: &str) {
        let Some(slot) = self.slots.lock().get(id).cloned() else {
            return;
        };

        let mut guard = slot.lock().await;
        guard.session = None;

        let mut slots = self.slots.lock();
        if slots.get(id).is_some_and(|s| Arc::ptr_eq(s, &slot)) {
            slots.remove(id);
        }
    }

    /// Number of identities currently holding a slot.
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    /// Drops slots that are empty or idle past the TTL. Slots currently
    /// locked by a request are skipped.
    pub fn evict_idle(&self) -> usize {
        let ttl = self.idle_ttl;
        let mut slots = self.slots.lock();
        let before = slots.len();

        slots.retain(|_, slot| match slot.try_lock() {
            Ok(guard) => guard.session.is_some() && !guard.is_idle(ttl),
            Err(_) => true,
        });

        let evicted = before - slots.len();
        if evicted > 0 {
            debug!("Evicted {evicted} idle session slot(s)");
        }
        evicted
    }

    fn contains(&self, id: &str) -> bool {
        self.slots.lock().contains_key(id)
    }

    fn is_registered(&self, id: &str, slot: &Arc<AsyncMutex<Slot>>) -> bool {
        self.slots
            .lock()
            .get(id)
            .is_some_and(|s| Arc::ptr_eq(s, slot))
    }

    fn slot_for(&self, id: &str) -> Arc<AsyncMutex<Slot>> {
        if let Some(slot) = self.slots.lock().get(id) {
            return slot.clone();
        }

        self.evict_idle();

        self.slots
            .lock()
            .entry(id.to_string())
            .or_insert_with(|| {
                Arc::new(AsyncMutex::new(Slot {
                    session: None,
                    last_active: Instant::now(),
                }))
            })
            .clone()
    }
}
