//! Session registry and nickname index.
//!
//! Nicknames are only visible to their owner, but they still have to be
//! unique so that `PRIVMSG nick` reaches exactly one session. The index is
//! keyed by the rfc1459 casefold of the nickname.

use crate::state::session::{Session, SessionId};
use anonirc_proto::irc_to_lower;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub struct SessionManager {
    sessions: DashMap<SessionId, Arc<Session>>,
    nicks: DashMap<String, SessionId>,
    next_id: AtomicU64,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> SessionId {
        SessionId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1)
    }

    pub fn insert(&self, session: Arc<Session>) {
        self.sessions.insert(session.id, session);
    }

    pub fn get(&self, id: SessionId) -> Option<Arc<Session>> {
        self.sessions.get(&id).map(|s| Arc::clone(s.value()))
    }

    pub fn remove(&self, id: SessionId) -> Option<Arc<Session>> {
        self.sessions.remove(&id).map(|(_, s)| s)
    }

    /// Snapshot of every live session.
    pub fn all(&self) -> Vec<Arc<Session>> {
        self.sessions.iter().map(|s| Arc::clone(s.value())).collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Reserve `nick` for `id`. Succeeds if the nick is free or already
    /// held by `id` (a case-only change).
    pub fn claim_nick(&self, nick: &str, id: SessionId) -> bool {
        match self.nicks.entry(irc_to_lower(nick)) {
            Entry::Occupied(e) => *e.get() == id,
            Entry::Vacant(e) => {
                e.insert(id);
                true
            }
        }
    }

    /// Drop `nick` from the index if `id` still owns it.
    pub fn release_nick(&self, nick: &str, id: SessionId) {
        self.nicks.remove_if(&irc_to_lower(nick), |_, owner| *owner == id);
    }

    pub fn find_by_nick(&self, nick: &str) -> Option<Arc<Session>> {
        let id = *self.nicks.get(&irc_to_lower(nick))?;
        self.get(id)
    }
}
