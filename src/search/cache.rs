//! Search session cache
//!
//! A bounded, explicitly FIFO cache of search results keyed by session id.
//! A session is single-use: consuming it removes it, so a duplicate or late
//! download action cannot reuse stale data. Capacity pruning is the only
//! bound; there is no time-based expiry.

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::time::SystemTime;

/// Maximum number of sessions a manager keeps before evicting the oldest.
pub const SESSION_CAPACITY: usize = 10;

/// A cached search result awaiting an archive-download action.
///
/// The matched paths were confirmed inside the root at search time; their
/// existence is re-checked at archive time.
#[derive(Debug, Clone)]
pub struct SearchSession {
    pub id: String,
    pub matched_paths: Vec<PathBuf>,
    pub created_at: SystemTime,
}

/// Fixed-capacity FIFO session store. All mutation happens under the owning
/// manager's lock; the structure itself is single-threaded.
#[derive(Debug)]
pub struct SessionCache {
    capacity: usize,
    order: VecDeque<String>,
    sessions: HashMap<String, SearchSession>,
}

impl SessionCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            order: VecDeque::new(),
            sessions: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sessions.contains_key(id)
    }

    /// Stores a session, evicting the oldest entries once occupancy exceeds
    /// the capacity.
    pub fn insert(&mut self, session: SearchSession) {
        self.order.push_back(session.id.clone());
        self.sessions.insert(session.id.clone(), session);

        while self.sessions.len() > self.capacity {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.sessions.remove(&oldest);
                }
                None => break,
            }
        }
    }

    /// Removes and returns the session, so a second take of the same id
    /// misses.
    pub fn take(&mut self, id: &str) -> Option<SearchSession> {
        let session = self.sessions.remove(id)?;
        self.order.retain(|queued| queued != id);
        Some(session)
    }
}

impl Default for SessionCache {
    fn default() -> Self {
        Self::new(SESSION_CAPACITY)
    }
}
