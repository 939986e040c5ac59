//! Per-conversation identity and bounded turn history.
//!
//! ```rust
//! use dchat::SessionStore;
//! use dprovider::Turn;
//!
//! let mut store = SessionStore::with_capacity(2);
//! store.append(Turn::user("one"));
//! store.append(Turn::assistant("two"));
//! store.append(Turn::user("three"));
//!
//! let contents: Vec<_> = store.history().iter().map(|turn| turn.content.as_str()).collect();
//! assert_eq!(contents, ["two", "three"]);
//! ```

use std::collections::VecDeque;

use dcommon::SessionId;
use dprovider::Turn;

/// Default number of turns retained per session.
pub const SESSION_CAPACITY: usize = 10;

#[derive(Debug, Clone)]
pub struct SessionStore {
    session_id: SessionId,
    history: VecDeque<Turn>,
    capacity: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_capacity(SESSION_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            session_id: SessionId::generate(),
            history: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn with_session_id(mut self, session_id: SessionId) -> Self {
        self.session_id = session_id;
        self
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn history(&self) -> &VecDeque<Turn> {
        &self.history
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Appends a turn, evicting the oldest ones once the window is full.
    pub fn append(&mut self, turn: Turn) {
        while self.history.len() >= self.capacity {
            self.history.pop_front();
        }

        self.history.push_back(turn);
    }

    /// Up to `limit` turns preceding the most recent one, oldest first.
    pub fn previous_turns(&self, limit: usize) -> Vec<Turn> {
        let prior = self.history.len().saturating_sub(1);
        let skip = prior.saturating_sub(limit);

        self.history
            .iter()
            .take(prior)
            .skip(skip)
            .cloned()
            .collect()
    }

    /// Starts a fresh conversation: new identifier, empty history.
    pub fn reset(&mut self) {
        self.session_id = SessionId::generate();
        self.history.clear();
    }
}
