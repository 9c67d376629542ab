//! Session store
//!
//! Maps a session id to the ordered answers submitted so far. A session with
//! no entry is inactive.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;

/// Opaque session key, derived from the Telegram chat id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub i64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for SessionId {
    fn from(chat_id: i64) -> Self {
        Self(chat_id)
    }
}

impl FromStr for SessionId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("No active quiz session for {0}")]
    Inactive(SessionId),
}

/// Storage for per-session answers
pub trait SessionStore: Send + Sync {
    /// Start (or restart) a session with no answers
    fn start_session(&self, id: SessionId);

    /// Append an answer. Returns the new answer count.
    fn record_answer(&self, id: SessionId, answer: &str) -> Result<usize, SessionError>;

    /// Answers submitted so far, empty if the session is inactive
    fn answers(&self, id: SessionId) -> Vec<String>;

    fn is_active(&self, id: SessionId) -> bool;

    /// Number of sessions that have been started
    fn session_count(&self) -> usize;
}

impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    fn start_session(&self, id: SessionId) {
        (**self).start_session(id);
    }

    fn record_answer(&self, id: SessionId, answer: &str) -> Result<usize, SessionError> {
        (**self).record_answer(id, answer)
    }

    fn answers(&self, id: SessionId) -> Vec<String> {
        (**self).answers(id)
    }

    fn is_active(&self, id: SessionId) -> bool {
        (**self).is_active(id)
    }

    fn session_count(&self) -> usize {
        (**self).session_count()
    }
}

/// Process-local session store.
///
/// Critical sections never span an await point. Ordering of events within one
/// session is the caller's job; the runtime gives each session its own task.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<SessionId, Vec<String>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn start_session(&self, id: SessionId) {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        sessions.insert(id, Vec::new());
    }

    fn record_answer(&self, id: SessionId, answer: &str) -> Result<usize, SessionError> {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let answers = sessions.get_mut(&id).ok_or(SessionError::Inactive(id))?;
        answers.push(answer.to_string());
        Ok(answers.len())
    }

    fn answers(&self, id: SessionId) -> Vec<String> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
            .unwrap_or_default()
    }

    fn is_active(&self, id: SessionId) -> bool {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&id)
    }

    fn session_count(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
