//! Runtime for quiz sessions
//!
//! Each session gets its own task that owns the session's state machine and
//! consumes its events in arrival order. Different sessions run independently:
//! queues are unbounded, so a session stuck in delivery never blocks the
//! caller routing events to the others.

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::{QuizRuntime, SessionSnapshot};
pub use traits::*;

use crate::quiz::QuizData;
use crate::session::{SessionId, SessionStore};
use crate::state_machine::{Event, QuizState};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, watch, RwLock};

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Runtime for session {0} has stopped")]
    Stopped(SessionId),
}

/// Handle to interact with a running session
#[derive(Clone)]
pub struct SessionHandle {
    pub event_tx: mpsc::UnboundedSender<Event>,
    pub snapshot_rx: watch::Receiver<SessionSnapshot>,
}

/// Manager for all session runtimes
pub struct SessionManager {
    quiz: Arc<QuizData>,
    store: Arc<dyn SessionStore>,
    delivery: Arc<dyn Delivery>,
    runtimes: RwLock<HashMap<SessionId, SessionHandle>>,
}

impl SessionManager {
    pub fn new(
        quiz: Arc<QuizData>,
        store: Arc<dyn SessionStore>,
        delivery: Arc<dyn Delivery>,
    ) -> Self {
        Self {
            quiz,
            store,
            delivery,
            runtimes: RwLock::new(HashMap::new()),
        }
    }

    /// Get or create the runtime for a session
    pub async fn get_or_create(&self, session_id: SessionId) -> SessionHandle {
        // Check if already running
        {
            let runtimes = self.runtimes.read().await;
            if let Some(handle) = runtimes.get(&session_id) {
                return handle.clone();
            }
        }

        let mut runtimes = self.runtimes.write().await;
        // Another event may have created it while we waited for the write lock
        if let Some(handle) = runtimes.get(&session_id) {
            return handle.clone();
        }

        let answers = self.store.answers(session_id);
        let initial_state =
            QuizState::from_progress(self.store.is_active(session_id), &answers, &self.quiz);

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(SessionSnapshot::new(initial_state.clone()));

        let runtime = QuizRuntime::new(
            session_id,
            initial_state,
            self.quiz.clone(),
            self.store.clone(),
            self.delivery.clone(),
            event_rx,
            snapshot_tx,
        );

        tokio::spawn(async move {
            runtime.run().await;
            tracing::debug!(session_id = %session_id, "Session runtime finished");
        });

        let handle = SessionHandle {
            event_tx,
            snapshot_rx,
        };
        runtimes.insert(session_id, handle.clone());
        handle
    }

    /// Queue an event for a session. Never waits on the session's progress.
    ///
    /// Text from a chat with no runtime and no active quiz is dropped here, so
    /// strangers never get a runtime. Returns whether the event was queued.
    pub async fn send_event(&self, session_id: SessionId, event: Event) -> Result<bool, RuntimeError> {
        let handle = match self.handle(session_id).await {
            Some(handle) => handle,
            None if matches!(event, Event::Text { .. }) && !self.store.is_active(session_id) => {
                tracing::debug!(session_id = %session_id, "Ignoring text from inactive session");
                return Ok(false);
            }
            None => self.get_or_create(session_id).await,
        };

        handle
            .event_tx
            .send(event)
            .map_err(|_| RuntimeError::Stopped(session_id))?;
        Ok(true)
    }

    /// Handle of an existing runtime, without creating one
    pub async fn handle(&self, session_id: SessionId) -> Option<SessionHandle> {
        self.runtimes.read().await.get(&session_id).cloned()
    }

    /// Latest snapshot of a session that has a runtime
    pub async fn snapshot(&self, session_id: SessionId) -> Option<SessionSnapshot> {
        self.handle(session_id)
            .await
            .map(|handle| handle.snapshot_rx.borrow().clone())
    }

    pub fn quiz(&self) -> &QuizData {
        &self.quiz
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }
}
