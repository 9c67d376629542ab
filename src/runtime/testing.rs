//! Mock implementations for testing
//!
//! These mocks enable integration testing without a chat transport.

use super::traits::*;
use super::{SessionManager, SessionSnapshot};
use crate::quiz::{BotMessages, Question, QuizData, ResultEntry, ScoredResult};
use crate::session::{InMemorySessionStore, SessionId};
use crate::state_machine::Event;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// ============================================================================
// Fixtures
// ============================================================================

/// Two questions; `Lion` matches A/C, `Owl` matches B/D, declared in that order
pub fn lion_owl_quiz() -> QuizData {
    let entry = |answers: &[&str], description: &str| ResultEntry {
        answers: answers.iter().map(ToString::to_string).collect(),
        description: description.to_string(),
        image: None,
    };

    QuizData {
        questions: vec![
            Question {
                text: "Question 1".to_string(),
                answers: vec!["A".to_string(), "B".to_string()],
            },
            Question {
                text: "Question 2".to_string(),
                answers: vec!["C".to_string(), "D".to_string()],
            },
        ],
        catalog: [
            ("Lion", entry(&["A", "C"], "Brave and proud")),
            ("Owl", entry(&["B", "D"], "Wise and calm")),
        ]
        .into_iter()
        .collect(),
        messages: BotMessages::default(),
    }
}

// ============================================================================
// Recording Delivery
// ============================================================================

/// Everything the runtime asked to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivered {
    Greeting,
    Question { index: usize, text: String },
    Result { key: String },
    Undetermined,
    Help,
}

/// Delivery that records intents instead of sending them
#[derive(Default)]
pub struct RecordingDelivery {
    delivered: Mutex<Vec<(SessionId, Delivered)>>,
    fail: bool,
}

impl RecordingDelivery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records every intent but reports each one as failed
    pub fn failing() -> Self {
        Self {
            delivered: Mutex::default(),
            fail: true,
        }
    }

    pub fn delivered(&self) -> Vec<(SessionId, Delivered)> {
        self.delivered.lock().unwrap().clone()
    }

    pub fn delivered_to(&self, session: SessionId) -> Vec<Delivered> {
        self.delivered()
            .into_iter()
            .filter(|(id, _)| *id == session)
            .map(|(_, d)| d)
            .collect()
    }

    fn record(&self, session: SessionId, delivered: Delivered) -> Result<(), DeliveryError> {
        self.delivered.lock().unwrap().push((session, delivered));
        if self.fail {
            Err(DeliveryError("mock delivery failure".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Delivery for RecordingDelivery {
    async fn present_greeting(&self, session: SessionId) -> Result<(), DeliveryError> {
        self.record(session, Delivered::Greeting)
    }

    async fn present_question(
        &self,
        session: SessionId,
        index: usize,
        question: &Question,
    ) -> Result<(), DeliveryError> {
        self.record(
            session,
            Delivered::Question {
                index,
                text: question.text.clone(),
            },
        )
    }

    async fn present_result(
        &self,
        session: SessionId,
        result: &ScoredResult,
    ) -> Result<(), DeliveryError> {
        self.record(
            session,
            Delivered::Result {
                key: result.key.clone(),
            },
        )
    }

    async fn present_undetermined(&self, session: SessionId) -> Result<(), DeliveryError> {
        self.record(session, Delivered::Undetermined)
    }

    async fn present_help(&self, session: SessionId) -> Result<(), DeliveryError> {
        self.record(session, Delivered::Help)
    }
}

// ============================================================================
// Stalling Delivery
// ============================================================================

/// Delivery that never completes for one session and records the rest
pub struct StallingDelivery {
    stalled: SessionId,
    inner: RecordingDelivery,
}

impl StallingDelivery {
    pub fn new(stalled: SessionId) -> Self {
        Self {
            stalled,
            inner: RecordingDelivery::new(),
        }
    }

    pub fn delivered_to(&self, session: SessionId) -> Vec<Delivered> {
        self.inner.delivered_to(session)
    }

    async fn stall_if_blocked(&self, session: SessionId) {
        if session == self.stalled {
            std::future::pending::<()>().await;
        }
    }
}

#[async_trait]
impl Delivery for StallingDelivery {
    async fn present_greeting(&self, session: SessionId) -> Result<(), DeliveryError> {
        self.stall_if_blocked(session).await;
        self.inner.present_greeting(session).await
    }

    async fn present_question(
        &self,
        session: SessionId,
        index: usize,
        question: &Question,
    ) -> Result<(), DeliveryError> {
        self.stall_if_blocked(session).await;
        self.inner.present_question(session, index, question).await
    }

    async fn present_result(
        &self,
        session: SessionId,
        result: &ScoredResult,
    ) -> Result<(), DeliveryError> {
        self.stall_if_blocked(session).await;
        self.inner.present_result(session, result).await
    }

    async fn present_undetermined(&self, session: SessionId) -> Result<(), DeliveryError> {
        self.stall_if_blocked(session).await;
        self.inner.present_undetermined(session).await
    }

    async fn present_help(&self, session: SessionId) -> Result<(), DeliveryError> {
        self.stall_if_blocked(session).await;
        self.inner.present_help(session).await
    }
}

// ============================================================================
// Static Image Resolver
// ============================================================================

/// Image resolver backed by a fixed map of result key to bytes
#[derive(Default)]
pub struct StaticImageResolver {
    images: HashMap<String, Vec<u8>>,
}

impl StaticImageResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(mut self, key: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.images.insert(key.into(), bytes.into());
        self
    }
}

#[async_trait]
impl ImageResolver for StaticImageResolver {
    async fn resolve(&self, key: &str, _image: Option<&str>) -> Option<Vec<u8>> {
        self.images.get(key).cloned()
    }
}

// ============================================================================
// Test Harness
// ============================================================================

/// A `SessionManager` wired to an in-memory store and a recording delivery
pub struct TestHarness {
    pub manager: Arc<SessionManager>,
    pub store: Arc<InMemorySessionStore>,
    pub delivery: Arc<RecordingDelivery>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_delivery(RecordingDelivery::new())
    }

    pub fn with_delivery(delivery: RecordingDelivery) -> Self {
        let store = Arc::new(InMemorySessionStore::new());
        let delivery = Arc::new(delivery);
        let manager = Arc::new(SessionManager::new(
            Arc::new(lion_owl_quiz()),
            store.clone(),
            delivery.clone(),
        ));
        Self {
            manager,
            store,
            delivery,
        }
    }

    /// Send an event and wait until the session runtime has handled it.
    /// Events dropped before reaching a runtime return an inactive snapshot.
    pub async fn send(&self, session: SessionId, event: Event) -> SessionSnapshot {
        let target = self
            .manager
            .snapshot(session)
            .await
            .map_or(0, |s| s.events_processed)
            + 1;

        if !self.manager.send_event(session, event).await.unwrap() {
            return SessionSnapshot::new(crate::state_machine::QuizState::Inactive);
        }

        let mut handle = self.manager.handle(session).await.unwrap();
        let snapshot = handle
            .snapshot_rx
            .wait_for(|s| s.events_processed >= target)
            .await
            .unwrap();
        snapshot.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::ScoreOutcome;
    use crate::session::SessionStore;
    use crate::state_machine::QuizState;

    const CHAT: SessionId = SessionId(100);

    #[tokio::test]
    async fn test_full_quiz_determined() {
        let h = TestHarness::new();

        let snapshot = h.send(CHAT, Event::Start).await;
        assert_eq!(snapshot.state, QuizState::AwaitingAnswer { index: 0 });

        h.send(CHAT, Event::text("A")).await;
        let snapshot = h.send(CHAT, Event::text("C")).await;

        match snapshot.state {
            QuizState::Completed {
                outcome: ScoreOutcome::Determined(result),
            } => assert_eq!(result.key, "Lion"),
            other => panic!("Expected Lion, got {other:?}"),
        }
        assert_eq!(
            h.delivery.delivered_to(CHAT),
            vec![
                Delivered::Greeting,
                Delivered::Question {
                    index: 0,
                    text: "Question 1".to_string()
                },
                Delivered::Question {
                    index: 1,
                    text: "Question 2".to_string()
                },
                Delivered::Result {
                    key: "Lion".to_string()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_tie_resolves_to_first_declared() {
        let h = TestHarness::new();
        h.send(CHAT, Event::Start).await;
        h.send(CHAT, Event::text("A")).await;
        h.send(CHAT, Event::text("B")).await;

        assert_eq!(
            h.delivery.delivered_to(CHAT).last(),
            Some(&Delivered::Result {
                key: "Lion".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_unmatched_answers_are_undetermined() {
        let h = TestHarness::new();
        h.send(CHAT, Event::Start).await;
        h.send(CHAT, Event::text("X")).await;
        let snapshot = h.send(CHAT, Event::text("Y")).await;

        assert_eq!(
            snapshot.state,
            QuizState::Completed {
                outcome: ScoreOutcome::Undetermined
            }
        );
        assert_eq!(h.store.answers(CHAT), vec!["X", "Y"]);
        assert_eq!(
            h.delivery.delivered_to(CHAT).last(),
            Some(&Delivered::Undetermined)
        );
    }

    #[tokio::test]
    async fn test_restart_discards_previous_answers() {
        let h = TestHarness::new();
        h.send(CHAT, Event::Start).await;
        h.send(CHAT, Event::text("A")).await;
        h.send(CHAT, Event::Start).await;
        let snapshot = h.send(CHAT, Event::text("Q1-answer")).await;

        assert_eq!(h.store.answers(CHAT), vec!["Q1-answer"]);
        assert_eq!(snapshot.state, QuizState::AwaitingAnswer { index: 1 });
    }

    #[tokio::test]
    async fn test_text_while_inactive_is_ignored() {
        let h = TestHarness::new();
        let snapshot = h.send(CHAT, Event::text("hello")).await;

        assert_eq!(snapshot.state, QuizState::Inactive);
        assert!(h.manager.snapshot(CHAT).await.is_none());
        assert!(!h.store.is_active(CHAT));
        assert!(h.delivery.delivered().is_empty());
    }

    #[tokio::test]
    async fn test_text_after_help_while_inactive_is_ignored() {
        let h = TestHarness::new();
        h.send(CHAT, Event::Help).await;
        let snapshot = h.send(CHAT, Event::text("hello")).await;

        assert_eq!(snapshot.state, QuizState::Inactive);
        assert_eq!(snapshot.events_processed, 2);
        assert!(!h.store.is_active(CHAT));
        assert_eq!(h.delivery.delivered_to(CHAT), vec![Delivered::Help]);
    }

    #[tokio::test]
    async fn test_text_after_completion_is_ignored() {
        let h = TestHarness::new();
        h.send(CHAT, Event::Start).await;
        h.send(CHAT, Event::text("A")).await;
        h.send(CHAT, Event::text("C")).await;
        let sent_before = h.delivery.delivered_to(CHAT).len();

        let snapshot = h.send(CHAT, Event::text("more")).await;
        assert!(matches!(snapshot.state, QuizState::Completed { .. }));
        assert_eq!(h.store.answers(CHAT).len(), 2);
        assert_eq!(h.delivery.delivered_to(CHAT).len(), sent_before);
    }

    #[tokio::test]
    async fn test_help_in_any_state() {
        let h = TestHarness::new();
        let snapshot = h.send(CHAT, Event::Help).await;
        assert_eq!(snapshot.state, QuizState::Inactive);

        h.send(CHAT, Event::Start).await;
        let snapshot = h.send(CHAT, Event::Help).await;
        assert_eq!(snapshot.state, QuizState::AwaitingAnswer { index: 0 });
        assert_eq!(
            h.delivery
                .delivered_to(CHAT)
                .iter()
                .filter(|d| **d == Delivered::Help)
                .count(),
            2
        );
    }

    #[tokio::test]
    async fn test_delivery_failure_does_not_alter_state() {
        let h = TestHarness::with_delivery(RecordingDelivery::failing());
        h.send(CHAT, Event::Start).await;
        let snapshot = h.send(CHAT, Event::text("A")).await;

        assert_eq!(snapshot.state, QuizState::AwaitingAnswer { index: 1 });
        assert_eq!(h.store.answers(CHAT), vec!["A"]);
        // Every intent was still attempted
        assert_eq!(h.delivery.delivered_to(CHAT).len(), 3);
    }

    #[tokio::test]
    async fn test_sessions_progress_independently() {
        let h = TestHarness::new();
        let other = SessionId(200);

        h.send(CHAT, Event::Start).await;
        h.send(other, Event::Start).await;
        h.send(CHAT, Event::text("A")).await;

        assert_eq!(h.store.answers(CHAT), vec!["A"]);
        assert!(h.store.answers(other).is_empty());
        assert_eq!(
            h.manager.snapshot(other).await.unwrap().state,
            QuizState::AwaitingAnswer { index: 0 }
        );
    }

    #[tokio::test]
    async fn test_concurrent_events_keep_arrival_order() {
        let h = TestHarness::new();
        h.send(CHAT, Event::Start).await;

        // Queue both answers without waiting in between
        h.manager.send_event(CHAT, Event::text("B")).await.unwrap();
        h.manager.send_event(CHAT, Event::text("D")).await.unwrap();

        let mut handle = h.manager.handle(CHAT).await.unwrap();
        let snapshot = handle
            .snapshot_rx
            .wait_for(|s| s.events_processed >= 3)
            .await
            .unwrap()
            .clone();

        assert_eq!(h.store.answers(CHAT), vec!["B", "D"]);
        match snapshot.state {
            QuizState::Completed { outcome } => assert_eq!(outcome.key(), Some("Owl")),
            other => panic!("Expected Completed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_static_image_resolver() {
        let resolver = StaticImageResolver::new().with_image("Lion", b"roar".to_vec());
        assert_eq!(resolver.resolve("Lion", None).await, Some(b"roar".to_vec()));
        assert!(resolver.resolve("Owl", None).await.is_none());
    }
}
