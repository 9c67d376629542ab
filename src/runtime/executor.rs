//! Quiz session runtime executor

use super::traits::{Delivery, DeliveryError};
use crate::quiz::{QuizData, ScoreOutcome};
use crate::session::{SessionId, SessionStore};
use crate::state_machine::{transition, Effect, Event, QuizContext, QuizState};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// Published after every processed event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub state: QuizState,
    /// Events handled so far, including ignored ones
    pub events_processed: u64,
}

impl SessionSnapshot {
    pub fn new(state: QuizState) -> Self {
        Self {
            state,
            events_processed: 0,
        }
    }
}

/// Owns one session's state machine and applies its effects
pub struct QuizRuntime {
    session_id: SessionId,
    state: QuizState,
    quiz: Arc<QuizData>,
    store: Arc<dyn SessionStore>,
    delivery: Arc<dyn Delivery>,
    event_rx: mpsc::UnboundedReceiver<Event>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
    events_processed: u64,
}

impl QuizRuntime {
    pub fn new(
        session_id: SessionId,
        state: QuizState,
        quiz: Arc<QuizData>,
        store: Arc<dyn SessionStore>,
        delivery: Arc<dyn Delivery>,
        event_rx: mpsc::UnboundedReceiver<Event>,
        snapshot_tx: watch::Sender<SessionSnapshot>,
    ) -> Self {
        Self {
            session_id,
            state,
            quiz,
            store,
            delivery,
            event_rx,
            snapshot_tx,
            events_processed: 0,
        }
    }

    pub async fn run(mut self) {
        tracing::debug!(session_id = %self.session_id, state = self.state.name(), "Starting session runtime");

        // Events are processed one at a time; nothing else touches this session
        while let Some(event) = self.event_rx.recv().await {
            self.process_event(event).await;
        }

        tracing::debug!(session_id = %self.session_id, "Session runtime stopped");
    }

    async fn process_event(&mut self, event: Event) {
        let event_name = event.name();
        let answers = self.store.answers(self.session_id);
        let context = QuizContext::new(&self.quiz, &answers);

        match transition(&self.state, &context, event) {
            Ok(result) => {
                let old_state = std::mem::replace(&mut self.state, result.new_state);
                if old_state.name() != self.state.name() || event_name == "start" {
                    tracing::info!(
                        session_id = %self.session_id,
                        event = event_name,
                        from = old_state.name(),
                        to = self.state.name(),
                        "Quiz state changed"
                    );
                }

                // Store effects come first in every transition, so the store is
                // consistent with the new state before anything is sent
                for effect in result.effects {
                    self.execute_effect(effect).await;
                }
            }
            Err(e) => {
                tracing::debug!(
                    session_id = %self.session_id,
                    event = event_name,
                    state = self.state.name(),
                    reason = %e,
                    "Ignoring event"
                );
            }
        }

        self.events_processed += 1;
        self.snapshot_tx.send_replace(SessionSnapshot {
            state: self.state.clone(),
            events_processed: self.events_processed,
        });
    }

    async fn execute_effect(&self, effect: Effect) {
        match effect {
            Effect::ResetAnswers => {
                self.store.start_session(self.session_id);
            }

            Effect::RecordAnswer { text } => {
                match self.store.record_answer(self.session_id, &text) {
                    Ok(count) => {
                        tracing::debug!(session_id = %self.session_id, count, "Answer recorded");
                    }
                    Err(e) => {
                        tracing::warn!(session_id = %self.session_id, error = %e, "Failed to record answer");
                    }
                }
            }

            Effect::SendGreeting => {
                let result = self.delivery.present_greeting(self.session_id).await;
                self.report("greeting", result);
            }

            Effect::PresentQuestion { index } => {
                let Some(question) = self.quiz.question(index) else {
                    tracing::error!(session_id = %self.session_id, index, "Question index out of range");
                    return;
                };
                let result = self
                    .delivery
                    .present_question(self.session_id, index, question)
                    .await;
                self.report("question", result);
            }

            Effect::PresentOutcome { outcome } => {
                tracing::info!(
                    session_id = %self.session_id,
                    result = outcome.key().unwrap_or("undetermined"),
                    "Quiz completed"
                );
                let result = match &outcome {
                    ScoreOutcome::Determined(scored) => {
                        self.delivery.present_result(self.session_id, scored).await
                    }
                    ScoreOutcome::Undetermined => {
                        self.delivery.present_undetermined(self.session_id).await
                    }
                };
                self.report("outcome", result);
            }

            Effect::SendHelp => {
                let result = self.delivery.present_help(self.session_id).await;
                self.report("help", result);
            }
        }
    }

    /// Delivery failures are logged and dropped; state has already moved on
    fn report(&self, what: &'static str, result: Result<(), DeliveryError>) {
        if let Err(e) = result {
            tracing::warn!(
                session_id = %self.session_id,
                kind = what,
                error = %e,
                "Delivery failed"
            );
        }
    }
}
