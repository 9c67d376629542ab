//! Pure state transition function
//!
//! Given the same state, context and event, `transition` always returns the
//! same result and performs no I/O. Scoring happens inside the transition that
//! completes the quiz.

use super::{Effect, Event, QuizContext, QuizState};
use crate::quiz::score;
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: QuizState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: QuizState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Events that have no transition. The runtime drops them without replying.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Session is inactive, text is not an answer")]
    InactiveSession,
    #[error("Quiz already completed, waiting for /start")]
    QuizCompleted,
}

pub fn transition(
    state: &QuizState,
    context: &QuizContext<'_>,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // Any state + Start -> AwaitingAnswer(0), answers discarded
        (_, Event::Start) => Ok(TransitionResult::new(QuizState::AwaitingAnswer { index: 0 })
            .with_effect(Effect::ResetAnswers)
            .with_effect(Effect::SendGreeting)
            .with_effect(Effect::PresentQuestion { index: 0 })),

        // Help never changes progress
        (state, Event::Help) => {
            Ok(TransitionResult::new(state.clone()).with_effect(Effect::SendHelp))
        }

        (QuizState::Inactive, Event::Text { .. }) => Err(TransitionError::InactiveSession),

        (QuizState::Completed { .. }, Event::Text { .. }) => Err(TransitionError::QuizCompleted),

        // AwaitingAnswer(k) + Text -> AwaitingAnswer(k + 1)
        // Text is recorded verbatim, whether or not it is one of the options.
        (QuizState::AwaitingAnswer { index }, Event::Text { text })
            if index + 1 < context.question_count() =>
        {
            let next = index + 1;
            Ok(TransitionResult::new(QuizState::AwaitingAnswer { index: next })
                .with_effect(Effect::record_answer(text))
                .with_effect(Effect::PresentQuestion { index: next }))
        }

        // AwaitingAnswer(last) + Text -> Completed
        (QuizState::AwaitingAnswer { .. }, Event::Text { text }) => {
            let mut answers = context.answers.to_vec();
            answers.push(text.clone());
            let outcome = score(&context.quiz.catalog, &answers);

            Ok(TransitionResult::new(QuizState::Completed {
                outcome: outcome.clone(),
            })
            .with_effect(Effect::record_answer(text))
            .with_effect(Effect::PresentOutcome { outcome }))
        }
    }
}
