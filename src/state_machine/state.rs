//! Quiz session state types

use crate::quiz::{score, QuizData, ScoreOutcome};
use serde::Serialize;

/// Progress of one session through the quiz
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuizState {
    /// No quiz started; free text is ignored
    #[default]
    Inactive,

    /// Waiting for the answer to question `index` (0-based)
    AwaitingAnswer { index: usize },

    /// All questions answered; terminal until the next `/start`
    Completed { outcome: ScoreOutcome },
}

impl QuizState {
    /// Rebuild the state for a session the store already knows about.
    ///
    /// The answer count doubles as the index of the next question; a full set
    /// of answers is re-scored.
    pub fn from_progress(active: bool, answers: &[String], quiz: &QuizData) -> Self {
        if !active {
            return QuizState::Inactive;
        }
        if answers.len() < quiz.question_count() {
            QuizState::AwaitingAnswer {
                index: answers.len(),
            }
        } else {
            QuizState::Completed {
                outcome: score(&quiz.catalog, answers),
            }
        }
    }

    /// Short state name for logs
    pub fn name(&self) -> &'static str {
        match self {
            QuizState::Inactive => "inactive",
            QuizState::AwaitingAnswer { .. } => "awaiting_answer",
            QuizState::Completed { .. } => "completed",
        }
    }
}

/// Read-only inputs to a transition
#[derive(Debug, Clone, Copy)]
pub struct QuizContext<'a> {
    pub quiz: &'a QuizData,
    /// Answers recorded so far, as seen by the store before this event
    pub answers: &'a [String],
}

impl<'a> QuizContext<'a> {
    pub fn new(quiz: &'a QuizData, answers: &'a [String]) -> Self {
        Self {
            quiz,
            answers,
        }
    }

    pub fn question_count(&self) -> usize {
        self.quiz.question_count()
    }
}
