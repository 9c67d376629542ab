//! Effects produced by state transitions

use crate::quiz::ScoreOutcome;

/// Effects to be executed after a state transition, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Clear the session's answers (starts the session if needed)
    ResetAnswers,

    /// Append an answer to the session
    RecordAnswer { text: String },

    /// Send the welcome text
    SendGreeting,

    /// Send the question at `index` with its options
    PresentQuestion { index: usize },

    /// Send the scored result, or the undetermined notice
    PresentOutcome { outcome: ScoreOutcome },

    /// Send the help text
    SendHelp,
}

impl Effect {
    pub fn record_answer(text: impl Into<String>) -> Self {
        Effect::RecordAnswer { text: text.into() }
    }
}
