//! Inbound events for a quiz session

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// `/start`: begin or restart the quiz
    Start,
    /// Any free-text message; an answer when a question is pending
    Text { text: String },
    /// `/help`: guardianship programme info, valid in every state
    Help,
}

impl Event {
    pub fn text(text: impl Into<String>) -> Self {
        Event::Text { text: text.into() }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Event::Start => "start",
            Event::Text { .. } => "text",
            Event::Help => "help",
        }
    }
}
