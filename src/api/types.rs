//! API response types

use crate::session::SessionId;
use crate::state_machine::QuizState;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Shape of the loaded quiz, without answer sets or descriptions
#[derive(Debug, Serialize)]
pub struct QuizSummaryResponse {
    pub question_count: usize,
    pub questions: Vec<String>,
    /// Result keys in declaration order, which is also tie-break order
    pub results: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionCountResponse {
    pub active_sessions: usize,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id: SessionId,
    pub state: QuizState,
    pub answers: Vec<String>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
