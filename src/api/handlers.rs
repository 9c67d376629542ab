//! HTTP request handlers

use super::types::{
    ErrorResponse, HealthResponse, QuizSummaryResponse, SessionCountResponse, SessionResponse,
};
use super::AppState;
use crate::session::{SessionId, SessionStore};
use crate::state_machine::QuizState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/version", get(get_version))
        .route("/api/quiz", get(get_quiz))
        .route("/api/sessions", get(count_sessions))
        .route("/api/sessions/:id", get(get_session))
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn get_version() -> &'static str {
    concat!("totem-quiz ", env!("CARGO_PKG_VERSION"))
}

async fn get_quiz(State(state): State<AppState>) -> Json<QuizSummaryResponse> {
    let quiz = state.sessions.quiz();
    Json(QuizSummaryResponse {
        question_count: quiz.question_count(),
        questions: quiz.questions.iter().map(|q| q.text.clone()).collect(),
        results: quiz.catalog.keys().map(ToString::to_string).collect(),
    })
}

async fn count_sessions(State(state): State<AppState>) -> Json<SessionCountResponse> {
    Json(SessionCountResponse {
        active_sessions: state.sessions.store().session_count(),
    })
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>, AppError> {
    let id: SessionId = id
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid session id: {id}")))?;

    // Only chats that started a quiz are sessions
    let store = state.sessions.store();
    if !store.is_active(id) {
        return Err(AppError::NotFound(format!("Session not found: {id}")));
    }

    let answers = store.answers(id);
    let quiz_state = match state.sessions.snapshot(id).await {
        Some(snapshot) => snapshot.state,
        None => QuizState::from_progress(true, &answers, state.sessions.quiz()),
    };

    Ok(Json(SessionResponse {
        id,
        state: quiz_state,
        answers,
    }))
}

// ============================================================
// Error Handling
// ============================================================

enum AppError {
    BadRequest(String),
    NotFound(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
