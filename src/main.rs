//! Totem Quiz - Telegram bot that finds a user's totem animal
//!
//! Asks a fixed set of multiple-choice questions, scores the answers against
//! a catalog of animals and replies with the best match.

mod api;
mod config;
mod quiz;
mod runtime;
mod session;
mod state_machine;
mod telegram;

use api::{create_router, AppState};
use config::BotConfig;
use quiz::QuizData;
use runtime::{FsImageResolver, SessionManager};
use session::InMemorySessionStore;
use std::net::SocketAddr;
use std::sync::Arc;
use telegram::{PollingDispatcher, TelegramClient, TelegramDelivery};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env is fine; variables may come from the environment
    let dotenv = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "totem_quiz=info,tower_http=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "Loaded .env");
    }

    // Configuration
    let config = BotConfig::from_env()?;
    tracing::info!(config = ?config, "Configuration loaded");

    // Quiz data must be valid before anything is served
    let quiz = QuizData::load(&config.quiz_data_path).map_err(|e| {
        tracing::error!(path = %config.quiz_data_path.display(), error = %e, "Failed to load quiz data");
        e
    })?;
    tracing::info!(
        questions = quiz.question_count(),
        results = quiz.catalog.len(),
        "Quiz data loaded"
    );

    // Telegram transport
    let client = Arc::new(TelegramClient::new(
        &config.telegram_api_url,
        &config.bot_token,
        config.poll_timeout,
    )?);
    let delivery = TelegramDelivery::new(
        client.clone(),
        Arc::new(FsImageResolver::new(config.images_dir.clone())),
        quiz.messages.clone(),
    );

    // Sessions
    let sessions = Arc::new(SessionManager::new(
        Arc::new(quiz),
        Arc::new(InMemorySessionStore::new()),
        Arc::new(delivery),
    ));

    // Polling and webhooks are exclusive; start from a clean queue
    client.delete_webhook(true).await?;
    tracing::info!("Webhook removed, pending updates dropped");

    // Status API
    let app = create_router(AppState::new(sessions.clone())).layer(TraceLayer::new_for_http());
    let addr = SocketAddr::new(config.http_bind, config.http_port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Status API listening on {}", addr);
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "Status API stopped");
        }
    });

    let dispatcher = PollingDispatcher::new(client, sessions);
    tokio::select! {
        result = dispatcher.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutting down");
        }
    }

    Ok(())
}
