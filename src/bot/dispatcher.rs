use crate::bot::messager::MessageRouter;
use crate::bot::messenger::{Messenger, TelegramMessenger};
use crate::core::config::Config;
use crate::core::services::ledger::SheetsLedger;
use crate::core::services::transcription::WhisperTranscriber;
use crate::errors::MyError;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{debug, error, info};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use teloxide::Bot;
use teloxide::utils::html;

#[derive(Clone)]
pub struct AppState {
    router: Arc<MessageRouter>,
    messenger: Arc<dyn Messenger>,
    log_chat_id: Option<i64>,
}

impl AppState {
    pub fn new(
        router: Arc<MessageRouter>,
        messenger: Arc<dyn Messenger>,
        log_chat_id: Option<i64>,
    ) -> Self {
        Self {
            router,
            messenger,
            log_chat_id,
        }
    }
}

#[derive(Serialize)]
struct Ack {
    ok: bool,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/webhook", post(webhook))
        .with_state(state)
}

/// GET / - liveness
async fn health_check() -> &'static str {
    "ok"
}

/// POST /webhook - one Telegram update
async fn webhook(State(state): State<AppState>, body: Bytes) -> Response {
    // unreadable bodies are acknowledged like an empty update
    match state.router.handle_body(&body).await {
        Ok(outcome) => {
            debug!("Update handled: {:?}", outcome);
            (StatusCode::OK, Json(Ack { ok: true })).into_response()
        }
        Err(err) => {
            handle_error(&state, &err).await;
            (StatusCode::INTERNAL_SERVER_ERROR, Json(Ack { ok: false })).into_response()
        }
    }
}

pub async fn handle_error(state: &AppState, err: &MyError) {
    error!("An error has occurred: {:?}", err);

    let Some(log_chat_id) = state.log_chat_id else {
        return;
    };

    let report = format!(
        "🚨 <b>Novo erro!</b>\n\n<blockquote expandable>{}</blockquote>\n\n#error",
        html::escape(&err.to_string())
    );
    match state.messenger.send_message(log_chat_id, &report, None).await {
        Ok(()) => info!("Error report sent to chat {}", log_chat_id),
        Err(e) => error!("Failed to send error report to chat {}: {}", log_chat_id, e),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for ctrl-c: {}", e);
    }
    info!("Shutting down");
}

pub async fn run() -> Result<(), MyError> {
    let config = Config::from_env()?;

    let telegram = Arc::new(TelegramMessenger::new(Bot::new(config.get_bot_token()))?);
    if let Some(url) = config.get_webhook_url() {
        telegram.register_webhook(url.clone()).await?;
        info!("Webhook registered");
    }

    let messenger: Arc<dyn Messenger> = telegram;
    let router = Arc::new(MessageRouter::new(
        messenger.clone(),
        Arc::new(WhisperTranscriber::new(&config)?),
        Arc::new(SheetsLedger::new(&config)?),
    ));
    let state = AppState::new(router, messenger, config.get_log_chat_id());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.get_port()));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        "Listening on {} (sheet {}, worksheet {})",
        addr,
        config.get_sheet_id(),
        config.get_worksheet_name()
    );

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
