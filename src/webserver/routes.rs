use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

use crate::{
    logger::{self, LogTag},
    towns::{commands::BotCommand, commands::COMMANDS, InboundEvent},
    webserver::{auth, state::AppState},
};

pub const SERVICE_NAME: &str = "towns-token-bot";

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: String,
    pub uptime_seconds: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentMetadata {
    pub name: String,
    pub description: String,
    pub version: String,
    pub commands: Vec<BotCommand>,
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/.well-known/agent-metadata.json", get(agent_metadata))
        .route("/webhook", post(webhook))
        .with_state(state)
}

/// GET /
async fn root() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "service": SERVICE_NAME }))
}

/// GET /health
async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    logger::debug(LogTag::Webserver, "Health check endpoint called");

    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
    })
}

/// GET /.well-known/agent-metadata.json
async fn agent_metadata(State(state): State<Arc<AppState>>) -> Json<AgentMetadata> {
    Json(AgentMetadata {
        name: state.bot_name.clone(),
        description: state.bot_description.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        commands: COMMANDS.to_vec(),
    })
}

/// POST /webhook
///
/// Authenticates and parses the event, then acknowledges immediately; the
/// event is handled on its own task.
async fn webhook(State(state): State<Arc<AppState>>, headers: HeaderMap, body: Bytes) -> Response {
    if let Err(e) = auth::verify_webhook(&headers, &state.jwt_secret) {
        logger::warning(LogTag::Webserver, &format!("Rejected webhook call: {}", e));
        return error_response(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", &e.to_string());
    }

    let event: InboundEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            logger::warning(LogTag::Webserver, &format!("Malformed webhook body: {}", e));
            return error_response(StatusCode::BAD_REQUEST, "MALFORMED_EVENT", &e.to_string());
        }
    };

    logger::verbose(
        LogTag::Webserver,
        &format!("Webhook {} event accepted", event.kind()),
    );

    let handler = Arc::clone(&state.handler);
    tokio::spawn(async move {
        handler.handle(event).await;
    });

    (StatusCode::OK, Json(json!({ "ok": true }))).into_response()
}

fn error_response(status: StatusCode, code: &str, message: &str) -> Response {
    (
        status,
        Json(json!({ "error": { "code": code, "message": message } })),
    )
        .into_response()
}
