//! REST API server
//!
//! Exposes the message relay, the chat endpoint and the intent-routed
//! financial query over HTTP for the web frontend.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, info_span, warn};

use crate::config::Config;
use crate::intent::IntentRouter;
use crate::models::{ChatTranscript, Message, MessageReply, Query};
use crate::openai::{ChatModel, OpenAiClient};
use crate::relay::MessageRelay;
use crate::sienge::{FinancialData, SiengeClient};

pub const ROOT_MESSAGE: &str = "🚀 Backend da Omni AI Nexus rodando com sucesso!";
pub const EMPTY_MESSAGE_REPLY: &str = "Mensagem vazia.";

/// =============================
/// Response Wrapper
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).ok(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub relay: Arc<MessageRelay>,
    pub router: Arc<IntentRouter>,
}

impl ApiState {
    /// Wire the real OpenAI and Sienge clients from configuration
    pub fn from_config(config: &Config) -> crate::Result<Self> {
        let model: Arc<dyn ChatModel> = Arc::new(OpenAiClient::new(&config.openai)?);
        let erp: Arc<dyn FinancialData> = Arc::new(SiengeClient::new(&config.sienge)?);

        Ok(Self {
            relay: Arc::new(MessageRelay::new(
                model.clone(),
                config.openai.chat_model.clone(),
            )),
            router: Arc::new(IntentRouter::new(
                model,
                erp,
                config.openai.classifier_model.clone(),
            )),
        })
    }
}

/// =============================
/// Root & Health
/// =============================

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": ROOT_MESSAGE }))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Message Relay Endpoint
/// =============================

async fn message_handler(
    State(state): State<ApiState>,
    Json(msg): Json<Message>,
) -> (StatusCode, Json<MessageReply>) {
    if msg.text.trim().is_empty() {
        warn!("Empty message from user '{}'", msg.user);
        return (
            StatusCode::BAD_REQUEST,
            Json(MessageReply {
                response: EMPTY_MESSAGE_REPLY.to_string(),
            }),
        );
    }

    let response = state.relay.relay(&msg.user, &msg.text).await;
    (StatusCode::OK, Json(MessageReply { response }))
}

/// =============================
/// Chat Endpoint
/// =============================

async fn chat_handler(
    State(state): State<ApiState>,
    Json(transcript): Json<ChatTranscript>,
) -> (StatusCode, Json<serde_json::Value>) {
    match state
        .relay
        .chat(transcript.messages, &transcript.files)
        .await
    {
        Ok(response) => (
            StatusCode::OK,
            Json(serde_json::json!({ "response": response })),
        ),
        Err(e) => {
            warn!("Chat request failed: {}", e);
            (
                e.status_code(),
                Json(serde_json::json!({ "error": e.to_string() })),
            )
        }
    }
}

/// =============================
/// Intent-Routed Query Endpoint
/// =============================

async fn query_handler(
    State(state): State<ApiState>,
    Json(query): Json<Query>,
) -> (StatusCode, Json<ApiResponse>) {
    info!("Received query: {}", query.pergunta);

    match state
        .router
        .answer(&query.pergunta, query.empresa.as_deref())
        .await
    {
        Ok(outcome) => (StatusCode::OK, Json(ApiResponse::success(outcome))),
        Err(e) => {
            warn!("Query failed: {}", e);
            (e.status_code(), Json(ApiResponse::error(e.to_string())))
        }
    }
}

/// =============================
/// Router
/// =============================

pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/mensagem", post(message_handler))
        .route("/chat", post(chat_handler))
        .route("/consulta", post(query_handler))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                info_span!(
                    "http",
                    request_id = %uuid::Uuid::new_v4(),
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(CorsLayer::very_permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    state: ApiState,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}
