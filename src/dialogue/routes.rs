//! HTTP surface: the chat endpoint and the lead listing.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::catalog::DEFAULT_LOCALE;
use crate::dialogue::engine::DialogueEngine;
use crate::dialogue::session::DEFAULT_SESSION_ID;
use crate::store::LeadStore;

/// Shared state for the chat routes.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<DialogueEngine>,
    pub store: Arc<dyn LeadStore>,
}

/// POST /chat request body. A missing `message` is rejected by the JSON
/// extractor before any session is touched.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: Option<String>,
    pub lang: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub options: Vec<String>,
}

/// POST /chat
///
/// One conversational turn: `{message, session_id?, lang?}` in,
/// `{response, options}` out.
async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Json<ChatResponse> {
    let session_id = req.session_id.as_deref().unwrap_or(DEFAULT_SESSION_ID);
    let lang = req.lang.as_deref().unwrap_or(DEFAULT_LOCALE);
    let reply = state.engine.handle_message(session_id, lang, &req.message).await;
    Json(ChatResponse {
        response: reply.response,
        options: reply.options,
    })
}

/// GET /leads
///
/// All persisted lead rows, oldest first. Pass-through to storage.
async fn list_leads(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.list().await {
        Ok(leads) => Json(leads).into_response(),
        Err(e) => {
            tracing::error!("Lead listing failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "failed to load leads"})),
            )
                .into_response()
        }
    }
}

/// GET /health
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

/// Build the chat router. CORS is wide open; the widget is embedded on
/// arbitrary sites.
pub fn chat_routes(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/leads", get(list_leads))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
