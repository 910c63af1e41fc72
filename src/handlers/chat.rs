use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{ChatStatus, ChatTurn};
use crate::state::AppState;

#[derive(Serialize)]
pub struct SessionResponse {
    id: Uuid,
    turns: Vec<ChatTurn>,
}

// POST /api/chat/sessions
pub async fn open_session(State(state): State<Arc<AppState>>) -> Json<SessionResponse> {
    let (id, relay) = state.chat.open();
    Json(SessionResponse {
        id,
        turns: relay.turns(),
    })
}

// GET /api/chat/sessions/:id
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let relay = state
        .chat
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("chat session {id}")))?;
    Ok(Json(SessionResponse {
        id,
        turns: relay.turns(),
    }))
}

// POST /api/chat/sessions/:id/messages
#[derive(Deserialize)]
pub struct SendMessageRequest {
    pub message: String,
}

#[derive(Serialize)]
pub struct SendMessageResponse {
    reply: ChatTurn,
    turns: Vec<ChatTurn>,
}

pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<SendMessageRequest>,
) -> Result<Json<SendMessageResponse>, AppError> {
    let relay = state
        .chat
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("chat session {id}")))?;

    let reply = relay
        .send(&body.message)
        .await
        .ok_or_else(|| AppError::Validation("message cannot be empty".to_string()))?;

    Ok(Json(SendMessageResponse {
        reply,
        turns: relay.turns(),
    }))
}

// GET /api/chat/status
pub async fn chat_status(State(state): State<Arc<AppState>>) -> Result<Json<ChatStatus>, AppError> {
    let status = state.chat.service().chat_status().await?;
    Ok(Json(status))
}
