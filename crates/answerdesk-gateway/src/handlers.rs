// SPDX-FileCopyrightText: 2026 Answerdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.

use answerdesk_core::{AnswerdeskError, Chatbot, KnowledgeEntry, Message, ResolvedAnswer, Session};
use answerdesk_knowledge::EntryDraft;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::server::GatewayState;

/// Request body for POST /v1/chatbots.
#[derive(Debug, Deserialize)]
pub struct CreateChatbotRequest {
    pub name: String,
    #[serde(default)]
    pub system_prompt: Option<String>,
}

/// Request body for POST /v1/chatbots/{chatbot_id}/sessions.
#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    /// Caller-supplied end-user identifier.
    pub user_identity: String,
}

/// Request body for POST .../messages.
#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    /// Message content text.
    pub content: String,
}

/// Query string for GET .../messages.
#[derive(Debug, Default, Deserialize)]
pub struct TranscriptQuery {
    /// Only the last `limit` messages.
    #[serde(default)]
    pub limit: Option<i64>,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    pub session_id: String,
    pub messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
pub struct KnowledgeListResponse {
    pub chatbot_id: String,
    /// Newest first.
    pub entries: Vec<KnowledgeEntry>,
}

#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub chatbot_id: String,
    pub entries: usize,
}

/// GET /health
pub async fn get_public_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// POST /v1/chatbots
pub async fn create_chatbot(
    State(state): State<GatewayState>,
    Json(body): Json<CreateChatbotRequest>,
) -> Result<(StatusCode, Json<Chatbot>), ApiError> {
    let chatbot = state
        .orchestrator
        .create_chatbot(&body.name, body.system_prompt)
        .await?;
    Ok((StatusCode::CREATED, Json(chatbot)))
}

/// GET /v1/chatbots/{chatbot_id}
pub async fn get_chatbot(
    State(state): State<GatewayState>,
    Path(chatbot_id): Path<String>,
) -> Result<Json<Chatbot>, ApiError> {
    Ok(Json(state.orchestrator.chatbot(&chatbot_id).await?))
}

/// POST /v1/chatbots/{chatbot_id}/sessions
pub async fn start_session(
    State(state): State<GatewayState>,
    Path(chatbot_id): Path<String>,
    Json(body): Json<StartSessionRequest>,
) -> Result<(StatusCode, Json<Session>), ApiError> {
    let session = state
        .orchestrator
        .start_session(&chatbot_id, &body.user_identity)
        .await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// DELETE /v1/chatbots/{chatbot_id}/sessions/{session_id}
pub async fn end_session(
    State(state): State<GatewayState>,
    Path((chatbot_id, session_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    state.orchestrator.end_session(&chatbot_id, &session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /v1/chatbots/{chatbot_id}/sessions/{session_id}/messages
pub async fn post_message(
    State(state): State<GatewayState>,
    Path((chatbot_id, session_id)): Path<(String, String)>,
    Json(body): Json<MessageRequest>,
) -> Result<Json<ResolvedAnswer>, ApiError> {
    let answer = state
        .orchestrator
        .resolve(&chatbot_id, &session_id, &body.content)
        .await?;
    Ok(Json(answer))
}

/// GET /v1/chatbots/{chatbot_id}/sessions/{session_id}/messages
pub async fn get_transcript(
    State(state): State<GatewayState>,
    Path((chatbot_id, session_id)): Path<(String, String)>,
    Query(query): Query<TranscriptQuery>,
) -> Result<Json<TranscriptResponse>, ApiError> {
    let session = state.orchestrator.session_for(&chatbot_id, &session_id).await?;
    let messages = state.orchestrator.transcript(&session.id, query.limit).await?;
    Ok(Json(TranscriptResponse {
        session_id: session.id,
        messages,
    }))
}

/// GET /v1/chatbots/{chatbot_id}/knowledge
pub async fn list_knowledge(
    State(state): State<GatewayState>,
    Path(chatbot_id): Path<String>,
) -> Result<Json<KnowledgeListResponse>, ApiError> {
    let chatbot = state.orchestrator.chatbot(&chatbot_id).await?;
    let index = state.orchestrator.knowledge().index_for(&chatbot.id).await?;
    Ok(Json(KnowledgeListResponse {
        chatbot_id: chatbot.id,
        entries: index.all().iter().map(|e| e.as_ref().clone()).collect(),
    }))
}

/// POST /v1/chatbots/{chatbot_id}/knowledge
pub async fn add_knowledge(
    State(state): State<GatewayState>,
    Path(chatbot_id): Path<String>,
    Json(draft): Json<EntryDraft>,
) -> Result<(StatusCode, Json<KnowledgeEntry>), ApiError> {
    let chatbot = state.orchestrator.chatbot(&chatbot_id).await?;
    let entry = draft.into_entry(&chatbot.id)?;
    let stored = state.orchestrator.knowledge().add_entry(entry).await?;
    Ok((StatusCode::CREATED, Json(stored.as_ref().clone())))
}

/// DELETE /v1/chatbots/{chatbot_id}/knowledge/{entry_id}
pub async fn delete_knowledge(
    State(state): State<GatewayState>,
    Path((chatbot_id, entry_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let chatbot = state.orchestrator.chatbot(&chatbot_id).await?;
    let removed = state
        .orchestrator
        .knowledge()
        .remove_entry(&chatbot.id, &entry_id)
        .await?;
    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AnswerdeskError::not_found("knowledge entry", &entry_id).into())
    }
}

/// POST /v1/chatbots/{chatbot_id}/knowledge/reload
pub async fn reload_knowledge(
    State(state): State<GatewayState>,
    Path(chatbot_id): Path<String>,
) -> Result<Json<ReloadResponse>, ApiError> {
    let chatbot = state.orchestrator.chatbot(&chatbot_id).await?;
    let entries = state.orchestrator.knowledge().reload(&chatbot.id).await?;
    Ok(Json(ReloadResponse {
        chatbot_id: chatbot.id,
        entries,
    }))
}
