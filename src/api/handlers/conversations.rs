//! Conversation handlers.
//!
//! A conversation is started by its first question. Follow-up questions are
//! researched with the prior turns attached as context, but only the raw
//! question is recorded in history.

use crate::{
    api::handlers::require_question,
    conversations::topic_with_context,
    types::{
        AnswerResponse, AppError, Conversation, ErrorResponse, QuestionRequest, Result,
        StartConversationResponse,
    },
    AppState,
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};

/// Start a new conversation with its first question
#[utoipa::path(
    post,
    path = "/conversation",
    request_body = QuestionRequest,
    responses(
        (status = 200, description = "Conversation started", body = StartConversationResponse),
        (status = 400, description = "Missing or malformed question", body = ErrorResponse),
        (status = 500, description = "Research pipeline failed", body = ErrorResponse)
    ),
    tag = "conversations"
)]
pub async fn start_conversation(
    State(state): State<AppState>,
    payload: std::result::Result<Json<QuestionRequest>, JsonRejection>,
) -> Result<Json<StartConversationResponse>> {
    let question = require_question(payload)?;

    // The record exists before research starts; it stays empty if research fails.
    let conversation = state.conversations.create().await;

    let answer = state.researcher.research(&question).await.map_err(|e| {
        tracing::error!(conversation_id = %conversation.id, "Error processing query: {}", e);
        e
    })?;

    state
        .conversations
        .append(&conversation.id, &question, &answer)
        .await?;

    Ok(Json(StartConversationResponse {
        conversation_id: conversation.id,
        answer,
        suggested_questions: state.suggested_questions(),
    }))
}

/// Ask a follow-up question in an existing conversation
#[utoipa::path(
    post,
    path = "/conversation/{id}",
    request_body = QuestionRequest,
    params(("id" = String, Path, description = "Conversation id")),
    responses(
        (status = 200, description = "Follow-up answered", body = AnswerResponse),
        (status = 400, description = "Missing or malformed question", body = ErrorResponse),
        (status = 404, description = "Conversation not found", body = ErrorResponse),
        (status = 500, description = "Research pipeline failed", body = ErrorResponse)
    ),
    tag = "conversations"
)]
pub async fn continue_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<QuestionRequest>, JsonRejection>,
) -> Result<Json<AnswerResponse>> {
    let question = require_question(payload)?;

    let conversation = state
        .conversations
        .get(&id)
        .await
        .ok_or_else(|| AppError::NotFound("Conversation not found".to_string()))?;

    let window = state.config_manager.config().research.history_window;
    let topic = topic_with_context(&question, &conversation, window);

    let answer = state.researcher.research(&topic).await.map_err(|e| {
        tracing::error!(conversation_id = %id, "Error continuing conversation: {}", e);
        e
    })?;

    state.conversations.append(&id, &question, &answer).await?;

    Ok(Json(AnswerResponse {
        answer,
        suggested_questions: state.suggested_questions(),
    }))
}

/// Get the full record of a conversation
#[utoipa::path(
    get,
    path = "/conversation/{id}/history",
    params(("id" = String, Path, description = "Conversation id")),
    responses(
        (status = 200, description = "Conversation record", body = Conversation),
        (status = 404, description = "Conversation not found", body = ErrorResponse)
    ),
    tag = "conversations"
)]
pub async fn get_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Conversation>> {
    state
        .conversations
        .get(&id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Conversation not found".to_string()))
}
