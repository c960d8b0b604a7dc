//! API request handlers.
//!
//! This module contains all HTTP request handlers organized by functionality.

/// Stateless single-question handler.
pub mod ask;
/// Conversation start, follow-up and history handlers.
pub mod conversations;
/// Liveness probe.
pub mod health;
/// Topic research handler.
pub mod research;
/// Suggested follow-up questions.
pub mod suggestions;

use crate::types::{AppError, QuestionRequest, Result};
use axum::extract::rejection::JsonRejection;
use axum::Json;

/// Pull a non-empty question out of a JSON body.
pub(crate) fn require_question(
    payload: std::result::Result<Json<QuestionRequest>, JsonRejection>,
) -> Result<String> {
    let Json(body) = payload?;

    match body.question {
        Some(question) if !question.trim().is_empty() => Ok(question),
        _ => Err(AppError::InvalidInput(
            "Missing question in request body".to_string(),
        )),
    }
}
