use crate::{
    api::handlers::require_question,
    types::{AnswerResponse, ErrorResponse, QuestionRequest, Result},
    AppState,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

/// Answer a single question without conversation state
#[utoipa::path(
    post,
    path = "/ask",
    request_body = QuestionRequest,
    responses(
        (status = 200, description = "Question answered", body = AnswerResponse),
        (status = 400, description = "Missing or malformed question", body = ErrorResponse),
        (status = 500, description = "Research pipeline failed", body = ErrorResponse)
    ),
    tag = "research"
)]
pub async fn ask(
    State(state): State<AppState>,
    payload: std::result::Result<Json<QuestionRequest>, JsonRejection>,
) -> Result<Json<AnswerResponse>> {
    let question = require_question(payload)?;
    let answer = state.researcher.research(&question).await?;

    Ok(Json(AnswerResponse {
        answer,
        suggested_questions: state.suggested_questions(),
    }))
}
