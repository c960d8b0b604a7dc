use crate::{
    types::{AppError, ErrorResponse, ResearchRequest, ResearchResponse, Result},
    AppState,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::time::Instant;

/// Run the research pipeline on a topic
#[utoipa::path(
    post,
    path = "/api/research",
    request_body = ResearchRequest,
    responses(
        (status = 200, description = "Research completed", body = ResearchResponse),
        (status = 400, description = "Missing topic", body = ErrorResponse),
        (status = 500, description = "Research pipeline failed", body = ErrorResponse)
    ),
    tag = "research"
)]
pub async fn research(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ResearchRequest>, JsonRejection>,
) -> Result<Json<ResearchResponse>> {
    let Json(body) = payload?;

    let topic = body
        .topic
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::InvalidInput("Missing topic in request body".to_string()))?;

    let start = Instant::now();
    let result = state.researcher.research(&topic).await?;
    tracing::info!(
        duration_ms = start.elapsed().as_millis() as u64,
        "Research completed"
    );

    Ok(Json(ResearchResponse {
        status: "success".to_string(),
        result,
    }))
}
