use crate::{types::SuggestionQuery, AppState};
use axum::{
    extract::{Query, State},
    Json,
};

/// List suggested questions
///
/// The list is static configuration; `context` does not change it yet.
#[utoipa::path(
    get,
    path = "/suggested-questions",
    params(SuggestionQuery),
    responses(
        (status = 200, description = "Suggested questions", body = Vec<String>)
    ),
    tag = "research"
)]
pub async fn suggested_questions(
    State(state): State<AppState>,
    Query(query): Query<SuggestionQuery>,
) -> Json<Vec<String>> {
    if let Some(context) = query.context.as_deref() {
        tracing::debug!(context, "Suggested questions requested with context");
    }

    Json(state.suggested_questions())
}
