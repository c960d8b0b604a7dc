use crate::api::handlers::{ask, conversations, health, research, suggestions};
use crate::types::{
    AnswerResponse, Conversation, ErrorResponse, HealthResponse, QuestionRequest,
    ResearchRequest, ResearchResponse, StartConversationResponse, Turn,
};
use crate::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Aptos Research Server",
        description = "Parallel documentation research with a final report step"
    ),
    paths(
        conversations::start_conversation,
        conversations::continue_conversation,
        conversations::get_history,
        ask::ask,
        suggestions::suggested_questions,
        health::health,
        research::research,
    ),
    components(schemas(
        QuestionRequest,
        StartConversationResponse,
        AnswerResponse,
        ResearchRequest,
        ResearchResponse,
        HealthResponse,
        ErrorResponse,
        Conversation,
        Turn,
    )),
    tags(
        (name = "conversations", description = "Stateful question threads"),
        (name = "research", description = "Research pipeline"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/conversation", post(conversations::start_conversation))
        .route("/conversation/{id}", post(conversations::continue_conversation))
        .route("/conversation/{id}/history", get(conversations::get_history))
        .route("/ask", post(ask::ask))
        .route("/suggested-questions", get(suggestions::suggested_questions))
        .route("/health", get(health::health))
        .route("/api/research", post(research::research))
}

#[cfg(feature = "swagger-ui")]
fn with_api_docs(router: Router) -> Router {
    router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
}

#[cfg(not(feature = "swagger-ui"))]
fn with_api_docs(router: Router) -> Router {
    router.route(
        "/api-docs/openapi.json",
        get(|| async { axum::Json(ApiDoc::openapi()) }),
    )
}

/// Build the complete application: routes, API docs and middleware.
pub fn build_app(state: AppState) -> Router {
    let max_body_bytes = state.config_manager.config().server.max_body_bytes;

    with_api_docs(create_router().with_state(state)).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .layer(DefaultBodyLimit::max(max_body_bytes)),
    )
}
