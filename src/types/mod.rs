use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

// ============= API Request/Response Types =============

/// Body accepted by the question endpoints.
///
/// `question` is optional at the serde level so that a missing field is
/// reported as a 400 with an `{error}` body instead of a framework rejection.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct QuestionRequest {
    #[serde(default)]
    pub question: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StartConversationResponse {
    pub conversation_id: String,
    pub answer: String,
    pub suggested_questions: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AnswerResponse {
    pub answer: String,
    pub suggested_questions: Vec<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct ResearchRequest {
    #[serde(default)]
    pub topic: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ResearchResponse {
    pub status: String,
    pub result: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

/// Query string of the suggested-questions endpoint.
#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SuggestionQuery {
    /// Free-text context; accepted but currently unused
    pub context: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

// ============= Conversation Types =============

/// A single question/answer exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Turn {
    pub question: String,
    pub answer: String,
    pub timestamp: DateTime<Utc>,
}

/// Id-keyed, append-only turn history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Conversation {
    pub id: String,
    pub history: Vec<Turn>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Create an empty conversation with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("LLM error: {0}")]
    LLM(String),

    #[error("Source error: {0}")]
    Source(String),

    #[error("Research error: {0}")]
    Research(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status this error maps to.
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;

        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Configuration(_)
            | AppError::LLM(_)
            | AppError::Source(_)
            | AppError::Research(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The bare message, without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            AppError::Configuration(msg)
            | AppError::LLM(msg)
            | AppError::Source(msg)
            | AppError::Research(msg)
            | AppError::NotFound(msg)
            | AppError::InvalidInput(msg)
            | AppError::PayloadTooLarge(msg)
            | AppError::Internal(msg) => msg,
        }
    }
}

/// Body rejections keep a 413 for oversized payloads; everything else is a 400.
impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        if rejection.status() == axum::http::StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(rejection.body_text())
        } else {
            AppError::InvalidInput(rejection.body_text())
        }
    }
}

impl From<crate::utils::toml_config::ConfigError> for AppError {
    fn from(err: crate::utils::toml_config::ConfigError) -> Self {
        AppError::Configuration(err.to_string())
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("Error processing request: {}", self);
        }

        let body = serde_json::json!({
            "error": self.message()
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::InvalidInput("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Research("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::LLM("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_message_strips_prefix() {
        let err = AppError::NotFound("Conversation not found".into());
        assert_eq!(err.message(), "Conversation not found");
        assert_eq!(err.to_string(), "Not found: Conversation not found");
    }

    #[test]
    fn test_into_response_status() {
        let response = AppError::InvalidInput("Missing question".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_question_request_missing_field() {
        let req: QuestionRequest = serde_json::from_str("{}").unwrap();
        assert!(req.question.is_none());
    }

    #[test]
    fn test_conversation_new_is_empty() {
        let conv = Conversation::new("abc");
        assert_eq!(conv.id, "abc");
        assert!(conv.history.is_empty());
        assert_eq!(conv.created_at, conv.updated_at);
    }
}
