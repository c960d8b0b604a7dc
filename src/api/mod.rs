//! HTTP API Handlers and Routes
//!
//! This module provides the REST API layer, built on the Axum web framework.
//!
//! # Module Structure
//!
//! - [`api::handlers`](crate::api::handlers) - Request handlers for each endpoint
//! - [`api::routes`](crate::api::routes) - Route definitions, OpenAPI document and middleware
//!
//! # API Endpoints
//!
//! ## Conversations
//! - `POST /conversation` - Start a conversation with a first question
//! - `POST /conversation/{id}` - Ask a follow-up question
//! - `GET /conversation/{id}/history` - Full conversation record
//!
//! ## Research
//! - `POST /ask` - Answer one question without conversation state
//! - `POST /api/research` - Research a topic
//! - `GET /suggested-questions` - Static list of suggested questions
//!
//! ## Health
//! - `GET /health` - Always `{"status": "healthy"}`
//!
//! Errors are returned as `{"error": "<message>"}`.
//!
//! # OpenAPI Documentation
//!
//! The OpenAPI document is served at `/api-docs/openapi.json`. When the
//! `swagger-ui` feature is enabled, interactive documentation is available
//! at `/swagger-ui/`.

/// Request and response handlers for all API endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;

pub use routes::{build_app, create_router, ApiDoc};
