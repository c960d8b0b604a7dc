//! # Aptos Research Server
//!
//! An HTTP service that answers developer questions by fanning each question
//! out to several research crews in parallel, combining their findings under
//! labeled headers and handing the result to a reporting crew that writes the
//! final answer.
//!
//! ## Overview
//!
//! The server can be used in two ways:
//!
//! 1. **As a standalone server** - Run the `aptos-research` binary
//! 2. **As a library** - Embed the router or the research pipeline
//!
//! ### Running the pipeline directly
//!
//! ```rust,ignore
//! use aptos_research::{AptosConfigManager, ConfiguredResearcher, Researcher};
//! use std::sync::Arc;
//!
//! let config_manager = Arc::new(AptosConfigManager::new("aptos.toml")?);
//! let researcher = ConfiguredResearcher::new(config_manager, reqwest::Client::new());
//!
//! let report = researcher.research("How do I upgrade my Move modules?").await?;
//! println!("{}", report);
//! ```
//!
//! ### Serving the HTTP API
//!
//! ```rust,ignore
//! use aptos_research::{api, AppState, AptosConfigManager};
//! use std::sync::Arc;
//!
//! let state = AppState::from_config_manager(Arc::new(AptosConfigManager::new("aptos.toml")?));
//! let app = api::build_app(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8007").await?;
//! axum::serve(listener, app).await?;
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `ollama` | Ollama local inference (default) |
//! | `openai` | OpenAI API and compatible endpoints (default) |
//! | `swagger-ui` | Interactive API documentation at `/swagger-ui/` |
//!
//! ## Configuration
//!
//! Everything the pipeline runs is declared in `aptos.toml`: LLM providers
//! and models, search sources, agent personas, task templates, the research
//! lanes and the report task. The file is validated at startup and can be
//! hot-reloaded.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

/// HTTP API handlers and routes.
pub mod api;
/// Command-line interface.
pub mod cli;
/// Conversation history storage.
pub mod conversations;
/// Agent + task crews and their builder.
pub mod crew;
/// LLM provider clients and abstractions.
pub mod llm;
/// Parallel research lanes and the report step.
pub mod research;
/// Searchable reference material (GitHub, documentation sites).
pub mod sources;
/// Core types (requests, responses, errors).
pub mod types;
/// Configuration utilities.
pub mod utils;

// Re-export commonly used types
pub use conversations::{ConversationStore, InMemoryConversationStore};
pub use crew::{Crew, CrewBuilder, CrewInputs};
pub use llm::{LLMClient, Provider, ProviderRegistry};
pub use research::{ConfiguredResearcher, FanOutPolicy, ResearchCoordinator, Researcher};
pub use types::{AppError, Result};
pub use utils::toml_config::{AptosConfig, AptosConfigManager};

use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// TOML configuration with hot-reload support
    pub config_manager: Arc<AptosConfigManager>,
    /// Conversation records
    pub conversations: Arc<dyn ConversationStore>,
    /// The research pipeline
    pub researcher: Arc<dyn Researcher>,
}

impl AppState {
    pub fn new(
        config_manager: Arc<AptosConfigManager>,
        conversations: Arc<dyn ConversationStore>,
        researcher: Arc<dyn Researcher>,
    ) -> Self {
        Self {
            config_manager,
            conversations,
            researcher,
        }
    }

    /// Production wiring: in-memory conversations and the configured pipeline.
    pub fn from_config_manager(config_manager: Arc<AptosConfigManager>) -> Self {
        let researcher =
            ConfiguredResearcher::new(Arc::clone(&config_manager), reqwest::Client::new());

        Self::new(
            config_manager,
            Arc::new(InMemoryConversationStore::new()),
            Arc::new(researcher),
        )
    }

    /// The currently configured suggested questions.
    pub fn suggested_questions(&self) -> Vec<String> {
        self.config_manager.config().suggestions.questions.clone()
    }
}
