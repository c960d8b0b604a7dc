//! LLM Provider Clients and Abstractions
//!
//! This module provides a unified interface for interacting with the Large Language
//! Model (LLM) providers agents run on. Provider-specific implementations sit behind
//! the [`LLMClient`] trait, so crews work with any supported LLM.
//!
//! # Architecture
//!
//! - [`LLMClient`] - The core trait that all providers implement
//! - [`Provider`] - A resolved provider plus model, able to build a client
//! - [`ProviderRegistry`] - Resolves configured model names to providers
//!
//! # Supported Providers
//!
//! Enable providers via Cargo features:
//! - `ollama` - Local Ollama server
//! - `openai` - OpenAI API and compatible endpoints
//!
//! # Example
//!
//! ```ignore
//! use aptos_research::llm::ProviderRegistry;
//!
//! let registry = ProviderRegistry::from_config(&config);
//! let client = registry.create_client_for_model("default").await?;
//!
//! let answer = client.generate("What is a Move resource?").await?;
//! ```

/// Core LLM client trait and provider selection.
pub mod client;
/// Registry for resolving configured models to providers.
pub mod provider_registry;

#[cfg(feature = "ollama")]
pub mod ollama;

#[cfg(feature = "openai")]
pub mod openai;

pub use client::{LLMClient, Provider};
pub use provider_registry::ProviderRegistry;
