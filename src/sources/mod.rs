//! Reference material sources
//!
//! A [`Source`] turns a query into plain text an agent can read. Agents name
//! the sources they may consult; [`SourceRegistry`] builds them from the
//! `[sources.*]` configuration tables.

pub mod docs;
pub mod github;

pub use docs::DocsSource;
pub use github::GithubSource;

use crate::types::Result;
use crate::utils::toml_config::{AptosConfig, SourceConfig};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// A searchable body of reference material.
#[async_trait]
pub trait Source: Send + Sync {
    /// Configured name of this source
    fn name(&self) -> &str;

    /// Search the source and render the hits as plain text.
    async fn search(&self, query: &str) -> Result<String>;
}

/// Named sources built from configuration.
#[derive(Default, Clone)]
pub struct SourceRegistry {
    sources: HashMap<String, Arc<dyn Source>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build every configured source, sharing one HTTP client.
    pub fn from_config(config: &AptosConfig, http: reqwest::Client) -> Self {
        let mut registry = Self::new();

        for (name, source) in &config.sources {
            let built: Arc<dyn Source> = match source {
                SourceConfig::Github {
                    repo,
                    token_env,
                    content_types,
                    max_results,
                    api_base,
                } => Arc::new(GithubSource::new(
                    name.clone(),
                    repo.clone(),
                    token_env.as_deref().and_then(|env| config.resolve_env(env)),
                    content_types.clone(),
                    *max_results,
                    api_base.clone(),
                    http.clone(),
                )),
                SourceConfig::Docs {
                    url,
                    max_pages,
                    max_chars,
                } => Arc::new(DocsSource::new(
                    name.clone(),
                    url.clone(),
                    *max_pages,
                    *max_chars,
                )),
            };
            registry.register(built);
        }

        registry
    }

    /// Register a source under its own name, replacing any previous one.
    pub fn register(&mut self, source: Arc<dyn Source>) {
        self.sources.insert(source.name().to_string(), source);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Source>> {
        self.sources.get(name).cloned()
    }

    pub fn names(&self) -> Vec<&str> {
        self.sources.keys().map(|s| s.as_str()).collect()
    }
}

/// Truncate to at most `max_chars` characters, marking the cut.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticSource;

    #[async_trait]
    impl Source for StaticSource {
        fn name(&self) -> &str {
            "static"
        }

        async fn search(&self, query: &str) -> Result<String> {
            Ok(format!("hit for {}", query))
        }
    }

    #[tokio::test]
    async fn test_register_and_get() {
        let mut registry = SourceRegistry::new();
        registry.register(Arc::new(StaticSource));

        let source = registry.get("static").unwrap();
        assert_eq!(source.search("move").await.unwrap(), "hit for move");
        assert!(registry.get("other").is_none());
        assert_eq!(registry.names(), vec!["static"]);
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 5), "hello");
        assert_eq!(truncate_chars("hello world", 5), "hello...");
        assert_eq!(truncate_chars("héllo", 2), "hé...");
    }
}
