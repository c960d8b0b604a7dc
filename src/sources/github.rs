//! GitHub repository search over the REST API.

use crate::sources::{truncate_chars, Source};
use crate::types::{AppError, Result};
use crate::utils::toml_config::GithubContentType;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::Deserialize;

const ISSUE_BODY_CHARS: usize = 400;

/// Searches code and issues of a single repository.
pub struct GithubSource {
    name: String,
    repo: String,
    token: Option<String>,
    content_types: Vec<GithubContentType>,
    max_results: usize,
    api_base: String,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct SearchResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct CodeItem {
    path: String,
    html_url: String,
}

#[derive(Debug, Deserialize)]
struct IssueItem {
    number: u64,
    title: String,
    html_url: String,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    body: Option<String>,
}

impl GithubSource {
    pub fn new(
        name: String,
        repo: String,
        token: Option<String>,
        content_types: Vec<GithubContentType>,
        max_results: usize,
        api_base: String,
        http: reqwest::Client,
    ) -> Self {
        Self {
            name,
            repo,
            token,
            content_types,
            max_results,
            api_base: api_base.trim_end_matches('/').to_string(),
            http,
        }
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    async fn fetch<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &str,
    ) -> Result<Vec<T>> {
        let q = format!("{} repo:{}", query, self.repo);
        let per_page = self.max_results.to_string();

        let mut request = self
            .http
            .get(format!("{}/search/{}", self.api_base, endpoint))
            .query(&[("q", q.as_str()), ("per_page", per_page.as_str())])
            .header(ACCEPT, "application/vnd.github+json")
            .header(USER_AGENT, "aptos-research-server");

        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = request.send().await.map_err(|e| {
            AppError::Source(format!("GitHub {} search failed: {}", endpoint, e))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Source(format!(
                "GitHub {} search for {} returned {}",
                endpoint, self.repo, status
            )));
        }

        let body: SearchResponse<T> = response.json().await.map_err(|e| {
            AppError::Source(format!("Invalid GitHub {} search response: {}", endpoint, e))
        })?;

        Ok(body.items.into_iter().take(self.max_results).collect())
    }

    fn render_code(items: &[CodeItem]) -> Vec<String> {
        items
            .iter()
            .map(|item| format!("[code] {} ({})", item.path, item.html_url))
            .collect()
    }

    fn render_issues(items: &[IssueItem]) -> Vec<String> {
        items
            .iter()
            .map(|item| {
                let mut line = format!(
                    "[issue #{}] {} [{}] ({})",
                    item.number,
                    item.title,
                    item.state.as_deref().unwrap_or("unknown"),
                    item.html_url
                );
                if let Some(body) = item.body.as_deref().map(str::trim) {
                    if !body.is_empty() {
                        line.push('\n');
                        line.push_str(&truncate_chars(body, ISSUE_BODY_CHARS));
                    }
                }
                line
            })
            .collect()
    }
}

#[async_trait]
impl Source for GithubSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(&self, query: &str) -> Result<String> {
        let mut lines = Vec::new();

        for content_type in &self.content_types {
            match content_type {
                GithubContentType::Code => {
                    let items: Vec<CodeItem> = self.fetch("code", query).await?;
                    lines.extend(Self::render_code(&items));
                }
                GithubContentType::Issue => {
                    let items: Vec<IssueItem> = self.fetch("issues", query).await?;
                    lines.extend(Self::render_issues(&items));
                }
            }
        }

        tracing::debug!(source = %self.name, hits = lines.len(), "GitHub search finished");

        if lines.is_empty() {
            Ok(format!("No results in {} for '{}'", self.repo, query))
        } else {
            Ok(lines.join("\n"))
        }
    }
}
