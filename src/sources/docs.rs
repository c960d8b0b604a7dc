//! Documentation site search powered by daedra
//!
//! Runs a site-restricted web search, then fetches the top pages and keeps
//! their text up to a character budget.

use crate::sources::{truncate_chars, Source};
use crate::types::{AppError, Result};
use async_trait::async_trait;

pub struct DocsSource {
    name: String,
    url: String,
    max_pages: usize,
    max_chars: usize,
}

impl DocsSource {
    pub fn new(name: String, url: String, max_pages: usize, max_chars: usize) -> Self {
        Self {
            name,
            url,
            max_pages,
            max_chars,
        }
    }

    /// The search query scoped to this site.
    pub fn site_query(&self, query: &str) -> String {
        match reqwest::Url::parse(&self.url)
            .ok()
            .and_then(|u| u.host_str().map(String::from))
        {
            Some(host) => format!("site:{} {}", host, query),
            None => query.to_string(),
        }
    }
}

#[async_trait]
impl Source for DocsSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(&self, query: &str) -> Result<String> {
        let search_args = daedra::SearchArgs {
            query: self.site_query(query),
            options: Some(daedra::SearchOptions {
                num_results: self.max_pages,
                ..Default::default()
            }),
        };

        let response = daedra::tools::search::perform_search(&search_args)
            .await
            .map_err(|e| AppError::Source(format!("Docs search on {} failed: {}", self.url, e)))?;

        if response.data.is_empty() {
            return Ok(format!("No results on {} for '{}'", self.url, query));
        }

        let mut sections = Vec::new();
        for hit in response.data.iter().take(self.max_pages) {
            let fetch_args = daedra::VisitPageArgs {
                url: hit.url.to_string(),
                include_images: false,
                selector: None,
            };

            let body = match daedra::tools::fetch::fetch_page(&fetch_args).await {
                Ok(page) => page.content.to_string(),
                Err(e) => {
                    tracing::warn!(source = %self.name, url = %hit.url, "Failed to fetch page: {}", e);
                    hit.description.to_string()
                }
            };

            sections.push(format!("## {}\n{}\n{}", hit.title, hit.url, body));
        }

        Ok(truncate_chars(&sections.join("\n\n"), self.max_chars))
    }
}
