//! Research fan-out/fan-in
//!
//! A question is researched by several independent lanes running
//! concurrently. Their outputs are combined under labeled headers in a fixed
//! lane order and passed to a reporting crew, which writes the final answer.
//!
//! # Architecture
//!
//! - [`coordinator::ResearchCoordinator`] - runs lanes, combines, reports
//! - [`Researcher`] - the seam HTTP handlers and the CLI call through
//! - [`ConfiguredResearcher`] - rebuilds the coordinator from the current
//!   configuration snapshot on every request, so hot reloads apply
//!
//! # Usage
//!
//! ```ignore
//! use aptos_research::research::{ConfiguredResearcher, Researcher};
//!
//! let researcher = ConfiguredResearcher::new(config_manager, reqwest::Client::new());
//! let report = researcher.research("How do I deploy a Move module?").await?;
//! println!("{}", report);
//! ```

/// Lane fan-out, outcome combination and the report step.
pub mod coordinator;

pub use coordinator::{combine, FanOutPolicy, Lane, LaneOutcome, ResearchCoordinator};

use crate::crew::CrewBuilder;
use crate::types::Result;
use crate::utils::toml_config::AptosConfigManager;
use async_trait::async_trait;
use std::sync::Arc;

/// Anything that can turn a topic into a finished report.
#[async_trait]
pub trait Researcher: Send + Sync {
    async fn research(&self, topic: &str) -> Result<String>;
}

/// Researcher backed by the live configuration.
pub struct ConfiguredResearcher {
    config_manager: Arc<AptosConfigManager>,
    http: reqwest::Client,
}

impl ConfiguredResearcher {
    pub fn new(config_manager: Arc<AptosConfigManager>, http: reqwest::Client) -> Self {
        Self {
            config_manager,
            http,
        }
    }
}

#[async_trait]
impl Researcher for ConfiguredResearcher {
    async fn research(&self, topic: &str) -> Result<String> {
        let config = self.config_manager.config();
        let coordinator = CrewBuilder::new(config, self.http.clone())
            .build_coordinator()
            .await?;

        coordinator.run(topic).await
    }
}
