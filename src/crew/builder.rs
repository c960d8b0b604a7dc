//! Builds crews and the research coordinator from configuration.

use crate::crew::{AgentSpec, Crew, LlmCrew, TaskSpec};
use crate::llm::{LLMClient, ProviderRegistry};
use crate::research::{Lane, ResearchCoordinator};
use crate::sources::{Source, SourceRegistry};
use crate::types::{AppError, Result};
use crate::utils::toml_config::AptosConfig;
use std::collections::HashMap;
use std::sync::Arc;

/// Resolves task -> agent -> model/sources chains into runnable crews.
pub struct CrewBuilder {
    config: Arc<AptosConfig>,
    providers: ProviderRegistry,
    sources: SourceRegistry,
}

impl CrewBuilder {
    pub fn new(config: Arc<AptosConfig>, http: reqwest::Client) -> Self {
        let providers = ProviderRegistry::from_config(&config);
        let sources = SourceRegistry::from_config(&config, http);

        Self {
            config,
            providers,
            sources,
        }
    }

    /// Replace the configured sources, e.g. with stubs in tests.
    pub fn with_sources(mut self, sources: SourceRegistry) -> Self {
        self.sources = sources;
        self
    }

    pub fn task_spec(&self, task_name: &str) -> Result<TaskSpec> {
        self.config
            .get_task(task_name)
            .map(|task| TaskSpec::from_config(task_name, task))
            .ok_or_else(|| {
                AppError::Configuration(format!("Task '{}' not found in configuration", task_name))
            })
    }

    pub fn agent_spec(&self, agent_name: &str) -> Result<AgentSpec> {
        self.config
            .get_agent(agent_name)
            .map(|agent| AgentSpec::from_config(agent_name, agent))
            .ok_or_else(|| {
                AppError::Configuration(format!(
                    "Agent '{}' not found in configuration",
                    agent_name
                ))
            })
    }

    fn agent_sources(&self, agent: &AgentSpec) -> Result<Vec<Arc<dyn Source>>> {
        agent
            .sources
            .iter()
            .map(|name| {
                self.sources.get(name).ok_or_else(|| {
                    AppError::Configuration(format!(
                        "Source '{}' referenced by agent '{}' not found",
                        name, agent.name
                    ))
                })
            })
            .collect()
    }

    async fn build_with_clients(
        &self,
        crew_name: &str,
        task_name: &str,
        clients: &mut HashMap<String, Arc<dyn LLMClient>>,
    ) -> Result<LlmCrew> {
        let task = self.task_spec(task_name)?;
        let agent = self.agent_spec(&task.agent)?;
        let sources = self.agent_sources(&agent)?;

        let llm = match clients.get(&agent.model) {
            Some(client) => Arc::clone(client),
            None => {
                let client: Arc<dyn LLMClient> =
                    Arc::from(self.providers.create_client_for_model(&agent.model).await?);
                clients.insert(agent.model.clone(), Arc::clone(&client));
                client
            }
        };

        Ok(LlmCrew::new(crew_name, agent, task, llm).with_sources(sources))
    }

    /// Build the crew that runs a single configured task.
    pub async fn build_task_crew(&self, crew_name: &str, task_name: &str) -> Result<LlmCrew> {
        self.build_with_clients(crew_name, task_name, &mut HashMap::new())
            .await
    }

    /// Build the coordinator for the configured lanes and report task.
    ///
    /// Agents sharing a model share one client.
    pub async fn build_coordinator(&self) -> Result<ResearchCoordinator> {
        let research = &self.config.research;
        let mut clients = HashMap::new();

        let mut lanes = Vec::with_capacity(research.lanes.len());
        for lane in &research.lanes {
            let crew = self
                .build_with_clients(&lane.label, &lane.task, &mut clients)
                .await?;
            lanes.push(Lane::new(lane.label.clone(), Arc::new(crew) as Arc<dyn Crew>));
        }

        let reporter = self
            .build_with_clients(&research.report_task, &research.report_task, &mut clients)
            .await?;

        let mut coordinator =
            ResearchCoordinator::new(lanes, Arc::new(reporter)).with_policy(research.policy);
        if let Some(timeout) = self.config.lane_timeout() {
            coordinator = coordinator.with_lane_timeout(timeout);
        }

        Ok(coordinator)
    }
}

#[cfg(all(test, feature = "ollama"))]
mod tests {
    use super::*;
    use crate::research::FanOutPolicy;

    const CONFIG: &str = r#"
[providers.local]
type = "ollama"
default_model = "llama3.2"

[models.default]
provider = "local"
model = "llama3.2"

[sources.core]
type = "github"
repo = "aptos-labs/aptos-core"

[agents.core_researcher]
role = "Core researcher"
goal = "Answer {topic}"
backstory = "You read aptos-core."
model = "default"
sources = ["core"]

[agents.reporting_analyst]
role = "Reporting analyst"
goal = "Report"
backstory = "You write reports."
model = "default"

[tasks.core_task]
description = "Research {topic}"
expected_output = "Notes"
agent = "core_researcher"

[tasks.reporting_task]
description = "Report on {topic}: {research_results}"
expected_output = "A report"
agent = "reporting_analyst"

[research]
report_task = "reporting_task"
policy = "partial"
lane_timeout_secs = 30

[[research.lanes]]
label = "Aptos Core Research"
task = "core_task"

[[research.lanes]]
label = "Second Pass"
task = "core_task"
"#;

    fn builder() -> CrewBuilder {
        let config = AptosConfig::parse(CONFIG).unwrap();
        CrewBuilder::new(Arc::new(config), reqwest::Client::new())
    }

    #[tokio::test]
    async fn test_build_task_crew_resolves_chain() {
        let crew = builder()
            .build_task_crew("core", "core_task")
            .await
            .unwrap();

        assert_eq!(crew.name(), "core");
        assert_eq!(crew.agent().name, "core_researcher");
        assert_eq!(crew.task().description, "Research {topic}");
    }

    #[tokio::test]
    async fn test_build_coordinator_keeps_lane_order_and_policy() {
        let coordinator = builder().build_coordinator().await.unwrap();

        let labels: Vec<_> = coordinator.lanes().iter().map(|l| l.label.as_str()).collect();
        assert_eq!(labels, vec!["Aptos Core Research", "Second Pass"]);
        assert_eq!(coordinator.policy(), FanOutPolicy::Partial);
    }

    #[tokio::test]
    async fn test_unknown_task() {
        let err = builder()
            .build_task_crew("x", "missing_task")
            .await
            .err()
            .unwrap();
        assert!(err.to_string().contains("missing_task"));
    }

    #[test]
    fn test_missing_source_in_registry() {
        let builder = builder().with_sources(SourceRegistry::new());
        let agent = builder.agent_spec("core_researcher").unwrap();
        let err = builder.agent_sources(&agent).err().unwrap();
        assert!(err.to_string().contains("core"));
    }
}
