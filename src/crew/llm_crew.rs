//! LLM-backed crew: one agent persona, one task, optional sources.

use crate::crew::{interpolate, Crew, CrewInputs};
use crate::llm::LLMClient;
use crate::sources::Source;
use crate::types::Result;
use crate::utils::toml_config::{AgentConfig, TaskConfig};
use async_trait::async_trait;
use futures::future::join_all;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Agent persona as configured under `[agents.*]`.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentSpec {
    pub name: String,
    pub role: String,
    pub goal: String,
    pub backstory: String,
    pub model: String,
    pub sources: Vec<String>,
}

impl AgentSpec {
    pub fn from_config(name: &str, config: &AgentConfig) -> Self {
        Self {
            name: name.to_string(),
            role: config.role.clone(),
            goal: config.goal.clone(),
            backstory: config.backstory.clone(),
            model: config.model.clone(),
            sources: config.sources.clone(),
        }
    }

    /// Persona prompt with placeholders filled in.
    pub fn system_prompt(&self, inputs: &CrewInputs) -> String {
        format!(
            "You are {}.\n{}\n\nYour personal goal is: {}",
            interpolate(&self.role, inputs).trim(),
            interpolate(&self.backstory, inputs).trim(),
            interpolate(&self.goal, inputs).trim()
        )
    }
}

/// Task template as configured under `[tasks.*]`.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskSpec {
    pub name: String,
    pub description: String,
    pub expected_output: String,
    pub agent: String,
    pub output_file: Option<PathBuf>,
}

impl TaskSpec {
    pub fn from_config(name: &str, config: &TaskConfig) -> Self {
        Self {
            name: name.to_string(),
            description: config.description.clone(),
            expected_output: config.expected_output.clone(),
            agent: config.agent.clone(),
            output_file: config.output_file.clone(),
        }
    }
}

pub struct LlmCrew {
    name: String,
    agent: AgentSpec,
    task: TaskSpec,
    llm: Arc<dyn LLMClient>,
    sources: Vec<Arc<dyn Source>>,
}

impl LlmCrew {
    pub fn new(
        name: impl Into<String>,
        agent: AgentSpec,
        task: TaskSpec,
        llm: Arc<dyn LLMClient>,
    ) -> Self {
        Self {
            name: name.into(),
            agent,
            task,
            llm,
            sources: Vec::new(),
        }
    }

    pub fn with_sources(mut self, sources: Vec<Arc<dyn Source>>) -> Self {
        self.sources = sources;
        self
    }

    pub fn agent(&self) -> &AgentSpec {
        &self.agent
    }

    pub fn task(&self) -> &TaskSpec {
        &self.task
    }

    /// Query every source concurrently. Failures are noted inline, not returned.
    async fn gather_reference(&self, query: &str) -> String {
        let searches = self.sources.iter().map(|source| async move {
            match source.search(query).await {
                Ok(text) => format!("### Source: {}\n{}", source.name(), text),
                Err(e) => {
                    tracing::warn!(
                        crew = %self.name,
                        source = %source.name(),
                        "Source search failed: {}",
                        e
                    );
                    format!("### Source: {}\n[source unavailable: {}]", source.name(), e)
                }
            }
        });

        join_all(searches).await.join("\n\n")
    }

    fn task_prompt(&self, inputs: &CrewInputs, reference: &str) -> String {
        let mut prompt = format!(
            "{}\n\nThis is the expected criteria for your final answer: {}",
            interpolate(&self.task.description, inputs).trim(),
            interpolate(&self.task.expected_output, inputs).trim()
        );

        if !reference.is_empty() {
            prompt.push_str("\n\nReference material:\n");
            prompt.push_str(reference);
        }

        prompt
    }

    async fn write_output(&self, path: &Path, output: &str) {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                tracing::warn!(crew = %self.name, "Failed to create {:?}: {}", parent, e);
                return;
            }
        }

        if let Err(e) = tokio::fs::write(path, output).await {
            tracing::warn!(crew = %self.name, "Failed to write output to {:?}: {}", path, e);
        }
    }
}

/// Sources are searched with the question line only; follow-up context stays in the prompt.
fn search_query<'a>(inputs: &'a CrewInputs, description: &'a str) -> &'a str {
    inputs
        .topic()
        .and_then(|topic| topic.lines().map(str::trim).find(|line| !line.is_empty()))
        .unwrap_or(description)
}

#[async_trait]
impl Crew for LlmCrew {
    fn name(&self) -> &str {
        &self.name
    }

    async fn kickoff(&self, inputs: &CrewInputs) -> Result<String> {
        let reference = if self.sources.is_empty() {
            String::new()
        } else {
            let description = interpolate(&self.task.description, inputs);
            self.gather_reference(&search_query(inputs, &description))
                .await
        };

        let system = self.agent.system_prompt(inputs);
        let prompt = self.task_prompt(inputs, &reference);

        tracing::debug!(
            crew = %self.name,
            model = %self.llm.model_name(),
            "Running task '{}'",
            self.task.name
        );

        let output = self.llm.generate_with_system(&system, &prompt).await?;

        if let Some(path) = &self.task.output_file {
            self.write_output(path, &output).await;
        }

        Ok(output)
    }
}
