//! Crew runtime
//!
//! A crew pairs one agent persona with one task template and runs it against
//! a set of template inputs. The research pipeline only sees the [`Crew`]
//! trait; [`LlmCrew`] is the configuration-driven implementation.
//!
//! # Templates
//!
//! Agent and task text may contain `{name}` placeholders which are filled
//! from [`CrewInputs`] at kickoff. Placeholders with no matching input are
//! left as written.

pub mod builder;
pub mod llm_crew;

pub use builder::CrewBuilder;
pub use llm_crew::{AgentSpec, LlmCrew, TaskSpec};

use crate::types::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// Input key carrying the research topic.
pub const TOPIC: &str = "topic";
/// Input key carrying the combined lane output handed to the reporter.
pub const RESEARCH_RESULTS: &str = "research_results";

/// An executable agent + task pairing.
#[async_trait]
pub trait Crew: Send + Sync {
    fn name(&self) -> &str;

    /// Run the crew to completion and return its final text output.
    async fn kickoff(&self, inputs: &CrewInputs) -> Result<String>;
}

/// Template variables passed to a crew.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrewInputs {
    values: HashMap<String, String>,
}

impl CrewInputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inputs for a research lane.
    pub fn for_topic(topic: impl Into<String>) -> Self {
        Self::new().with(TOPIC, topic)
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn topic(&self) -> Option<&str> {
        self.get(TOPIC)
    }
}

/// Replace `{name}` placeholders with values from `inputs`.
pub fn interpolate(template: &str, inputs: &CrewInputs) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let replacement = after.find('}').and_then(|close| {
            let key = &after[..close];
            if is_placeholder(key) {
                inputs.get(key).map(|value| (close, value))
            } else {
                None
            }
        });

        match replacement {
            Some((close, value)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

fn is_placeholder(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
