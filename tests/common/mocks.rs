//! Mock implementations for testing.
//!
//! Crews, LLM clients and researchers that can be used across test files
//! without reaching any external service.

use aptos_research::crew::{Crew, CrewInputs, RESEARCH_RESULTS};
use aptos_research::llm::LLMClient;
use aptos_research::research::Researcher;
use aptos_research::types::{AppError, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Mock crew with a configurable delay, output and failure mode.
///
/// The output is `"{output} ({topic})"` so tests can check which topic a lane
/// received.
///
/// # Examples
///
/// ```ignore
/// let fast = MockCrew::new("fast", "done");
/// let slow = MockCrew::new("slow", "done").with_delay(Duration::from_millis(50));
/// let broken = MockCrew::failing("broken", "rate limited");
/// ```
#[derive(Clone)]
pub struct MockCrew {
    name: String,
    output: String,
    delay: Option<Duration>,
    failure: Option<String>,
    panics: bool,
    seen: Arc<Mutex<Vec<CrewInputs>>>,
}

#[allow(dead_code)]
impl MockCrew {
    pub fn new(name: &str, output: &str) -> Self {
        Self {
            name: name.to_string(),
            output: output.to_string(),
            delay: None,
            failure: None,
            panics: false,
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Always returns a research error with the given message.
    pub fn failing(name: &str, error: &str) -> Self {
        let mut crew = Self::new(name, "");
        crew.failure = Some(error.to_string());
        crew
    }

    /// Panics on kickoff.
    pub fn panicking(name: &str) -> Self {
        let mut crew = Self::new(name, "");
        crew.panics = true;
        crew
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every input set this crew was kicked off with.
    pub fn seen(&self) -> Vec<CrewInputs> {
        self.seen.lock().clone()
    }
}

#[async_trait]
impl Crew for MockCrew {
    fn name(&self) -> &str {
        &self.name
    }

    async fn kickoff(&self, inputs: &CrewInputs) -> Result<String> {
        self.seen.lock().push(inputs.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.panics {
            panic!("mock crew '{}' panicked", self.name);
        }
        if let Some(error) = &self.failure {
            return Err(AppError::Research(error.clone()));
        }

        Ok(format!(
            "{} ({})",
            self.output,
            inputs.topic().unwrap_or_default()
        ))
    }
}

/// Reporter that echoes the combined lane output it received.
pub struct EchoReporter;

#[async_trait]
impl Crew for EchoReporter {
    fn name(&self) -> &str {
        "echo_reporter"
    }

    async fn kickoff(&self, inputs: &CrewInputs) -> Result<String> {
        Ok(inputs.get(RESEARCH_RESULTS).unwrap_or_default().to_string())
    }
}

/// Mock LLM client for testing with configurable responses.
#[derive(Clone)]
pub struct MockLLMClient {
    response: String,
    should_fail: bool,
}

#[allow(dead_code)]
impl MockLLMClient {
    /// Create a new mock client that returns the given response.
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            should_fail: false,
        }
    }

    /// Create a mock client that always returns an error.
    pub fn failing() -> Self {
        Self {
            response: String::new(),
            should_fail: true,
        }
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        if self.should_fail {
            return Err(AppError::LLM("Mock LLM failure".to_string()));
        }
        Ok(self.response.clone())
    }

    async fn generate_with_system(&self, _system: &str, _prompt: &str) -> Result<String> {
        if self.should_fail {
            return Err(AppError::LLM("Mock LLM failure".to_string()));
        }
        Ok(self.response.clone())
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

/// Researcher that records every topic and answers `"Answer to: {question}"`,
/// where the question is the first line of the topic.
#[derive(Clone, Default)]
pub struct MockResearcher {
    topics: Arc<Mutex<Vec<String>>>,
    failure: Option<String>,
}

#[allow(dead_code)]
impl MockResearcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(error: &str) -> Self {
        Self {
            topics: Arc::default(),
            failure: Some(error.to_string()),
        }
    }

    pub fn topics(&self) -> Vec<String> {
        self.topics.lock().clone()
    }
}

#[async_trait]
impl Researcher for MockResearcher {
    async fn research(&self, topic: &str) -> Result<String> {
        self.topics.lock().push(topic.to_string());

        match &self.failure {
            Some(error) => Err(AppError::Research(error.clone())),
            None => Ok(format!(
                "Answer to: {}",
                topic.lines().next().unwrap_or_default()
            )),
        }
    }
}
