//! Shared helpers for integration tests.

pub mod mocks;

use aptos_research::AptosConfig;

/// Smallest configuration that passes validation: one lane and a reporter.
#[allow(dead_code)]
pub const MINIMAL_CONFIG: &str = r#"
[server]
host = "127.0.0.1"
port = 8007

[providers.local]
type = "ollama"
base_url = "http://127.0.0.1:11434"
default_model = "llama3.2"

[models.default]
provider = "local"
model = "llama3.2"

[sources.aptos_dev_docs]
type = "docs"
url = "https://aptos.dev/"

[agents.researcher]
role = "Aptos Dev Docs Researcher"
goal = "Research {topic}"
backstory = "Knows aptos.dev"
model = "default"
sources = ["aptos_dev_docs"]

[agents.writer]
role = "Reporting Analyst"
goal = "Report on {topic}"
backstory = "Careful writer"
model = "default"

[tasks.research]
description = "Research {topic}"
expected_output = "Findings"
agent = "researcher"

[tasks.report]
description = "Answer {topic} using:\n{research_results}"
expected_output = "An answer"
agent = "writer"

[research]
report_task = "report"
history_window = 2

[[research.lanes]]
label = "Aptos Dev Docs Research"
task = "research"

[suggestions]
questions = ["What are Move resources?", "How do I upgrade my Move modules?"]
"#;

#[allow(dead_code)]
pub fn minimal_config() -> AptosConfig {
    AptosConfig::parse(MINIMAL_CONFIG).expect("minimal config parses")
}
