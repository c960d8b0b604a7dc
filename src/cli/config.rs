//! Config command implementation
//!
//! Prints a summary of a loaded `aptos.toml`, optionally in full, and reports
//! validation warnings.

use super::output::Output;
use crate::utils::toml_config::{AptosConfig, ProviderConfig, SourceConfig};
use std::path::Path;

/// Print the configuration summary
pub fn show(config: &AptosConfig, path: &Path, full: bool, output: &Output) {
    output.header("Configuration");
    output.kv("File", &path.display().to_string());
    output.kv(
        "Server",
        &format!("{}:{}", config.server.host, config.server.port),
    );
    output.kv("Log level", &config.server.log_level);
    output.kv(
        "Hot reload",
        if config.server.hot_reload {
            "enabled"
        } else {
            "disabled"
        },
    );

    output.subheader("Providers");
    for (name, provider) in sorted(&config.providers) {
        output.list_item(&format!("{} ({})", name, describe_provider(provider)));
    }

    output.subheader("Models");
    for (name, model) in sorted(&config.models) {
        output.list_item(&format!("{} -> {}/{}", name, model.provider, model.model));
    }

    output.subheader("Research lanes");
    output.table_header(&["Label", "Task", "Agent"]);
    for lane in &config.research.lanes {
        let agent = config
            .get_task(&lane.task)
            .map(|t| t.agent.as_str())
            .unwrap_or("?");
        output.table_row(&[lane.label.as_str(), lane.task.as_str(), agent]);
    }
    output.newline();
    output.kv("Report task", &config.research.report_task);
    output.kv("Policy", &format!("{:?}", config.research.policy));
    output.kv(
        "Lane timeout",
        &config
            .research
            .lane_timeout_secs
            .map(|s| format!("{}s", s))
            .unwrap_or_else(|| "none".to_string()),
    );
    output.kv("History window", &config.research.history_window.to_string());

    if !full {
        output.hint("Use --full to list sources, agents and tasks");
        return;
    }

    output.subheader("Sources");
    for (name, source) in sorted(&config.sources) {
        output.list_item(&format!("{} ({})", name, describe_source(source)));
    }

    output.subheader("Agents");
    for (name, agent) in sorted(&config.agents) {
        output.list_item(&format!("{}: {} [model: {}]", name, agent.role, agent.model));
        if !agent.sources.is_empty() {
            output.kv("sources", &agent.sources.join(", "));
        }
    }

    output.subheader("Tasks");
    for (name, task) in sorted(&config.tasks) {
        output.list_item(&format!("{} -> {}", name, task.agent));
        if let Some(file) = &task.output_file {
            output.kv("output_file", &file.display().to_string());
        }
    }

    output.subheader("Suggested questions");
    for question in &config.suggestions.questions {
        output.list_item(question);
    }
}

/// Validate and print warnings. Returns false when the configuration is invalid.
pub fn validate(config: &AptosConfig, output: &Output) -> bool {
    match config.validate_with_warnings() {
        Ok(warnings) if warnings.is_empty() => {
            output.success("Configuration is valid");
            true
        }
        Ok(warnings) => {
            output.success("Configuration is valid");
            for warning in &warnings {
                output.warning(&warning.to_string());
            }
            true
        }
        Err(e) => {
            output.error(&format!("Configuration is invalid: {}", e));
            false
        }
    }
}

fn describe_provider(provider: &ProviderConfig) -> String {
    match provider {
        ProviderConfig::Ollama {
            base_url,
            default_model,
        } => format!("ollama at {}, default {}", base_url, default_model),
        ProviderConfig::OpenAI {
            api_base,
            default_model,
            ..
        } => format!("openai at {}, default {}", api_base, default_model),
    }
}

fn describe_source(source: &SourceConfig) -> String {
    match source {
        SourceConfig::Github {
            repo,
            content_types,
            ..
        } => format!("github {} {:?}", repo, content_types),
        SourceConfig::Docs { url, .. } => format!("docs {}", url),
    }
}

fn sorted<V>(map: &std::collections::HashMap<String, V>) -> Vec<(&String, &V)> {
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries
}
