//! Init command implementation
//!
//! Writes a starter `aptos.toml` with the five shipped research lanes, plus
//! `.env.example` and `.gitignore`.

use super::output::Output;
use super::InitProvider;
use std::fs;
use std::path::{Path, PathBuf};

/// Sources, agents, tasks, lanes and suggestions shared by every generated config.
const RESEARCH_SECTIONS: &str = include_str!("templates/research.toml");

/// Result of the init operation
#[derive(Debug, PartialEq, Eq)]
pub enum InitResult {
    Success,
    /// aptos.toml exists and `--force` was not given
    AlreadyExists,
    Error(String),
}

/// Configuration for the init command
pub struct InitConfig {
    pub path: PathBuf,
    pub force: bool,
    pub provider: InitProvider,
    pub host: String,
    pub port: u16,
}

/// Run the init command
pub fn run(config: InitConfig, output: &Output) -> InitResult {
    output.banner();
    output.header("Initializing research server configuration");

    let base_path = &config.path;
    if let Err(e) = fs::create_dir_all(base_path) {
        output.error(&format!("Failed to create {}: {}", base_path.display(), e));
        return InitResult::Error(e.to_string());
    }

    let config_path = base_path.join("aptos.toml");
    if config_path.exists() && !config.force {
        output.warning("aptos.toml already exists!");
        output.hint("Use --force to overwrite existing files");
        return InitResult::AlreadyExists;
    }

    output.subheader("Creating configuration files");

    if let Err(e) = write_file(&config_path, &generate_aptos_toml(&config), config.force) {
        output.error(&format!("Failed to create aptos.toml: {}", e));
        return InitResult::Error(e.to_string());
    }
    output.created("config", "aptos.toml");

    let env_example_path = base_path.join(".env.example");
    if env_example_path.exists() && !config.force {
        output.skipped(".env.example", "already exists");
    } else if let Err(e) = write_file(&env_example_path, &generate_env_example(), config.force) {
        output.error(&format!("Failed to create .env.example: {}", e));
        return InitResult::Error(e.to_string());
    } else {
        output.created("env", ".env.example");
    }

    let gitignore_path = base_path.join(".gitignore");
    if !gitignore_path.exists() {
        if let Err(e) = write_file(&gitignore_path, &generate_gitignore(), false) {
            output.warning(&format!("Failed to create .gitignore: {}", e));
        } else {
            output.created("file", ".gitignore");
        }
    }

    output.complete("Configuration written");

    output.header("Next Steps");
    output.newline();
    output.info("1. Set up environment variables:");
    output.command("cp .env.example .env");
    output.command("# Edit .env and set GITHUB_TOKEN for GitHub code search");
    output.newline();

    if config.provider != InitProvider::Openai {
        output.info("2. Start Ollama (if not running):");
        output.command("ollama serve");
        output.command("ollama pull llama3.2");
        output.newline();
    }

    output.info("3. Start the server:");
    output.command("aptos-research");
    output.newline();

    output.hint(&format!(
        "Server will be available at http://{}:{}",
        config.host, config.port
    ));

    InitResult::Success
}

fn write_file(path: &Path, content: &str, force: bool) -> std::io::Result<()> {
    if path.exists() && !force {
        return Ok(());
    }
    fs::write(path, content)
}

fn generate_aptos_toml(config: &InitConfig) -> String {
    let provider_section = match config.provider {
        InitProvider::Ollama => {
            r#"# Ollama - Local inference (no API key required)
[providers.ollama-local]
type = "ollama"
base_url = "http://localhost:11434"
default_model = "llama3.2"
"#
        }
        InitProvider::Openai => {
            r#"# OpenAI API (set OPENAI_API_KEY in .env)
[providers.openai]
type = "openai"
api_key_env = "OPENAI_API_KEY"
api_base = "https://api.openai.com/v1"
default_model = "gpt-4o-mini"
"#
        }
        InitProvider::Both => {
            r#"# Ollama - Local inference (default)
[providers.ollama-local]
type = "ollama"
base_url = "http://localhost:11434"
default_model = "llama3.2"

# OpenAI API (set OPENAI_API_KEY in .env)
[providers.openai]
type = "openai"
api_key_env = "OPENAI_API_KEY"
api_base = "https://api.openai.com/v1"
default_model = "gpt-4o-mini"
"#
        }
    };

    let (model_provider, model_name) = match config.provider {
        InitProvider::Openai => ("openai", "gpt-4o-mini"),
        InitProvider::Ollama | InitProvider::Both => ("ollama-local", "llama3.2"),
    };

    format!(
        r#"# Aptos Research Server configuration
# Generated by `aptos-research init`

[server]
host = "{host}"
port = {port}
log_level = "info"
log_format = "text"
hot_reload = false

# =============================================================================
# LLM providers and models
# =============================================================================

{provider_section}
[models.default]
provider = "{model_provider}"
model = "{model_name}"

{research_sections}"#,
        host = config.host,
        port = config.port,
        provider_section = provider_section,
        model_provider = model_provider,
        model_name = model_name,
        research_sections = RESEARCH_SECTIONS,
    )
}

fn generate_env_example() -> String {
    r#"# Aptos Research Server environment variables
# Copy this file to .env and fill in the values.

# Optional: Logging filter, overrides server.log_level
RUST_LOG=info,aptos_research=debug

# Recommended: GitHub token for code and issue search
# GITHUB_TOKEN=ghp_...

# Required when using the OpenAI provider
# OPENAI_API_KEY=sk-...
"#
    .to_string()
}

fn generate_gitignore() -> String {
    r#"# Environment
.env
.env.local

# Generated reports
report.md

# Rust
/target/
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::toml_config::AptosConfig;
    use tempfile::TempDir;

    fn create_test_config(temp_dir: &TempDir, provider: InitProvider) -> InitConfig {
        InitConfig {
            path: temp_dir.path().to_path_buf(),
            force: false,
            provider,
            host: "127.0.0.1".to_string(),
            port: 8007,
        }
    }

    #[test]
    fn test_generated_ollama_config_is_valid() {
        let temp_dir = TempDir::new().unwrap();
        let content = generate_aptos_toml(&create_test_config(&temp_dir, InitProvider::Ollama));

        assert!(content.contains("host = \"127.0.0.1\""));
        assert!(content.contains("[providers.ollama-local]"));

        let config = AptosConfig::parse(&content).unwrap();
        assert_eq!(config.research.lanes.len(), 5);
        assert_eq!(config.research.lanes[0].label, "Aptos Core Research");
        assert_eq!(config.research.lanes[4].label, "Aptos Dev Docs Research");
        assert_eq!(config.suggestions.questions.len(), 8);
    }

    #[test]
    fn test_generated_openai_config_references_key_env() {
        let temp_dir = TempDir::new().unwrap();
        let content = generate_aptos_toml(&create_test_config(&temp_dir, InitProvider::Openai));

        assert!(content.contains("api_key_env = \"OPENAI_API_KEY\""));
        assert!(content.contains("provider = \"openai\""));
        assert!(!content.contains("[providers.ollama-local]"));
    }

    #[test]
    fn test_generated_both_config_defaults_to_ollama() {
        let temp_dir = TempDir::new().unwrap();
        let content = generate_aptos_toml(&create_test_config(&temp_dir, InitProvider::Both));

        assert!(content.contains("[providers.openai]"));
        assert!(content.contains("provider = \"ollama-local\""));
    }

    #[test]
    fn test_write_file_skips_existing_without_force() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("existing.txt");
        fs::write(&path, "original").unwrap();

        write_file(&path, "new content", false).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "original");

        write_file(&path, "new content", true).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new content");
    }

    #[test]
    fn test_run_creates_all_files() {
        let temp_dir = TempDir::new().unwrap();
        let config = create_test_config(&temp_dir, InitProvider::Ollama);

        let result = run(config, &Output::no_color());

        assert_eq!(result, InitResult::Success);
        assert!(temp_dir.path().join("aptos.toml").exists());
        assert!(temp_dir.path().join(".env.example").exists());
        assert!(temp_dir.path().join(".gitignore").exists());
    }

    #[test]
    fn test_run_already_exists_without_force() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("aptos.toml"), "# existing").unwrap();

        let result = run(
            create_test_config(&temp_dir, InitProvider::Ollama),
            &Output::no_color(),
        );

        assert_eq!(result, InitResult::AlreadyExists);
        assert_eq!(
            fs::read_to_string(temp_dir.path().join("aptos.toml")).unwrap(),
            "# existing"
        );
    }

    #[test]
    fn test_run_force_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("aptos.toml"), "# existing").unwrap();

        let mut config = create_test_config(&temp_dir, InitProvider::Ollama);
        config.force = true;

        assert_eq!(run(config, &Output::no_color()), InitResult::Success);
        let content = fs::read_to_string(temp_dir.path().join("aptos.toml")).unwrap();
        assert!(content.contains("[research]"));
    }
}
