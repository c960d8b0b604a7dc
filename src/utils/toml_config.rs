//! TOML-based configuration for the research server
//!
//! This module provides declarative configuration for LLM providers, models,
//! search sources, agents, tasks and the research fan-out via a TOML file
//! (`aptos.toml`). The file is validated once at load time so that every
//! name referenced by a lane, task or agent is known to resolve.
//!
//! # Hot Reloading
//!
//! Configuration changes can be picked up at runtime when `server.hot_reload`
//! is enabled. Use `AptosConfigManager` for thread-safe access to the current
//! configuration.

use crate::research::coordinator::FanOutPolicy;
use arc_swap::ArcSwap;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Root configuration structure loaded from aptos.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AptosConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// Named LLM provider configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    /// Named model configurations that reference providers
    #[serde(default)]
    pub models: HashMap<String, ModelConfig>,

    /// Named search sources agents can draw reference material from
    #[serde(default)]
    pub sources: HashMap<String, SourceConfig>,

    /// Agent personas
    #[serde(default)]
    pub agents: HashMap<String, AgentConfig>,

    /// Task templates assigned to agents
    #[serde(default)]
    pub tasks: HashMap<String, TaskConfig>,

    /// Fan-out lanes and the reporting step
    pub research: ResearchConfig,

    /// Static suggested follow-up questions
    #[serde(default)]
    pub suggestions: SuggestionsConfig,
}

// ============= Server Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Upper bound on accepted request bodies
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Watch the configuration file and swap in valid changes
    #[serde(default)]
    pub hot_reload: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8007
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_body_bytes() -> usize {
    64 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            max_body_bytes: default_max_body_bytes(),
            hot_reload: false,
        }
    }
}

// ============= Provider Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    Ollama {
        #[serde(default = "default_ollama_url")]
        base_url: String,
        default_model: String,
    },
    OpenAI {
        /// Environment variable name containing the API key
        api_key_env: String,
        #[serde(default = "default_openai_base")]
        api_base: String,
        default_model: String,
    },
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_openai_base() -> String {
    "https://api.openai.com/v1".to_string()
}

// ============= Model Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Reference to a provider name defined in [providers]
    pub provider: String,

    /// Model name/identifier to use with the provider
    pub model: String,
}

// ============= Source Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceConfig {
    /// Search a single GitHub repository
    Github {
        /// `owner/name`
        repo: String,
        /// Environment variable holding a GitHub token
        #[serde(default)]
        token_env: Option<String>,
        #[serde(default = "default_content_types")]
        content_types: Vec<GithubContentType>,
        #[serde(default = "default_max_results")]
        max_results: usize,
        #[serde(default = "default_github_api")]
        api_base: String,
    },
    /// Search a documentation site
    Docs {
        url: String,
        #[serde(default = "default_max_pages")]
        max_pages: usize,
        #[serde(default = "default_max_chars")]
        max_chars: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GithubContentType {
    Code,
    Issue,
}

fn default_content_types() -> Vec<GithubContentType> {
    vec![GithubContentType::Code, GithubContentType::Issue]
}

fn default_max_results() -> usize {
    5
}

fn default_github_api() -> String {
    "https://api.github.com".to_string()
}

fn default_max_pages() -> usize {
    3
}

fn default_max_chars() -> usize {
    6000
}

// ============= Agent & Task Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    pub role: String,
    pub goal: String,
    pub backstory: String,

    /// Reference to a model name defined in [models]
    pub model: String,

    /// Source names this agent may consult
    #[serde(default)]
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskConfig {
    pub description: String,
    pub expected_output: String,

    /// Reference to an agent name defined in [agents]
    pub agent: String,

    /// Also write the task output to this file
    #[serde(default)]
    pub output_file: Option<PathBuf>,
}

// ============= Research Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchConfig {
    /// Lanes in the order their results are combined
    pub lanes: Vec<LaneConfig>,

    /// Task run over the combined lane output
    pub report_task: String,

    #[serde(default)]
    pub policy: FanOutPolicy,

    /// Per-lane time limit; unset means lanes may run indefinitely
    #[serde(default)]
    pub lane_timeout_secs: Option<u64>,

    /// Number of prior turns passed as context on follow-up questions
    #[serde(default = "default_history_window")]
    pub history_window: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaneConfig {
    pub label: String,
    pub task: String,
}

fn default_history_window() -> usize {
    10
}

// ============= Suggestions =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionsConfig {
    #[serde(default = "default_suggested_questions")]
    pub questions: Vec<String>,
}

fn default_suggested_questions() -> Vec<String> {
    [
        "How do I deploy a Move module?",
        "What are Move resources?",
        "How do I test Move contracts?",
        "How do I integrate Aptos wallet?",
        "What are the best practices for Move development?",
        "How do I handle errors in Move?",
        "What are the gas fee considerations in Aptos?",
        "How do I upgrade my Move modules?",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Default for SuggestionsConfig {
    fn default() -> Self {
        Self {
            questions: default_suggested_questions(),
        }
    }
}

// ============= Configuration Loading & Validation =============

/// Configuration warnings that don't prevent operation but may indicate issues
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub kind: ConfigWarningKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigWarningKind {
    UnusedProvider,
    UnusedModel,
    UnusedSource,
    UnusedAgent,
    UnusedTask,
    MissingToken,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),

    #[error("Provider '{0}' referenced by model '{1}' does not exist")]
    MissingProvider(String, String),

    #[error("Model '{0}' referenced by agent '{1}' does not exist")]
    MissingModel(String, String),

    #[error("Source '{0}' referenced by agent '{1}' does not exist")]
    MissingSource(String, String),

    #[error("Agent '{0}' referenced by task '{1}' does not exist")]
    MissingAgent(String, String),

    #[error("Task '{0}' referenced by {1} does not exist")]
    MissingTask(String, String),

    #[error("Watch error: {0}")]
    WatchError(#[from] notify::Error),
}

impl AptosConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: AptosConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration for internal consistency and env var availability
    pub fn validate(&self) -> Result<(), ConfigError> {
        for provider in self.providers.values() {
            if let ProviderConfig::OpenAI { api_key_env, .. } = provider {
                self.validate_env_var(api_key_env)?;
            }
        }

        for (name, source) in &self.sources {
            match source {
                SourceConfig::Github {
                    repo,
                    content_types,
                    ..
                } => {
                    if repo.split('/').filter(|s| !s.is_empty()).count() != 2 {
                        return Err(ConfigError::ValidationError(format!(
                            "Source '{}' must name a repository as 'owner/name', got '{}'",
                            name, repo
                        )));
                    }
                    if content_types.is_empty() {
                        return Err(ConfigError::ValidationError(format!(
                            "Source '{}' must search at least one content type",
                            name
                        )));
                    }
                }
                SourceConfig::Docs { url, .. } => {
                    if reqwest::Url::parse(url).is_err() {
                        return Err(ConfigError::ValidationError(format!(
                            "Source '{}' has an invalid docs url: {}",
                            name, url
                        )));
                    }
                }
            }
        }

        // Validate model -> provider references
        for (model_name, model_config) in &self.models {
            if !self.providers.contains_key(&model_config.provider) {
                return Err(ConfigError::MissingProvider(
                    model_config.provider.clone(),
                    model_name.clone(),
                ));
            }
        }

        // Validate agent -> model and agent -> source references
        for (agent_name, agent_config) in &self.agents {
            if !self.models.contains_key(&agent_config.model) {
                return Err(ConfigError::MissingModel(
                    agent_config.model.clone(),
                    agent_name.clone(),
                ));
            }

            for source_name in &agent_config.sources {
                if !self.sources.contains_key(source_name) {
                    return Err(ConfigError::MissingSource(
                        source_name.clone(),
                        agent_name.clone(),
                    ));
                }
            }
        }

        // Validate task -> agent references
        for (task_name, task_config) in &self.tasks {
            if !self.agents.contains_key(&task_config.agent) {
                return Err(ConfigError::MissingAgent(
                    task_config.agent.clone(),
                    task_name.clone(),
                ));
            }
        }

        self.validate_research()
    }

    fn validate_research(&self) -> Result<(), ConfigError> {
        let research = &self.research;

        if research.lanes.is_empty() {
            return Err(ConfigError::ValidationError(
                "research.lanes must define at least one lane".to_string(),
            ));
        }

        let mut labels = HashSet::new();
        for lane in &research.lanes {
            if lane.label.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "research lane labels must not be empty".to_string(),
                ));
            }
            if !labels.insert(lane.label.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "Duplicate research lane label '{}'",
                    lane.label
                )));
            }
            if !self.tasks.contains_key(&lane.task) {
                return Err(ConfigError::MissingTask(
                    lane.task.clone(),
                    format!("lane '{}'", lane.label),
                ));
            }
        }

        if !self.tasks.contains_key(&research.report_task) {
            return Err(ConfigError::MissingTask(
                research.report_task.clone(),
                "research.report_task".to_string(),
            ));
        }

        if research.lane_timeout_secs == Some(0) {
            return Err(ConfigError::ValidationError(
                "research.lane_timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Validate configuration with warnings for unused items
    ///
    /// Returns Ok with warnings, or Err if validation fails
    pub fn validate_with_warnings(&self) -> Result<Vec<ConfigWarning>, ConfigError> {
        self.validate()?;

        let mut warnings = Vec::new();
        warnings.extend(self.check_unused_providers());
        warnings.extend(self.check_unused_models());
        warnings.extend(self.check_unused_sources());
        warnings.extend(self.check_unused_agents());
        warnings.extend(self.check_unused_tasks());
        warnings.extend(self.check_missing_tokens());

        Ok(warnings)
    }

    fn check_unused_providers(&self) -> Vec<ConfigWarning> {
        let referenced: HashSet<_> = self.models.values().map(|m| m.provider.as_str()).collect();

        self.providers
            .keys()
            .filter(|name| !referenced.contains(name.as_str()))
            .map(|name| ConfigWarning {
                kind: ConfigWarningKind::UnusedProvider,
                message: format!(
                    "Provider '{}' is defined but not referenced by any model",
                    name
                ),
            })
            .collect()
    }

    fn check_unused_models(&self) -> Vec<ConfigWarning> {
        let referenced: HashSet<_> = self.agents.values().map(|a| a.model.as_str()).collect();

        self.models
            .keys()
            .filter(|name| !referenced.contains(name.as_str()))
            .map(|name| ConfigWarning {
                kind: ConfigWarningKind::UnusedModel,
                message: format!(
                    "Model '{}' is defined but not referenced by any agent",
                    name
                ),
            })
            .collect()
    }

    fn check_unused_sources(&self) -> Vec<ConfigWarning> {
        let referenced: HashSet<_> = self
            .agents
            .values()
            .flat_map(|a| a.sources.iter().map(|s| s.as_str()))
            .collect();

        self.sources
            .keys()
            .filter(|name| !referenced.contains(name.as_str()))
            .map(|name| ConfigWarning {
                kind: ConfigWarningKind::UnusedSource,
                message: format!(
                    "Source '{}' is defined but not referenced by any agent",
                    name
                ),
            })
            .collect()
    }

    fn check_unused_agents(&self) -> Vec<ConfigWarning> {
        let referenced: HashSet<_> = self.tasks.values().map(|t| t.agent.as_str()).collect();

        self.agents
            .keys()
            .filter(|name| !referenced.contains(name.as_str()))
            .map(|name| ConfigWarning {
                kind: ConfigWarningKind::UnusedAgent,
                message: format!("Agent '{}' is defined but not assigned any task", name),
            })
            .collect()
    }

    fn check_unused_tasks(&self) -> Vec<ConfigWarning> {
        let mut referenced: HashSet<&str> = self
            .research
            .lanes
            .iter()
            .map(|l| l.task.as_str())
            .collect();
        referenced.insert(self.research.report_task.as_str());

        self.tasks
            .keys()
            .filter(|name| !referenced.contains(name.as_str()))
            .map(|name| ConfigWarning {
                kind: ConfigWarningKind::UnusedTask,
                message: format!("Task '{}' is defined but not used by the research pipeline", name),
            })
            .collect()
    }

    /// GitHub sources fall back to unauthenticated requests without a token.
    fn check_missing_tokens(&self) -> Vec<ConfigWarning> {
        self.sources
            .iter()
            .filter_map(|(name, source)| match source {
                SourceConfig::Github {
                    token_env: Some(env),
                    ..
                } if self.resolve_env(env).is_none() => Some(ConfigWarning {
                    kind: ConfigWarningKind::MissingToken,
                    message: format!(
                        "Source '{}' reads its token from '{}', which is not set; \
                         requests will be unauthenticated",
                        name, env
                    ),
                }),
                _ => None,
            })
            .collect()
    }

    fn validate_env_var(&self, name: &str) -> Result<(), ConfigError> {
        std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))?;
        Ok(())
    }

    /// Get a resolved value from an env var reference
    pub fn resolve_env(&self, env_name: &str) -> Option<String> {
        std::env::var(env_name).ok()
    }

    pub fn get_provider(&self, name: &str) -> Option<&ProviderConfig> {
        self.providers.get(name)
    }

    pub fn get_model(&self, name: &str) -> Option<&ModelConfig> {
        self.models.get(name)
    }

    pub fn get_source(&self, name: &str) -> Option<&SourceConfig> {
        self.sources.get(name)
    }

    pub fn get_agent(&self, name: &str) -> Option<&AgentConfig> {
        self.agents.get(name)
    }

    pub fn get_task(&self, name: &str) -> Option<&TaskConfig> {
        self.tasks.get(name)
    }

    /// Per-lane timeout as a `Duration`, if configured
    pub fn lane_timeout(&self) -> Option<Duration> {
        self.research.lane_timeout_secs.map(Duration::from_secs)
    }
}

// ============= Hot Reloading Configuration Manager =============

const RELOAD_DEBOUNCE: Duration = Duration::from_millis(500);

/// Thread-safe configuration manager with hot reloading support
pub struct AptosConfigManager {
    config: Arc<ArcSwap<AptosConfig>>,
    config_path: PathBuf,
    watcher: RwLock<Option<RecommendedWatcher>>,
}

impl AptosConfigManager {
    /// Create a new configuration manager and load the initial config
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        // Convert to absolute path for reliable file watching
        let path = path.as_ref();
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(ConfigError::ReadError)?
                .join(path)
        };

        let config = AptosConfig::load(&path)?;

        Ok(Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            config_path: path,
            watcher: RwLock::new(None),
        })
    }

    /// Create a config manager directly from a config (useful for testing)
    /// This won't have file watching capabilities.
    pub fn from_config(config: AptosConfig) -> Self {
        Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            config_path: PathBuf::from("test-config.toml"),
            watcher: RwLock::new(None),
        }
    }

    /// Get the current configuration (lockless read)
    pub fn config(&self) -> Arc<AptosConfig> {
        self.config.load_full()
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Manually reload the configuration from disk
    pub fn reload(&self) -> Result<(), ConfigError> {
        info!("Reloading configuration from {:?}", self.config_path);

        let new_config = AptosConfig::load(&self.config_path)?;
        self.config.store(Arc::new(new_config));

        info!("Configuration reloaded successfully");
        Ok(())
    }

    /// Start watching for configuration file changes
    pub fn start_watching(&mut self) -> Result<(), ConfigError> {
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();

        let config_path = self.config_path.clone();
        let config_arc = Arc::clone(&self.config);
        let file_name = config_path.file_name().map(|n| n.to_os_string());

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                Ok(event) => {
                    let touches_config = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                    if touches_config && (event.kind.is_modify() || event.kind.is_create()) {
                        // Send reload signal (debounced in the receiver)
                        let _ = tx.send(());
                    }
                }
                Err(e) => {
                    error!("Config watcher error: {:?}", e);
                }
            }
        })?;

        // Watch the config file's parent directory; editors often replace the file
        if let Some(parent) = self.config_path.parent() {
            watcher.watch(parent, RecursiveMode::NonRecursive)?;
        }

        *self.watcher.write() = Some(watcher);

        tokio::spawn(async move {
            while rx.recv().await.is_some() {
                // Reload once the file has been quiet for the whole window,
                // so the last write of a burst is always picked up.
                loop {
                    match tokio::time::timeout(RELOAD_DEBOUNCE, rx.recv()).await {
                        Ok(Some(())) => continue,
                        Ok(None) | Err(_) => break,
                    }
                }

                match AptosConfig::load(&config_path) {
                    Ok(new_config) => {
                        config_arc.store(Arc::new(new_config));
                        info!("Configuration hot-reloaded successfully");
                    }
                    Err(e) => {
                        warn!(
                            "Failed to hot-reload config: {}. Keeping previous config.",
                            e
                        );
                    }
                }
            }
        });

        info!("Configuration hot-reload watcher started");
        Ok(())
    }
}

impl Clone for AptosConfigManager {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            config_path: self.config_path.clone(),
            watcher: RwLock::new(None), // Watcher is not cloned
        }
    }
}
