//! Loading, validating and reloading aptos.toml.

mod common;

use aptos_research::utils::toml_config::{
    AptosConfig, AptosConfigManager, ConfigError, ConfigWarningKind, LogFormat,
};
use aptos_research::FanOutPolicy;
use rstest::rstest;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("aptos.toml");
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_minimal_config_defaults() {
    let config = common::minimal_config();

    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 8007);
    assert_eq!(config.server.log_format, LogFormat::Text);
    assert!(!config.server.hot_reload);
    assert_eq!(config.research.policy, FanOutPolicy::AllOrNothing);
    assert_eq!(config.research.history_window, 2);
    assert_eq!(config.lane_timeout(), None);
}

#[test]
fn test_lane_timeout_and_policy_parse() {
    let content = common::MINIMAL_CONFIG.replace(
        "history_window = 2",
        "history_window = 2\npolicy = \"partial\"\nlane_timeout_secs = 120",
    );
    let config = AptosConfig::parse(&content).unwrap();

    assert_eq!(config.research.policy, FanOutPolicy::Partial);
    assert_eq!(config.lane_timeout(), Some(Duration::from_secs(120)));
}

#[test]
fn test_suggestions_default_when_omitted() {
    let content = common::MINIMAL_CONFIG
        .split("[suggestions]")
        .next()
        .unwrap()
        .to_string();
    let config = AptosConfig::parse(&content).unwrap();

    assert_eq!(config.suggestions.questions.len(), 8);
    assert_eq!(
        config.suggestions.questions[0],
        "How do I deploy a Move module?"
    );
}

#[rstest]
#[case::unknown_model("model = \"default\"\nsources", "model = \"missing\"\nsources")]
#[case::unknown_source("sources = [\"aptos_dev_docs\"]", "sources = [\"nope\"]")]
#[case::unknown_agent("agent = \"researcher\"", "agent = \"ghost\"")]
#[case::unknown_report_task("report_task = \"report\"", "report_task = \"ghost\"")]
#[case::unknown_lane_task("task = \"research\"", "task = \"ghost\"")]
#[case::unknown_provider("provider = \"local\"", "provider = \"ghost\"")]
#[case::bad_docs_url("url = \"https://aptos.dev/\"", "url = \"not a url\"")]
#[case::zero_timeout("history_window = 2", "history_window = 2\nlane_timeout_secs = 0")]
#[case::empty_lane_label(
    "label = \"Aptos Dev Docs Research\"",
    "label = \"  \""
)]
fn test_invalid_configs_rejected(#[case] from: &str, #[case] to: &str) {
    assert!(
        common::MINIMAL_CONFIG.contains(from),
        "fixture does not contain {:?}",
        from
    );
    let content = common::MINIMAL_CONFIG.replacen(from, to, 1);

    assert!(AptosConfig::parse(&content).is_err());
}

#[test]
fn test_duplicate_lane_labels_rejected() {
    let content = format!(
        "{}\n[[research.lanes]]\nlabel = \"Aptos Dev Docs Research\"\ntask = \"research\"\n",
        common::MINIMAL_CONFIG.split("[suggestions]").next().unwrap()
    );

    assert!(matches!(
        AptosConfig::parse(&content),
        Err(ConfigError::ValidationError(_))
    ));
}

#[test]
fn test_missing_research_section_is_parse_error() {
    let content = common::MINIMAL_CONFIG
        .split("[research]")
        .next()
        .unwrap()
        .to_string();

    assert!(matches!(
        AptosConfig::parse(&content),
        Err(ConfigError::ParseError(_))
    ));
}

#[test]
fn test_github_repo_must_be_owner_slash_name() {
    let content = common::MINIMAL_CONFIG.replace(
        "[agents.researcher]",
        "[sources.bad]\ntype = \"github\"\nrepo = \"aptos-core\"\n\n[agents.researcher]",
    );

    assert!(matches!(
        AptosConfig::parse(&content),
        Err(ConfigError::ValidationError(_))
    ));
}

#[test]
fn test_missing_github_token_is_a_warning() {
    let content = common::MINIMAL_CONFIG
        .replace(
            "[agents.researcher]",
            "[sources.core]\ntype = \"github\"\nrepo = \"aptos-labs/aptos-core\"\n\
             token_env = \"APTOS_RESEARCH_TEST_UNSET_GITHUB_TOKEN\"\n\n[agents.researcher]",
        )
        .replace("sources = [\"aptos_dev_docs\"]", "sources = [\"aptos_dev_docs\", \"core\"]");

    let config = AptosConfig::parse(&content).unwrap();
    let warnings = config.validate_with_warnings().unwrap();

    assert!(warnings
        .iter()
        .any(|w| w.kind == ConfigWarningKind::MissingToken));
}

#[test]
fn test_unused_agent_warning() {
    let content = common::MINIMAL_CONFIG.replace(
        "[tasks.research]",
        "[agents.idle]\nrole = \"Idle\"\ngoal = \"Nothing\"\nbackstory = \"None\"\nmodel = \"default\"\n\n[tasks.research]",
    );

    let warnings = AptosConfig::parse(&content)
        .unwrap()
        .validate_with_warnings()
        .unwrap();

    assert!(warnings
        .iter()
        .any(|w| w.kind == ConfigWarningKind::UnusedAgent && w.message.contains("idle")));
}

// ============= File Loading =============

#[test]
fn test_load_missing_file() {
    let dir = TempDir::new().unwrap();

    assert!(matches!(
        AptosConfig::load(dir.path().join("absent.toml")),
        Err(ConfigError::FileNotFound(_))
    ));
}

#[test]
fn test_manager_loads_and_reloads() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, common::MINIMAL_CONFIG);

    let manager = AptosConfigManager::new(&path).unwrap();
    assert_eq!(manager.config().server.port, 8007);
    assert_eq!(manager.config_path(), path.as_path());

    write_config(
        &dir,
        &common::MINIMAL_CONFIG.replace("port = 8007", "port = 9000"),
    );
    manager.reload().unwrap();

    assert_eq!(manager.config().server.port, 9000);
}

#[test]
fn test_reload_keeps_previous_config_on_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, common::MINIMAL_CONFIG);
    let manager = AptosConfigManager::new(&path).unwrap();

    write_config(&dir, "this is = not [valid");
    assert!(manager.reload().is_err());

    assert_eq!(manager.config().research.lanes.len(), 1);
}

#[test]
fn test_snapshots_survive_reload() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, common::MINIMAL_CONFIG);
    let manager = AptosConfigManager::new(&path).unwrap();

    let before = manager.config();
    write_config(
        &dir,
        &common::MINIMAL_CONFIG.replace("history_window = 2", "history_window = 7"),
    );
    manager.reload().unwrap();

    assert_eq!(before.research.history_window, 2);
    assert_eq!(manager.config().research.history_window, 7);
}

#[tokio::test]
async fn test_watcher_picks_up_last_of_quick_edits() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, common::MINIMAL_CONFIG);
    let mut manager = AptosConfigManager::new(&path).unwrap();
    manager.start_watching().unwrap();

    write_config(
        &dir,
        &common::MINIMAL_CONFIG.replace("port = 8007", "port = 9001"),
    );
    tokio::time::sleep(Duration::from_millis(250)).await;
    write_config(
        &dir,
        &common::MINIMAL_CONFIG.replace("port = 8007", "port = 9002"),
    );

    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    while manager.config().server.port != 9002 && std::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    assert_eq!(manager.config().server.port, 9002);
}

#[tokio::test]
async fn test_watcher_keeps_config_after_invalid_edit() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, common::MINIMAL_CONFIG);
    let mut manager = AptosConfigManager::new(&path).unwrap();
    manager.start_watching().unwrap();

    write_config(&dir, "this is = not [valid");
    tokio::time::sleep(Duration::from_millis(1200)).await;

    assert_eq!(manager.config().server.port, 8007);
}

#[test]
fn test_shipped_config_is_valid() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("aptos.toml");
    let config = AptosConfig::load(&path).unwrap();

    let labels: Vec<&str> = config
        .research
        .lanes
        .iter()
        .map(|l| l.label.as_str())
        .collect();
    assert_eq!(
        labels,
        vec![
            "Aptos Core Research",
            "Full Stack Research",
            "Developer Docs Research",
            "Learn Aptoslabs Research",
            "Aptos Dev Docs Research",
        ]
    );
}
