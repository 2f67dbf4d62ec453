//! Configuration loading tests

use reach_agent::{Assistant, Config, ProviderRegistry, RunMode};
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_tuning_file_overrides_defaults() {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    writeln!(
        file,
        r#"
[orchestrator]
provider_timeout_ms = 2500
use_reasoning = false

[reasoning]
max_steps = 3
success_threshold = 0.6

[coordinator]
max_suggestions = 4

[llm]
model = "qwen2.5:7b"

[bandit]
critical_bonus = 3.0
"#
    )
    .unwrap();

    let config = Config::from_file(file.path()).unwrap();

    assert_eq!(config.orchestrator.provider_timeout_ms, 2500);
    assert_eq!(config.reasoning.max_steps, 3);
    assert_eq!(config.reasoning.success_threshold, 0.6);
    assert_eq!(config.reasoning.fallback_threshold, 0.3);
    assert_eq!(config.coordinator.max_suggestions, 4);
    assert_eq!(config.llm.model, "qwen2.5:7b");
    assert_eq!(config.llm.temperature, 0.3);
    assert_eq!(config.bandit.critical_bonus, 3.0);
    assert_eq!(config.source.as_deref(), Some(file.path()));

    let assistant = Assistant::from_config(&config, ProviderRegistry::new());
    assert_eq!(assistant.mode(), RunMode::Selected);
    assert!(!assistant.coordinator().has_selector());
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::from_file(dir.path().join("absent.toml")).unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}

#[test]
fn test_malformed_file_is_an_error() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[reasoning\nmax_steps = 3").unwrap();
    let err = Config::from_file(file.path()).unwrap_err();
    assert!(err.to_string().contains("Invalid config file"));
}
