//! Configuration management
//!
//! Environment variables first pick an optional TOML tuning file
//! (`REACH_CONFIG`), then override individual values on top of it.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::agent::{CoordinatorConfig, OrchestratorConfig, ReasoningConfig};
use crate::llm::LlmConfig;
use crate::recommendation::BanditConfig;

/// Complete runtime configuration. Every section has working defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub llm: LlmConfig,
    pub orchestrator: OrchestratorConfig,
    pub reasoning: ReasoningConfig,
    pub coordinator: CoordinatorConfig,
    pub bandit: BanditConfig,

    /// Tuning file this config was read from, if any
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var("REACH_CONFIG") {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path.trim())?,
            _ => Self::default(),
        };

        if let Ok(url) = std::env::var("OLLAMA_URL") {
            config.llm.ollama_url = Some(url).filter(|u| !u.trim().is_empty());
        }
        if let Ok(model) = std::env::var("REACH_LLM_MODEL") {
            config.llm.model = model;
        }
        if let Some(ms) = parse_env("REACH_LLM_TIMEOUT_MS")? {
            config.llm.timeout_ms = ms;
        }
        if let Some(ms) = parse_env("REACH_PROVIDER_TIMEOUT_MS")? {
            config.orchestrator.provider_timeout_ms = ms;
        }
        if let Some(steps) = parse_env("REACH_MAX_STEPS")? {
            config.reasoning.max_steps = steps;
        }
        if let Ok(v) = std::env::var("REACH_USE_LLM") {
            config.coordinator.use_llm = v == "true" || v == "1";
        }
        if let Ok(v) = std::env::var("REACH_USE_REASONING") {
            config.orchestrator.use_reasoning = v == "true" || v == "1";
        }

        Ok(config)
    }

    /// Read a TOML tuning file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config = Self::from_toml(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.reasoning.max_steps > 0, "reasoning.max_steps must be at least 1");
        anyhow::ensure!(
            self.orchestrator.provider_timeout_ms > 0,
            "orchestrator.provider_timeout_ms must be positive"
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.reasoning.fallback_confidence),
            "reasoning.fallback_confidence must be within [0, 1]"
        );
        Ok(())
    }
}

fn parse_env<T>(name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(v) => v
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("Invalid value for {}: {}", name, v)),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.reasoning.max_steps, 5);
        assert_eq!(config.orchestrator.provider_timeout_ms, 10_000);
        assert_eq!(config.llm.timeout_ms, 15_000);
        assert_eq!(config.coordinator.max_suggestions, 6);
        assert_eq!(config.bandit.exploration_factor, 2.0);
        assert!(config.llm.ollama_url.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [reasoning]
            max_steps = 3

            [bandit]
            night_bonus = 0.75
            "#,
        )
        .unwrap();

        assert_eq!(config.reasoning.max_steps, 3);
        assert_eq!(config.reasoning.fallback_confidence, 0.6);
        assert_eq!(config.bandit.night_bonus, 0.75);
        assert_eq!(config.bandit.critical_bonus, 2.0);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(Config::from_toml("[reasoning]\nmax_steps = 0\n").is_err());
        assert!(Config::from_toml("[reasoning]\nfallback_confidence = 1.5\n").is_err());
        assert!(Config::from_toml("[reasoning]\nmax_steps = \"many\"\n").is_err());
    }
}
