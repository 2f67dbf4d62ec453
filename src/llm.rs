//! Ollama Client
//!
//! Thin JSON-mode client for an Ollama-compatible `/api/generate` endpoint.
//! Used by the coordinator to ask which agents should answer a query.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Errors from a single LLM call
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("LLM selection disabled (no endpoint configured)")]
    Disabled,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Ollama error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unparseable response: {0}")]
    Parse(String),

    #[error("Timed out after {0} ms")]
    Timeout(u64),
}

/// LLM client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL; `None` disables LLM calls entirely
    pub ollama_url: Option<String>,
    pub model: String,
    pub temperature: f64,
    /// Whole-call budget in milliseconds
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            ollama_url: None,
            model: "llama3.2:3b".to_string(),
            temperature: 0.3,
            timeout_ms: 15_000,
        }
    }
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

/// JSON-mode Ollama client
pub struct OllamaClient {
    config: LlmConfig,
    client: reqwest::Client,
}

impl OllamaClient {
    pub fn new(config: LlmConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { config, client }
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.config.ollama_url.is_some()
    }

    /// Generate a completion constrained to JSON and parse it
    pub async fn generate_json(&self, prompt: &str) -> Result<Value, LlmError> {
        let base = self.config.ollama_url.as_deref().ok_or(LlmError::Disabled)?;
        let url = format!("{}/api/generate", base.trim_end_matches('/'));

        let call = async {
            let response = self
                .client
                .post(&url)
                .json(&serde_json::json!({
                    "model": self.config.model,
                    "prompt": prompt,
                    "stream": false,
                    "format": "json",
                    "options": {
                        "temperature": self.config.temperature,
                        "num_predict": 256,
                    }
                }))
                .send()
                .await?;

            if !response.status().is_success() {
                let status = response.status().as_u16();
                let body = response.text().await.unwrap_or_default();
                return Err(LlmError::Status { status, body });
            }

            let result: OllamaGenerateResponse = response.json().await?;
            Ok(result.response)
        };

        let text = tokio::time::timeout(self.config.timeout(), call)
            .await
            .map_err(|_| LlmError::Timeout(self.config.timeout_ms))??;

        debug!("LLM raw response: {}", text);
        parse_json_object(&text)
    }
}

/// Parse the first balanced JSON object in a model response.
/// Models sometimes wrap JSON in prose or code fences.
pub fn parse_json_object(text: &str) -> Result<Value, LlmError> {
    let json = extract_json_object(text).ok_or_else(|| LlmError::Parse(truncate(text, 120)))?;
    serde_json::from_str(json).map_err(|e| LlmError::Parse(e.to_string()))
}

fn extract_json_object(s: &str) -> Option<&str> {
    let start = s.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in s[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&s[start..start + i + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        format!("{}...", s.chars().take(max).collect::<String>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_object() {
        let value = parse_json_object(r#"{"selectedAgents": ["medical"], "reasoning": "x"}"#).unwrap();
        assert_eq!(value["selectedAgents"][0], "medical");
    }

    #[test]
    fn test_parse_fenced_object_with_braces_in_strings() {
        let text = "```json\n{\"reasoning\": \"use {medical}\", \"selectedAgents\": []}\n```";
        let value = parse_json_object(text).unwrap();
        assert_eq!(value["reasoning"], "use {medical}");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(parse_json_object("no json here"), Err(LlmError::Parse(_))));
        assert!(matches!(parse_json_object("{\"open\": "), Err(LlmError::Parse(_))));
    }

    #[tokio::test]
    async fn test_disabled_without_url() {
        let client = OllamaClient::new(LlmConfig::default());
        assert!(!client.is_enabled());
        assert!(matches!(client.generate_json("x").await, Err(LlmError::Disabled)));
    }
}
