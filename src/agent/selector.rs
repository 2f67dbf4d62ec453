//! Agent Selection
//!
//! Decides which specialized agents answer a query. The language-model
//! selector is optional; any failure falls back to [`keyword_fallback`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

use super::analysis::QueryAnalysis;
use crate::keywords::{contains_any, normalize};
use crate::llm::{LlmConfig, LlmError, OllamaClient};
use crate::types::ToolResult;

/// Closed set of specialized agents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    Medical,
    Location,
    Emergency,
    #[serde(rename = "ilkyardim")]
    FirstAid,
    Population,
    Info,
}

impl AgentKind {
    pub const ALL: [AgentKind; 6] = [
        AgentKind::Medical,
        AgentKind::Location,
        AgentKind::Emergency,
        AgentKind::FirstAid,
        AgentKind::Population,
        AgentKind::Info,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Medical => "medical",
            Self::Location => "location",
            Self::Emergency => "emergency",
            Self::FirstAid => "ilkyardim",
            Self::Population => "population",
            Self::Info => "info",
        }
    }

    /// Parse a wire name; unknown names yield `None`
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "medical" => Some(Self::Medical),
            "location" => Some(Self::Location),
            "emergency" => Some(Self::Emergency),
            "ilkyardim" => Some(Self::FirstAid),
            "population" => Some(Self::Population),
            "info" => Some(Self::Info),
            _ => None,
        }
    }

    /// Catalog line shown to the selection model
    pub fn description(&self) -> &'static str {
        match self {
            Self::Medical => "Tıbbi bilgiler, hastane araması, ilkyardım, sağlık konuları",
            Self::Location => "Konum bilgileri, güvenli alanlar, toplanma alanları, yol tarifi",
            Self::Emergency => "Acil durum müdahalesi, 112 çağrısı, kritik durumlar",
            Self::FirstAid => "İlk yardım bilgileri, yaşam üçgeni, deprem güvenliği",
            Self::Population => "Nüfus analizi, demografi, istatistik, nüfus değişimi",
            Self::Info => "Genel bilgi, diğer konular",
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Selector output. Names stay raw strings so unknown ones can be logged and skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionDecision {
    #[serde(rename = "selectedAgents", default)]
    pub selected_agents: Vec<String>,
    #[serde(default)]
    pub reasoning: String,
}

/// Strategy for picking agents
#[async_trait]
pub trait AgentSelector: Send + Sync {
    async fn select(
        &self,
        query: &str,
        analysis: &QueryAnalysis,
        tool_results: &[ToolResult],
    ) -> Result<SelectionDecision, LlmError>;
}

/// Asks an Ollama-compatible model for the agent list
pub struct LlmAgentSelector {
    client: OllamaClient,
}

impl LlmAgentSelector {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            client: OllamaClient::new(config),
        }
    }
}

#[async_trait]
impl AgentSelector for LlmAgentSelector {
    async fn select(
        &self,
        query: &str,
        _analysis: &QueryAnalysis,
        tool_results: &[ToolResult],
    ) -> Result<SelectionDecision, LlmError> {
        let prompt = build_prompt(query, &provider_summary(tool_results));
        let value = self.client.generate_json(&prompt).await?;
        let mut decision: SelectionDecision =
            serde_json::from_value(value).map_err(|e| LlmError::Parse(e.to_string()))?;

        if decision.selected_agents.is_empty() {
            decision.selected_agents.push(AgentKind::Info.as_str().to_string());
        }
        info!("LLM agent selection: {:?} ({})", decision.selected_agents, decision.reasoning);
        Ok(decision)
    }
}

/// One line per result: `kind: data available|no data (confidence: x.xx)`
pub fn provider_summary(results: &[ToolResult]) -> String {
    if results.is_empty() {
        return "No provider results.".to_string();
    }
    let lines = results
        .iter()
        .map(|r| {
            format!(
                "- {}: {} (confidence: {:.2})",
                r.kind,
                if r.has_data() { "data available" } else { "no data" },
                r.confidence
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!("Provider results ({}):\n{}", results.len(), lines)
}

fn build_prompt(query: &str, summary: &str) -> String {
    let catalog = AgentKind::ALL
        .iter()
        .map(|k| format!("- {}: {}", k.as_str(), k.description()))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You select which specialized agents should answer a disaster-support query.
Look at the available provider results first, then pick the agents that can use them.

Query: "{query}"

{summary}

Agents:
{catalog}

Rules:
1. Population data present -> population
2. Hospital or location data present -> medical, location
3. First-aid data present -> ilkyardim
4. Emergency situation -> emergency
5. Nothing specific -> info

Respond with JSON only:
{{"selectedAgents": ["agent1", "agent2"], "reasoning": "why, based on the provider results"}}"#
    )
}

/// Deterministic keyword selection; never empty
pub fn keyword_fallback(query: &str) -> Vec<AgentKind> {
    let q = normalize(query);
    let mut agents = Vec::new();

    if contains_any(&q, &["hastane", "doktor", "sağlık"]) {
        agents.push(AgentKind::Medical);
    }
    if contains_any(&q, &["konum", "nerede", "yakın", "güvenli alan"]) {
        agents.push(AgentKind::Location);
    }
    if contains_any(&q, &["acil", "emergency", "112", "ambulans"]) {
        agents.push(AgentKind::Emergency);
    }
    if contains_any(&q, &["ilkyardım", "yaşam üçgeni", "deprem"]) {
        agents.push(AgentKind::FirstAid);
    }
    if agents.is_empty() {
        agents.push(AgentKind::Info);
    }

    debug!("Keyword agent selection: {:?}", agents);
    agents
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ToolKind;
    use serde_json::json;

    #[test]
    fn test_keyword_fallback_hospital_location() {
        assert_eq!(
            keyword_fallback("En yakın hastane nerede?"),
            vec![AgentKind::Medical, AgentKind::Location]
        );
    }

    #[test]
    fn test_keyword_fallback_earthquake() {
        assert_eq!(
            keyword_fallback("Deprem anında yaşam üçgeni nasıl oluşturulur?"),
            vec![AgentKind::FirstAid]
        );
    }

    #[test]
    fn test_keyword_fallback_defaults_to_info() {
        assert_eq!(keyword_fallback("Merhaba"), vec![AgentKind::Info]);
    }

    #[test]
    fn test_agent_kind_round_trip_names() {
        for kind in AgentKind::ALL {
            assert_eq!(AgentKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(AgentKind::parse("weather"), None);
    }

    #[test]
    fn test_decision_wire_format() {
        let decision: SelectionDecision =
            serde_json::from_value(json!({"selectedAgents": ["medical", "location"], "reasoning": "r"}))
                .unwrap();
        assert_eq!(decision.selected_agents, vec!["medical", "location"]);

        let empty: SelectionDecision = serde_json::from_value(json!({})).unwrap();
        assert!(empty.selected_agents.is_empty());
    }

    #[test]
    fn test_provider_summary_lines() {
        let results = vec![
            ToolResult::new(ToolKind::Location, json!({"hospitals": []}), 0.8),
            ToolResult::new(ToolKind::Social, json!({}), 0.1),
        ];
        let summary = provider_summary(&results);
        assert!(summary.contains("- location: data available (confidence: 0.80)"));
        assert!(summary.contains("- social: no data (confidence: 0.10)"));
    }

    #[tokio::test]
    async fn test_llm_selector_without_endpoint_errors() {
        let selector = LlmAgentSelector::new(LlmConfig::default());
        let analysis = QueryAnalysis::analyze("hastane");
        assert!(matches!(
            selector.select("hastane", &analysis, &[]).await,
            Err(LlmError::Disabled)
        ));
    }
}
