//! Multi-Agent Coordination
//!
//! Classifies the query, picks specialized agents (language model first,
//! keyword fallback second), runs them one after another and merges their
//! responses into a single answer.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::analysis::QueryAnalysis;
use super::selector::{keyword_fallback, AgentKind, AgentSelector};
use super::specialized::{
    EmergencyAgent, FirstAidAgent, InfoAgent, LocationAgent, MedicalAgent, PopulationAgent, SpecializedAgent,
};
use crate::types::{AgentResponse, Severity, ToolResult, UserContext};

const SEPARATOR: &str = "\n\n---\n\n";

const EMERGENCY_MARKERS: [&str; 2] = ["ACİL DURUM", "🚨"];
const MEDICAL_MARKERS: [&str; 2] = ["🏥", "İlk Yardım"];
const LOCATION_MARKERS: [&str; 2] = ["📍", "Konum"];

/// Coordinator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Ask the selector before falling back to keywords
    pub use_llm: bool,
    /// Cap on merged suggestions
    pub max_suggestions: usize,
    /// Confidence of the "nobody answered" response
    pub default_confidence: f64,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            use_llm: true,
            max_suggestions: 6,
            default_confidence: 0.1,
        }
    }
}

/// Runs and merges the specialized agents
pub struct Coordinator {
    config: CoordinatorConfig,
    selector: Option<Arc<dyn AgentSelector>>,
    medical: MedicalAgent,
    location: LocationAgent,
    emergency: EmergencyAgent,
    first_aid: FirstAidAgent,
    population: PopulationAgent,
    info: InfoAgent,
}

impl Coordinator {
    /// Keyword selection only
    pub fn new() -> Self {
        Self::with_config(CoordinatorConfig::default(), None)
    }

    pub fn with_selector(selector: Arc<dyn AgentSelector>) -> Self {
        Self::with_config(CoordinatorConfig::default(), Some(selector))
    }

    pub fn with_config(config: CoordinatorConfig, selector: Option<Arc<dyn AgentSelector>>) -> Self {
        Self {
            config,
            selector,
            medical: MedicalAgent::new(),
            location: LocationAgent::new(),
            emergency: EmergencyAgent::new(),
            first_aid: FirstAidAgent::new(),
            population: PopulationAgent::new(),
            info: InfoAgent::new(),
        }
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    pub fn has_selector(&self) -> bool {
        self.selector.is_some()
    }

    /// Analyze, select, run, merge
    pub async fn execute(&self, query: &str, ctx: &UserContext, tool_results: &[ToolResult]) -> AgentResponse {
        let analysis = QueryAnalysis::analyze(query);
        debug!(
            "Query analysis: intent={:?} urgency={} complexity={:?}",
            analysis.primary_intent, analysis.urgency, analysis.complexity
        );

        let names = self.select_agents(query, &analysis, tool_results).await;

        let mut responses = Vec::new();
        let mut seen = Vec::new();
        for name in &names {
            let Some(kind) = AgentKind::parse(name) else {
                warn!("Unknown agent '{}', skipping", name);
                continue;
            };
            if seen.contains(&kind) {
                continue;
            }
            seen.push(kind);

            let response = self.agent(kind).respond(query, ctx, tool_results);
            debug!("Agent {} answered (confidence {:.2})", kind, response.confidence);
            responses.push(response);
        }

        info!("Coordinated {} agent response(s) for '{}'", responses.len(), query);
        self.merge(&analysis, responses)
    }

    /// Agent names in run order. Never empty.
    async fn select_agents(&self, query: &str, analysis: &QueryAnalysis, tool_results: &[ToolResult]) -> Vec<String> {
        if self.config.use_llm {
            if let Some(selector) = &self.selector {
                match selector.select(query, analysis, tool_results).await {
                    Ok(decision) => return decision.selected_agents,
                    Err(e) => warn!("Agent selection failed, using keyword fallback: {}", e),
                }
            }
        }

        let agents = keyword_fallback(query);
        debug!("Keyword agent selection: {:?}", agents);
        agents.iter().map(|a| a.as_str().to_string()).collect()
    }

    fn agent(&self, kind: AgentKind) -> &dyn SpecializedAgent {
        match kind {
            AgentKind::Medical => &self.medical,
            AgentKind::Location => &self.location,
            AgentKind::Emergency => &self.emergency,
            AgentKind::FirstAid => &self.first_aid,
            AgentKind::Population => &self.population,
            AgentKind::Info => &self.info,
        }
    }

    /// Fold agent responses into one
    pub fn merge(&self, analysis: &QueryAnalysis, mut responses: Vec<AgentResponse>) -> AgentResponse {
        match responses.len() {
            0 => return self.default_response(),
            1 => return responses.remove(0),
            _ => {}
        }

        let message = merge_messages(analysis, &responses);

        let mut suggestions: Vec<String> = Vec::new();
        for s in responses.iter().flat_map(|r| r.suggestions.iter()) {
            if !suggestions.contains(s) {
                suggestions.push(s.clone());
            }
        }
        suggestions.truncate(self.config.max_suggestions);

        let mut action_items = responses
            .iter()
            .flat_map(|r| r.action_items.iter().cloned())
            .collect::<Vec<_>>();
        action_items.sort_by(|a, b| b.priority.cmp(&a.priority));

        let mut tool_results: Vec<ToolResult> = Vec::new();
        for result in responses.iter().flat_map(|r| r.tool_results.iter()) {
            let duplicate = tool_results
                .iter()
                .any(|r| r.kind == result.kind && r.timestamp == result.timestamp);
            if !duplicate {
                tool_results.push(result.clone());
            }
        }

        let confidence = responses.iter().map(|r| r.confidence).sum::<f64>() / responses.len() as f64;

        AgentResponse::new(message, confidence)
            .with_suggestions(suggestions)
            .with_action_items(action_items)
            .with_tool_results(tool_results)
    }

    fn default_response(&self) -> AgentResponse {
        AgentResponse::new(
            "Üzgünüm, bu konuda yardımcı olamıyorum. Lütfen daha spesifik bir soru sorun.".to_string(),
            self.config.default_confidence,
        )
        .with_suggestions(vec![
            "🏥 Hastane bilgisi için 112'yi arayın".to_string(),
            "📍 Konum bilgisi için harita uygulamalarını kullanın".to_string(),
            "🚨 Acil durumlarda 112'yi arayın".to_string(),
        ])
    }
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new()
    }
}

fn has_marker(message: &str, markers: &[&str]) -> bool {
    markers.iter().any(|m| message.contains(m))
}

fn merge_messages(analysis: &QueryAnalysis, responses: &[AgentResponse]) -> String {
    if analysis.urgency == Severity::Critical {
        if let Some(r) = responses.iter().find(|r| has_marker(&r.message, &EMERGENCY_MARKERS)) {
            return r.message.clone();
        }
    }

    let medical = responses.iter().position(|r| has_marker(&r.message, &MEDICAL_MARKERS));
    let location = responses
        .iter()
        .enumerate()
        .position(|(i, r)| Some(i) != medical && has_marker(&r.message, &LOCATION_MARKERS));

    match (medical, location) {
        (Some(m), Some(l)) => format!("{}{}{}", responses[m].message, SEPARATOR, responses[l].message),
        (Some(i), None) | (None, Some(i)) => responses[i].message.clone(),
        (None, None) => responses[0].message.clone(),
    }
}
