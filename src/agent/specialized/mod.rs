//! Specialized Agents
//!
//! Deterministic, template-based responders. Each agent filters the
//! provider results it cares about, assesses the query, and renders an
//! [`AgentResponse`]. No network calls happen here.

mod emergency;
mod first_aid;
mod info;
mod location;
mod medical;
mod population;

pub use emergency::EmergencyAgent;
pub use first_aid::FirstAidAgent;
pub use info::InfoAgent;
pub use location::LocationAgent;
pub use medical::MedicalAgent;
pub use population::PopulationAgent;

use serde::{Deserialize, Serialize};

use super::selector::AgentKind;
use crate::types::{AgentResponse, Severity, ToolKind, ToolResult, UserContext};

/// A template-driven responder for one domain
pub trait SpecializedAgent: Send + Sync {
    fn kind(&self) -> AgentKind;

    fn respond(&self, query: &str, ctx: &UserContext, results: &[ToolResult]) -> AgentResponse;
}

/// Emergency phone line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub name: String,
    pub number: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub priority: Severity,
}

impl EmergencyContact {
    fn new(name: &str, number: &str, kind: &str, priority: Severity) -> Self {
        Self {
            name: name.to_string(),
            number: number.to_string(),
            kind: kind.to_string(),
            priority,
        }
    }
}

/// National emergency lines
pub fn emergency_contacts() -> Vec<EmergencyContact> {
    vec![
        EmergencyContact::new("Acil Çağrı Merkezi", "112", "emergency", Severity::Critical),
        EmergencyContact::new("Ambulans", "112", "medical", Severity::High),
        EmergencyContact::new("İtfaiye", "110", "fire", Severity::High),
        EmergencyContact::new("Polis", "155", "police", Severity::Medium),
    ]
}

/// Results whose kind is in `kinds`, or every result when `accept_all` is set
pub(crate) fn filter_results(results: &[ToolResult], kinds: &[ToolKind], accept_all: bool) -> Vec<ToolResult> {
    results
        .iter()
        .filter(|r| accept_all || kinds.contains(&r.kind))
        .cloned()
        .collect()
}

/// Shared confidence rule for template agents, capped by [`AgentResponse::new`]
pub(crate) fn template_confidence(has_results: bool, resolved: bool, certain: bool) -> f64 {
    let mut confidence = 0.5;
    if has_results {
        confidence += 0.2;
    }
    if resolved {
        confidence += 0.2;
    }
    if certain {
        confidence += 0.1;
    }
    confidence
}

pub(crate) fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filter_results() {
        let results = vec![
            ToolResult::new(ToolKind::Location, json!({}), 0.8),
            ToolResult::new(ToolKind::Social, json!({}), 0.8),
        ];
        assert_eq!(filter_results(&results, &[ToolKind::Location], false).len(), 1);
        assert_eq!(filter_results(&results, &[ToolKind::Location], true).len(), 2);
    }

    #[test]
    fn test_template_confidence_components() {
        assert!((template_confidence(false, false, false) - 0.5).abs() < 1e-9);
        assert!((template_confidence(true, true, false) - 0.9).abs() < 1e-9);
        assert!((template_confidence(true, true, true) - 1.0).abs() < 1e-9);
    }
}
