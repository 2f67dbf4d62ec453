//! Shared request/response types
//!
//! Everything that flows between capability providers, the reasoning loop,
//! the specialized agents and the host.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Upper bound for any agent-produced confidence
pub const MAX_AGENT_CONFIDENCE: f64 = 0.95;

/// District placeholder used when the user's location is unknown
pub const UNKNOWN_DISTRICT: &str = "Bilinmiyor";

/// City assumed when only a district is known
pub const DEFAULT_CITY: &str = "İstanbul";

/// Where the user currently is
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub district: String,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

/// Per-request user context. Never mutated once a request starts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserContext {
    pub user_id: String,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub operator: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub preferences: Map<String, Value>,
}

impl UserContext {
    pub fn new(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            ..Default::default()
        }
    }

    pub fn with_location(mut self, district: &str, city: &str) -> Self {
        self.location = Some(Location {
            district: district.to_string(),
            city: city.to_string(),
            latitude: None,
            longitude: None,
        });
        self
    }

    pub fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        if let Some(location) = self.location.as_mut() {
            location.latitude = Some(latitude);
            location.longitude = Some(longitude);
        }
        self
    }

    pub fn with_operator(mut self, operator: &str) -> Self {
        self.operator = Some(operator.to_string());
        self
    }

    pub fn with_age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_preference(mut self, key: &str, value: Value) -> Self {
        self.preferences.insert(key.to_string(), value);
        self
    }

    /// Known district, if any. Empty and placeholder districts count as unknown.
    pub fn district(&self) -> Option<&str> {
        self.location
            .as_ref()
            .map(|l| l.district.trim())
            .filter(|d| !d.is_empty() && *d != UNKNOWN_DISTRICT)
    }

    pub fn city(&self) -> &str {
        self.location
            .as_ref()
            .map(|l| l.city.trim())
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CITY)
    }

    /// "district, city" with placeholders for the missing parts
    pub fn location_label(&self) -> String {
        format!("{}, {}", self.district().unwrap_or(UNKNOWN_DISTRICT), self.city())
    }

    pub fn coordinates_label(&self) -> String {
        match self.location.as_ref().and_then(|l| l.latitude.zip(l.longitude)) {
            Some((lat, lon)) => format!("{:.4}, {:.4}", lat, lon),
            None => "N/A, N/A".to_string(),
        }
    }
}

/// Provider type tag carried by every [`ToolResult`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    Location,
    Network,
    Social,
    Emergency,
    Notification,
    #[serde(rename = "websearch")]
    WebSearch,
    Recommendation,
    #[serde(rename = "ilkyardim")]
    FirstAid,
    Population,
    StaticData,
}

impl ToolKind {
    pub const ALL: [ToolKind; 10] = [
        ToolKind::Location,
        ToolKind::Network,
        ToolKind::Social,
        ToolKind::Emergency,
        ToolKind::Notification,
        ToolKind::WebSearch,
        ToolKind::Recommendation,
        ToolKind::FirstAid,
        ToolKind::Population,
        ToolKind::StaticData,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Location => "location",
            Self::Network => "network",
            Self::Social => "social",
            Self::Emergency => "emergency",
            Self::Notification => "notification",
            Self::WebSearch => "websearch",
            Self::Recommendation => "recommendation",
            Self::FirstAid => "ilkyardim",
            Self::Population => "population",
            Self::StaticData => "static_data",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uniform result envelope produced by a capability provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    #[serde(rename = "type")]
    pub kind: ToolKind,
    pub data: Value,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
    pub source: String,
}

impl ToolResult {
    /// Create a result; confidence is clamped into [0, 1]
    pub fn new(kind: ToolKind, data: Value, confidence: f64) -> Self {
        Self {
            kind,
            data,
            confidence: clamp_unit(confidence),
            timestamp: Utc::now(),
            source: kind.as_str().to_string(),
        }
    }

    /// A result that reports a provider-side failure in its payload
    pub fn failed(kind: ToolKind, message: &str) -> Self {
        Self::new(kind, serde_json::json!({ "error": message }), 0.1)
    }

    pub fn with_source(mut self, source: &str) -> Self {
        self.source = source.to_string();
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Error marker carried in the payload, if any
    pub fn error(&self) -> Option<String> {
        match self.data.get("error") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        }
    }

    pub fn has_error(&self) -> bool {
        self.error().is_some()
    }

    /// Whether the payload carries anything at all
    pub fn has_data(&self) -> bool {
        match &self.data {
            Value::Null => false,
            Value::Object(map) => !map.is_empty(),
            Value::Array(items) => !items.is_empty(),
            Value::String(s) => !s.is_empty(),
            _ => true,
        }
    }

    /// String field from the payload
    pub fn data_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(|v| v.as_str())
    }
}

/// Four-tier scale shared by urgency, action priority and emergency level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            other => Err(format!("unknown severity: {}", other)),
        }
    }
}

/// Concrete next step suggested to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionItem {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub priority: Severity,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,
}

impl ActionItem {
    pub fn new(kind: &str, title: &str, priority: Severity) -> Self {
        Self {
            kind: kind.to_string(),
            title: title.to_string(),
            priority,
            description: String::new(),
            data: Value::Null,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }
}

/// Unit exchanged between agents, the coordinator and the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    pub message: String,
    pub suggestions: Vec<String>,
    pub action_items: Vec<ActionItem>,
    pub tool_results: Vec<ToolResult>,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
}

impl AgentResponse {
    /// Create a response; confidence is clamped into [0, 0.95]
    pub fn new(message: String, confidence: f64) -> Self {
        Self {
            message,
            suggestions: Vec::new(),
            action_items: Vec::new(),
            tool_results: Vec::new(),
            confidence: clamp_unit(confidence).min(MAX_AGENT_CONFIDENCE),
            timestamp: Utc::now(),
        }
    }

    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self
    }

    pub fn with_action_items(mut self, action_items: Vec<ActionItem>) -> Self {
        self.action_items = action_items;
        self
    }

    pub fn with_tool_results(mut self, tool_results: Vec<ToolResult>) -> Self {
        self.tool_results = tool_results;
        self
    }
}

/// Clamp into [0, 1], mapping NaN to 0
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Mean confidence of a result set, capped at [`MAX_AGENT_CONFIDENCE`].
/// Returns `empty` when there is nothing to average.
pub fn mean_confidence(results: &[ToolResult], empty: f64) -> f64 {
    if results.is_empty() {
        return empty;
    }
    let total: f64 = results.iter().map(|r| clamp_unit(r.confidence)).sum();
    (total / results.len() as f64).min(MAX_AGENT_CONFIDENCE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_result_confidence_clamped() {
        assert_eq!(ToolResult::new(ToolKind::Location, json!({}), 1.7).confidence, 1.0);
        assert_eq!(ToolResult::new(ToolKind::Location, json!({}), -0.2).confidence, 0.0);
        assert_eq!(ToolResult::new(ToolKind::Location, json!({}), f64::NAN).confidence, 0.0);
    }

    #[test]
    fn test_error_marker() {
        let ok = ToolResult::new(ToolKind::WebSearch, json!({"results": []}), 0.8);
        assert!(!ok.has_error());

        let failed = ToolResult::failed(ToolKind::WebSearch, "Web araması yapılamadı");
        assert_eq!(failed.error().as_deref(), Some("Web araması yapılamadı"));
        assert_eq!(failed.confidence, 0.1);
    }

    #[test]
    fn test_tool_kind_wire_names() {
        assert_eq!(serde_json::to_value(ToolKind::WebSearch).unwrap(), json!("websearch"));
        assert_eq!(serde_json::to_value(ToolKind::FirstAid).unwrap(), json!("ilkyardim"));
        assert_eq!(serde_json::to_value(ToolKind::StaticData).unwrap(), json!("static_data"));

        for kind in ToolKind::ALL {
            assert_eq!(serde_json::to_value(kind).unwrap(), json!(kind.as_str()));
        }
    }

    #[test]
    fn test_agent_response_confidence_capped() {
        assert_eq!(AgentResponse::new("x".into(), 1.0).confidence, MAX_AGENT_CONFIDENCE);
        assert_eq!(AgentResponse::new("x".into(), -1.0).confidence, 0.0);
    }

    #[test]
    fn test_location_label() {
        let ctx = UserContext::new("u1");
        assert_eq!(ctx.location_label(), "Bilinmiyor, İstanbul");
        assert!(ctx.district().is_none());

        let ctx = UserContext::new("u1").with_location("Kadıköy", "İstanbul");
        assert_eq!(ctx.district(), Some("Kadıköy"));
        assert_eq!(ctx.location_label(), "Kadıköy, İstanbul");
    }

    #[test]
    fn test_severity_ordering_and_parse() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::Medium > Severity::Low);
        assert_eq!("CRITICAL".parse::<Severity>().unwrap(), Severity::Critical);
        assert!("urgent".parse::<Severity>().is_err());
    }

    #[test]
    fn test_mean_confidence() {
        let results = vec![
            ToolResult::new(ToolKind::Emergency, json!({}), 1.0),
            ToolResult::new(ToolKind::Notification, json!({}), 1.0),
        ];
        assert_eq!(mean_confidence(&results, 0.1), MAX_AGENT_CONFIDENCE);
        assert_eq!(mean_confidence(&[], 0.1), 0.1);
    }
}
