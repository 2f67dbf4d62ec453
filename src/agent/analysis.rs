//! Query analysis for the coordinator: intent, urgency, complexity, keywords

use serde::{Deserialize, Serialize};

use crate::keywords::{contains_any, normalize};
use crate::types::Severity;

static MEDICAL_KEYWORDS: &[&str] = &[
    "hastane", "doktor", "ilkyardım", "yaşam üçgeni", "acil", "emergency",
    "kanama", "kırık", "yanık", "bilinç", "ambulans", "112", "sağlık",
    "tıbbi", "medikal", "first aid",
];

static LOCATION_KEYWORDS: &[&str] = &[
    "konum", "nerede", "güvenli alan", "toplanma", "hastane", "doktor",
    "yol tarifi", "nasıl giderim", "yakın", "mesafe", "koordinat",
    "park", "meydan", "mahalle", "ilçe", "bölge",
];

static EMERGENCY_KEYWORDS: &[&str] = &[
    "acil", "emergency", "tehlike", "güvenlik", "112", "ambulans",
    "itfaiye", "polis", "kurtarma", "afet", "deprem", "yangın", "sel",
];

static CRITICAL_URGENCY: &[&str] = &["acil", "emergency", "112", "ambulans"];
static HIGH_URGENCY: &[&str] = &["hastane", "doktor", "yaralanma", "ağrı"];
static MEDIUM_URGENCY: &[&str] = &["ilkyardım", "yaşam üçgeni"];

static STOP_WORDS: &[&str] = &["ve", "ile", "için", "olan", "bu", "şu", "o", "bir", "da", "de", "ta", "te"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Medical,
    Location,
    Emergency,
    General,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

/// Coordinator-side classification of a query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryAnalysis {
    pub primary_intent: Intent,
    pub secondary_intents: Vec<Intent>,
    pub urgency: Severity,
    pub complexity: Complexity,
    pub keywords: Vec<String>,
}

impl QueryAnalysis {
    pub fn analyze(query: &str) -> Self {
        let q = normalize(query);
        let medical = contains_any(&q, MEDICAL_KEYWORDS);
        let location = contains_any(&q, LOCATION_KEYWORDS);
        let emergency = contains_any(&q, EMERGENCY_KEYWORDS);

        let primary_intent = if medical {
            Intent::Medical
        } else if location {
            Intent::Location
        } else if emergency {
            Intent::Emergency
        } else {
            Intent::General
        };

        let mut secondary_intents = Vec::new();
        if medical && location {
            secondary_intents.push(Intent::Location);
        }
        if emergency {
            secondary_intents.push(Intent::Emergency);
        }

        let urgency = if contains_any(&q, CRITICAL_URGENCY) {
            Severity::Critical
        } else if contains_any(&q, HIGH_URGENCY) {
            Severity::High
        } else if contains_any(&q, MEDIUM_URGENCY) {
            Severity::Medium
        } else {
            Severity::Low
        };

        let complexity = if !secondary_intents.is_empty() || urgency == Severity::Critical {
            Complexity::High
        } else if matches!(urgency, Severity::High | Severity::Medium) {
            Complexity::Medium
        } else {
            Complexity::Low
        };

        Self {
            primary_intent,
            secondary_intents,
            urgency,
            complexity,
            keywords: extract_keywords(&q),
        }
    }
}

/// Words longer than two characters, minus stop words
pub fn extract_keywords(normalized: &str) -> Vec<String> {
    normalized
        .split_whitespace()
        .filter(|w| w.chars().count() > 2 && !STOP_WORDS.contains(w))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hospital_location_query() {
        let analysis = QueryAnalysis::analyze("En yakın hastane nerede?");
        assert_eq!(analysis.primary_intent, Intent::Medical);
        assert_eq!(analysis.secondary_intents, vec![Intent::Location]);
        assert_eq!(analysis.urgency, Severity::High);
        assert_eq!(analysis.complexity, Complexity::High);
        assert_eq!(analysis.keywords, vec!["yakın", "hastane", "nerede?"]);
    }

    #[test]
    fn test_critical_emergency() {
        let analysis = QueryAnalysis::analyze("Acil durum! Yardım gerekli!");
        assert_eq!(analysis.primary_intent, Intent::Medical);
        assert!(analysis.secondary_intents.contains(&Intent::Emergency));
        assert_eq!(analysis.urgency, Severity::Critical);
        assert_eq!(analysis.complexity, Complexity::High);
    }

    #[test]
    fn test_first_aid_is_medium() {
        let analysis = QueryAnalysis::analyze("yaşam üçgeni nasıl kurulur");
        assert_eq!(analysis.urgency, Severity::Medium);
        assert_eq!(analysis.complexity, Complexity::Medium);
    }

    #[test]
    fn test_general_query() {
        let analysis = QueryAnalysis::analyze("Merhaba");
        assert_eq!(analysis.primary_intent, Intent::General);
        assert!(analysis.secondary_intents.is_empty());
        assert_eq!(analysis.urgency, Severity::Low);
        assert_eq!(analysis.complexity, Complexity::Low);
    }

    #[test]
    fn test_stop_words_removed() {
        assert_eq!(extract_keywords("bu ve şu için deprem"), vec!["deprem"]);
    }
}
