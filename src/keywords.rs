//! Keyword Matching
//!
//! Case-insensitive substring matching for Turkish/English queries plus the
//! keyword families the orchestrator uses to pick providers.

use crate::types::ToolKind;

// Provider selection families. Independent and non-exclusive.
static MEDICAL_KEYWORDS: &[&str] = &[
    "hastane", "doktor", "sağlık", "tıbbi", "medikal",
    "hospital", "doctor", "eczane",
];

static FIRST_AID_KEYWORDS: &[&str] = &[
    "ilkyardım", "ilk yardım", "yaşam üçgeni", "first aid",
    "kanama", "yanık", "kırık",
];

static EMERGENCY_KEYWORDS: &[&str] = &[
    "acil", "emergency", "112", "ambulans", "itfaiye",
    "kurtarma", "afet", "deprem", "yangın", "tehlike",
];

static LOCATION_KEYWORDS: &[&str] = &[
    "konum", "nerede", "güvenli alan", "toplanma", "yol tarifi",
    "nasıl giderim", "yakın", "mesafe", "koordinat",
];

static POPULATION_KEYWORDS: &[&str] = &[
    "nüfus", "demografi", "yaş dağılımı", "istatistik", "population",
];

/// Lowercase a query. Turkish dotted capital I folds to plain "i" so that
/// "İlkyardım" and "ilkyardım" compare equal.
pub fn normalize(text: &str) -> String {
    text.replace('İ', "i").to_lowercase()
}

/// True when the already-normalized text contains any of the keywords
pub fn contains_any(normalized: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| normalized.contains(kw))
}

/// Provider kinds relevant to a query, de-duplicated in first-occurrence order.
/// The recommendation provider is always included.
pub fn select_providers(query: &str) -> Vec<ToolKind> {
    let q = normalize(query);
    let mut kinds = Vec::new();

    if contains_any(&q, MEDICAL_KEYWORDS) {
        kinds.push(ToolKind::Location);
        kinds.push(ToolKind::WebSearch);
    }
    if contains_any(&q, FIRST_AID_KEYWORDS) {
        kinds.push(ToolKind::FirstAid);
    }
    if contains_any(&q, EMERGENCY_KEYWORDS) {
        kinds.push(ToolKind::Emergency);
        kinds.push(ToolKind::Notification);
    }
    if contains_any(&q, LOCATION_KEYWORDS) {
        kinds.push(ToolKind::Location);
    }
    if contains_any(&q, POPULATION_KEYWORDS) {
        kinds.push(ToolKind::Population);
    }
    kinds.push(ToolKind::Recommendation);

    let mut seen = Vec::with_capacity(kinds.len());
    kinds.retain(|k| {
        if seen.contains(k) {
            false
        } else {
            seen.push(*k);
            true
        }
    });
    kinds
}
