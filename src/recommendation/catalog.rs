//! Candidate actions for a context. Deterministic; never persisted.

use serde::{Deserialize, Serialize};

use super::context::{ActionType, RecommendationContext};
use crate::types::Severity;

/// A candidate next-best-action with its static priors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationAction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ActionType,
    pub title: String,
    pub description: String,
    pub confidence: f64,
    pub expected_reward: f64,
    pub context_relevance: f64,
}

impl RecommendationAction {
    fn new(
        id: impl Into<String>,
        kind: ActionType,
        title: impl Into<String>,
        description: impl Into<String>,
        priors: (f64, f64, f64),
    ) -> Self {
        let (confidence, expected_reward, context_relevance) = priors;
        Self {
            id: id.into(),
            kind,
            title: title.into(),
            description: description.into(),
            confidence,
            expected_reward,
            context_relevance,
        }
    }

    /// Prior score before any history is considered
    pub fn base_score(&self) -> f64 {
        self.expected_reward * self.context_relevance
    }
}

/// Candidates in catalog order. Always contains at least the general
/// network and social actions.
pub fn candidate_actions(ctx: &RecommendationContext) -> Vec<RecommendationAction> {
    let mut actions = Vec::new();

    match ctx.emergency_level {
        Severity::Critical => actions.push(RecommendationAction::new(
            "emergency_critical",
            ActionType::Emergency,
            "🚨 KRİTİK: Acil durum aksiyonları",
            "Hemen yapmanız gereken kritik aksiyonlar",
            (0.95, 0.9, 1.0),
        )),
        Severity::High => actions.push(RecommendationAction::new(
            "emergency_high",
            ActionType::Emergency,
            "⚠️ Acil durum hazırlığı",
            "Acil durum için hazırlık yapmanız gerekenler",
            (0.9, 0.85, 0.95),
        )),
        Severity::Medium | Severity::Low => {}
    }

    if ctx.has_district() {
        actions.push(RecommendationAction::new(
            format!("safe_area_{}", ctx.district),
            ActionType::Location,
            format!("📍 {} güvenli alanları", ctx.district),
            "Yakınınızdaki güvenli toplanma alanları ve hastaneler",
            (0.8, 0.7, 0.9),
        ));
    }

    if let Some(operator) = &ctx.operator {
        actions.push(RecommendationAction::new(
            format!("network_{}", operator),
            ActionType::Network,
            format!("📡 {} kapsama durumu", operator),
            format!("Mevcut konumunuzda {} şebeke kalitesi", operator),
            (0.85, 0.8, 0.8),
        ));
    }

    actions.push(RecommendationAction::new(
        "network_general",
        ActionType::Network,
        "📶 Şebeke durumu genel",
        "Tüm operatörlerin mevcut durumu",
        (0.75, 0.7, 0.6),
    ));

    if ctx.emergency_level <= Severity::Medium {
        actions.push(RecommendationAction::new(
            "notification_setup",
            ActionType::Notification,
            "🔔 Bildirim ayarları",
            "Acil durum bildirimlerini yapılandırın",
            (0.7, 0.6, 0.7),
        ));
    }

    actions.push(RecommendationAction::new(
        "social_media_insights",
        ActionType::Social,
        "📱 Sosyal medya durumu",
        "Güncel sosyal medya analizi ve trendler",
        (0.7, 0.65, 0.6),
    ));

    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommendation::context::FixedClock;
    use crate::types::UserContext;
    use serde_json::json;

    fn ids(actions: &[RecommendationAction]) -> Vec<&str> {
        actions.iter().map(|a| a.id.as_str()).collect()
    }

    #[test]
    fn test_minimal_catalog() {
        let rc = RecommendationContext::build("Merhaba", &UserContext::new("u1"), &FixedClock(10));
        assert_eq!(
            ids(&candidate_actions(&rc)),
            vec!["network_general", "notification_setup", "social_media_insights"]
        );
    }

    #[test]
    fn test_full_catalog_for_critical_user() {
        let ctx = UserContext::new("u1")
            .with_location("Beşiktaş", "İstanbul")
            .with_operator("Turkcell")
            .with_preference("emergencyLevel", json!("critical"));
        let rc = RecommendationContext::build("Merhaba", &ctx, &FixedClock(10));
        let actions = candidate_actions(&rc);

        assert_eq!(
            ids(&actions),
            vec![
                "emergency_critical",
                "safe_area_Beşiktaş",
                "network_Turkcell",
                "network_general",
                "social_media_insights"
            ]
        );
        assert!((actions[0].base_score() - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_high_level_keeps_out_notifications() {
        let ctx = UserContext::new("u1").with_preference("emergencyLevel", json!("high"));
        let rc = RecommendationContext::build("Merhaba", &ctx, &FixedClock(10));
        let actions = candidate_actions(&rc);
        assert_eq!(actions[0].id, "emergency_high");
        assert!(actions.iter().all(|a| a.kind != ActionType::Notification));
    }
}
