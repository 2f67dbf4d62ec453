//! End-to-end pipeline tests
//!
//! Fake capability providers through orchestrator, coordinator and the
//! assistant facade.

use reach_agent::agent::{Coordinator, ReasoningLoop, SelectionDecision};
use reach_agent::{
    AgentSelector, Assistant, Config, FnProvider, LlmError, ProviderError, ProviderRegistry, QueryAnalysis,
    RunMode, ToolKind, ToolOrchestrator, ToolResult, UserContext,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn location_provider() -> Arc<FnProvider> {
    Arc::new(FnProvider::new("location", ToolKind::Location, |input| async move {
        let district = input.user_context.district().unwrap_or("Bilinmiyor").to_string();
        Ok(Some(ToolResult::new(
            ToolKind::Location,
            json!({
                "currentLocation": {"district": district, "city": "İstanbul"},
                "nearestSafeArea": {"name": "Yoğurtçu Parkı", "distance": "350 m"},
                "safeAreas": [{"name": "Yoğurtçu Parkı"}, {"name": "Fenerbahçe Parkı"}]
            }),
            0.9,
        )))
    }))
}

fn failing_provider(kind: ToolKind) -> Arc<FnProvider> {
    Arc::new(FnProvider::new("broken", kind, |_| async {
        Err(ProviderError::Unavailable("connection refused".to_string()))
    }))
}

fn kadikoy() -> UserContext {
    UserContext::new("user-1").with_location("Kadıköy", "İstanbul")
}

#[tokio::test]
async fn test_greeting_goes_to_info_agent() {
    let assistant = Assistant::new(ProviderRegistry::new());
    let reply = assistant.process_with_mode(RunMode::React, "Merhaba", &kadikoy()).await;

    assert!(reply.response.message.starts_with("ℹ️"));
    assert_eq!(reply.response.confidence, 0.1);
    assert!(!reply.reasoning.is_empty());
    assert!(reply.stats.total_providers <= 1);
}

#[tokio::test]
async fn test_hospital_query_merges_medical_and_location() {
    let registry = ProviderRegistry::new()
        .with(location_provider())
        .with(failing_provider(ToolKind::WebSearch));
    let assistant = Assistant::new(registry);

    let reply = assistant
        .process_with_mode(RunMode::Selected, "En yakın hastane nerede?", &kadikoy())
        .await;

    assert!(reply.response.message.contains("\n\n---\n\n"));
    assert!(reply.response.message.contains("🏥"));
    assert!(reply.response.confidence <= 0.95);
    assert!(reply.response.suggestions.len() <= 6);
    assert_eq!(reply.stats.total_providers, 2);
    assert_eq!(reply.stats.kinds, vec![ToolKind::Location, ToolKind::Recommendation]);

    let priorities: Vec<_> = reply.response.action_items.iter().map(|a| a.priority).collect();
    let mut sorted = priorities.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(priorities, sorted);
}

#[tokio::test]
async fn test_first_aid_query_selects_first_aid_provider() {
    let registry = ProviderRegistry::new().with(Arc::new(FnProvider::new(
        "ilkyardim",
        ToolKind::FirstAid,
        |_| async {
            Ok(Some(ToolResult::new(
                ToolKind::FirstAid,
                json!({"message": "Kanayan yere temiz bir bezle baskı uygulayın."}),
                0.85,
            )))
        },
    )));
    let assistant = Assistant::new(registry);
    let orchestrator = assistant.orchestrator();

    let results = orchestrator.run_selected("ilkyardım", &UserContext::new("u")).await;
    let kinds: Vec<_> = results.iter().map(|r| r.kind).collect();
    assert!(kinds.contains(&ToolKind::FirstAid));
    assert!(kinds.contains(&ToolKind::Recommendation));

    let response = assistant.coordinator().execute("ilkyardım", &UserContext::new("u"), &results).await;
    assert!(response.message.contains("Kanayan yere"));
}

#[tokio::test]
async fn test_react_success_returns_single_result() {
    let registry = ProviderRegistry::new().with(location_provider());
    let orchestrator = ToolOrchestrator::new(registry);

    let results = orchestrator.run_react("Konumum nerede?", &kadikoy()).await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].kind, ToolKind::Location);
    assert_eq!(orchestrator.last_reasoning().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_slow_provider_does_not_stall_the_request() {
    let slow = Arc::new(FnProvider::new("slow", ToolKind::Network, |_| async {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(Some(ToolResult::new(ToolKind::Network, json!({}), 0.9)))
    }));
    let registry = ProviderRegistry::new().with(slow).with(location_provider());

    let mut config = Config::default();
    config.orchestrator.provider_timeout_ms = 100;
    let assistant = Assistant::from_config(&config, registry);

    let reply = assistant.process_with_mode(RunMode::All, "durum", &kadikoy()).await;
    assert!(!reply.stats.kinds.contains(&ToolKind::Network));
    assert!(reply.stats.kinds.contains(&ToolKind::Location));
}

struct Unreachable;

#[async_trait::async_trait]
impl AgentSelector for Unreachable {
    async fn select(&self, _: &str, _: &QueryAnalysis, _: &[ToolResult]) -> Result<SelectionDecision, LlmError> {
        Err(LlmError::Status {
            status: 503,
            body: "model loading".to_string(),
        })
    }
}

#[tokio::test]
async fn test_selector_outage_uses_keyword_agents() {
    let coordinator = Coordinator::with_selector(Arc::new(Unreachable));
    let results = vec![ToolResult::new(
        ToolKind::Emergency,
        json!({"isUrgent": true, "emergencyAlerts": ["Deprem uyarısı"], "safetyRecommendations": []}),
        0.9,
    )];

    let response = coordinator
        .execute("Acil! Deprem oldu, ambulans lazım", &kadikoy(), &results)
        .await;
    assert!(response.message.contains("🚨"));
    assert!(!response.action_items.is_empty());
    assert!(response.confidence <= 0.95);
}

#[test]
fn test_reasoning_fallback_on_empty_results() {
    let reasoning = ReasoningLoop::new();
    let ctx = UserContext::new("u");
    let mut run = reasoning.begin("Merhaba", &ctx, Vec::new());
    run.advance();

    assert_eq!(run.results().len(), 1);
    assert_eq!(run.results()[0].kind, ToolKind::WebSearch);
    assert_eq!(run.results()[0].confidence, 0.6);
}
