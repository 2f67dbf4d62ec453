//! Recommendation Engine Integration Tests
//!
//! Feedback loop through the public API with a fixed clock.

use reach_agent::recommendation::{
    ActionType, FixedClock, InMemoryInteractionStore, InteractionStore, RecommendationEngine,
};
use reach_agent::UserContext;
use serde_json::json;
use std::sync::Arc;

fn critical_user() -> UserContext {
    UserContext::new("user-7")
        .with_location("Kadıköy", "İstanbul")
        .with_operator("Turkcell")
        .with_age(34)
        .with_preference("emergencyLevel", json!("critical"))
}

#[test]
fn test_critical_user_gets_emergency_action() {
    let engine = RecommendationEngine::new().with_clock(FixedClock(14));
    let rec = engine.select_action("Acil durum! Yardım gerekli!", &critical_user()).unwrap();

    assert_eq!(rec.kind, ActionType::Emergency);
    assert_eq!(rec.action_id, "emergency_critical");
    assert_eq!(rec.context_key, "Kadıköy_İstanbul_critical_afternoon");
    assert_eq!(rec.alternatives.len(), 2);
    assert_eq!(rec.context.age, Some(34));
    assert_eq!(rec.context.operator.as_deref(), Some("Turkcell"));
}

#[test]
fn test_repeated_selection_is_identical() {
    let engine = RecommendationEngine::new().with_clock(FixedClock(20));
    let ctx = critical_user();

    let first = engine.select_action("internet çekmiyor", &ctx).unwrap();
    for _ in 0..10 {
        let again = engine.select_action("internet çekmiyor", &ctx).unwrap();
        assert_eq!(again.action_id, first.action_id);
        assert_eq!(again.alternatives, first.alternatives);
        assert_eq!(again.score, first.score);
    }
}

#[test]
fn test_feedback_is_append_only() {
    let engine = RecommendationEngine::new().with_clock(FixedClock(9));
    let ctx = UserContext::new("user-1");
    let rec = engine.select_action("Merhaba", &ctx).unwrap();

    let before = engine.performance().total_interactions;
    engine.record_interaction("user-1", &rec.action_id, 0.7, &rec.context);
    engine.record_interaction("user-1", &rec.action_id, 0.7, &rec.context);
    let after = engine.performance();

    assert_eq!(after.total_interactions, before + 2);
    assert_eq!(after.unique_users, 1);
    assert_eq!(after.unique_actions, 1);
    assert_eq!(after.context_keys, 1);
    assert!((after.average_reward - 0.7).abs() < 1e-9);
}

#[test]
fn test_bad_feedback_moves_user_off_an_action() {
    let engine = RecommendationEngine::new().with_clock(FixedClock(9));
    let ctx = UserContext::new("user-2");

    let first = engine.select_action("Merhaba", &ctx).unwrap();
    engine.record_interaction("user-2", &first.action_id, 0.0, &first.context);

    let second = engine.select_action("Merhaba", &ctx).unwrap();
    assert_ne!(second.action_id, first.action_id);
    assert!(second.reasoning.contains("Daha önce denemediğiniz bir öneri"));
}

#[test]
fn test_shared_store_between_engines() {
    let store = Arc::new(InMemoryInteractionStore::new());
    let a = RecommendationEngine::new()
        .with_clock(FixedClock(9))
        .with_store(store.clone());
    let b = RecommendationEngine::new()
        .with_clock(FixedClock(9))
        .with_store(store.clone());

    let ctx = UserContext::new("user-3");
    let rec = a.select_action("Merhaba", &ctx).unwrap();
    a.record_interaction("user-3", &rec.action_id, 1.0, &rec.context);

    assert_eq!(b.performance().total_interactions, 1);
    assert_eq!(store.by_user("user-3").len(), 1);
}
