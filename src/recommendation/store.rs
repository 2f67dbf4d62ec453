//! Interaction Store
//!
//! Append-only feedback log read by the bandit. Three views are kept:
//! per user, per action, and per action within a context key.
//! Nothing is ever evicted or de-duplicated.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use super::context::RecommendationContext;

/// One observed reward for a recommended action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInteraction {
    pub id: Uuid,
    pub user_id: String,
    pub action_id: String,
    /// Always within [0, 1]
    pub reward: f64,
    pub timestamp: DateTime<Utc>,
    pub context: RecommendationContext,
}

impl UserInteraction {
    pub fn new(user_id: &str, action_id: &str, reward: f64, context: RecommendationContext) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            action_id: action_id.to_string(),
            reward: crate::types::clamp_unit(reward),
            timestamp: Utc::now(),
            context,
        }
    }

    pub fn context_key(&self) -> String {
        self.context.context_key()
    }
}

/// Aggregate view of the feedback log
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub total_interactions: usize,
    /// 0.0 when there is no feedback yet
    pub average_reward: f64,
    pub unique_users: usize,
    pub unique_actions: usize,
    pub context_keys: usize,
}

/// Storage behind the bandit. Implementations must be append-only.
pub trait InteractionStore: Send + Sync {
    fn insert(&self, interaction: UserInteraction);

    /// All interactions of one user, oldest first
    fn by_user(&self, user_id: &str) -> Vec<UserInteraction>;

    /// Rewards observed for `action_id` under `context_key`
    fn context_rewards(&self, context_key: &str, action_id: &str) -> Vec<f64>;

    fn summary(&self) -> PerformanceSummary;
}

#[derive(Default)]
struct Indices {
    by_user: HashMap<String, Vec<UserInteraction>>,
    by_action: HashMap<String, Vec<f64>>,
    by_context: HashMap<String, HashMap<String, Vec<f64>>>,
}

/// Process-local store; grows without bound
#[derive(Default)]
pub struct InMemoryInteractionStore {
    inner: RwLock<Indices>,
}

impl InMemoryInteractionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().by_user.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl InteractionStore for InMemoryInteractionStore {
    fn insert(&self, interaction: UserInteraction) {
        let key = interaction.context_key();
        let mut inner = self.inner.write();

        inner
            .by_action
            .entry(interaction.action_id.clone())
            .or_default()
            .push(interaction.reward);
        inner
            .by_context
            .entry(key)
            .or_default()
            .entry(interaction.action_id.clone())
            .or_default()
            .push(interaction.reward);
        inner
            .by_user
            .entry(interaction.user_id.clone())
            .or_default()
            .push(interaction);
    }

    fn by_user(&self, user_id: &str) -> Vec<UserInteraction> {
        self.inner.read().by_user.get(user_id).cloned().unwrap_or_default()
    }

    fn context_rewards(&self, context_key: &str, action_id: &str) -> Vec<f64> {
        self.inner
            .read()
            .by_context
            .get(context_key)
            .and_then(|actions| actions.get(action_id))
            .cloned()
            .unwrap_or_default()
    }

    fn summary(&self) -> PerformanceSummary {
        let inner = self.inner.read();
        let total_interactions = inner.by_user.values().map(Vec::len).sum::<usize>();
        let reward_sum = inner.by_action.values().flatten().sum::<f64>();
        let average_reward = if total_interactions == 0 {
            0.0
        } else {
            reward_sum / total_interactions as f64
        };

        PerformanceSummary {
            total_interactions,
            average_reward,
            unique_users: inner.by_user.len(),
            unique_actions: inner.by_action.len(),
            context_keys: inner.by_context.len(),
        }
    }
}
