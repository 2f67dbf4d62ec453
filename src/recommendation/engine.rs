//! Contextual bandit scoring and selection.
//!
//! Each candidate's score is the sum of:
//! - prior: `expected_reward * context_relevance`
//! - exploration: UCB1 over the user's own history, flat bonus for untried actions
//! - exploitation: mean reward under the current context key
//! - emergency, night, location and intent bonuses
//!
//! There is no randomness; identical history and context give identical rankings.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use super::catalog::{candidate_actions, RecommendationAction};
use super::context::{ActionType, Clock, RecommendationContext, RecommendationIntent, SystemClock, TimeOfDay};
use super::store::{InMemoryInteractionStore, InteractionStore, PerformanceSummary, UserInteraction};
use crate::provider::{CapabilityProvider, ProviderError, ToolInput};
use crate::types::{Severity, ToolKind, ToolResult, UserContext};

/// Errors from action selection
#[derive(Debug, thiserror::Error)]
pub enum RecommendationError {
    #[error("No candidate actions for context {0}")]
    NoCandidates(String),
}

/// Scoring weights. Defaults reproduce the production tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BanditConfig {
    /// UCB1 exploration factor `c`
    pub exploration_factor: f64,
    /// Exploration bonus for an action the user never chose
    pub new_action_bonus: f64,
    /// Exploitation score with no history under the context key
    pub default_exploitation: f64,
    pub critical_bonus: f64,
    pub high_bonus: f64,
    pub night_bonus: f64,
    pub location_bonus: f64,
    pub social_intent_bonus: f64,
    pub network_intent_bonus: f64,
    pub location_intent_bonus: f64,
    pub emergency_intent_bonus: f64,
    pub notification_intent_bonus: f64,
    pub max_alternatives: usize,
}

impl Default for BanditConfig {
    fn default() -> Self {
        Self {
            exploration_factor: 2.0,
            new_action_bonus: 1.0,
            default_exploitation: 0.5,
            critical_bonus: 2.0,
            high_bonus: 1.0,
            night_bonus: 0.5,
            location_bonus: 0.3,
            social_intent_bonus: 1.5,
            network_intent_bonus: 1.2,
            location_intent_bonus: 1.2,
            emergency_intent_bonus: 1.0,
            notification_intent_bonus: 1.0,
            max_alternatives: 2,
        }
    }
}

impl BanditConfig {
    fn intent_bonus(&self, intent: RecommendationIntent) -> f64 {
        match intent {
            RecommendationIntent::Social => self.social_intent_bonus,
            RecommendationIntent::Network => self.network_intent_bonus,
            RecommendationIntent::Location => self.location_intent_bonus,
            RecommendationIntent::Emergency => self.emergency_intent_bonus,
            RecommendationIntent::Notification => self.notification_intent_bonus,
            RecommendationIntent::General => 0.0,
        }
    }
}

/// Per-term contribution to an action's score
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub base: f64,
    pub exploration: f64,
    pub exploitation: f64,
    pub emergency: f64,
    pub time: f64,
    pub location: f64,
    pub intent: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.base + self.exploration + self.exploitation + self.emergency + self.time + self.location + self.intent
    }
}

/// A candidate with its score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredAction {
    pub action: RecommendationAction,
    pub score: ScoreBreakdown,
    /// Times this user chose the action before
    pub times_chosen: usize,
    /// Rewards observed under the current context key
    pub context_observations: usize,
}

/// Runner-up action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    pub id: String,
    pub title: String,
    pub confidence: f64,
}

/// Output of [`RecommendationEngine::select_action`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub action_id: String,
    #[serde(rename = "type")]
    pub kind: ActionType,
    pub title: String,
    pub description: String,
    pub confidence: f64,
    pub reasoning: String,
    pub alternatives: Vec<Alternative>,
    pub context_key: String,
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
    pub score: ScoreBreakdown,
    /// Context the choice was made in; pass it back to `record_interaction`
    pub context: RecommendationContext,
}

/// Next-best-action selector with online feedback
pub struct RecommendationEngine {
    config: BanditConfig,
    store: Arc<dyn InteractionStore>,
    clock: Arc<dyn Clock>,
}

impl RecommendationEngine {
    pub fn new() -> Self {
        Self {
            config: BanditConfig::default(),
            store: Arc::new(InMemoryInteractionStore::new()),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_config(mut self, config: BanditConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_store(mut self, store: Arc<dyn InteractionStore>) -> Self {
        self.store = store;
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn config(&self) -> &BanditConfig {
        &self.config
    }

    /// Bandit context for a request, using the engine's clock
    pub fn context(&self, query: &str, ctx: &UserContext) -> RecommendationContext {
        RecommendationContext::build(query, ctx, self.clock.as_ref())
    }

    /// Score every candidate, highest first. Ties keep catalog order.
    pub fn rank(&self, ctx: &RecommendationContext) -> Vec<ScoredAction> {
        let history = self.store.by_user(&ctx.user_id);
        let total = history.len();
        let context_key = ctx.context_key();

        let mut scored = candidate_actions(ctx)
            .into_iter()
            .map(|action| {
                let times_chosen = history.iter().filter(|i| i.action_id == action.id).count();
                let rewards = self.store.context_rewards(&context_key, &action.id);

                let exploration = if total == 0 || times_chosen == 0 {
                    self.config.new_action_bonus
                } else {
                    self.config.exploration_factor * ((total as f64).ln() / times_chosen as f64).sqrt()
                };
                let exploitation = if rewards.is_empty() {
                    self.config.default_exploitation
                } else {
                    rewards.iter().sum::<f64>() / rewards.len() as f64
                };

                let is_emergency = action.kind == ActionType::Emergency;
                let emergency = match (is_emergency, ctx.emergency_level) {
                    (true, Severity::Critical) => self.config.critical_bonus,
                    (true, Severity::High) => self.config.high_bonus,
                    _ => 0.0,
                };
                let time = if is_emergency && ctx.time_of_day == TimeOfDay::Night {
                    self.config.night_bonus
                } else {
                    0.0
                };
                let location = if action.kind == ActionType::Location && ctx.has_district() {
                    self.config.location_bonus
                } else {
                    0.0
                };
                let intent = if ctx.primary_intent.action_type() == Some(action.kind) {
                    self.config.intent_bonus(ctx.primary_intent)
                } else {
                    0.0
                };

                ScoredAction {
                    score: ScoreBreakdown {
                        base: action.base_score(),
                        exploration,
                        exploitation,
                        emergency,
                        time,
                        location,
                        intent,
                    },
                    action,
                    times_chosen,
                    context_observations: rewards.len(),
                }
            })
            .collect::<Vec<_>>();

        scored.sort_by(|a, b| b.score.total().total_cmp(&a.score.total()));
        scored
    }

    /// Pick the top action for this query and user
    pub fn select_action(&self, query: &str, ctx: &UserContext) -> Result<Recommendation, RecommendationError> {
        let context = self.context(query, ctx);
        self.recommend(context)
    }

    /// Pick the top action for a prepared context
    pub fn recommend(&self, context: RecommendationContext) -> Result<Recommendation, RecommendationError> {
        let ranked = self.rank(&context);
        for (i, s) in ranked.iter().enumerate() {
            debug!(
                "  {}. {} (score: {:.3}, base={:.3}, exploration={:.3}, exploitation={:.3}, intent={:.3})",
                i + 1,
                s.action.id,
                s.score.total(),
                s.score.base,
                s.score.exploration,
                s.score.exploitation,
                s.score.intent
            );
        }

        let mut ranked = ranked.into_iter();
        let Some(top) = ranked.next() else {
            return Err(RecommendationError::NoCandidates(context.context_key()));
        };
        let alternatives = ranked
            .take(self.config.max_alternatives)
            .map(|s| Alternative {
                id: s.action.id,
                title: s.action.title,
                confidence: s.action.confidence,
            })
            .collect();

        info!(
            "Recommendation for {}: {} (intent {:?}, score {:.3})",
            context.user_id,
            top.action.id,
            context.primary_intent,
            top.score.total()
        );

        Ok(Recommendation {
            reasoning: self.justify(&top, &context),
            action_id: top.action.id,
            kind: top.action.kind,
            title: top.action.title,
            description: top.action.description,
            confidence: top.action.confidence,
            alternatives,
            context_key: context.context_key(),
            user_id: context.user_id.clone(),
            timestamp: Utc::now(),
            score: top.score,
            context,
        })
    }

    fn justify(&self, scored: &ScoredAction, ctx: &RecommendationContext) -> String {
        let mut reasons = Vec::new();
        if scored.action.context_relevance > 0.8 {
            reasons.push("Mevcut durumunuza çok uygun");
        }
        if scored.action.expected_reward > 0.8 {
            reasons.push("Yüksek fayda potansiyeli");
        }
        if scored.score.emergency > 0.0 {
            reasons.push("Acil durum önceliği");
        }
        if scored.score.time > 0.0 {
            reasons.push("Gece saatleri için optimize edilmiş");
        }
        if scored.score.location > 0.0 {
            reasons.push("Konumunuza yakın");
        }
        if scored.score.intent > 0.0 {
            reasons.push("Sorunuzla doğrudan ilgili");
        }
        if scored.times_chosen == 0 && !self.store.by_user(&ctx.user_id).is_empty() {
            reasons.push("Daha önce denemediğiniz bir öneri");
        }
        if scored.context_observations > 0 && scored.score.exploitation > self.config.default_exploitation {
            reasons.push("Geçmişte işinize yaradı");
        }

        if reasons.is_empty() {
            "Genel öneri".to_string()
        } else {
            reasons.join(", ")
        }
    }

    /// Append one feedback observation. Reward is clamped into [0, 1].
    pub fn record_interaction(
        &self,
        user_id: &str,
        action_id: &str,
        reward: f64,
        context: &RecommendationContext,
    ) -> UserInteraction {
        let interaction = UserInteraction::new(user_id, action_id, reward, context.clone());
        info!(
            "Feedback recorded: {} -> {:.2} (user: {})",
            action_id, interaction.reward, user_id
        );
        self.store.insert(interaction.clone());
        interaction
    }

    pub fn performance(&self) -> PerformanceSummary {
        self.store.summary()
    }
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CapabilityProvider for RecommendationEngine {
    fn name(&self) -> &str {
        "recommendation"
    }

    fn kind(&self) -> ToolKind {
        ToolKind::Recommendation
    }

    async fn execute(&self, input: &ToolInput) -> Result<Option<ToolResult>, ProviderError> {
        let recommendation = self
            .select_action(&input.query, &input.user_context)
            .map_err(|e| ProviderError::Failed(e.to_string()))?;
        let confidence = recommendation.confidence;
        let data = serde_json::to_value(&recommendation).map_err(|e| ProviderError::Failed(e.to_string()))?;

        Ok(Some(
            ToolResult::new(ToolKind::Recommendation, data, confidence).with_source("recommendation_tool"),
        ))
    }
}
