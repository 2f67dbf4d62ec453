//! Recommendation Engine
//!
//! Online contextual bandit that picks one next-best-action per request
//! and learns from reported rewards.

pub mod catalog;
pub mod context;
pub mod engine;
pub mod store;

pub use catalog::{candidate_actions, RecommendationAction};
pub use context::{ActionType, Clock, FixedClock, RecommendationContext, RecommendationIntent, SystemClock, TimeOfDay};
pub use engine::{
    Alternative, BanditConfig, Recommendation, RecommendationEngine, RecommendationError, ScoreBreakdown, ScoredAction,
};
pub use store::{InMemoryInteractionStore, InteractionStore, PerformanceSummary, UserInteraction};
