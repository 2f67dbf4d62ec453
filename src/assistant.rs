//! Assistant facade
//!
//! One call from query to answer: providers fan out, the coordinator
//! picks and merges agents. Recommendation feedback goes through here too.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::agent::{
    AgentSelector, Coordinator, ExecutionStats, LlmAgentSelector, ReasoningStep, RunMode, ToolOrchestrator,
};
use crate::config::Config;
use crate::provider::{ProviderRegistry, StaticDataProvider};
use crate::recommendation::{
    PerformanceSummary, Recommendation, RecommendationContext, RecommendationEngine, RecommendationError,
    UserInteraction,
};
use crate::types::{AgentResponse, ToolKind, UserContext};

/// Everything produced for a single query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantReply {
    pub response: AgentResponse,
    pub mode: RunMode,
    pub stats: ExecutionStats,
    /// Empty unless the ReAct pass ran
    pub reasoning: Vec<ReasoningStep>,
}

/// Orchestrator, coordinator and recommendation engine wired together
pub struct Assistant {
    orchestrator: ToolOrchestrator,
    coordinator: Coordinator,
    engine: Arc<RecommendationEngine>,
    mode: RunMode,
}

impl Assistant {
    /// Default tuning, keyword-only agent selection
    pub fn new(providers: ProviderRegistry) -> Self {
        Self::assemble(&Config::default(), providers, RecommendationEngine::new(), Coordinator::new())
    }

    /// Build from configuration. The language-model selector is enabled
    /// only when an Ollama URL is configured.
    pub fn from_config(config: &Config, providers: ProviderRegistry) -> Self {
        let engine = RecommendationEngine::new().with_config(config.bandit.clone());
        let selector: Option<Arc<dyn AgentSelector>> = match config.llm.ollama_url {
            Some(_) => Some(Arc::new(LlmAgentSelector::new(config.llm.clone()))),
            None => None,
        };
        let coordinator = Coordinator::with_config(config.coordinator.clone(), selector);
        Self::assemble(config, providers, engine, coordinator)
    }

    /// Use a prepared engine, e.g. one with a fixed clock or a custom store
    pub fn with_engine(config: &Config, providers: ProviderRegistry, engine: RecommendationEngine) -> Self {
        Self::assemble(config, providers, engine, Coordinator::with_config(config.coordinator.clone(), None))
    }

    fn assemble(
        config: &Config,
        mut providers: ProviderRegistry,
        engine: RecommendationEngine,
        coordinator: Coordinator,
    ) -> Self {
        let engine = Arc::new(engine);
        if !providers.contains(ToolKind::StaticData) {
            providers.register(Arc::new(StaticDataProvider::new()));
        }
        if !providers.contains(ToolKind::Recommendation) {
            providers.register(engine.clone());
        }

        info!(
            "Assistant ready: providers {:?}, llm selection {}",
            providers.kinds(),
            if coordinator.has_selector() { "on" } else { "off" }
        );

        Self {
            orchestrator: ToolOrchestrator::with_config(
                providers,
                config.orchestrator.clone(),
                config.reasoning.clone(),
            ),
            coordinator,
            engine,
            mode: config.orchestrator.default_mode(),
        }
    }

    pub fn orchestrator(&self) -> &ToolOrchestrator {
        &self.orchestrator
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    pub fn engine(&self) -> &RecommendationEngine {
        &self.engine
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    /// Answer a query in the configured mode
    pub async fn process(&self, query: &str, ctx: &UserContext) -> AgentResponse {
        self.process_with_mode(self.mode, query, ctx).await.response
    }

    pub async fn process_with_mode(&self, mode: RunMode, query: &str, ctx: &UserContext) -> AssistantReply {
        let results = self.orchestrator.run(mode, query, ctx).await;
        let stats = self.orchestrator.execution_stats(&results);
        let reasoning = if mode == RunMode::React {
            self.orchestrator.last_reasoning()
        } else {
            Vec::new()
        };

        let response = self.coordinator.execute(query, ctx, &results).await;
        info!(
            "Answered '{}' via {:?}: {} results, confidence {:.2}",
            query, mode, stats.total_providers, response.confidence
        );

        AssistantReply {
            response,
            mode,
            stats,
            reasoning,
        }
    }

    pub fn recommend(&self, query: &str, ctx: &UserContext) -> Result<Recommendation, RecommendationError> {
        self.engine.select_action(query, ctx)
    }

    pub fn record_feedback(
        &self,
        user_id: &str,
        action_id: &str,
        reward: f64,
        context: &RecommendationContext,
    ) -> UserInteraction {
        self.engine.record_interaction(user_id, action_id, reward, context)
    }

    pub fn performance(&self) -> PerformanceSummary {
        self.engine.performance()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommendation::FixedClock;

    #[test]
    fn test_builtin_providers_are_registered() {
        let assistant = Assistant::new(ProviderRegistry::new());
        let kinds = assistant.orchestrator().registry().kinds();
        assert_eq!(kinds, vec![ToolKind::StaticData, ToolKind::Recommendation]);
        assert_eq!(assistant.mode(), RunMode::React);
        assert!(!assistant.coordinator().has_selector());
    }

    #[test]
    fn test_selector_enabled_by_ollama_url() {
        let mut config = Config::default();
        config.llm.ollama_url = Some("http://localhost:11434".to_string());
        let assistant = Assistant::from_config(&config, ProviderRegistry::new());
        assert!(assistant.coordinator().has_selector());
    }

    #[test]
    fn test_feedback_shares_the_registered_engine() {
        let engine = RecommendationEngine::new().with_clock(FixedClock(10));
        let assistant = Assistant::with_engine(&Config::default(), ProviderRegistry::new(), engine);
        let ctx = UserContext::new("u1");

        let rec = assistant.recommend("Merhaba", &ctx).unwrap();
        assistant.record_feedback("u1", &rec.action_id, 0.9, &rec.context);
        assert_eq!(assistant.performance().total_interactions, 1);
    }
}
