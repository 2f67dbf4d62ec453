//! Tool Orchestration
//!
//! Entry point of the pipeline:
//! - Provider subset selection from keyword families
//! - Concurrent fan-out with per-provider timeout and error isolation
//! - Optional ReAct pass with a websearch → static_data fallback chain
//!
//! A failing or slow provider never fails the request; it just contributes
//! no result.

use futures_util::future::join_all;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::reasoning::{ReasoningConfig, ReasoningLoop, ReasoningStep};
use crate::keywords;
use crate::provider::{CapabilityProvider, ProviderError, ProviderRegistry, ToolInput};
use crate::types::{ToolKind, ToolResult, UserContext};

/// Providers tried in order when the reasoning loop gives up on an empty set
const FALLBACK_CHAIN: [ToolKind; 2] = [ToolKind::WebSearch, ToolKind::StaticData];

/// Orchestrator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Per-provider timeout in milliseconds
    pub provider_timeout_ms: u64,
    /// Default to the ReAct pass rather than the plain keyword subset
    pub use_reasoning: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            provider_timeout_ms: 10_000,
            use_reasoning: true,
        }
    }
}

impl OrchestratorConfig {
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_millis(self.provider_timeout_ms)
    }

    pub fn default_mode(&self) -> RunMode {
        if self.use_reasoning {
            RunMode::React
        } else {
            RunMode::Selected
        }
    }
}

/// How a request should be fanned out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    All,
    Selected,
    React,
}

/// Aggregate numbers over one result set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionStats {
    pub total_providers: usize,
    pub successful: usize,
    /// Rounded to two decimals
    pub average_confidence: f64,
    pub kinds: Vec<ToolKind>,
}

/// Fans a query out to capability providers
pub struct ToolOrchestrator {
    registry: ProviderRegistry,
    reasoning: ReasoningLoop,
    config: OrchestratorConfig,
    last_reasoning: Mutex<Vec<ReasoningStep>>,
}

impl ToolOrchestrator {
    /// Create an orchestrator with default tuning
    pub fn new(registry: ProviderRegistry) -> Self {
        Self::with_config(registry, OrchestratorConfig::default(), ReasoningConfig::default())
    }

    pub fn with_config(
        registry: ProviderRegistry,
        config: OrchestratorConfig,
        reasoning: ReasoningConfig,
    ) -> Self {
        info!(
            "Tool orchestrator ready: {} providers, timeout {} ms",
            registry.len(),
            config.provider_timeout_ms
        );
        Self {
            registry,
            reasoning: ReasoningLoop::with_config(reasoning),
            config,
            last_reasoning: Mutex::new(Vec::new()),
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Run in the given mode
    pub async fn run(&self, mode: RunMode, query: &str, ctx: &UserContext) -> Vec<ToolResult> {
        match mode {
            RunMode::All => self.run_all(query, ctx).await,
            RunMode::Selected => self.run_selected(query, ctx).await,
            RunMode::React => self.run_react(query, ctx).await,
        }
    }

    /// Invoke every registered provider concurrently
    pub async fn run_all(&self, query: &str, ctx: &UserContext) -> Vec<ToolResult> {
        info!("Running all {} providers: \"{}\"", self.registry.len(), query);
        self.fan_out(self.registry.all(), query, ctx).await
    }

    /// Invoke only the providers the query's keyword families ask for
    pub async fn run_selected(&self, query: &str, ctx: &UserContext) -> Vec<ToolResult> {
        let kinds = keywords::select_providers(query);
        debug!("Selected provider kinds: {:?}", kinds);
        let providers = kinds
            .iter()
            .filter_map(|k| self.registry.get(*k))
            .collect::<Vec<_>>();
        self.fan_out(providers, query, ctx).await
    }

    /// Invoke an explicit list of provider kinds; unregistered kinds are skipped
    pub async fn run_kinds(&self, kinds: &[ToolKind], query: &str, ctx: &UserContext) -> Vec<ToolResult> {
        let mut providers = Vec::with_capacity(kinds.len());
        for kind in kinds {
            match self.registry.get(*kind) {
                Some(p) => providers.push(p),
                None => warn!("Provider not registered: {}", kind),
            }
        }
        self.fan_out(providers, query, ctx).await
    }

    /// Selected providers followed by the ReAct pass.
    ///
    /// Success yields the single best result. Failure yields the raw selected
    /// set, or the first fallback provider's output when that set is empty.
    pub async fn run_react(&self, query: &str, ctx: &UserContext) -> Vec<ToolResult> {
        let selected = self.run_selected(query, ctx).await;
        let outcome = self.reasoning.run(query, ctx, selected.clone());
        *self.last_reasoning.lock() = outcome.steps;

        if outcome.success {
            if let Some(best) = outcome.best {
                info!("ReAct picked {} (confidence {:.2})", best.kind, best.confidence);
                return vec![best];
            }
        }

        if !selected.is_empty() {
            return selected;
        }

        let input = ToolInput::new(query, ctx);
        for kind in FALLBACK_CHAIN {
            let Some(provider) = self.registry.get(kind) else {
                continue;
            };
            if let Some(result) = self.invoke(provider, &input).await {
                info!("Fallback chain answered with {}", kind);
                return vec![result];
            }
        }

        warn!("No provider produced a result for \"{}\"", query);
        Vec::new()
    }

    /// Step log of the most recent [`run_react`](Self::run_react)
    pub fn last_reasoning(&self) -> Vec<ReasoningStep> {
        self.last_reasoning.lock().clone()
    }

    /// Summarize a result set
    pub fn execution_stats(&self, results: &[ToolResult]) -> ExecutionStats {
        let successful = results.iter().filter(|r| !r.has_error()).count();
        let average = if results.is_empty() {
            0.0
        } else {
            results.iter().map(|r| r.confidence).sum::<f64>() / results.len() as f64
        };
        let mut kinds = Vec::new();
        for r in results {
            if !kinds.contains(&r.kind) {
                kinds.push(r.kind);
            }
        }
        ExecutionStats {
            total_providers: results.len(),
            successful,
            average_confidence: (average * 100.0).round() / 100.0,
            kinds,
        }
    }

    async fn fan_out(
        &self,
        providers: Vec<Arc<dyn CapabilityProvider>>,
        query: &str,
        ctx: &UserContext,
    ) -> Vec<ToolResult> {
        let input = ToolInput::new(query, ctx);
        let start = Instant::now();
        let count = providers.len();

        let results = join_all(providers.into_iter().map(|p| self.invoke(p, &input)))
            .await
            .into_iter()
            .flatten()
            .collect::<Vec<_>>();

        debug!(
            "Fan-out finished: {}/{} providers answered in {} ms",
            results.len(),
            count,
            start.elapsed().as_millis()
        );
        results
    }

    /// Run one provider; every failure mode collapses to `None`
    async fn invoke(&self, provider: Arc<dyn CapabilityProvider>, input: &ToolInput) -> Option<ToolResult> {
        let timeout = self.config.provider_timeout();
        let outcome = match tokio::time::timeout(timeout, provider.execute(input)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(ProviderError::Timeout(self.config.provider_timeout_ms)),
        };

        match outcome {
            Ok(Some(result)) => Some(result),
            Ok(None) => {
                debug!("Provider {} had nothing for this query", provider.name());
                None
            }
            Err(e) => {
                warn!("Provider {} failed: {}", provider.name(), e);
                None
            }
        }
    }
}
