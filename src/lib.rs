//! REACH+ Agent Core
//!
//! Agentic orchestration and recommendation for a disaster-support assistant.
//!
//! # Features
//!
//! - **Tool Orchestration**: keyword-driven provider subsets, concurrent fan-out, per-provider timeout
//! - **ReAct Reasoning**: bounded reason → act → observe loop with web-search fallback
//! - **Agent Coordination**: LLM agent selection (Ollama) with deterministic keyword fallback
//! - **Specialized Agents**: medical, location, emergency, first aid, population, info
//! - **Recommendations**: contextual bandit (UCB1 exploration + context-keyed exploitation)
//!
//! # Architecture
//!
//! ```text
//! query ──► ToolOrchestrator ──► providers (concurrent)
//!                │
//!                ├── ReasoningLoop (optional, fallbacks)
//!                ▼
//!           Coordinator ──► AgentSelector (Ollama / keywords)
//!                │
//!                ├── Medical / Location / Emergency / İlkyardım / Population / Info
//!                ▼
//!           merged AgentResponse
//!
//! RecommendationEngine ◄── feedback (InteractionStore)
//! ```

pub mod agent;
pub mod assistant;
pub mod config;
pub mod keywords;
pub mod llm;
pub mod provider;
pub mod recommendation;
pub mod types;

pub use agent::{
    AgentKind, AgentSelector, Coordinator, CoordinatorConfig, LlmAgentSelector, QueryAnalysis, ReasoningConfig,
    ReasoningLoop, ReasoningStep, RunMode, ToolOrchestrator,
};
pub use assistant::{Assistant, AssistantReply};
pub use config::Config;
pub use llm::{LlmConfig, LlmError};
pub use provider::{CapabilityProvider, FnProvider, ProviderError, ProviderRegistry, StaticDataProvider, ToolInput};
pub use recommendation::{BanditConfig, Recommendation, RecommendationEngine, PerformanceSummary};
pub use types::{ActionItem, AgentResponse, Location, Severity, ToolKind, ToolResult, UserContext};
