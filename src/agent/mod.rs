//! Agent Pipeline
//!
//! Query handling from provider fan-out to a merged answer:
//! - Tool orchestration (keyword subset or all providers, concurrent)
//! - ReAct reasoning (bounded reason → act → observe with fallbacks)
//! - Agent selection (language model with keyword fallback)
//! - Specialized template agents and response merging
//!
//! Flow: Orchestrate → Reason → Analyze → Select → Respond → Merge

pub mod analysis;
pub mod coordinator;
pub mod orchestrator;
pub mod reasoning;
pub mod selector;
pub mod specialized;

pub use analysis::{Complexity, Intent, QueryAnalysis};
pub use coordinator::{Coordinator, CoordinatorConfig};
pub use orchestrator::{ExecutionStats, OrchestratorConfig, RunMode, ToolOrchestrator};
pub use reasoning::{Observation, QueryType, ReasoningConfig, ReasoningLoop, ReasoningOutcome, ReasoningStep};
pub use selector::{keyword_fallback, AgentKind, AgentSelector, LlmAgentSelector, SelectionDecision};
pub use specialized::{EmergencyContact, SpecializedAgent};
