//! ReAct Reasoning Loop
//!
//! Bounded reason → act → observe cycle over a provider result set:
//! - Reason: summarize the results, classify the query, fold in the last step
//! - Act: pick the next action from a fixed decision table
//! - Observe: judge the set and append a web-search fallback when it is weak
//!
//! The loop stops on the first successful step or after `max_steps`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use tracing::{debug, info};

use crate::keywords::{contains_any, normalize};
use crate::types::{clamp_unit, ToolKind, ToolResult, UserContext, DEFAULT_CITY, UNKNOWN_DISTRICT};

/// Tuning knobs for the reasoning loop
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReasoningConfig {
    /// Hard cap on steps per query
    pub max_steps: usize,
    /// Results at or below this carry no real signal
    pub signal_threshold: f64,
    /// Best result must exceed this for the set to count as answered
    pub success_threshold: f64,
    /// A set where every result is below this triggers a fallback
    pub fallback_threshold: f64,
    /// Confidence of the synthetic web-search fallback result
    pub fallback_confidence: f64,
    pub base_step_confidence: f64,
    pub success_boost: f64,
    pub error_penalty: f64,
    pub empty_penalty: f64,
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            max_steps: 5,
            signal_threshold: 0.1,
            success_threshold: 0.5,
            fallback_threshold: 0.3,
            fallback_confidence: 0.6,
            base_step_confidence: 0.5,
            success_boost: 0.3,
            error_penalty: 0.4,
            empty_penalty: 0.3,
        }
    }
}

/// One reason → act → observe record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningStep {
    pub step: usize,
    pub reasoning: String,
    pub action: String,
    pub observation: String,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
}

/// Coarse query category driving the default action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    Hospital,
    FirstAid,
    Emergency,
    Location,
    General,
}

impl QueryType {
    pub fn classify(query: &str) -> Self {
        let q = normalize(query);
        if contains_any(&q, &["hastane", "doktor"]) {
            Self::Hospital
        } else if contains_any(&q, &["ilkyardım", "yaşam üçgeni"]) {
            Self::FirstAid
        } else if contains_any(&q, &["acil", "emergency"]) {
            Self::Emergency
        } else if contains_any(&q, &["konum", "nerede"]) {
            Self::Location
        } else {
            Self::General
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hospital => "hospital",
            Self::FirstAid => "first_aid",
            Self::Emergency => "emergency",
            Self::Location => "location",
            Self::General => "general",
        }
    }

    /// Default action when the result set looks healthy
    fn action(&self) -> &'static str {
        match self {
            Self::Hospital => "Hastane araması için location ve websearch araçlarını kullan",
            Self::FirstAid => "İlkyardım bilgisi için ilkyardim aracını kullan",
            Self::Emergency => "Acil durum için emergency aracını kullan",
            Self::Location => "Konum bilgisi için location aracını kullan",
            Self::General => "Genel bilgi için websearch aracını kullan",
        }
    }
}

/// Aggregate view of a result set
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSummary {
    pub total: usize,
    pub successful: usize,
    pub max_confidence: f64,
    pub errors: Vec<String>,
}

impl ResultSummary {
    pub fn of(results: &[ToolResult], config: &ReasoningConfig) -> Self {
        let mut summary = Self {
            total: results.len(),
            successful: 0,
            max_confidence: 0.0,
            errors: Vec::new(),
        };
        for result in results {
            if result.confidence > config.signal_threshold {
                summary.successful += 1;
                summary.max_confidence = summary.max_confidence.max(result.confidence);
            }
            if let Some(err) = result.error() {
                summary.errors.push(err);
            }
        }
        summary
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.successful == 0
    }

    pub fn has_low_confidence(&self, config: &ReasoningConfig) -> bool {
        self.max_confidence < config.success_threshold
    }
}

impl fmt::Display for ResultSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.total == 0 {
            f.write_str("Hiç araç sonucu yok")
        } else {
            write!(f, "{} araç, {} başarılı", self.total, self.successful)
        }
    }
}

/// What a step saw
#[derive(Debug, Clone, PartialEq)]
pub enum Observation {
    Error(Vec<String>),
    NoResults { total: usize },
    LowConfidence { max: f64 },
    Success { total: usize, successful: usize, max: f64 },
}

impl Observation {
    fn from_summary(summary: &ResultSummary, config: &ReasoningConfig) -> Self {
        if summary.has_errors() {
            Self::Error(summary.errors.clone())
        } else if summary.is_empty() {
            Self::NoResults { total: summary.total }
        } else if summary.has_low_confidence(config) {
            Self::LowConfidence { max: summary.max_confidence }
        } else {
            Self::Success {
                total: summary.total,
                successful: summary.successful,
                max: summary.max_confidence,
            }
        }
    }

    /// Step confidence implied by this observation
    pub fn confidence(&self, config: &ReasoningConfig) -> f64 {
        let delta = match self {
            Self::Success { .. } => config.success_boost,
            Self::Error(_) => -config.error_penalty,
            Self::NoResults { .. } => -config.empty_penalty,
            Self::LowConfidence { .. } => 0.0,
        };
        clamp_unit(config.base_step_confidence + delta)
    }

    fn wants_fallback(&self) -> bool {
        matches!(self, Self::Error(_) | Self::NoResults { .. })
    }
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error(errors) => write!(f, "Hata: {}", errors.join(", ")),
            Self::NoResults { total } => {
                write!(f, "Sonuç bulunamadı: {} araç çalıştı ama sonuç yok", total)
            }
            Self::LowConfidence { max } => {
                write!(f, "Düşük güven: En yüksek güven skoru {:.2}", max)
            }
            Self::Success { total, successful, max } => write!(
                f,
                "Başarılı: {} aracın {} tanesi sonuç verdi. En yüksek güven: {:.2}",
                total, successful, max
            ),
        }
    }
}

/// Result of one [`ReasoningRun::advance`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The set now answers the query
    Succeeded,
    /// Another step may help
    Continue,
    /// Step budget spent without success
    Exhausted,
}

/// Final verdict of a run
#[derive(Debug, Clone)]
pub struct ReasoningOutcome {
    pub success: bool,
    pub best: Option<ToolResult>,
    pub steps: Vec<ReasoningStep>,
}

/// Stateless driver; each query gets its own [`ReasoningRun`]
#[derive(Debug, Clone, Default)]
pub struct ReasoningLoop {
    config: ReasoningConfig,
}

impl ReasoningLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ReasoningConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReasoningConfig {
        &self.config
    }

    /// Start a run over an initial result set
    pub fn begin<'a>(
        &'a self,
        query: &'a str,
        ctx: &'a UserContext,
        results: Vec<ToolResult>,
    ) -> ReasoningRun<'a> {
        info!("ReAct loop started: \"{}\" ({} results)", query, results.len());
        ReasoningRun {
            config: &self.config,
            query,
            ctx,
            query_type: QueryType::classify(query),
            results,
            steps: Vec::new(),
            success: false,
        }
    }

    /// Drive a run to completion
    pub fn run(&self, query: &str, ctx: &UserContext, results: Vec<ToolResult>) -> ReasoningOutcome {
        let mut run = self.begin(query, ctx, results);
        while run.advance() == StepOutcome::Continue {}
        run.finish()
    }
}

/// In-flight reasoning over one query
pub struct ReasoningRun<'a> {
    config: &'a ReasoningConfig,
    query: &'a str,
    ctx: &'a UserContext,
    query_type: QueryType,
    results: Vec<ToolResult>,
    steps: Vec<ReasoningStep>,
    success: bool,
}

impl<'a> ReasoningRun<'a> {
    pub fn results(&self) -> &[ToolResult] {
        &self.results
    }

    pub fn steps(&self) -> &[ReasoningStep] {
        &self.steps
    }

    pub fn query_type(&self) -> QueryType {
        self.query_type
    }

    pub fn is_finished(&self) -> bool {
        self.success || self.steps.len() >= self.config.max_steps
    }

    /// Perform exactly one step. No-op once the run is finished.
    pub fn advance(&mut self) -> StepOutcome {
        if self.success {
            return StepOutcome::Succeeded;
        }
        if self.steps.len() >= self.config.max_steps {
            return StepOutcome::Exhausted;
        }

        let step = self.steps.len() + 1;
        let summary = ResultSummary::of(&self.results, self.config);
        let reasoning = self.reason(step, &summary);
        let action = self.decide(&summary);
        let observation = Observation::from_summary(&summary, self.config);

        debug!("ReAct step {}: {} -> {} -> {}", step, reasoning, action, observation);

        self.steps.push(ReasoningStep {
            step,
            reasoning,
            action: action.to_string(),
            observation: observation.to_string(),
            confidence: observation.confidence(self.config),
            timestamp: Utc::now(),
        });

        if self.is_success() {
            self.success = true;
            info!("ReAct loop succeeded at step {}", step);
            return StepOutcome::Succeeded;
        }

        if self.needs_fallback(&observation) {
            let fallback = self.fallback_result();
            self.results.push(fallback);
            debug!("Fallback applied, {} results", self.results.len());
        }

        if self.steps.len() >= self.config.max_steps {
            info!("ReAct loop exhausted after {} steps", self.steps.len());
            StepOutcome::Exhausted
        } else {
            StepOutcome::Continue
        }
    }

    /// Consume the run into its verdict
    pub fn finish(self) -> ReasoningOutcome {
        let best = if self.success { best_result(&self.results) } else { None };
        ReasoningOutcome {
            success: self.success,
            best,
            steps: self.steps,
        }
    }

    fn reason(&self, step: usize, summary: &ResultSummary) -> String {
        let mut text = format!("Adım {}: ", step);

        match self.steps.last() {
            None => {
                text.push_str(&format!(
                    "\"{}\" sorgusu analiz edildi. Tür: {}. Kullanıcı konumu: {}. Mevcut araç sonuçları: {}. ",
                    self.query,
                    self.query_type.as_str(),
                    self.location_summary(),
                    summary
                ));
            }
            Some(last) => {
                text.push_str(&format!(
                    "Son adım: {} → {}. Mevcut durum: {}. ",
                    last.action, last.observation, summary
                ));
            }
        }

        if summary.has_errors() {
            text.push_str(&format!("Hata tespit edildi: {}. ", summary.errors.join(", ")));
        }
        if summary.is_empty() {
            text.push_str("Sonuç bulunamadı, fallback gerekli. ");
        }
        text.trim_end().to_string()
    }

    fn decide(&self, summary: &ResultSummary) -> &'static str {
        if summary.has_errors() {
            "Hata tespit edildi, fallback araçlarını kullan"
        } else if summary.is_empty() {
            "Sonuç bulunamadı, web search fallback'i uygula"
        } else if summary.has_low_confidence(self.config) {
            "Düşük güven skoru, alternatif araçları dene"
        } else {
            self.query_type.action()
        }
    }

    fn location_summary(&self) -> String {
        match &self.ctx.location {
            None => "Konum bilgisi yok".to_string(),
            Some(loc) => {
                let district = if loc.district.is_empty() { UNKNOWN_DISTRICT } else { loc.district.as_str() };
                let city = if loc.city.is_empty() { DEFAULT_CITY } else { loc.city.as_str() };
                format!("{}, {}", district, city)
            }
        }
    }

    fn is_success(&self) -> bool {
        self.results.iter().any(|r| r.confidence > self.config.success_threshold)
            && !self.results.iter().any(|r| r.has_error())
    }

    fn needs_fallback(&self, observation: &Observation) -> bool {
        observation.wants_fallback()
            || self.results.is_empty()
            || self.results.iter().all(|r| r.confidence < self.config.fallback_threshold)
    }

    fn fallback_result(&self) -> ToolResult {
        ToolResult::new(
            ToolKind::WebSearch,
            json!({
                "query": self.query,
                "results": [{
                    "title": format!("{} - Web Arama Sonucu", self.query),
                    "snippet": "Web araması ile bulunan sonuç",
                    "content": format!(
                        "\"{}\" için web araması sonucu. Detaylı bilgi için web sitesini ziyaret edin.",
                        self.query
                    ),
                }],
                "fallback": true,
            }),
            self.config.fallback_confidence,
        )
        .with_source("websearch_fallback")
    }
}

/// Highest-confidence result, first occurrence on ties
pub fn best_result(results: &[ToolResult]) -> Option<ToolResult> {
    let mut best: Option<&ToolResult> = None;
    for result in results {
        match best {
            Some(b) if result.confidence <= b.confidence => {}
            _ => best = Some(result),
        }
    }
    best.cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(kind: ToolKind, confidence: f64) -> ToolResult {
        ToolResult::new(kind, json!({"ok": true}), confidence)
    }

    fn ctx() -> UserContext {
        UserContext::new("u1").with_location("Kadıköy", "İstanbul")
    }

    #[test]
    fn test_success_on_first_step() {
        let engine = ReasoningLoop::new();
        let outcome = engine.run(
            "hastane nerede",
            &ctx(),
            vec![result(ToolKind::Location, 0.8), result(ToolKind::WebSearch, 0.7)],
        );

        assert!(outcome.success);
        assert_eq!(outcome.steps.len(), 1);
        assert_eq!(outcome.best.unwrap().kind, ToolKind::Location);
        assert!((outcome.steps[0].confidence - 0.8).abs() < 1e-9);
        assert!(outcome.steps[0].observation.starts_with("Başarılı"));
    }

    #[test]
    fn test_empty_set_recovers_via_fallback() {
        let engine = ReasoningLoop::new();
        let ctx = ctx();
        let mut run = engine.begin("deprem bilgisi", &ctx, vec![]);

        assert_eq!(run.advance(), StepOutcome::Continue);
        assert_eq!(run.results().len(), 1);
        assert_eq!(run.results()[0].source, "websearch_fallback");
        assert_eq!(run.results()[0].data["fallback"], true);
        assert!((run.steps()[0].confidence - 0.2).abs() < 1e-9);

        assert_eq!(run.advance(), StepOutcome::Succeeded);
        let outcome = run.finish();
        assert!(outcome.success);
        assert_eq!(outcome.steps.len(), 2);
        assert_eq!(outcome.best.unwrap().kind, ToolKind::WebSearch);
    }

    #[test]
    fn test_fallback_appends_exactly_one_result() {
        let engine = ReasoningLoop::new();
        let ctx = ctx();
        let mut run = engine.begin("q", &ctx, vec![result(ToolKind::Social, 0.2)]);
        run.advance();
        assert_eq!(run.results().len(), 2);
    }

    #[test]
    fn test_low_confidence_above_fallback_threshold_does_not_fallback() {
        let engine = ReasoningLoop::new();
        let ctx = ctx();
        let mut run = engine.begin("q", &ctx, vec![result(ToolKind::Social, 0.4)]);
        assert_eq!(run.advance(), StepOutcome::Continue);
        assert_eq!(run.results().len(), 1);
        assert!(run.steps()[0].observation.starts_with("Düşük güven"));
        assert!((run.steps()[0].confidence - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_error_results_exhaust_the_budget() {
        let engine = ReasoningLoop::new();
        let outcome = engine.run(
            "hastane",
            &ctx(),
            vec![ToolResult::failed(ToolKind::Location, "servis yok")],
        );

        assert!(!outcome.success);
        assert!(outcome.best.is_none());
        assert_eq!(outcome.steps.len(), 5);
        assert!(outcome.steps[0].observation.starts_with("Hata: servis yok"));
        assert!((outcome.steps[0].confidence - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_step_count_never_exceeds_max_steps() {
        let engine = ReasoningLoop::with_config(ReasoningConfig {
            max_steps: 3,
            ..Default::default()
        });
        let ctx = ctx();
        let mut run = engine.begin("q", &ctx, vec![ToolResult::failed(ToolKind::Network, "x")]);
        for _ in 0..10 {
            run.advance();
        }
        assert_eq!(run.steps().len(), 3);
        assert!(run.is_finished());
        assert_eq!(run.advance(), StepOutcome::Exhausted);
    }

    #[test]
    fn test_second_step_folds_in_previous() {
        let engine = ReasoningLoop::new();
        let ctx = ctx();
        let mut run = engine.begin("q", &ctx, vec![result(ToolKind::Social, 0.4)]);
        run.advance();
        run.advance();
        assert!(run.steps()[1].reasoning.contains("Son adım: Düşük güven skoru"));
        assert!(run.steps()[0].reasoning.contains("Kadıköy, İstanbul"));
    }

    #[test]
    fn test_best_result_first_on_ties() {
        let results = vec![
            result(ToolKind::Location, 0.7).with_source("first"),
            result(ToolKind::WebSearch, 0.7).with_source("second"),
        ];
        assert_eq!(best_result(&results).unwrap().source, "first");
        assert!(best_result(&[]).is_none());
    }

    #[test]
    fn test_query_type_classification() {
        assert_eq!(QueryType::classify("Doktor lazım"), QueryType::Hospital);
        assert_eq!(QueryType::classify("İlkyardım"), QueryType::FirstAid);
        assert_eq!(QueryType::classify("ACİL"), QueryType::Emergency);
        assert_eq!(QueryType::classify("konumum"), QueryType::Location);
        assert_eq!(QueryType::classify("merhaba"), QueryType::General);
    }
}
