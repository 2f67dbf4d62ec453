//! Population agent. Relays demographic summaries from the population provider.

use super::{strings, SpecializedAgent};
use crate::agent::selector::AgentKind;
use crate::types::{AgentResponse, ToolKind, ToolResult, UserContext};

#[derive(Debug, Clone, Copy, Default)]
pub struct PopulationAgent;

impl PopulationAgent {
    pub fn new() -> Self {
        Self
    }
}

impl SpecializedAgent for PopulationAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Population
    }

    fn respond(&self, _query: &str, _ctx: &UserContext, results: &[ToolResult]) -> AgentResponse {
        let analysis = results
            .iter()
            .find(|r| r.kind == ToolKind::Population && !r.has_error() && r.has_data());

        match analysis {
            Some(result) => AgentResponse::new(
                result
                    .data_str("message")
                    .unwrap_or("Nüfus analizi verisi sağlandı.")
                    .to_string(),
                result.confidence,
            )
            .with_suggestions(strings(&[
                "Nüfus trend analizi",
                "Yaş grupları dağılımı",
                "Cinsiyet dağılımı",
                "Bölgesel nüfus karşılaştırması",
            ]))
            .with_tool_results(vec![result.clone()]),
            None => AgentResponse::new(
                "Nüfus analizi konusunda size yardımcı olmaya çalışıyorum. Daha spesifik bir soru sorabilir misiniz?"
                    .to_string(),
                0.5,
            )
            .with_suggestions(strings(&[
                "İstanbul nüfus değişimi",
                "Nüfus trend analizi",
                "Demografik veriler",
            ])),
        }
    }
}
