//! First-aid agent. Relays the first-aid provider's prepared guidance.

use super::{strings, SpecializedAgent};
use crate::agent::selector::AgentKind;
use crate::types::{AgentResponse, ToolKind, ToolResult, UserContext};

#[derive(Debug, Clone, Copy, Default)]
pub struct FirstAidAgent;

impl FirstAidAgent {
    pub fn new() -> Self {
        Self
    }
}

impl SpecializedAgent for FirstAidAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::FirstAid
    }

    fn respond(&self, _query: &str, _ctx: &UserContext, results: &[ToolResult]) -> AgentResponse {
        let guidance = results
            .iter()
            .find(|r| r.kind == ToolKind::FirstAid && !r.has_error());

        match guidance {
            Some(result) => AgentResponse::new(
                result
                    .data_str("message")
                    .unwrap_or("İlkyardım bilgisi sağlandı.")
                    .to_string(),
                result.confidence,
            )
            .with_suggestions(strings(&[
                "Deprem anında yaşam üçgeni",
                "Kanama durdurma",
                "Yanık tedavisi",
                "CPR uygulaması",
            ]))
            .with_tool_results(vec![result.clone()]),
            None => AgentResponse::new(
                "İlkyardım konusunda size yardımcı olmaya çalışıyorum. Daha spesifik bir soru sorabilir misiniz?"
                    .to_string(),
                0.5,
            )
            .with_suggestions(strings(&["Yaşam üçgeni", "İlk yardım temel kuralları"])),
        }
    }
}
