//! General information agent
//!
//! Summarizes location, network, social and web-search payloads into one
//! message, framed by what the user asked about.

use serde_json::{json, Value};
use std::fmt::Write as _;

use super::{strings, SpecializedAgent};
use crate::agent::selector::AgentKind;
use crate::keywords::{contains_any, normalize};
use crate::types::{mean_confidence, ActionItem, AgentResponse, Severity, ToolKind, ToolResult, UserContext};

const RESULT_KINDS: [ToolKind; 4] = [ToolKind::Location, ToolKind::Network, ToolKind::Social, ToolKind::WebSearch];

const SNIPPET_LIMIT: usize = 200;

/// Catch-all responder
#[derive(Debug, Clone, Copy, Default)]
pub struct InfoAgent;

impl InfoAgent {
    pub fn new() -> Self {
        Self
    }
}

impl SpecializedAgent for InfoAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Info
    }

    fn respond(&self, query: &str, ctx: &UserContext, results: &[ToolResult]) -> AgentResponse {
        let relevant = results
            .iter()
            .filter(|r| RESULT_KINDS.contains(&r.kind))
            .cloned()
            .collect::<Vec<_>>();

        let summary = relevant
            .iter()
            .filter_map(summarize)
            .collect::<Vec<_>>()
            .join("\n\n");

        AgentResponse::new(frame(query, ctx, &summary), mean_confidence(&relevant, 0.1))
            .with_suggestions(suggestions(&relevant))
            .with_action_items(action_items(&relevant))
            .with_tool_results(relevant)
    }
}

fn frame(query: &str, ctx: &UserContext, summary: &str) -> String {
    let q = normalize(query);
    let place = ctx.district().unwrap_or_else(|| ctx.city());

    if contains_any(&q, &["toplanma", "güvenli alan"]) {
        format!(
            "🏢 {} bölgesindeki toplanma alanları:\n\n{}\n\nBu alanlar acil durumlarda güvenli toplanma noktalarıdır. Koordinat bilgileri ile konumlarına ulaşabilirsiniz.",
            place, summary
        )
    } else if contains_any(&q, &["durum", "ne oluyor"]) {
        format!(
            "📊 {} için güncel durum:\n\n{}\n\nBu bilgiler gerçek zamanlı olarak güncellenmektedir.",
            place, summary
        )
    } else if contains_any(&q, &["konum", "nerede"]) {
        format!(
            "📍 Konum bilgileriniz:\n\n{}\n\nGüvenli alanlara ulaşım için yol tarifi alabilirsiniz.",
            summary
        )
    } else if contains_any(&q, &["şebeke", "internet"]) {
        format!(
            "📡 Şebeke durumu:\n\n{}\n\nEn iyi bağlantı için önerilen operatörü kullanabilirsiniz.",
            summary
        )
    } else {
        format!(
            "ℹ️ İstediğiniz bilgiler:\n\n{}\n\nDaha detaylı bilgi için spesifik sorular sorabilirsiniz.",
            summary
        )
    }
}

fn summarize(result: &ToolResult) -> Option<String> {
    let label = match result.kind {
        ToolKind::Location => "Konum bilgisi",
        ToolKind::Network => "Şebeke bilgisi",
        ToolKind::Social => "Sosyal medya bilgisi",
        ToolKind::WebSearch => "Web araması",
        _ => return None,
    };
    if let Some(err) = result.error() {
        return Some(format!("{}: {}", label, err));
    }

    let data = &result.data;
    let place = data.get("location").and_then(Value::as_str).unwrap_or("-");
    let mut out = String::new();

    match result.kind {
        ToolKind::Location => {
            out.push_str("📍 Konum Bilgileri:\n");
            if let Some(current) = data.get("currentLocation") {
                let _ = writeln!(
                    out,
                    "• Mevcut konum: {}, {}",
                    current.get("city").and_then(Value::as_str).unwrap_or("-"),
                    current.get("district").and_then(Value::as_str).unwrap_or("-")
                );
            }
            if let Some(nearest) = data.get("nearestSafeArea") {
                let _ = writeln!(
                    out,
                    "• En yakın güvenli alan: {} ({})",
                    nearest.get("name").and_then(Value::as_str).unwrap_or("-"),
                    display(nearest.get("distance"))
                );
            }
            let others = data.get("safeAreas").and_then(Value::as_array).map(Vec::len).unwrap_or(0);
            if others > 0 {
                let _ = writeln!(out, "• Diğer güvenli alanlar: {} adet", others);
            }
        }
        ToolKind::Network => {
            let _ = writeln!(out, "📡 Şebeke Durumu ({}):", place);
            if let Some(operators) = data.get("operators").and_then(Value::as_object) {
                for (operator, status) in operators {
                    let status = status.get("status").and_then(Value::as_str).unwrap_or("Bilinmiyor");
                    let _ = writeln!(out, "• {}: {}", operator, status);
                }
            }
            if let Some(rec) = data.get("recommendation").and_then(Value::as_str) {
                let _ = writeln!(out, "• Öneri: {}", rec);
            }
        }
        ToolKind::Social => {
            let _ = writeln!(out, "🐦 Sosyal Medya Analizi ({}):", place);
            let insights = data.get("insights").and_then(Value::as_array).map(Vec::len).unwrap_or(0);
            if insights > 0 {
                let _ = writeln!(out, "• {} adet insight", insights);
            }
            if let Some(trends) = data.get("trends").and_then(Value::as_array) {
                let top = trends.iter().filter_map(Value::as_str).take(3).collect::<Vec<_>>();
                if !top.is_empty() {
                    let _ = writeln!(out, "• Trend konular: {}", top.join(", "));
                }
            }
            if let Some(sentiment) = data.get("sentimentSummary").and_then(Value::as_str) {
                let _ = writeln!(out, "• Genel duygu: {}", sentiment);
            }
        }
        ToolKind::WebSearch => out.push_str(&summarize_search(data, place)),
        _ => {}
    }

    Some(out.trim_end().to_string())
}

fn summarize_search(data: &Value, place: &str) -> String {
    let items = data.get("results").and_then(Value::as_array).cloned().unwrap_or_default();
    if items.is_empty() {
        return format!("🔍 Web Araştırması ({}):\nArama sonucu bulunamadı.", place);
    }

    let field = |item: &Value, key: &str| item.get(key).and_then(Value::as_str).unwrap_or("").to_string();
    let assembly = items.iter().any(|item| {
        let title = field(item, "title");
        title.contains("toplanma") || title.contains("alan") || field(item, "url").contains("toplanma-alanlari")
    });

    let mut out = String::new();
    if assembly {
        let _ = writeln!(out, "🏢 Toplanma Alanları ({}):", place);
        for (i, item) in items.iter().enumerate() {
            let _ = writeln!(out, "\n{}. {}", i + 1, field(item, "title"));
            let content = field(item, "content");
            if !content.is_empty() {
                let _ = writeln!(out, "   {}", content);
            }
        }
    } else {
        let _ = writeln!(out, "🔍 Web Araştırması ({}):", place);
        for (i, item) in items.iter().enumerate() {
            let _ = writeln!(out, "\n{}. {}", i + 1, field(item, "title"));
            let snippet = field(item, "snippet");
            if !snippet.is_empty() {
                let _ = writeln!(out, "   {}", snippet);
            }
            let content = field(item, "content");
            if !content.is_empty() {
                let _ = writeln!(out, "   {}", shorten(&content, SNIPPET_LIMIT));
            }
        }
    }
    out
}

fn shorten(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        format!("{}...", text.chars().take(max).collect::<String>())
    } else {
        text.to_string()
    }
}

fn display(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "-".to_string(),
        Some(other) => other.to_string(),
    }
}

fn suggestions(results: &[ToolResult]) -> Vec<String> {
    let has = |kind: ToolKind| results.iter().any(|r| r.kind == kind);
    let mut out = Vec::new();
    if has(ToolKind::Location) {
        out.extend(strings(&["Güvenli alana nasıl giderim?", "Yakındaki hastaneler nerede?"]));
    }
    if has(ToolKind::Network) {
        out.extend(strings(&["Şebekemi nasıl test ederim?", "Hangi operatörü kullanmalıyım?"]));
    }
    if has(ToolKind::Social) {
        out.extend(strings(&["Son trendler neler?", "Sosyal medyada ne konuşuluyor?"]));
    }
    if has(ToolKind::WebSearch) {
        out.extend(strings(&["Daha detaylı araştırma yap", "Güncel verileri kontrol et"]));
    }
    out.extend(strings(&["Acil durum numarası nedir?", "Yardım nasıl isteyebilirim?"]));
    out.truncate(4);
    out
}

fn action_items(results: &[ToolResult]) -> Vec<ActionItem> {
    let mut items = Vec::new();
    for result in results {
        match result.kind {
            ToolKind::Location => {
                if let Some(area) = result.data.get("nearestSafeArea") {
                    items.push(
                        ActionItem::new("location", "Güvenli alana git", Severity::Medium)
                            .with_data(json!({ "safeArea": area })),
                    );
                }
            }
            ToolKind::Network => {
                if let Some(rec) = result.data.get("recommendation") {
                    items.push(
                        ActionItem::new("network", "Operatör değiştir", Severity::Low)
                            .with_data(json!({ "recommendation": rec })),
                    );
                }
            }
            _ => {}
        }
    }
    items
}
