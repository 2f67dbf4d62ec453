//! Emergency agent
//!
//! Grades severity from the query and from alert/notification payloads,
//! then renders immediate actions, hazard-specific safety protocols and
//! the emergency lines appropriate for that severity.

use serde_json::{json, Value};
use std::fmt::Write as _;

use super::{emergency_contacts, strings, EmergencyContact, SpecializedAgent};
use crate::agent::selector::AgentKind;
use crate::keywords::{contains_any, normalize};
use crate::types::{
    mean_confidence, ActionItem, AgentResponse, Severity, ToolKind, ToolResult, UserContext, UNKNOWN_DISTRICT,
};

static CRITICAL_KEYWORDS: &[&str] = &[
    "acil", "emergency", "tehlike", "yangın", "deprem", "sel",
    "kurtarma", "yardım", "112", "ambulans", "itfaiye", "polis",
    "sıkıştım", "mahsur", "enkaz", "can kaybı", "yaralı",
];

static HIGH_KEYWORDS: &[&str] = &[
    "hastane", "doktor", "ilaç", "kan", "oksijen", "nefes",
    "kalp", "bayılma", "koma", "şok", "travma",
];

static MEDIUM_KEYWORDS: &[&str] = &[
    "güvenlik", "kaçış", "toplanma", "sığınak", "barınak",
    "yiyecek", "su", "elektrik", "ısıtma",
];

#[derive(Debug, Clone)]
struct EmergencyAssessment {
    severity: Severity,
    immediate_actions: Vec<ActionItem>,
    safety_protocols: Vec<String>,
    contacts: Vec<EmergencyContact>,
    location: String,
}

impl EmergencyAssessment {
    fn assess(query: &str, ctx: &UserContext, results: &[ToolResult]) -> Self {
        let q = normalize(query);
        let mut assessment = Self {
            severity: severity_of(&q),
            immediate_actions: Vec::new(),
            safety_protocols: Vec::new(),
            contacts: Vec::new(),
            location: ctx.district().unwrap_or(UNKNOWN_DISTRICT).to_string(),
        };

        for result in results {
            match result.kind {
                ToolKind::Emergency => assessment.absorb_alert(result),
                ToolKind::Notification => assessment.absorb_notification(result),
                _ => {}
            }
        }

        assessment.safety_protocols.extend(safety_protocols(assessment.severity, &q));
        assessment.contacts = contacts_for(assessment.severity);
        assessment
    }

    fn absorb_alert(&mut self, result: &ToolResult) {
        if result.has_error() {
            self.immediate_actions.push(
                ActionItem::new("error_handling", "Veri Hatası", Severity::High)
                    .with_description("Acil durum verisi alınamadı, manuel kontrol gerekli"),
            );
            return;
        }

        if result.data.get("isUrgent").and_then(Value::as_bool).unwrap_or(false) {
            self.severity = Severity::Critical;
        }

        let alerts = result
            .data
            .get("emergencyAlerts")
            .and_then(Value::as_array)
            .map(|a| a.len())
            .unwrap_or(0);
        if alerts > 0 {
            self.immediate_actions.push(
                ActionItem::new("alert_response", "Aktif Uyarılar", Severity::Critical)
                    .with_description(&format!("{} aktif uyarı tespit edildi", alerts)),
            );
        }

        if let Some(recs) = result.data.get("safetyRecommendations").and_then(Value::as_array) {
            self.safety_protocols
                .extend(recs.iter().filter_map(Value::as_str).map(str::to_string));
        }
    }

    fn absorb_notification(&mut self, result: &ToolResult) {
        if !result.data.get("canSend").and_then(Value::as_bool).unwrap_or(false) {
            return;
        }
        let channel = result.data_str("type").unwrap_or("sms");
        let priority = if self.severity == Severity::Critical {
            Severity::Critical
        } else {
            Severity::High
        };
        self.immediate_actions.push(
            ActionItem::new("send_notification", "Bildirim Gönder", priority)
                .with_description(&format!("{} ile acil durum bildirimi gönder", channel))
                .with_data(result.data.clone()),
        );
    }
}

fn severity_of(normalized: &str) -> Severity {
    if contains_any(normalized, CRITICAL_KEYWORDS) {
        Severity::Critical
    } else if contains_any(normalized, HIGH_KEYWORDS) {
        Severity::High
    } else if contains_any(normalized, MEDIUM_KEYWORDS) {
        Severity::Medium
    } else {
        Severity::Low
    }
}

fn safety_protocols(severity: Severity, normalized: &str) -> Vec<String> {
    let mut protocols = Vec::new();
    if severity == Severity::Critical {
        protocols.extend(strings(&[
            "112 Acil Çağrı Merkezini hemen arayın",
            "Güvenli bir yere geçin",
            "Acil durum çantanızı alın",
        ]));
    }
    if normalized.contains("deprem") {
        protocols.extend(strings(&[
            "Çök, kapan, tutun pozisyonu alın",
            "Asansör kullanmayın",
            "Pencere ve camlardan uzak durun",
        ]));
    }
    if normalized.contains("yangın") {
        protocols.extend(strings(&[
            "Hemen binayı terk edin",
            "Asansör kullanmayın",
            "Kapıları kapatın",
        ]));
    }
    if normalized.contains("sel") {
        protocols.extend(strings(&[
            "Yüksek yerlere çıkın",
            "Su seviyesini takip edin",
            "Elektrikli cihazları kapatın",
        ]));
    }
    protocols.extend(strings(&[
        "Acil durum numarası: 112",
        "Güvenli alana gidin",
        "Aile ve arkadaşlarınızı bilgilendirin",
    ]));
    protocols
}

/// Critical situations only list the critical and high lines
fn contacts_for(severity: Severity) -> Vec<EmergencyContact> {
    let contacts = emergency_contacts();
    if severity == Severity::Critical {
        contacts.into_iter().filter(|c| c.priority >= Severity::High).collect()
    } else {
        contacts
    }
}

/// Handles alerts, hazards and emergency notifications
#[derive(Debug, Clone, Copy, Default)]
pub struct EmergencyAgent;

impl EmergencyAgent {
    pub fn new() -> Self {
        Self
    }

    fn message(&self, a: &EmergencyAssessment) -> String {
        let mut out = String::new();
        match a.severity {
            Severity::Critical => {
                out.push_str("🚨 ACİL DURUM TESPİT EDİLDİ! 🚨\n\n");
                out.push_str("Hemen aşağıdaki adımları takip edin:\n\n");
            }
            Severity::High => {
                out.push_str("⚠️ YÜKSEK ÖNCELİKLİ DURUM ⚠️\n\n");
                out.push_str("Aşağıdaki önlemleri alın:\n\n");
            }
            _ => {
                out.push_str("📋 Güvenlik Durumu\n\n");
                out.push_str("Mevcut durum ve öneriler:\n\n");
            }
        }

        if !a.immediate_actions.is_empty() {
            out.push_str("🎯 HEMEN YAPILACAKLAR:\n");
            for (i, action) in a.immediate_actions.iter().enumerate() {
                let icon = if action.priority == Severity::Critical { "🚨" } else { "⚡" };
                let _ = writeln!(out, "{} {}. {}", icon, i + 1, action.title);
                let _ = writeln!(out, "   {}\n", action.description);
            }
        }

        if !a.safety_protocols.is_empty() {
            out.push_str("🛡️ GÜVENLİK PROTOKOLLERİ:\n");
            for (i, protocol) in a.safety_protocols.iter().enumerate() {
                let _ = writeln!(out, "{}. {}", i + 1, protocol);
            }
            out.push('\n');
        }

        if !a.contacts.is_empty() {
            out.push_str("📞 ACİL DURUM KİŞİLERİ:\n");
            for contact in &a.contacts {
                let icon = if contact.priority == Severity::Critical { "🚨" } else { "📞" };
                let _ = writeln!(out, "{} {}: {}", icon, contact.name, contact.number);
            }
            out.push('\n');
        }

        let _ = writeln!(out, "📍 Konum: {}", a.location);
        let _ = writeln!(out, "🕐 Zaman: {}", chrono::Local::now().format("%d.%m.%Y %H:%M:%S"));
        out
    }

    fn suggestions(&self, a: &EmergencyAssessment) -> Vec<String> {
        let mut out = if a.severity == Severity::Critical {
            strings(&[
                "112'yi aramak istiyorum",
                "Güvenli alana nasıl giderim?",
                "Aileme nasıl haber verebilirim?",
            ])
        } else {
            strings(&[
                "Güvenlik önlemleri neler?",
                "Acil durum çantası nedir?",
                "Toplanma alanları nerede?",
            ])
        };
        out.extend(strings(&["Yardım nasıl isteyebilirim?", "Durum nasıl?"]));
        out.truncate(4);
        out
    }

    fn action_items(&self, a: &EmergencyAssessment) -> Vec<ActionItem> {
        let mut items = a.immediate_actions.clone();
        let critical = a.severity == Severity::Critical;

        if !a.safety_protocols.is_empty() {
            items.push(
                ActionItem::new(
                    "safety_protocol",
                    "Güvenlik protokollerini uygula",
                    if critical { Severity::Critical } else { Severity::High },
                )
                .with_data(json!({ "protocols": a.safety_protocols })),
            );
        }
        if !a.contacts.is_empty() {
            items.push(
                ActionItem::new(
                    "emergency_contact",
                    "Acil durum kişilerini ara",
                    if critical { Severity::Critical } else { Severity::Medium },
                )
                .with_data(json!({ "contacts": a.contacts })),
            );
        }
        items
    }
}

impl SpecializedAgent for EmergencyAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Emergency
    }

    fn respond(&self, query: &str, ctx: &UserContext, results: &[ToolResult]) -> AgentResponse {
        let relevant = results
            .iter()
            .filter(|r| matches!(r.kind, ToolKind::Emergency | ToolKind::Notification))
            .cloned()
            .collect::<Vec<_>>();
        let assessment = EmergencyAssessment::assess(query, ctx, &relevant);

        AgentResponse::new(self.message(&assessment), mean_confidence(&relevant, 0.1))
            .with_suggestions(self.suggestions(&assessment))
            .with_action_items(self.action_items(&assessment))
            .with_tool_results(relevant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> UserContext {
        UserContext::new("u1").with_location("Kadıköy", "İstanbul")
    }

    #[test]
    fn test_critical_query() {
        let response = EmergencyAgent::new().respond("Acil durum! Yardım gerekli!", &ctx(), &[]);

        assert!(response.message.starts_with("🚨 ACİL DURUM TESPİT EDİLDİ! 🚨"));
        assert!(response.message.contains("📍 Konum: Kadıköy"));
        assert_eq!(response.confidence, 0.1);
        assert_eq!(response.suggestions.len(), 4);
        assert_eq!(response.suggestions[0], "112'yi aramak istiyorum");
    }

    #[test]
    fn test_contacts_filtered_when_critical() {
        let response = EmergencyAgent::new().respond("deprem oldu", &ctx(), &[]);
        let contacts = response
            .action_items
            .iter()
            .find(|a| a.kind == "emergency_contact")
            .unwrap();
        let numbers = contacts.data["contacts"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["number"].as_str().unwrap().to_string())
            .collect::<Vec<_>>();
        assert_eq!(numbers, vec!["112", "112", "110"]);
        assert!(!response.message.contains("Polis"));
        assert!(response.message.contains("Çök, kapan, tutun"));
    }

    #[test]
    fn test_contacts_complete_when_not_critical() {
        let response = EmergencyAgent::new().respond("merhaba", &ctx(), &[]);
        assert!(response.message.starts_with("📋 Güvenlik Durumu"));
        assert!(response.message.contains("Polis: 155"));
        let contact_item = response.action_items.last().unwrap();
        assert_eq!(contact_item.priority, Severity::Medium);
    }

    #[test]
    fn test_alert_payload_escalates() {
        let results = vec![
            ToolResult::new(
                ToolKind::Emergency,
                json!({
                    "isUrgent": true,
                    "emergencyAlerts": [{"title": "Deprem"}, {"title": "Artçı"}],
                    "safetyRecommendations": ["Binadan uzak durun"]
                }),
                0.9,
            ),
            ToolResult::new(ToolKind::Notification, json!({"canSend": true, "type": "sms"}), 0.7),
            ToolResult::new(ToolKind::Social, json!({}), 0.9),
        ];
        let response = EmergencyAgent::new().respond("durum nedir", &ctx(), &results);

        assert!(response.message.starts_with("🚨 ACİL DURUM"));
        assert!(response.message.contains("2 aktif uyarı tespit edildi"));
        assert!(response.message.contains("Binadan uzak durun"));
        assert_eq!(response.tool_results.len(), 2);
        assert!((response.confidence - 0.8).abs() < 1e-9);

        let notify = response
            .action_items
            .iter()
            .find(|a| a.kind == "send_notification")
            .unwrap();
        assert_eq!(notify.priority, Severity::Critical);
    }

    #[test]
    fn test_alert_error_becomes_manual_check() {
        let results = vec![ToolResult::failed(ToolKind::Emergency, "feed down")];
        let response = EmergencyAgent::new().respond("merhaba", &ctx(), &results);
        assert_eq!(response.action_items[0].kind, "error_handling");
    }
}
