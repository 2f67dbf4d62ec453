//! Location agent: hospitals on the map, safe areas, directions

use serde_json::json;

use super::{filter_results, strings, template_confidence, SpecializedAgent};
use crate::agent::selector::AgentKind;
use crate::keywords::{contains_any, normalize};
use crate::types::{ActionItem, AgentResponse, Severity, ToolKind, ToolResult, UserContext, UNKNOWN_DISTRICT};

static DOMAIN_KEYWORDS: &[&str] = &[
    "konum", "nerede", "güvenli alan", "toplanma", "hastane", "doktor",
    "yol tarifi", "nasıl giderim", "yakın", "mesafe", "koordinat",
    "park", "meydan", "mahalle", "ilçe", "bölge", "harita",
];

const RESULT_KINDS: [ToolKind; 2] = [ToolKind::Location, ToolKind::WebSearch];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LocationType {
    Hospital,
    SafeArea,
    Directions,
    LocationSearch,
    General,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Accessibility {
    Wheelchair,
    Walking,
    Vehicle,
    General,
}

impl Accessibility {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Wheelchair => "wheelchair_accessible",
            Self::Walking => "walking",
            Self::Vehicle => "vehicle",
            Self::General => "general",
        }
    }
}

#[derive(Debug, Clone)]
struct LocationAssessment {
    location_type: LocationType,
    urgency: Severity,
    accessibility: Accessibility,
    has_location: bool,
    district: String,
    city: String,
    coordinates: String,
}

impl LocationAssessment {
    fn assess(query: &str, ctx: &UserContext) -> Self {
        let q = normalize(query);

        let (location_type, mut urgency) = if contains_any(&q, &["hastane", "doktor"]) {
            (LocationType::Hospital, Severity::Low)
        } else if contains_any(&q, &["güvenli alan", "toplanma"]) {
            (LocationType::SafeArea, Severity::Medium)
        } else if contains_any(&q, &["yol tarifi", "nasıl giderim"]) {
            (LocationType::Directions, Severity::Low)
        } else if contains_any(&q, &["konum", "nerede"]) {
            (LocationType::LocationSearch, Severity::Low)
        } else {
            (LocationType::General, Severity::Low)
        };

        if contains_any(&q, &["acil", "emergency"]) {
            urgency = Severity::High;
        }

        let accessibility = if contains_any(&q, &["engelli", "tekerlekli"]) {
            Accessibility::Wheelchair
        } else if contains_any(&q, &["yürüyerek", "yaya"]) {
            Accessibility::Walking
        } else if contains_any(&q, &["araç", "araba"]) {
            Accessibility::Vehicle
        } else {
            Accessibility::General
        };

        Self {
            location_type,
            urgency,
            accessibility,
            has_location: ctx.location.is_some(),
            district: ctx.district().unwrap_or(UNKNOWN_DISTRICT).to_string(),
            city: ctx.city().to_string(),
            coordinates: ctx.coordinates_label(),
        }
    }
}

/// Answers "where" questions
#[derive(Debug, Clone, Copy, Default)]
pub struct LocationAgent;

impl LocationAgent {
    pub fn new() -> Self {
        Self
    }

    fn message(&self, a: &LocationAssessment) -> String {
        if a.urgency == Severity::High {
            return format!(
                "🚨 **ACİL KONUM DESTEĞİ**

**Acil Durum Konum Bilgisi:**

📍 **Mevcut Konumunuz:**
- İlçe: {}
- Şehir: {}
- Koordinat: {}

🚨 **Acil Durum Aksiyonları:**
1. **112'yi arayın** - Acil çağrı merkezi
2. **Güvenli alana geçin** - En yakın toplanma alanı
3. **Konumunuzu paylaşın** - Ailenizle iletişim kurun
4. **Yardım bekleyin** - Profesyonel ekipler geliyor

🏥 **En Yakın Hastaneler:**
- Acil durumlarda 112'den hastane bilgisi alın
- Ambulans hizmeti için 112'yi arayın
- GPS ile en yakın sağlık kuruluşunu bulun

**Ben buradayım, sizi yalnız bırakmam!** 🆘",
                a.district, a.city, a.coordinates
            );
        }

        let here = format!("{}, {}", a.district, a.city);
        match a.location_type {
            LocationType::Hospital => format!(
                "🏥 **HASTANE KONUM BİLGİLERİ**

**En Yakın Hastane Bulma:**

📍 **Konumunuz:** {here}

**Hastane Arama Seçenekleri:**

1. 🗺️ **Online Harita Servisleri (Önerilen)**
   - Harita uygulamasında \"hastane\" araması yapın
   - Mesafe ve yol tarifi alın

2. 📱 **Dijital Kaynaklar**
   - Sağlık Bakanlığı uygulamaları
   - Hastane web siteleri

3. 🏥 **Hastane Türleri**
   - Devlet Hastaneleri
   - Özel Hastaneler
   - Üniversite Hastaneleri
   - Acil Servisler

**Önemli Notlar:**
- Bu normal bir bilgi talebidir, acil durum değil
- 112'yi sadece gerçek acil durumlarda arayın"
            ),
            LocationType::SafeArea => format!(
                "🏠 **GÜVENLİ ALAN REHBERİ**

**Güvenli Alan Bulma:**

1. 🏢 **Toplanma Alanları**
   - Okul bahçeleri
   - Spor tesisleri
   - Parklar ve meydanlar

2. 🏠 **Bina İçi Güvenli Alanlar**
   - Sağlam masa altları
   - İç duvar yanları

3. 🚫 **Güvenli Olmayan Alanlar**
   - Pencerelerin yanı
   - Ağır eşyaların altı
   - Asansörler

4. 📍 **Konum Tabanlı Arama**
   - GPS koordinatlarınızı kullanın
   - En yakın toplanma alanını bulun

**Konumunuz:** {here}

**Güvenli alanlar için 112'den bilgi alabilirsiniz!** 🏠"
            ),
            LocationType::Directions => format!(
                "🗺️ **YOL TARİFİ REHBERİ**

**Yol Tarifi Alma Yöntemleri:**

1. 📱 **Harita Uygulamaları**
2. 🚗 **Ulaşım Seçenekleri:** {mode}
3. 📞 **Telefon Destekli Yol Tarifi:** 112 Acil Çağrı Merkezi
4. 🏥 **Hastane Yol Tarifi:** acil durumlarda 112'den ambulans isteyin

**Konumunuz:** {here}

**Yol tarifi için harita uygulamalarını kullanabilirsiniz!** 🗺️",
                mode = match a.accessibility {
                    Accessibility::Wheelchair => "Engelli erişimine uygun güzergahlar",
                    Accessibility::Walking => "Yürüyerek",
                    Accessibility::Vehicle => "Özel araç veya taksi",
                    Accessibility::General => "Yürüyerek, toplu taşıma, özel araç, taksi",
                }
            ),
            LocationType::LocationSearch => format!(
                "📍 **KONUM ARAMA REHBERİ**

**Konum Bulma Yöntemleri:**

1. 📱 **GPS ve Konum Servisleri**
   - Telefon GPS'i
   - Konum paylaşımı

2. 🗺️ **Harita Tabanlı Arama**

3. 📞 **Telefon Destekli Arama**
   - 112 Acil Çağrı Merkezi

**Mevcut Konumunuz:**
- İlçe: {}
- Şehir: {}
- Koordinat: {}

**Konum araması için harita uygulamalarını kullanabilirsiniz!** 📍",
                a.district, a.city, a.coordinates
            ),
            LocationType::General => format!(
                "📍 **GENEL KONUM BİLGİSİ**

**Konum Hizmetleri:**

1. 📱 **Dijital Araçlar:** harita uygulamaları, GPS, konum paylaşımı
2. 🏥 **Sağlık Konumları:** hastaneler, eczaneler, sağlık merkezleri
3. 🏠 **Güvenli Alanlar:** toplanma alanları, acil durum merkezleri
4. 📞 **Destek Hizmetleri:** 112 Acil Çağrı Merkezi

**Konumunuz:** {here}

**Konum bilgileri için 112'yi arayabilirsiniz!** 📍"
            ),
        }
    }

    fn suggestions(&self, a: &LocationAssessment) -> Vec<String> {
        let mut out = Vec::new();
        if a.urgency == Severity::High {
            out.extend(strings(&[
                "🚨 112 Acil Çağrı Merkezi'ni arayın",
                "🏃‍♂️ Güvenli alana geçin",
                "📱 Konumunuzu paylaşın",
            ]));
        }
        match a.location_type {
            LocationType::Hospital => out.extend(strings(&[
                "🏥 En yakın hastane bilgisi alın",
                "📞 112'den hastane bilgisi isteyin",
                "🗺️ GPS ile konum belirleyin",
            ])),
            LocationType::SafeArea => out.extend(strings(&[
                "🏠 En yakın toplanma alanını bulun",
                "🚫 Güvenli olmayan alanlardan uzak durun",
                "📱 Ailenizi bilgilendirin",
            ])),
            LocationType::Directions => out.extend(strings(&[
                "🗺️ Harita uygulaması kullanın",
                "🚗 Ulaşım seçeneklerini değerlendirin",
                "⏰ Yol süresini hesaplayın",
            ])),
            _ => {}
        }
        out.extend(strings(&[
            "📍 GPS konumunuzu kontrol edin",
            "📱 Harita uygulamalarını güncel tutun",
        ]));
        out.truncate(6);
        out
    }

    fn action_items(&self, a: &LocationAssessment) -> Vec<ActionItem> {
        let mut items = Vec::new();
        if a.urgency == Severity::High {
            items.push(
                ActionItem::new("emergency_location", "Acil Konum Desteği", Severity::Critical)
                    .with_description("Acil durum konum bilgisi")
                    .with_data(json!({ "district": a.district, "city": a.city })),
            );
        }
        match a.location_type {
            LocationType::Hospital => items.push(
                ActionItem::new("hospital_search", "Hastane Konum Arama", Severity::High)
                    .with_description("En yakın hastane bulma")
                    .with_data(json!({ "accessibility": a.accessibility.as_str() })),
            ),
            LocationType::SafeArea => items.push(
                ActionItem::new("safe_area_search", "Güvenli Alan Arama", Severity::Medium)
                    .with_description("En yakın güvenli alan bulma")
                    .with_data(json!({ "accessibility": a.accessibility.as_str() })),
            ),
            _ => {}
        }
        items
    }
}

impl SpecializedAgent for LocationAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Location
    }

    fn respond(&self, query: &str, ctx: &UserContext, results: &[ToolResult]) -> AgentResponse {
        let relevant = filter_results(results, &RESULT_KINDS, contains_any(&normalize(query), DOMAIN_KEYWORDS));
        let assessment = LocationAssessment::assess(query, ctx);

        let confidence = template_confidence(
            !relevant.is_empty(),
            assessment.location_type != LocationType::General,
            assessment.has_location,
        );

        AgentResponse::new(self.message(&assessment), confidence)
            .with_suggestions(self.suggestions(&assessment))
            .with_action_items(self.action_items(&assessment))
            .with_tool_results(relevant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hospital_location_message() {
        let ctx = UserContext::new("u1").with_location("Kadıköy", "İstanbul");
        let results = vec![ToolResult::new(ToolKind::Location, json!({"hospitals": []}), 0.8)];
        let response = LocationAgent::new().respond("En yakın hastane nerede?", &ctx, &results);

        assert!(response.message.contains("📍"));
        assert!(response.message.contains("Kadıköy, İstanbul"));
        assert_eq!(response.action_items[0].kind, "hospital_search");
        assert_eq!(response.confidence, 0.95);
    }

    #[test]
    fn test_urgent_brief_on_acil() {
        let ctx = UserContext::new("u1")
            .with_location("Bornova", "İzmir")
            .with_coordinates(38.4622, 27.2164);
        let response = LocationAgent::new().respond("Acil! güvenli alan nerede", &ctx, &[]);

        assert!(response.message.starts_with("🚨 **ACİL KONUM DESTEĞİ**"));
        assert!(response.message.contains("38.4622, 27.2164"));
        assert_eq!(response.action_items[0].priority, Severity::Critical);
        assert_eq!(response.action_items[1].kind, "safe_area_search");
    }

    #[test]
    fn test_unknown_location_uses_placeholders() {
        let response = LocationAgent::new().respond("konumum", &UserContext::new("u1"), &[]);
        assert!(response.message.contains("İlçe: Bilinmiyor"));
        assert!(response.message.contains("N/A, N/A"));
        // domain query, no results, resolved sub-type, no location
        assert!((response.confidence - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_directions_respect_accessibility() {
        let ctx = UserContext::new("u1").with_location("Çankaya", "Ankara");
        let response = LocationAgent::new().respond("Yol tarifi lazım, yürüyerek gideceğim", &ctx, &[]);
        assert!(response.message.contains("YOL TARİFİ"));
        assert!(response.message.contains("Yürüyerek"));
        assert!(response.suggestions.len() <= 6);
    }
}
