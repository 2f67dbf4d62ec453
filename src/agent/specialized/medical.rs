//! Medical agent: first aid, hospitals, earthquake safety

use serde_json::json;

use super::{emergency_contacts, filter_results, strings, template_confidence, SpecializedAgent};
use crate::agent::selector::AgentKind;
use crate::keywords::{contains_any, normalize};
use crate::types::{ActionItem, AgentResponse, Severity, ToolKind, ToolResult, UserContext, UNKNOWN_DISTRICT};

static DOMAIN_KEYWORDS: &[&str] = &[
    "hastane", "doktor", "ilkyardım", "yaşam üçgeni", "acil", "emergency",
    "kanama", "kırık", "yanık", "bilinç", "ambulans", "112", "sağlık",
    "tıbbi", "medikal", "deprem", "güvenlik", "first aid",
];

static CRITICAL_KEYWORDS: &[&str] = &[
    "acil", "emergency", "112", "ambulans", "yaralanma", "kanama",
    "ağrı", "bayıldı", "kritik", "tehlikede",
];

const RESULT_KINDS: [ToolKind; 3] = [ToolKind::FirstAid, ToolKind::Location, ToolKind::Emergency];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MedicalType {
    EarthquakeSafety,
    HospitalSearch,
    FirstAid,
    EmergencyCare,
    General,
}

#[derive(Debug, Clone)]
struct MedicalAssessment {
    urgency: Severity,
    medical_type: MedicalType,
    is_emergency: bool,
    location: String,
}

impl MedicalAssessment {
    fn assess(query: &str, ctx: &UserContext) -> Self {
        let q = normalize(query);

        let (urgency, is_emergency) = if contains_any(&q, CRITICAL_KEYWORDS) {
            (Severity::Critical, true)
        } else if contains_any(&q, &["ilkyardım", "yaşam üçgeni"])
            && !contains_any(&q, &["hastane", "doktor"])
        {
            (Severity::Medium, false)
        } else {
            // Looking for a hospital is a normal request, not an emergency
            (Severity::Low, false)
        };

        let medical_type = if contains_any(&q, &["yaşam üçgeni", "deprem"]) {
            MedicalType::EarthquakeSafety
        } else if contains_any(&q, &["hastane", "doktor"]) {
            MedicalType::HospitalSearch
        } else if contains_any(&q, &["ilkyardım", "first aid"]) {
            MedicalType::FirstAid
        } else if contains_any(&q, &["kanama", "kırık", "yanık", "bilinç"]) {
            MedicalType::EmergencyCare
        } else {
            MedicalType::General
        };

        Self {
            urgency,
            medical_type,
            is_emergency,
            location: ctx.district().unwrap_or(UNKNOWN_DISTRICT).to_string(),
        }
    }
}

/// Answers health and first-aid questions
#[derive(Debug, Clone, Copy, Default)]
pub struct MedicalAgent;

impl MedicalAgent {
    pub fn new() -> Self {
        Self
    }

    fn message(&self, a: &MedicalAssessment) -> String {
        if a.is_emergency {
            return format!(
                "🚨 **ACİL DURUM TESPİT EDİLDİ!**

Ben hemen 112'yi arayacağım! Siz sakin olun ve güvenli bir yerde kalın.

**Hemen Yapılacaklar:**
1. 🚨 **112'yi arayın** - Ben de arayacağım
2. 🏃‍♂️ **Güvenli alana geçin** - Pencerelerden uzak durun
3. 📱 **Ailenizi bilgilendirin** - Durumunuzu paylaşın
4. 🩹 **İlk yardım uygulayın** - Kanama varsa bastırın

**Konumunuz:** {}
**Durum:** {} ACİL

Ben buradayım, sizi yalnız bırakmam! Yardım geliyor! 🆘",
                a.location,
                a.urgency.as_str().to_uppercase()
            );
        }

        match a.medical_type {
            MedicalType::EarthquakeSafety => EARTHQUAKE_SAFETY.to_string(),
            MedicalType::HospitalSearch => format!(
                "🏥 **HASTANE BİLGİLERİ**

**En Yakın Hastane Bulma:**

📍 **Konumunuz:** {}

**Hastane Arama Seçenekleri:**

1. 🗺️ **Online Arama (Önerilen)**
   - En yakın sağlık kuruluşlarını görün
   - Mesafe ve yol tarifi alın

2. 📱 **Dijital Kaynaklar**
   - Hastane web siteleri
   - Sağlık Bakanlığı uygulamaları
   - Online harita servisleri

3. 📞 **Telefon ile Arama**
   - Hastane direkt telefon numaraları
   - Sağlık Bakanlığı bilgi hattı
   - 112 (sadece acil durumlarda)

**Önemli Notlar:**
- Bu normal bir bilgi talebidir, acil durum değil
- 112'yi sadece gerçek acil durumlarda arayın
- Randevu almak için hastaneyi direkt arayın",
                a.location
            ),
            MedicalType::FirstAid => FIRST_AID_GUIDE.to_string(),
            MedicalType::EmergencyCare => EMERGENCY_CARE.to_string(),
            MedicalType::General => GENERAL_HEALTH.to_string(),
        }
    }

    fn suggestions(&self, a: &MedicalAssessment) -> Vec<String> {
        let mut out = Vec::new();
        if a.is_emergency {
            out.extend(strings(&[
                "🚨 112 Acil Çağrı Merkezi'ni arayın",
                "🏃‍♂️ Güvenli alana geçin",
                "📱 Ailenizi bilgilendirin",
            ]));
        }
        match a.medical_type {
            MedicalType::EarthquakeSafety => out.extend(strings(&[
                "🏠 Yaşam üçgeni oluşturun",
                "🤲 Çömel, kapan, tutun pozisyonu alın",
                "🚫 Asansör kullanmayın",
            ])),
            MedicalType::HospitalSearch => out.extend(strings(&[
                "🏥 En yakın hastane bilgisi alın",
                "📞 112'den hastane bilgisi isteyin",
                "🗺️ GPS ile konum belirleyin",
            ])),
            MedicalType::FirstAid => out.extend(strings(&[
                "🩹 İlk yardım kurallarını uygulayın",
                "🚨 Acil durumda 112'yi arayın",
                "🩸 Kanama kontrolü yapın",
            ])),
            _ => {}
        }
        out.extend(strings(&[
            "📚 Sağlık bilgilerini güncel tutun",
            "🏥 Düzenli sağlık kontrolü yaptırın",
        ]));
        out.truncate(6);
        out
    }

    fn action_items(&self, a: &MedicalAssessment) -> Vec<ActionItem> {
        let mut items = Vec::new();
        if a.is_emergency {
            items.push(
                ActionItem::new("emergency_call", "112 Acil Çağrı Merkezi'ni Ara", Severity::Critical)
                    .with_description("Acil durum için 112'yi arayın")
                    .with_data(json!({ "contacts": emergency_contacts() })),
            );
        }
        match a.medical_type {
            MedicalType::HospitalSearch => items.push(
                ActionItem::new("hospital_search", "En Yakın Hastane Bul", Severity::High)
                    .with_description("Konum bazlı hastane araması yapın"),
            ),
            MedicalType::FirstAid => items.push(
                ActionItem::new("first_aid", "İlk Yardım Uygula", Severity::High)
                    .with_description("Temel ilk yardım kurallarını uygulayın"),
            ),
            _ => {}
        }
        items
    }
}

impl SpecializedAgent for MedicalAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Medical
    }

    fn respond(&self, query: &str, ctx: &UserContext, results: &[ToolResult]) -> AgentResponse {
        let relevant = filter_results(results, &RESULT_KINDS, contains_any(&normalize(query), DOMAIN_KEYWORDS));
        let assessment = MedicalAssessment::assess(query, ctx);

        let confidence = template_confidence(
            !relevant.is_empty(),
            assessment.medical_type != MedicalType::General,
            assessment.is_emergency,
        );

        AgentResponse::new(self.message(&assessment), confidence)
            .with_suggestions(self.suggestions(&assessment))
            .with_action_items(self.action_items(&assessment))
            .with_tool_results(relevant)
    }
}

const EARTHQUAKE_SAFETY: &str = "🏠 **DEPREM GÜVENLİĞİ - YAŞAM ÜÇGENİ**

**Deprem Anında Yaşam Üçgeni Oluşturma:**

1. 🪑 **Sağlam Masa/Sıra Yanına Geçin**
   - Masa, sıra veya yatak yanına çömelin
   - Başınızı ve boynunuzu koruyun

2. 🤲 **Çömel, Kapan, Tutun Pozisyonu**
   - Çömelin, kapanın, tutunun
   - Başınızı kollarınızla koruyun

3. 🚫 **Yapmamanız Gerekenler:**
   - Asansör kullanmayın
   - Merdivenlerden inmeyin
   - Dışarı çıkmaya çalışmayın
   - Pencerelerden uzak durun

4. 📱 **Sonrasında:**
   - 112'yi arayın
   - Ailenizi bilgilendirin
   - Güvenli alanda kalın

**Unutmayın:** İçeride kalmak dışarı çıkmaktan daha güvenlidir! 🏠";

const FIRST_AID_GUIDE: &str = "🩹 **İLK YARDIM REHBERİ**

**Temel İlk Yardım Kuralları:**

1. 🚨 **Önce Güvenlik**
   - Kendi güvenliğinizi sağlayın
   - Ortamı güvenli hale getirin
   - 112'yi arayın

2. 🩸 **Kanama Kontrolü**
   - Temiz bezle bastırın
   - Yüksekte tutun
   - Hareket ettirmeyin

3. 🫁 **Solunum Kontrolü**
   - Nefes alıp almadığını kontrol edin
   - Gerekirse CPR uygulayın
   - Yan yatırın

4. 🦴 **Kırık Şüphesi**
   - Hareket ettirmeyin
   - Destekleyin
   - Soğuk uygulayın

5. 🔥 **Yanık Durumunda**
   - Soğuk suyla yıkayın
   - 15-20 dakika
   - Buz koymayın

**Acil durumlarda 112'yi arayın!** 🚨";

const EMERGENCY_CARE: &str = "🚑 **ACİL BAKIM REHBERİ**

**Acil Durum Müdahalesi:**

1. 🚨 **İlk Değerlendirme**
   - Bilinç durumunu kontrol edin
   - Nefes alıp almadığını kontrol edin
   - Kanama var mı kontrol edin

2. 📞 **Acil Çağrı**
   - 112'yi arayın
   - Durumu açıklayın
   - Konum bilgisi verin

3. 🩹 **Temel Müdahale**
   - Kanama varsa bastırın
   - Nefes yoksa CPR başlatın
   - Hareket ettirmeyin

4. ⏰ **Zaman Kritik**
   - Hızlı hareket edin
   - Profesyonel yardım bekleyin
   - Sakin kalın

**Unutmayın:** İlk yardım bilginiz sınırlıysa, 112'yi arayın! 📞";

const GENERAL_HEALTH: &str = "🏥 **GENEL SAĞLIK BİLGİSİ**

**Sağlık Konularında Yardım:**

1. 📞 **Acil Durumlar**
   - 112 Acil Çağrı Merkezi
   - 7/24 hizmet
   - Ambulans ve hastane bilgisi

2. 🏥 **Hastane Bilgileri**
   - En yakın hastane
   - Acil servis bilgileri
   - Ulaşım rehberi

3. 🩹 **İlk Yardım**
   - Temel ilk yardım kuralları
   - Acil müdahale teknikleri
   - Güvenlik protokolleri

**Sağlık sorunlarınız için 112'yi arayabilirsiniz!** 🏥";
