//! Bandit context: who, where, when and what the query is about.

use chrono::Timelike;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tracing::debug;

use crate::keywords::{contains_any, normalize};
use crate::types::{Severity, UserContext, UNKNOWN_DISTRICT};

static SOCIAL_KEYWORDS: &[&str] = &[
    "instagram", "twitter", "facebook", "sosyal medya", "sosyal", "medya", "çöktü", "giremiyorum",
];
static NETWORK_KEYWORDS: &[&str] = &[
    "şebeke", "internet", "çekmiyor", "sinyal", "kapsama", "turkcell", "vodafone", "türk telekom",
];
static LOCATION_KEYWORDS: &[&str] = &[
    "nerede", "konum", "güvenli", "alan", "hastane", "toplanma", "mahalle", "ilçe",
];
static EMERGENCY_KEYWORDS: &[&str] = &[
    "acil", "emergency", "deprem", "yangın", "sel", "tehlike", "korku", "panik",
];
static NOTIFICATION_KEYWORDS: &[&str] = &["bildirim", "sms", "email", "uyarı", "haber", "bilgilendir"];

/// Source of the local wall-clock hour
pub trait Clock: Send + Sync {
    /// Hour of day, 0..=23
    fn hour(&self) -> u32;
}

/// Local system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn hour(&self) -> u32 {
        chrono::Local::now().hour()
    }
}

/// Always reports the same hour
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub u32);

impl Clock for FixedClock {
    fn hour(&self) -> u32 {
        self.0 % 24
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    /// 6-12 morning, 12-18 afternoon, 18-22 evening, otherwise night
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            6..=11 => Self::Morning,
            12..=17 => Self::Afternoon,
            18..=21 => Self::Evening,
            _ => Self::Night,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Afternoon => "afternoon",
            Self::Evening => "evening",
            Self::Night => "night",
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category of a candidate action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Location,
    Network,
    Emergency,
    Notification,
    Social,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Location => "location",
            Self::Network => "network",
            Self::Emergency => "emergency",
            Self::Notification => "notification",
            Self::Social => "social",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the query is mainly about, from the bandit's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationIntent {
    Emergency,
    Social,
    Network,
    Location,
    Notification,
    General,
}

impl RecommendationIntent {
    /// Families are tested independently; the first hit in
    /// emergency > social > network > location > notification wins.
    pub fn classify(query: &str) -> Self {
        let q = normalize(query);
        let hits = [
            (contains_any(&q, EMERGENCY_KEYWORDS), Self::Emergency),
            (contains_any(&q, SOCIAL_KEYWORDS), Self::Social),
            (contains_any(&q, NETWORK_KEYWORDS), Self::Network),
            (contains_any(&q, LOCATION_KEYWORDS), Self::Location),
            (contains_any(&q, NOTIFICATION_KEYWORDS), Self::Notification),
        ];
        hits.into_iter()
            .find(|(hit, _)| *hit)
            .map(|(_, intent)| intent)
            .unwrap_or(Self::General)
    }

    /// Action type that earns the intent bonus
    pub fn action_type(&self) -> Option<ActionType> {
        match self {
            Self::Emergency => Some(ActionType::Emergency),
            Self::Social => Some(ActionType::Social),
            Self::Network => Some(ActionType::Network),
            Self::Location => Some(ActionType::Location),
            Self::Notification => Some(ActionType::Notification),
            Self::General => None,
        }
    }
}

/// Everything the bandit scores against. Built fresh per call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationContext {
    pub user_id: String,
    pub district: String,
    pub city: String,
    pub operator: Option<String>,
    pub age: Option<u32>,
    pub emergency_level: Severity,
    pub time_of_day: TimeOfDay,
    #[serde(default)]
    pub preferences: Map<String, Value>,
    pub primary_intent: RecommendationIntent,
}

impl RecommendationContext {
    pub fn build(query: &str, ctx: &UserContext, clock: &dyn Clock) -> Self {
        let emergency_level = ctx
            .preferences
            .get("emergencyLevel")
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<Severity>().ok())
            .unwrap_or_default();

        let context = Self {
            user_id: ctx.user_id.clone(),
            district: ctx.district().unwrap_or(UNKNOWN_DISTRICT).to_string(),
            city: ctx.city().to_string(),
            operator: ctx
                .operator
                .as_deref()
                .map(str::trim)
                .filter(|op| !op.is_empty() && *op != UNKNOWN_DISTRICT)
                .map(str::to_string),
            age: ctx.age,
            emergency_level,
            time_of_day: TimeOfDay::from_hour(clock.hour()),
            preferences: ctx.preferences.clone(),
            primary_intent: RecommendationIntent::classify(query),
        };
        debug!(
            "Recommendation context for {}: intent={:?} level={} time={}",
            context.user_id, context.primary_intent, context.emergency_level, context.time_of_day
        );
        context
    }

    pub fn has_district(&self) -> bool {
        self.district != UNKNOWN_DISTRICT
    }

    /// `{district}_{city}_{emergency level}_{time of day}`
    pub fn context_key(&self) -> String {
        format!(
            "{}_{}_{}_{}",
            self.district, self.city, self.emergency_level, self.time_of_day
        )
    }
}
