//! Capability Providers
//!
//! The uniform contract every external lookup (hospital directory, web
//! search, alert feeds, population statistics, ...) is consumed through:
//! - `CapabilityProvider` trait: given a query and context, optionally
//!   produce one confidence-scored [`ToolResult`]
//! - `FnProvider`: closure-backed provider for hosts and tests
//! - `ProviderRegistry`: instance-owned set of providers, one per kind
//! - `StaticDataProvider`: canned guidance, the last link of the fallback chain

use async_trait::async_trait;
use serde_json::json;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{debug, info};

use crate::keywords::{contains_any, normalize};
use crate::types::{ToolKind, ToolResult, UserContext, UNKNOWN_DISTRICT};

/// Error types for provider invocations
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    #[error("Provider failed: {0}")]
    Failed(String),

    #[error("Provider timed out after {0} ms")]
    Timeout(u64),
}

/// Input handed to every provider of a single request
#[derive(Debug, Clone)]
pub struct ToolInput {
    pub query: String,
    pub user_context: UserContext,
}

impl ToolInput {
    pub fn new(query: &str, user_context: &UserContext) -> Self {
        Self {
            query: query.to_string(),
            user_context: user_context.clone(),
        }
    }
}

/// A source of typed, confidence-scored results.
///
/// `Ok(None)` means the provider had nothing to say for this query.
#[async_trait]
pub trait CapabilityProvider: Send + Sync {
    /// Provider name, used in logs
    fn name(&self) -> &str;

    /// Kind tag carried by this provider's results
    fn kind(&self) -> ToolKind;

    /// Run the lookup
    async fn execute(&self, input: &ToolInput) -> Result<Option<ToolResult>, ProviderError>;
}

/// Type alias for closure-backed provider handlers
pub type ProviderHandler = Arc<
    dyn Fn(ToolInput) -> Pin<Box<dyn Future<Output = Result<Option<ToolResult>, ProviderError>> + Send>>
        + Send
        + Sync,
>;

/// Provider backed by an async closure
pub struct FnProvider {
    name: String,
    kind: ToolKind,
    handler: ProviderHandler,
}

impl FnProvider {
    pub fn new<F, Fut>(name: &str, kind: ToolKind, handler: F) -> Self
    where
        F: Fn(ToolInput) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<ToolResult>, ProviderError>> + Send + 'static,
    {
        Self {
            name: name.to_string(),
            kind,
            handler: Arc::new(move |input| Box::pin(handler(input))),
        }
    }
}

#[async_trait]
impl CapabilityProvider for FnProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ToolKind {
        self.kind
    }

    async fn execute(&self, input: &ToolInput) -> Result<Option<ToolResult>, ProviderError> {
        (self.handler)(input.clone()).await
    }
}

/// Registered providers, at most one per kind, in registration order
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn CapabilityProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider, replacing any previous provider of the same kind
    pub fn register(&mut self, provider: Arc<dyn CapabilityProvider>) {
        let kind = provider.kind();
        info!("Registered provider: {} ({})", provider.name(), kind);
        match self.providers.iter().position(|p| p.kind() == kind) {
            Some(idx) => self.providers[idx] = provider,
            None => self.providers.push(provider),
        }
    }

    /// Builder-style [`register`](Self::register)
    pub fn with(mut self, provider: Arc<dyn CapabilityProvider>) -> Self {
        self.register(provider);
        self
    }

    pub fn unregister(&mut self, kind: ToolKind) -> bool {
        let before = self.providers.len();
        self.providers.retain(|p| p.kind() != kind);
        before != self.providers.len()
    }

    pub fn get(&self, kind: ToolKind) -> Option<Arc<dyn CapabilityProvider>> {
        self.providers.iter().find(|p| p.kind() == kind).cloned()
    }

    pub fn contains(&self, kind: ToolKind) -> bool {
        self.providers.iter().any(|p| p.kind() == kind)
    }

    pub fn kinds(&self) -> Vec<ToolKind> {
        self.providers.iter().map(|p| p.kind()).collect()
    }

    pub fn all(&self) -> Vec<Arc<dyn CapabilityProvider>> {
        self.providers.clone()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

const LIFE_TRIANGLE_STEPS: &str = "Deprem anında yaşam üçgeni oluşturmak için:
1. Sağlam masa, sıra veya yatak yanına geçin
2. Çömel, kapan, tutun pozisyonu alın
3. Başınızı ve boynunuzu koruyacak şekilde kapanın
4. Pencerelerden, ağır eşyalardan uzak durun
5. Asansör kullanmayın, merdivenlerden inmeyin
6. Dışarı çıkmaya çalışmayın, içeride kalın";

/// Deterministic canned guidance. Always answers.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticDataProvider;

impl StaticDataProvider {
    pub fn new() -> Self {
        Self
    }

    /// Canned result for a query
    pub fn lookup(&self, query: &str, ctx: &UserContext) -> ToolResult {
        let q = normalize(query);

        let (category, entry, confidence) = if q.contains("hastane") {
            (
                "hospital",
                json!({
                    "title": "Genel Hastane Bilgisi",
                    "content": "Hastane bilgileri için lütfen 112 Acil Çağrı Merkezi'ni arayın veya en yakın sağlık kuruluşuna başvurun.",
                    "location": ctx.district().unwrap_or(UNKNOWN_DISTRICT),
                    "phone": "112",
                }),
                0.4,
            )
        } else if contains_any(&q, &["yaşam üçgeni", "ilkyardım"]) {
            (
                "first_aid",
                json!({
                    "title": "Yaşam Üçgeni - Deprem Anında",
                    "content": LIFE_TRIANGLE_STEPS,
                    "category": "deprem_güvenlik",
                }),
                0.8,
            )
        } else {
            (
                "general",
                json!({
                    "title": "Genel Bilgi",
                    "content": format!(
                        "\"{}\" konusunda detaylı bilgi için lütfen daha spesifik bir soru sorun veya 112 Acil Çağrı Merkezi'ni arayın.",
                        query
                    ),
                }),
                0.3,
            )
        };

        debug!("Static data lookup: {} -> {}", query, category);

        ToolResult::new(
            ToolKind::StaticData,
            json!({
                "query": query,
                "category": category,
                "results": [entry],
                "fallback": true,
            }),
            confidence,
        )
        .with_source("static_data")
    }
}

#[async_trait]
impl CapabilityProvider for StaticDataProvider {
    fn name(&self) -> &str {
        "static_data"
    }

    fn kind(&self) -> ToolKind {
        ToolKind::StaticData
    }

    async fn execute(&self, input: &ToolInput) -> Result<Option<ToolResult>, ProviderError> {
        Ok(Some(self.lookup(&input.query, &input.user_context)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(kind: ToolKind, confidence: f64) -> Arc<dyn CapabilityProvider> {
        Arc::new(FnProvider::new(kind.as_str(), kind, move |_input| async move {
            Ok(Some(ToolResult::new(kind, json!({"ok": true}), confidence)))
        }))
    }

    #[test]
    fn test_register_replaces_same_kind() {
        let mut registry = ProviderRegistry::new();
        registry.register(fixed(ToolKind::Location, 0.5));
        registry.register(fixed(ToolKind::WebSearch, 0.5));
        registry.register(fixed(ToolKind::Location, 0.9));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.kinds(), vec![ToolKind::Location, ToolKind::WebSearch]);
    }

    #[test]
    fn test_unregister() {
        let mut registry = ProviderRegistry::new().with(fixed(ToolKind::Social, 0.5));
        assert!(registry.unregister(ToolKind::Social));
        assert!(!registry.unregister(ToolKind::Social));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_fn_provider_executes_handler() {
        let provider = fixed(ToolKind::Network, 0.7);
        let input = ToolInput::new("şebeke", &UserContext::new("u1"));
        let result = provider.execute(&input).await.unwrap().unwrap();
        assert_eq!(result.kind, ToolKind::Network);
        assert_eq!(result.confidence, 0.7);
    }

    #[test]
    fn test_static_data_categories() {
        let provider = StaticDataProvider::new();
        let ctx = UserContext::new("u1").with_location("Beşiktaş", "İstanbul");

        let hospital = provider.lookup("En yakın hastane", &ctx);
        assert_eq!(hospital.confidence, 0.4);
        assert_eq!(hospital.data_str("category"), Some("hospital"));
        assert_eq!(hospital.data["results"][0]["location"], "Beşiktaş");

        let first_aid = provider.lookup("Yaşam üçgeni nasıl yapılır", &ctx);
        assert_eq!(first_aid.confidence, 0.8);
        assert_eq!(first_aid.data_str("category"), Some("first_aid"));

        let general = provider.lookup("hava durumu", &ctx);
        assert_eq!(general.confidence, 0.3);
        assert_eq!(general.source, "static_data");
        assert_eq!(general.data["fallback"], true);
    }

    #[test]
    fn test_static_data_provider_never_empty() {
        let provider = StaticDataProvider::new();
        let input = ToolInput::new("deprem", &UserContext::new("u1"));
        let result = tokio_test::block_on(provider.execute(&input)).unwrap();
        assert!(result.is_some());
    }
}
