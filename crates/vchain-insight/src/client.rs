//! Insight service seam and the falling-back client

use crate::config::InsightConfig;
use crate::error::InsightError;
use crate::gemini::{build_prompt, GeminiProvider};
use crate::mock::MockInsight;
use crate::EMPTY_RESPONSE_FALLBACK;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

/// Produces a short insight; always answers
#[async_trait]
pub trait InsightService: Send + Sync {
    async fn generate_insight(&self, topic: &str, user_trait: &str) -> String;
}

/// A remote text generator that may fail
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InsightProvider: Send + Sync {
    /// Generate text for `prompt`
    ///
    /// # Errors
    /// Any transport, status or decode failure.
    async fn generate(&self, prompt: &str) -> Result<String, InsightError>;
}

/// Remote provider with an offline fallback
#[derive(Clone)]
pub struct InsightClient {
    provider: Option<Arc<dyn InsightProvider>>,
    fallback: MockInsight,
}

impl std::fmt::Debug for InsightClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InsightClient")
            .field("remote", &self.provider.is_some())
            .field("fallback", &self.fallback)
            .finish()
    }
}

impl InsightClient {
    /// Gemini when `config` carries a usable key, otherwise offline only
    pub fn new(config: InsightConfig) -> Self {
        let fallback = MockInsight::new(config.mock_latency);
        if config.usable_key().is_none() {
            warn!("no api key, insights use the offline fallback");
            return Self::offline(fallback);
        }
        match GeminiProvider::new(&config) {
            Ok(provider) => Self::with_provider(Arc::new(provider), fallback),
            Err(e) => {
                warn!(error = %e, "insight provider unavailable, using offline fallback");
                Self::offline(fallback)
            }
        }
    }

    pub fn offline(fallback: MockInsight) -> Self {
        Self {
            provider: None,
            fallback,
        }
    }

    pub fn with_provider(provider: Arc<dyn InsightProvider>, fallback: MockInsight) -> Self {
        Self {
            provider: Some(provider),
            fallback,
        }
    }

    /// Whether a remote provider is configured
    #[must_use]
    pub fn is_remote(&self) -> bool {
        self.provider.is_some()
    }
}

#[async_trait]
impl InsightService for InsightClient {
    async fn generate_insight(&self, topic: &str, user_trait: &str) -> String {
        let Some(provider) = &self.provider else {
            return self.fallback.generate_insight(topic, user_trait).await;
        };

        match provider.generate(&build_prompt(topic, user_trait)).await {
            Ok(text) if text.trim().is_empty() => EMPTY_RESPONSE_FALLBACK.to_string(),
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "insight request failed, using offline fallback");
                self.fallback.generate_insight(topic, user_trait).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::mock_insight;
    use std::time::Duration;

    fn client(mock: MockInsightProvider) -> InsightClient {
        InsightClient::with_provider(Arc::new(mock), MockInsight::new(Duration::ZERO))
    }

    #[tokio::test]
    async fn returns_provider_text() {
        let mut provider = MockInsightProvider::new();
        provider
            .expect_generate()
            .withf(|prompt| prompt.contains("\"foco\""))
            .times(1)
            .returning(|_| Ok("Seu foco abre portas.".to_string()));

        let text = client(provider).generate_insight("Mapa", "foco").await;
        assert_eq!(text, "Seu foco abre portas.");
    }

    #[tokio::test]
    async fn empty_text_uses_fixed_line() {
        let mut provider = MockInsightProvider::new();
        provider
            .expect_generate()
            .returning(|_| Ok(String::new()));

        let text = client(provider).generate_insight("Mapa", "foco").await;
        assert_eq!(text, EMPTY_RESPONSE_FALLBACK);
    }

    #[tokio::test]
    async fn error_falls_back_to_mock_text() {
        let mut provider = MockInsightProvider::new();
        provider.expect_generate().returning(|_| {
            Err(InsightError::Status {
                status: 500,
                body: "boom".to_string(),
            })
        });

        let text = client(provider).generate_insight("Mapa", "foco").await;
        assert_eq!(text, mock_insight("Mapa", "foco"));
    }

    #[tokio::test(start_paused = true)]
    async fn no_key_means_offline() {
        let client = InsightClient::new(InsightConfig::new());
        assert!(!client.is_remote());
        let text = client.generate_insight("Mapa", "foco").await;
        assert_eq!(text, mock_insight("Mapa", "foco"));
    }

    #[test]
    fn key_means_remote() {
        let client = InsightClient::new(InsightConfig::new().with_api_key("k"));
        assert!(client.is_remote());
    }
}
