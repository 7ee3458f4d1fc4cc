//! Insight configuration

use std::time::Duration;

/// Generative model used for insights
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// Generative Language API root
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Insight client configuration
#[derive(Clone, PartialEq, Eq)]
pub struct InsightConfig {
    /// API key; `None` or empty selects the offline fallback
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Simulated latency of the canned answer
    pub mock_latency: Duration,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(20),
            mock_latency: Duration::from_millis(1500),
        }
    }
}

impl std::fmt::Debug for InsightConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InsightConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("mock_latency", &self.mock_latency)
            .finish()
    }
}

impl InsightConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults plus the key from `API_KEY`, or `GEMINI_API_KEY` if that is unset
    #[must_use]
    pub fn from_env() -> Self {
        let api_key = ["API_KEY", "GEMINI_API_KEY"]
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .find(|key| !key.trim().is_empty());
        Self {
            api_key,
            ..Self::default()
        }
    }

    /// With API key
    #[inline]
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// With model name
    #[inline]
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// With API root
    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// With request timeout
    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// With canned-answer latency
    #[inline]
    #[must_use]
    pub fn with_mock_latency(mut self, latency: Duration) -> Self {
        self.mock_latency = latency;
        self
    }

    /// The key, if one is set and non-blank
    #[must_use]
    pub fn usable_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_key_is_not_usable() {
        assert_eq!(InsightConfig::new().usable_key(), None);
        assert_eq!(InsightConfig::new().with_api_key("  ").usable_key(), None);
        assert_eq!(InsightConfig::new().with_api_key("k").usable_key(), Some("k"));
    }

    #[test]
    fn debug_hides_the_key() {
        let shown = format!("{:?}", InsightConfig::new().with_api_key("secret"));
        assert!(!shown.contains("secret"));
        assert!(shown.contains("<redacted>"));
    }
}
