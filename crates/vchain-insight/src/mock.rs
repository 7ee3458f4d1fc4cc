//! Offline insight

use crate::client::InsightService;
use async_trait::async_trait;
use std::time::Duration;

/// The canned insight for `topic` and `user_trait`
#[must_use]
pub fn mock_insight(topic: &str, user_trait: &str) -> String {
    format!(
        "[IA Coach] Notei que você tem mostrado traços fortes de {user_trait} no {topic}. \
         Lembre-se: \"A verdadeira força vem do equilíbrio.\" Continue explorando!"
    )
}

/// Answers with [`mock_insight`] after a fixed latency
#[derive(Debug, Clone, Copy)]
pub struct MockInsight {
    latency: Duration,
}

impl MockInsight {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl InsightService for MockInsight {
    async fn generate_insight(&self, topic: &str, user_trait: &str) -> String {
        tokio::time::sleep(self.latency).await;
        mock_insight(topic, user_trait)
    }
}
