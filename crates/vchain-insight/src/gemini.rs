//! Gemini `generateContent` provider

use crate::client::InsightProvider;
use crate::config::InsightConfig;
use crate::error::InsightError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// The coaching prompt for `topic` and `user_trait`
#[must_use]
pub fn build_prompt(topic: &str, user_trait: &str) -> String {
    format!(
        "You are a wise, mystical, yet pragmatic guide in a gamified self-discovery app called \"Espelhar.me\".\n\
         The user is currently exploring the \"{topic}\".\n\
         Based on their recent answers, they seem to exhibit the trait: \"{user_trait}\".\n\
         \n\
         Generate a \"Micro-Insight\" (max 30 words). It should be intriguing, encouraging, and personalized.\n\
         Use a tone that mixes Yu-kai Chou's gamification enthusiasm with Daniel Cook's system design wisdom.\n\
         Do not be generic. Make them feel seen."
    )
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Calls the Generative Language API over HTTPS
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GeminiProvider {
    /// Provider for `config`
    ///
    /// # Errors
    /// [`InsightError::Setup`] if the config has no usable key or the HTTP
    /// client cannot be built.
    pub fn new(config: &InsightConfig) -> Result<Self, InsightError> {
        let api_key = config
            .usable_key()
            .ok_or_else(|| InsightError::Setup("no api key".to_string()))?
            .to_string();
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| InsightError::Setup(e.to_string()))?;
        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn build_request(prompt: &str) -> Value {
        json!({
            "contents": [
                { "parts": [ { "text": prompt } ] }
            ]
        })
    }

    /// Concatenated text of the first candidate; empty when there is none
    fn extract_text(body: &str) -> Result<String, InsightError> {
        let response: GenerateResponse =
            serde_json::from_str(body).map_err(|e| InsightError::Decode(e.to_string()))?;
        let text = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default();
        Ok(text)
    }
}

#[async_trait]
impl InsightProvider for GeminiProvider {
    async fn generate(&self, prompt: &str) -> Result<String, InsightError> {
        debug!(model = %self.model, "requesting insight");
        let response = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&Self::build_request(prompt))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(InsightError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Self::extract_text(&body)
    }
}
