//! vchain insight - short personalised coaching lines
//!
//! [`InsightClient`] asks a remote text model for a one-line "micro insight"
//! about a topic and a user trait. It never fails: without an API key, or
//! when the remote call errors, it answers with a canned line instead.
//!
//! # Example
//!
//! ```rust,ignore
//! use vchain_insight::{InsightClient, InsightConfig, InsightService};
//!
//! # async fn example() {
//! let client = InsightClient::new(InsightConfig::from_env());
//! let line = client.generate_insight("Mapa da Carreira", "curiosidade").await;
//! println!("{line}");
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod client;
mod config;
mod error;
mod gemini;
mod mock;

pub use client::{InsightClient, InsightProvider, InsightService};
pub use config::{InsightConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use error::InsightError;
pub use gemini::{build_prompt, GeminiProvider};
pub use mock::{mock_insight, MockInsight};

/// Returned when the model answers with no text
pub const EMPTY_RESPONSE_FALLBACK: &str =
    "A névoa encobre o futuro, mas seus passos revelam seu caminho.";
