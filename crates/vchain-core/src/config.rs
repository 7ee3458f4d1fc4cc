//! Simulation timing and transcript configuration

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Opening line of every transcript
pub const DEFAULT_GREETING: &str =
    "Olá! Eu sou sua Mente Digital. Diga algo, e eu te mostro como eu penso.";

/// Line appended when the timeline runs to completion
pub const DEFAULT_COMPLETION: &str = "Simulação concluída.";

/// Simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Entry beam travel time before step 0
    pub beam_delay_ms: u64,
    /// Delay between showing the agent picker and revealing the pick
    pub agent_reveal_delay_ms: u64,
    /// Progress added to every live packet per frame
    pub packet_step: f64,
    /// Frame period of the packet motion loop
    pub frame_interval_ms: u64,
    pub greeting: String,
    pub completion_message: String,
}

impl SimulationConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With beam delay
    #[inline]
    #[must_use]
    pub fn with_beam_delay(mut self, delay: Duration) -> Self {
        self.beam_delay_ms = millis(delay);
        self
    }

    /// With agent reveal delay
    #[inline]
    #[must_use]
    pub fn with_agent_reveal_delay(mut self, delay: Duration) -> Self {
        self.agent_reveal_delay_ms = millis(delay);
        self
    }

    /// With per-frame packet increment
    #[inline]
    #[must_use]
    pub fn with_packet_step(mut self, step: f64) -> Self {
        self.packet_step = step;
        self
    }

    /// With frame interval
    #[inline]
    #[must_use]
    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval_ms = millis(interval);
        self
    }

    pub fn beam_delay(&self) -> Duration {
        Duration::from_millis(self.beam_delay_ms)
    }

    pub fn agent_reveal_delay(&self) -> Duration {
        Duration::from_millis(self.agent_reveal_delay_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    /// Parse from TOML and validate
    ///
    /// # Errors
    /// [`ConfigError::Parse`] or [`ConfigError::InvalidValue`].
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// [`ConfigError::Io`] when the file cannot be read, otherwise as
    /// [`SimulationConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::io_error(path, e))?;
        Self::from_toml_str(&raw)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// [`ConfigError::InvalidValue`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "frame_interval_ms",
                reason: "must be positive".to_string(),
            });
        }
        if !self.packet_step.is_finite() || self.packet_step <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "packet_step",
                reason: format!("must be a positive number, got {}", self.packet_step),
            });
        }
        Ok(())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            beam_delay_ms: 1000,
            agent_reveal_delay_ms: 1500,
            packet_step: 2.0,
            frame_interval_ms: 16,
            greeting: DEFAULT_GREETING.to_string(),
            completion_message: DEFAULT_COMPLETION.to_string(),
        }
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = SimulationConfig::from_toml_str("beam_delay_ms = 250\n").unwrap();
        assert_eq!(config.beam_delay(), Duration::from_millis(250));
        assert_eq!(config.agent_reveal_delay(), Duration::from_millis(1500));
        assert_eq!(config.completion_message, DEFAULT_COMPLETION);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            SimulationConfig::from_toml_str("frame_interval_ms = 0"),
            Err(ConfigError::InvalidValue {
                field: "frame_interval_ms",
                ..
            })
        ));
        assert!(matches!(
            SimulationConfig::from_toml_str("packet_step = -1.0"),
            Err(ConfigError::InvalidValue {
                field: "packet_step",
                ..
            })
        ));
        assert!(matches!(
            SimulationConfig::from_toml_str("packet_step = \"fast\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "packet_step = 4.0").unwrap();
        let config = SimulationConfig::load(file.path()).unwrap();
        assert_eq!(config.packet_step, 4.0);

        let missing = SimulationConfig::load("/definitely/not/here.toml");
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn builders_set_durations() {
        let config = SimulationConfig::new()
            .with_beam_delay(Duration::from_millis(10))
            .with_agent_reveal_delay(Duration::from_millis(20))
            .with_frame_interval(Duration::from_millis(5))
            .with_packet_step(1.5);
        assert_eq!(config.beam_delay_ms, 10);
        assert_eq!(config.agent_reveal_delay_ms, 20);
        assert_eq!(config.frame_interval_ms, 5);
        assert!(config.validate().is_ok());
    }
}
