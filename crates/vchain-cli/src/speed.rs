//! Playback speed scaling

use anyhow::{bail, Result};
use vchain_core::{Catalog, SimulationConfig};

fn scale(ms: u64, speed: f64) -> u64 {
    ((ms as f64) / speed).round().max(1.0) as u64
}

/// Divide every delay by `speed`
///
/// Packets keep arriving at the same point of their step: the frame interval
/// stays put and the per-frame increment grows instead.
pub(crate) fn apply(
    catalog: &Catalog,
    config: &SimulationConfig,
    speed: f64,
) -> Result<(Catalog, SimulationConfig)> {
    if !speed.is_finite() || speed <= 0.0 {
        bail!("--speed must be a positive number, got {speed}");
    }

    let mut config = config.clone();
    config.beam_delay_ms = scale(config.beam_delay_ms, speed);
    config.agent_reveal_delay_ms = scale(config.agent_reveal_delay_ms, speed);
    config.packet_step *= speed;

    let mut doc = catalog.to_document();
    for step in &mut doc.timeline {
        step.duration_ms = scale(step.duration_ms, speed);
    }
    Ok((Catalog::new(doc.layers, doc.timeline)?, config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doubles_speed() {
        let (catalog, config) =
            apply(&Catalog::builtin(), &SimulationConfig::default(), 2.0).unwrap();
        assert_eq!(config.beam_delay_ms, 500);
        assert_eq!(config.agent_reveal_delay_ms, 750);
        assert_eq!(config.packet_step, 4.0);
        assert_eq!(catalog.total_duration().as_millis(), 9000);
    }

    #[test]
    fn rejects_non_positive() {
        let catalog = Catalog::builtin();
        let config = SimulationConfig::default();
        assert!(apply(&catalog, &config, 0.0).is_err());
        assert!(apply(&catalog, &config, f64::NAN).is_err());
    }
}
