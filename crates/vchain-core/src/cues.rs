//! Audio feedback seam
//!
//! Cues are fire-and-forget. A sink may fail (no device, blocked context),
//! but [`emit`] swallows the failure so it never reaches simulation state.

use crate::error::CueError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// UI feedback events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cue {
    /// A step begins
    Blip,
    /// Agent revealed or run complete
    Success,
    /// Input injected
    Beam,
    /// Pointer over a node
    Hover,
}

/// Oscillator shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Triangle,
    Sawtooth,
}

/// Synth parameters a sound backend renders a cue with
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub waveform: Waveform,
    pub start_hz: f32,
    pub end_hz: f32,
    pub gain: f32,
    pub duration_ms: u32,
}

impl Cue {
    /// Tone for this cue; `Hover` is silent
    #[must_use]
    pub fn tone(self) -> Option<Tone> {
        match self {
            Cue::Blip => Some(Tone {
                waveform: Waveform::Sine,
                start_hz: 800.0,
                end_hz: 1200.0,
                gain: 0.05,
                duration_ms: 100,
            }),
            Cue::Success => Some(Tone {
                waveform: Waveform::Triangle,
                start_hz: 440.0,
                end_hz: 880.0,
                gain: 0.05,
                duration_ms: 500,
            }),
            Cue::Beam => Some(Tone {
                waveform: Waveform::Sawtooth,
                start_hz: 200.0,
                end_hz: 800.0,
                gain: 0.03,
                duration_ms: 300,
            }),
            Cue::Hover => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Cue::Blip => "blip",
            Cue::Success => "success",
            Cue::Beam => "beam",
            Cue::Hover => "hover",
        }
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Something that can play cues
pub trait CueSink: Send + Sync {
    /// Play a cue
    ///
    /// # Errors
    /// [`CueError`] when audio is unavailable.
    fn play(&self, cue: Cue) -> Result<(), CueError>;
}

/// Play `cue`, discarding any failure
pub fn emit(sink: &dyn CueSink, cue: Cue) {
    if let Err(e) = sink.play(cue) {
        tracing::trace!(%cue, error = %e, "cue dropped");
    }
}

/// Discards every cue
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentCues;

impl CueSink for SilentCues {
    fn play(&self, _cue: Cue) -> Result<(), CueError> {
        Ok(())
    }
}

/// Logs each cue with the tone a backend would synthesize
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingCues;

impl CueSink for TracingCues {
    fn play(&self, cue: Cue) -> Result<(), CueError> {
        match cue.tone() {
            Some(tone) => tracing::debug!(
                %cue,
                waveform = ?tone.waveform,
                start_hz = tone.start_hz,
                end_hz = tone.end_hz,
                duration_ms = tone.duration_ms,
                "cue"
            ),
            None => tracing::trace!(%cue, "silent cue"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    impl CueSink for Broken {
        fn play(&self, _cue: Cue) -> Result<(), CueError> {
            Err(CueError::Unavailable("suspended".into()))
        }
    }

    #[test]
    fn emit_swallows_failures() {
        emit(&Broken, Cue::Beam);
        emit(&SilentCues, Cue::Blip);
        emit(&TracingCues, Cue::Hover);
    }

    #[test]
    fn hover_has_no_tone() {
        assert!(Cue::Hover.tone().is_none());
        assert_eq!(Cue::Beam.tone().unwrap().waveform, Waveform::Sawtooth);
        assert_eq!(Cue::Success.to_string(), "success");
    }
}
