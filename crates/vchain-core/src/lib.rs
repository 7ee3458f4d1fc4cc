//! vchain core - animated value-chain simulation
//!
//! A scripted, timed walk over a layered node diagram:
//! - [`catalog`] holds the validated node graph and step timeline
//! - [`sequencer`] advances through the timeline with cancellable timers
//! - [`motion`] moves in-flight packets once per frame
//! - [`engine`] serializes every mutation of the [`AnimationState`]
//! - [`runtime`] drives an engine on tokio in real time
//! - [`test_harness`] drives one on a virtual clock
//!
//! # Example
//!
//! ```rust,ignore
//! use vchain_core::prelude::*;
//!
//! # async fn example() -> Result<(), RuntimeError> {
//! let (handle, _task) = vchain_core::runtime::spawn(Engine::builtin());
//! handle.start("Qual o lucro?").await?;
//! let state = handle.state();
//! assert!(state.simulating);
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod catalog;
pub mod config;
pub mod cues;
pub mod engine;
pub mod error;
pub mod motion;
pub mod runtime;
pub mod sequencer;
pub mod store;
pub mod types;

pub mod test_harness;

// Re-exports for convenience
pub use catalog::{Catalog, CatalogDocument};
pub use config::{SimulationConfig, DEFAULT_COMPLETION, DEFAULT_GREETING};
pub use cues::{Cue, CueSink, SilentCues, Tone, TracingCues, Waveform};
pub use engine::{Command, Engine};
pub use error::{CatalogError, ConfigError, CueError, RuntimeError};
pub use motion::PacketMotion;
pub use runtime::SimulationHandle;
pub use sequencer::{Effect, Sequencer, Timer, TimerKind, TimerSlot};
pub use store::AnimationStore;
pub use types::*;

/// Re-export test harness for external use
pub use test_harness::{run_simulator, SimulatorConfig, TestHarness, VirtualDriver};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude for common imports
pub mod prelude {
    pub use crate::catalog::Catalog;
    pub use crate::config::SimulationConfig;
    pub use crate::cues::{Cue, CueSink};
    pub use crate::engine::{Command, Engine};
    pub use crate::error::{CatalogError, ConfigError, RuntimeError};
    pub use crate::runtime::SimulationHandle;
    pub use crate::types::{AnimationState, ChatEntry, NodeId, TimelineStep};
}
