//! Single owner of the animation state
//!
//! The [`Engine`] serializes every mutation: user intents, timer arrivals and
//! frame ticks all go through [`Engine::dispatch`], one at a time, so the
//! sequencer and the motion updater can never interleave writes.

use crate::catalog::Catalog;
use crate::config::SimulationConfig;
use crate::cues::CueSink;
use crate::error::ConfigError;
use crate::motion::PacketMotion;
use crate::sequencer::{Effect, Sequencer, Timer};
use crate::store::AnimationStore;
use crate::types::{AnimationState, NodeId};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::sync::Arc;

/// Inputs the engine accepts
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Submit text and begin a run
    Start(String),
    /// Pause or resume
    TogglePause,
    /// Cancel everything and go idle
    Reset,
    /// Inspect a node (or clear the selection)
    SelectNode(Option<NodeId>),
    /// A previously scheduled timer has elapsed
    Fire(Timer),
    /// One animation frame
    Frame,
}

#[derive(Debug)]
pub struct Engine {
    store: AnimationStore,
    sequencer: Sequencer,
    motion: PacketMotion,
    config: SimulationConfig,
}

impl Engine {
    /// Engine over `catalog` driven by `config`
    ///
    /// # Errors
    /// [`ConfigError::InvalidValue`] if `config` fails validation.
    pub fn new(catalog: Arc<Catalog>, config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::assemble(catalog, config))
    }

    fn assemble(catalog: Arc<Catalog>, config: SimulationConfig) -> Self {
        Self {
            store: AnimationStore::new(&config.greeting),
            sequencer: Sequencer::new(catalog, &config),
            motion: PacketMotion::new(config.packet_step),
            config,
        }
    }

    /// Engine over the built-in tables with default timing
    pub fn builtin() -> Self {
        Self::assemble(Arc::new(Catalog::builtin()), SimulationConfig::default())
    }

    /// Use a deterministic agent picker
    #[must_use]
    pub fn with_seed(self, seed: u64) -> Self {
        self.with_rng(StdRng::seed_from_u64(seed))
    }

    #[must_use]
    pub fn with_rng(mut self, rng: impl RngCore + Send + 'static) -> Self {
        self.sequencer = self.sequencer.with_rng(rng);
        self
    }

    #[must_use]
    pub fn with_cues(mut self, cues: Arc<dyn CueSink>) -> Self {
        self.sequencer = self.sequencer.with_cues(cues);
        self
    }

    /// Apply one command and report the timer work it produced
    pub fn dispatch(&mut self, command: Command) -> Vec<Effect> {
        match command {
            Command::Start(text) => self.sequencer.start(&mut self.store, &text),
            Command::TogglePause => self.sequencer.toggle_pause(&mut self.store),
            Command::Reset => self.sequencer.reset(&mut self.store),
            Command::SelectNode(id) => {
                self.store.select_node(id);
                Vec::new()
            }
            Command::Fire(timer) => self.sequencer.fire(&mut self.store, timer),
            Command::Frame => {
                self.motion.tick(&mut self.store);
                Vec::new()
            }
        }
    }

    /// Apply one frame; returns whether anything moved
    pub fn frame(&mut self) -> bool {
        self.motion.tick(&mut self.store)
    }

    pub fn state(&self) -> &AnimationState {
        self.store.state()
    }

    pub fn snapshot(&self) -> AnimationState {
        self.store.snapshot()
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        self.sequencer.catalog()
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }
}
