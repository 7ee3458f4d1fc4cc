//! Step sequencer
//!
//! Walks the catalog timeline one step at a time. The sequencer never sleeps
//! itself: every delayed continuation is returned as an [`Effect::Schedule`]
//! and comes back later through [`Sequencer::fire`]. Each timer carries the
//! generation of its slot, and a timer is honoured only while it is still the
//! pending one for that slot, so anything cancelled by pause, reset or a new
//! run is a no-op when it arrives.
//!
//! Slots:
//! - **advance**: the beam entry or the next-step timer. At most one pending.
//! - **reveal**: the agent picker's sub-delay. Independent of the advance
//!   slot; pausing leaves it alone, reset and a new run cancel it.

use crate::catalog::Catalog;
use crate::config::SimulationConfig;
use crate::cues::{emit, Cue, CueSink, TracingCues};
use crate::store::AnimationStore;
use crate::types::{AgentIndex, StepKind, AGENT_COUNT};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::sync::Arc;
use std::time::Duration;

/// Independent timer lanes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerSlot {
    Advance,
    Reveal,
}

/// What a timer does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Beam has landed; begin step 0
    BeamEntry,
    /// Begin the given step (or finish, if past the end)
    Advance { step: usize },
    /// Reveal the agent pick for the given step
    AgentReveal { step: usize },
}

impl TimerKind {
    #[must_use]
    pub fn slot(self) -> TimerSlot {
        match self {
            TimerKind::BeamEntry | TimerKind::Advance { .. } => TimerSlot::Advance,
            TimerKind::AgentReveal { .. } => TimerSlot::Reveal,
        }
    }
}

/// A delayed continuation requested by the sequencer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timer {
    pub kind: TimerKind,
    pub generation: u64,
    pub delay: Duration,
}

impl Timer {
    #[inline]
    #[must_use]
    pub fn slot(&self) -> TimerSlot {
        self.kind.slot()
    }
}

/// Instructions for whoever drives the clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Deliver the timer back through `fire` after its delay
    Schedule(Timer),
    /// Drop whatever is outstanding in this slot
    Cancel(TimerSlot),
}

/// Timeline sequencer
pub struct Sequencer {
    catalog: Arc<Catalog>,
    beam_delay: Duration,
    reveal_delay: Duration,
    completion: String,
    rng: Box<dyn RngCore + Send>,
    cues: Arc<dyn CueSink>,
    advance_generation: u64,
    reveal_generation: u64,
    pending_advance: Option<Timer>,
    pending_reveal: Option<Timer>,
}

impl std::fmt::Debug for Sequencer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sequencer")
            .field("steps", &self.catalog.len())
            .field("pending_advance", &self.pending_advance)
            .field("pending_reveal", &self.pending_reveal)
            .finish_non_exhaustive()
    }
}

impl Sequencer {
    /// Sequencer with an entropy-seeded RNG and tracing cues
    pub fn new(catalog: Arc<Catalog>, config: &SimulationConfig) -> Self {
        Self {
            catalog,
            beam_delay: config.beam_delay(),
            reveal_delay: config.agent_reveal_delay(),
            completion: config.completion_message.clone(),
            rng: Box::new(StdRng::from_entropy()),
            cues: Arc::new(TracingCues),
            advance_generation: 0,
            reveal_generation: 0,
            pending_advance: None,
            pending_reveal: None,
        }
    }

    /// Replace the random source used by the agent picker
    #[must_use]
    pub fn with_rng(mut self, rng: impl RngCore + Send + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    /// Replace the cue sink
    #[must_use]
    pub fn with_cues(mut self, cues: Arc<dyn CueSink>) -> Self {
        self.cues = cues;
        self
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// The outstanding advance timer, if any
    pub fn pending_advance(&self) -> Option<&Timer> {
        self.pending_advance.as_ref()
    }

    /// The outstanding agent reveal timer, if any
    pub fn pending_reveal(&self) -> Option<&Timer> {
        self.pending_reveal.as_ref()
    }

    /// Begin a run for `input`. Ignored while a run is active.
    pub fn start(&mut self, store: &mut AnimationStore, input: &str) -> Vec<Effect> {
        if store.state().simulating {
            tracing::debug!("start ignored: already simulating");
            return Vec::new();
        }
        tracing::info!(input, "run started");

        let mut effects = Vec::new();
        self.cancel_reveal(&mut effects);
        store.begin_run(input);
        emit(self.cues.as_ref(), Cue::Beam);
        self.schedule_advance(TimerKind::BeamEntry, self.beam_delay, &mut effects);
        effects
    }

    /// Enter step `index`, or finish the run when `index` is past the end
    pub fn advance_to(&mut self, store: &mut AnimationStore, index: usize) -> Vec<Effect> {
        let mut effects = Vec::new();
        let catalog = Arc::clone(&self.catalog);

        let Some(step) = catalog.step(index) else {
            self.cancel_advance(&mut effects);
            store.finish_run(&self.completion);
            emit(self.cues.as_ref(), Cue::Success);
            tracing::info!(steps = catalog.len(), "run complete");
            return effects;
        };
        // Validated catalogs guarantee a non-empty active list.
        let (Some(first), Some(last)) = (step.active_nodes.first(), step.active_nodes.last())
        else {
            return effects;
        };

        tracing::info!(step = index, description = %step.description, "step begins");
        emit(self.cues.as_ref(), Cue::Blip);

        let duration = step.duration();
        match step.kind {
            StepKind::AgentSelection => {
                store.show_agent_selector(index, first.clone());
                self.cancel_reveal(&mut effects);
                self.reveal_generation += 1;
                let timer = Timer {
                    kind: TimerKind::AgentReveal { step: index },
                    generation: self.reveal_generation,
                    delay: self.reveal_delay,
                };
                self.pending_reveal = Some(timer);
                effects.push(Effect::Schedule(timer));
            }
            StepKind::Transfer | StepKind::Processing => {
                store.enter_step(index, last.clone(), &step.packets);
            }
        }

        self.schedule_advance(
            TimerKind::Advance { step: index + 1 },
            duration,
            &mut effects,
        );
        effects
    }

    /// Deliver a timer. Stale timers are ignored.
    pub fn fire(&mut self, store: &mut AnimationStore, timer: Timer) -> Vec<Effect> {
        match timer.slot() {
            TimerSlot::Advance => {
                if self.pending_advance != Some(timer) {
                    tracing::trace!(?timer, "stale advance timer");
                    return Vec::new();
                }
                self.pending_advance = None;
                match timer.kind {
                    TimerKind::BeamEntry => {
                        store.end_beam();
                        self.advance_to(store, 0)
                    }
                    TimerKind::Advance { step } => self.advance_to(store, step),
                    TimerKind::AgentReveal { .. } => Vec::new(),
                }
            }
            TimerSlot::Reveal => {
                if self.pending_reveal != Some(timer) {
                    tracing::trace!(?timer, "stale reveal timer");
                    return Vec::new();
                }
                self.pending_reveal = None;
                let pick = self.rng.gen_range(0..AGENT_COUNT);
                if let Some(agent) = AgentIndex::new(pick) {
                    tracing::debug!(agent = pick, "agent revealed");
                    store.reveal_agent(agent);
                    emit(self.cues.as_ref(), Cue::Success);
                }
                Vec::new()
            }
        }
    }

    /// Pause or resume
    ///
    /// Pausing cancels the pending advance. Resuming an active run continues
    /// immediately with the step after the current one (step 0 if the beam
    /// was still travelling). Resuming while idle schedules nothing.
    pub fn toggle_pause(&mut self, store: &mut AnimationStore) -> Vec<Effect> {
        let paused = !store.state().paused;
        store.set_paused(paused);

        let mut effects = Vec::new();
        if paused {
            tracing::debug!(step = ?store.state().current_step, "paused");
            self.cancel_advance(&mut effects);
            return effects;
        }

        if !store.state().simulating {
            tracing::debug!("resume ignored: idle");
            return effects;
        }
        tracing::debug!(step = ?store.state().current_step, "resumed");
        self.cancel_advance(&mut effects);
        let next = match store.state().current_step {
            Some(current) => current + 1,
            None => {
                store.end_beam();
                0
            }
        };
        effects.extend(self.advance_to(store, next));
        effects
    }

    /// Cancel every timer and return to idle
    pub fn reset(&mut self, store: &mut AnimationStore) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.cancel_advance(&mut effects);
        self.cancel_reveal(&mut effects);
        store.reset();
        tracing::debug!("reset");
        effects
    }

    fn schedule_advance(&mut self, kind: TimerKind, delay: Duration, effects: &mut Vec<Effect>) {
        self.cancel_advance(effects);
        self.advance_generation += 1;
        let timer = Timer {
            kind,
            generation: self.advance_generation,
            delay,
        };
        self.pending_advance = Some(timer);
        effects.push(Effect::Schedule(timer));
    }

    fn cancel_advance(&mut self, effects: &mut Vec<Effect>) {
        if self.pending_advance.take().is_some() {
            self.advance_generation += 1;
            effects.push(Effect::Cancel(TimerSlot::Advance));
        }
    }

    fn cancel_reveal(&mut self, effects: &mut Vec<Effect>) {
        if self.pending_reveal.take().is_some() {
            self.reveal_generation += 1;
            effects.push(Effect::Cancel(TimerSlot::Reveal));
        }
    }
}
