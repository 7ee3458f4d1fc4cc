// Test harness module
// Virtual-time driver and randomized invariant simulator

pub mod simulator;

pub use simulator::*;

use crate::engine::{Command, Engine};
use crate::sequencer::{Effect, Timer, TimerSlot};
use crate::types::AnimationState;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
struct Scheduled {
    due: Duration,
    seq: u64,
    timer: Timer,
}

/// Drives an [`Engine`] on a virtual clock
///
/// Timers are kept in a queue and frame ticks happen at every multiple of the
/// configured frame interval. At equal instants timers run before frames.
/// Nothing sleeps, so whole runs complete instantly and reproducibly.
#[derive(Debug)]
pub struct VirtualDriver {
    engine: Engine,
    now: Duration,
    next_frame: Duration,
    frame_interval: Duration,
    queue: Vec<Scheduled>,
    seq: u64,
}

impl VirtualDriver {
    pub fn new(engine: Engine) -> Self {
        let frame_interval = engine.config().frame_interval();
        Self {
            engine,
            now: Duration::ZERO,
            next_frame: Duration::ZERO,
            frame_interval,
            queue: Vec::new(),
            seq: 0,
        }
    }

    /// Apply a command at the current instant
    pub fn dispatch(&mut self, command: Command) {
        let effects = self.engine.dispatch(command);
        self.apply(effects);
    }

    pub fn start(&mut self, text: &str) {
        self.dispatch(Command::Start(text.to_string()));
    }

    pub fn toggle_pause(&mut self) {
        self.dispatch(Command::TogglePause);
    }

    pub fn reset(&mut self) {
        self.dispatch(Command::Reset);
    }

    /// Move the clock forward, running every timer and frame that falls due
    pub fn advance(&mut self, by: Duration) {
        self.advance_observing(by, |_, _| {});
    }

    /// Like [`VirtualDriver::advance`], calling `observe` after every event
    pub fn advance_observing(
        &mut self,
        by: Duration,
        mut observe: impl FnMut(Duration, &AnimationState),
    ) {
        let target = self.now + by;
        loop {
            let next_timer = self
                .queue
                .iter()
                .min_by_key(|s| (s.due, s.seq))
                .copied()
                .filter(|s| s.due <= target);

            match next_timer {
                Some(s) if s.due <= self.next_frame || self.next_frame > target => {
                    self.queue.retain(|q| q.seq != s.seq);
                    self.now = s.due;
                    self.dispatch(Command::Fire(s.timer));
                }
                _ if self.next_frame <= target => {
                    self.now = self.next_frame;
                    self.next_frame += self.frame_interval;
                    self.engine.frame();
                }
                _ => break,
            }
            observe(self.now, self.engine.state());
        }
        self.now = target;
    }

    /// Advance in frame-sized hops until the run ends and no timer is left
    ///
    /// Returns the elapsed virtual time, or `None` if `limit` ran out first.
    pub fn run_until_idle(&mut self, limit: Duration) -> Option<Duration> {
        let started = self.now;
        while self.engine.state().simulating || !self.queue.is_empty() {
            if self.now - started >= limit {
                return None;
            }
            self.advance(self.frame_interval);
        }
        Some(self.now - started)
    }

    /// Timers queued in `slot`
    #[must_use]
    pub fn pending(&self, slot: TimerSlot) -> usize {
        self.queue.iter().filter(|s| s.timer.slot() == slot).count()
    }

    /// All queued timers
    #[must_use]
    pub fn pending_total(&self) -> usize {
        self.queue.len()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn state(&self) -> &AnimationState {
        self.engine.state()
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Schedule(timer) => {
                    self.queue.retain(|s| s.timer.slot() != timer.slot());
                    self.seq += 1;
                    self.queue.push(Scheduled {
                        due: self.now + timer.delay,
                        seq: self.seq,
                        timer,
                    });
                }
                Effect::Cancel(slot) => self.queue.retain(|s| s.timer.slot() != slot),
            }
        }
    }
}

/// Convenience entry points for randomized checking
pub struct TestHarness;

impl TestHarness {
    /// Run the simulator across `seeds` seeds
    pub fn run_certification(seeds: u64, operations: u64) -> CertificationReport {
        let mut total_violations = 0;
        let mut passed = true;
        for seed in 0..seeds {
            let report = run_simulator(SimulatorConfig {
                seed,
                total_operations: operations,
                ..Default::default()
            });
            passed &= report.passed();
            total_violations += report.violations.len();
        }
        CertificationReport {
            passed: passed && total_violations == 0,
            total_violations,
            seeds_tested: seeds,
        }
    }
}

/// Report from certification
#[derive(Debug, Clone)]
pub struct CertificationReport {
    pub passed: bool,
    pub total_violations: usize,
    pub seeds_tested: u64,
}
