//! Tokio actor that drives an [`Engine`] in real time
//!
//! One task owns the engine. Front ends talk to it through a cloneable
//! [`SimulationHandle`]: commands go in over an mpsc channel, state snapshots
//! come out over a `watch` channel. Timers are sleeping tasks that post
//! [`Command::Fire`] back into the same channel, and the frame loop is an
//! interval in the actor's `select!`, so every mutation is serialized.

use crate::engine::{Command, Engine};
use crate::error::RuntimeError;
use crate::sequencer::{Effect, Timer, TimerSlot};
use crate::types::{AnimationState, NodeId};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

const COMMAND_BUFFER: usize = 64;

#[derive(Debug)]
enum Request {
    Command(Command),
    Shutdown,
}

/// Client side of a running simulation
#[derive(Debug, Clone)]
pub struct SimulationHandle {
    sender: mpsc::Sender<Request>,
    state: watch::Receiver<AnimationState>,
}

impl SimulationHandle {
    /// Submit text and begin a run (ignored while one is active)
    pub async fn start(&self, text: impl Into<String>) -> Result<(), RuntimeError> {
        self.send(Command::Start(text.into())).await
    }

    /// Pause or resume
    pub async fn toggle_pause(&self) -> Result<(), RuntimeError> {
        self.send(Command::TogglePause).await
    }

    /// Cancel all timers and return to idle
    pub async fn reset(&self) -> Result<(), RuntimeError> {
        self.send(Command::Reset).await
    }

    /// Inspect a node, or clear the selection with `None`
    pub async fn select_node(&self, id: Option<NodeId>) -> Result<(), RuntimeError> {
        self.send(Command::SelectNode(id)).await
    }

    /// Latest published state
    #[must_use]
    pub fn state(&self) -> AnimationState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AnimationState> {
        self.state.clone()
    }

    /// Stop the actor; pending timers are aborted
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        self.sender
            .send(Request::Shutdown)
            .await
            .map_err(|_| RuntimeError::Closed)
    }

    async fn send(&self, command: Command) -> Result<(), RuntimeError> {
        self.sender
            .send(Request::Command(command))
            .await
            .map_err(|_| RuntimeError::Closed)
    }
}

/// Spawn the actor on the current tokio runtime
pub fn spawn(engine: Engine) -> (SimulationHandle, JoinHandle<()>) {
    let (sender, receiver) = mpsc::channel(COMMAND_BUFFER);
    let (state_tx, state_rx) = watch::channel(engine.snapshot());
    let actor = Actor {
        engine,
        receiver,
        timers: sender.downgrade(),
        state: state_tx,
        advance_task: None,
        reveal_task: None,
    };
    let task = tokio::spawn(actor.run());
    (
        SimulationHandle {
            sender,
            state: state_rx,
        },
        task,
    )
}

struct Actor {
    engine: Engine,
    receiver: mpsc::Receiver<Request>,
    timers: mpsc::WeakSender<Request>,
    state: watch::Sender<AnimationState>,
    advance_task: Option<JoinHandle<()>>,
    reveal_task: Option<JoinHandle<()>>,
}

impl Actor {
    async fn run(mut self) {
        let mut frames = tokio::time::interval(self.engine.config().frame_interval());
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tracing::debug!("simulation actor started");

        loop {
            tokio::select! {
                request = self.receiver.recv() => match request {
                    Some(Request::Command(command)) => {
                        let effects = self.engine.dispatch(command);
                        self.apply(effects);
                        self.publish();
                    }
                    Some(Request::Shutdown) | None => break,
                },
                _ = frames.tick() => {
                    if self.engine.frame() {
                        self.publish();
                    }
                }
            }
        }

        self.cancel(TimerSlot::Advance);
        self.cancel(TimerSlot::Reveal);
        tracing::debug!("simulation actor stopped");
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Schedule(timer) => self.schedule(timer),
                Effect::Cancel(slot) => self.cancel(slot),
            }
        }
    }

    fn schedule(&mut self, timer: Timer) {
        let sender = self.timers.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(timer.delay).await;
            if let Some(sender) = sender.upgrade() {
                let _ = sender.send(Request::Command(Command::Fire(timer))).await;
            }
        });
        if let Some(previous) = self.slot(timer.slot()).replace(task) {
            previous.abort();
        }
    }

    fn cancel(&mut self, slot: TimerSlot) {
        if let Some(task) = self.slot(slot).take() {
            task.abort();
        }
    }

    fn slot(&mut self, slot: TimerSlot) -> &mut Option<JoinHandle<()>> {
        match slot {
            TimerSlot::Advance => &mut self.advance_task,
            TimerSlot::Reveal => &mut self.reveal_task,
        }
    }

    fn publish(&self) {
        self.state.send_replace(self.engine.snapshot());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_COMPLETION;
    use crate::types::ChatEntry;
    use std::time::Duration;
    use tokio::time::sleep;

    #[tokio::test(start_paused = true)]
    async fn run_reaches_first_step_after_beam() {
        let (handle, _task) = spawn(Engine::builtin().with_seed(3));
        handle.start("Qual o lucro?").await.unwrap();
        sleep(Duration::from_millis(10)).await;
        let state = handle.state();
        assert!(state.simulating);
        assert!(state.beam_active);
        assert_eq!(state.last_chat(), Some(&ChatEntry::user("Qual o lucro?")));

        sleep(Duration::from_millis(1100)).await;
        let state = handle.state();
        assert!(!state.beam_active);
        assert_eq!(state.current_step, Some(0));
    }

    #[tokio::test(start_paused = true)]
    async fn full_run_returns_to_idle() {
        let (handle, _task) = spawn(Engine::builtin().with_seed(3));
        handle.start("Qual o lucro?").await.unwrap();
        sleep(Duration::from_secs(21)).await;
        let state = handle.state();
        assert!(!state.simulating);
        assert_eq!(state.current_step, None);
        assert!(state.packets.is_empty());
        assert_eq!(state.last_chat(), Some(&ChatEntry::ai(DEFAULT_COMPLETION)));
    }

    #[tokio::test(start_paused = true)]
    async fn pause_holds_the_current_step() {
        let (handle, _task) = spawn(Engine::builtin().with_seed(3));
        handle.start("x").await.unwrap();
        sleep(Duration::from_millis(1200)).await;
        handle.toggle_pause().await.unwrap();
        sleep(Duration::from_secs(10)).await;
        let state = handle.state();
        assert!(state.paused);
        assert_eq!(state.current_step, Some(0));

        handle.toggle_pause().await.unwrap();
        sleep(Duration::from_millis(10)).await;
        assert_eq!(handle.state().current_step, Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn reset_mid_run_stays_idle() {
        let (handle, _task) = spawn(Engine::builtin().with_seed(3));
        handle.start("x").await.unwrap();
        sleep(Duration::from_millis(4500)).await;
        handle.reset().await.unwrap();
        sleep(Duration::from_secs(30)).await;
        let state = handle.state();
        assert!(state.is_idle());
        assert_eq!(state.selected_agent, None);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_closes_the_handle() {
        let (handle, task) = spawn(Engine::builtin());
        handle.shutdown().await.unwrap();
        task.await.unwrap();
        assert_eq!(handle.start("late").await, Err(RuntimeError::Closed));
    }
}
