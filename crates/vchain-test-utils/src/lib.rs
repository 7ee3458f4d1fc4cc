//! Testing utilities for the vchain workspace
//!
//! Shared fixtures, a recording cue sink and virtual-clock helpers.

#![allow(missing_docs)]

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use vchain_core::{
    Catalog, Cue, CueError, CueSink, Engine, Layer, LayerKind, NodeId, PacketSpawn, Position,
    SimulationConfig, StepKind, TimelineStep, VirtualDriver,
};

/// Cue sink that remembers everything it was asked to play
#[derive(Debug, Default)]
pub struct RecordingCues {
    played: Mutex<Vec<Cue>>,
    fail: bool,
}

impl RecordingCues {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A sink that records but reports every cue as unavailable
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            played: Mutex::new(Vec::new()),
            fail: true,
        })
    }

    pub fn played(&self) -> Vec<Cue> {
        self.played.lock().clone()
    }

    pub fn count(&self, cue: Cue) -> usize {
        self.played.lock().iter().filter(|c| **c == cue).count()
    }
}

impl CueSink for RecordingCues {
    fn play(&self, cue: Cue) -> Result<(), CueError> {
        self.played.lock().push(cue);
        if self.fail {
            return Err(CueError::Unavailable("no audio device".to_string()));
        }
        Ok(())
    }
}

pub fn layer(id: &str, connections: &[&str]) -> Layer {
    Layer {
        id: NodeId::new(id),
        kind: LayerKind::Intelligence,
        layer_num: 1,
        subtitle: format!("{id} subtitle"),
        label: id.to_uppercase(),
        description: format!("{id} description"),
        margin: "Alta".to_string(),
        defense: "Escala".to_string(),
        access: "API".to_string(),
        verdict: "ok".to_string(),
        main_players: Vec::new(),
        dos: Vec::new(),
        donts: Vec::new(),
        icon: "Brain".to_string(),
        position: Position { x: 0.0, y: 0.0 },
        connections: connections.iter().map(|c| NodeId::new(*c)).collect(),
        color: "#000000".to_string(),
    }
}

pub fn transfer(from: &str, to: &str, duration_ms: u64) -> TimelineStep {
    TimelineStep {
        kind: StepKind::Transfer,
        active_nodes: vec![NodeId::new(from), NodeId::new(to)],
        packets: vec![PacketSpawn {
            from: NodeId::new(from),
            to: NodeId::new(to),
            label: format!("{from}->{to}"),
        }],
        duration_ms,
        description: format!("{from} para {to}"),
        details: None,
    }
}

pub fn agent_selection(node: &str, duration_ms: u64) -> TimelineStep {
    TimelineStep {
        kind: StepKind::AgentSelection,
        active_nodes: vec![NodeId::new(node)],
        packets: Vec::new(),
        duration_ms,
        description: "Selecionando agente".to_string(),
        details: None,
    }
}

/// Three nodes, three steps: transfer a->b, agent pick at b, transfer b->c
pub fn tiny_catalog() -> Catalog {
    let layers = vec![layer("a", &["b"]), layer("b", &["c"]), layer("c", &[])];
    let timeline = vec![
        transfer("a", "b", 500),
        agent_selection("b", 2000),
        transfer("b", "c", 500),
    ];
    match Catalog::new(layers, timeline) {
        Ok(catalog) => catalog,
        Err(e) => panic!("tiny catalog is invalid: {e}"),
    }
}

/// Short delays for quick runs
pub fn fast_config() -> SimulationConfig {
    SimulationConfig::new()
        .with_beam_delay(Duration::from_millis(100))
        .with_agent_reveal_delay(Duration::from_millis(200))
        .with_frame_interval(Duration::from_millis(10))
}

/// Built-in catalog on a virtual clock with a seeded agent picker
pub fn seeded_driver(seed: u64) -> VirtualDriver {
    VirtualDriver::new(Engine::builtin().with_seed(seed))
}

/// Tiny catalog with fast timing on a virtual clock
pub fn tiny_driver(seed: u64, cues: Arc<RecordingCues>) -> VirtualDriver {
    let engine = Engine::new(Arc::new(tiny_catalog()), fast_config())
        .expect("fast config is valid")
        .with_seed(seed)
        .with_cues(cues);
    VirtualDriver::new(engine)
}
