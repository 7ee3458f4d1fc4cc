//! Core types for the value-chain animation
//!
//! Defines:
//! - Static diagram nodes (layers) and timeline steps
//! - Runtime packets and their identifiers
//! - The single animation state value

use serde::{Deserialize, Serialize};
use std::fmt;

/// Color every in-flight packet is drawn with
pub const PACKET_COLOR: &str = "#22c55e";

/// Number of cosmetic specialist agents the picker chooses between
pub const AGENT_COUNT: u8 = 3;

/// Identifier of a diagram node (e.g. `layer6`, `sub_rag`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    /// Create a node id
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl PartialEq<str> for NodeId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for NodeId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Category tag of a diagram node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    Foundation,
    Compute,
    Intelligence,
    Connection,
    Specialization,
    Surface,
}

/// 2-D diagram position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// A notable company or product at a layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub title: String,
    pub desc: String,
}

/// A static node of the value-chain diagram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub id: NodeId,
    pub kind: LayerKind,
    pub layer_num: u8,
    pub subtitle: String,
    pub label: String,
    pub description: String,
    pub margin: String,
    pub defense: String,
    pub access: String,
    pub verdict: String,
    #[serde(default)]
    pub main_players: Vec<Player>,
    #[serde(default)]
    pub dos: Vec<String>,
    #[serde(default)]
    pub donts: Vec<String>,
    pub icon: String,
    pub position: Position,
    #[serde(default)]
    pub connections: Vec<NodeId>,
    pub color: String,
}

/// What a timeline step does visually
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Transfer,
    AgentSelection,
    Processing,
}

/// A packet to spawn when a step begins
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketSpawn {
    pub from: NodeId,
    pub to: NodeId,
    pub label: String,
}

/// One entry of the scripted timeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineStep {
    pub kind: StepKind,
    pub active_nodes: Vec<NodeId>,
    #[serde(default)]
    pub packets: Vec<PacketSpawn>,
    /// Step duration in milliseconds
    pub duration_ms: u64,
    pub description: String,
    #[serde(default)]
    pub details: Option<String>,
}

impl TimelineStep {
    /// Duration as a `Duration`
    #[inline]
    #[must_use]
    pub fn duration(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.duration_ms)
    }
}

/// Unique packet identifier, monotonically assigned for the whole session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PacketId(pub u64);

impl fmt::Display for PacketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pkt-{}", self.0)
    }
}

/// A data token travelling between two nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Packet {
    pub id: PacketId,
    pub from: NodeId,
    pub to: NodeId,
    /// Travel progress, 0..=100
    pub progress: f64,
    pub label: Option<String>,
    pub color: String,
    pub complete: bool,
}

/// Author of a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Ai,
}

/// One line of the chat transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEntry {
    pub role: ChatRole,
    pub text: String,
}

impl ChatEntry {
    /// User-authored entry
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    /// System-authored entry
    pub fn ai(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Ai,
            text: text.into(),
        }
    }
}

/// Index of the revealed specialist agent, always below [`AGENT_COUNT`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct AgentIndex(u8);

impl AgentIndex {
    /// Build an index, rejecting values outside the candidate set
    #[must_use]
    pub fn new(index: u8) -> Option<Self> {
        (index < AGENT_COUNT).then_some(Self(index))
    }

    /// Raw index
    #[inline]
    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for AgentIndex {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("agent index {value} out of range"))
    }
}

impl From<AgentIndex> for u8 {
    fn from(value: AgentIndex) -> Self {
        value.0
    }
}

/// The single process-wide animation state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationState {
    pub simulating: bool,
    pub paused: bool,
    /// `None` when no step is active
    pub current_step: Option<usize>,
    pub packets: Vec<Packet>,
    pub active_node: Option<NodeId>,
    pub input_message: String,
    pub chat_history: Vec<ChatEntry>,
    pub beam_active: bool,
    pub agent_selector_visible: bool,
    pub selected_agent: Option<AgentIndex>,
}

impl AnimationState {
    /// Fresh session state with the transcript seeded by `greeting`
    pub fn new(greeting: impl Into<String>) -> Self {
        Self {
            simulating: false,
            paused: false,
            current_step: None,
            packets: Vec::new(),
            active_node: None,
            input_message: String::new(),
            chat_history: vec![ChatEntry::ai(greeting)],
            beam_active: false,
            agent_selector_visible: false,
            selected_agent: None,
        }
    }

    /// True when a live packet travels `from -> to`
    #[must_use]
    pub fn is_edge_active(&self, from: &NodeId, to: &NodeId) -> bool {
        self.packets.iter().any(|p| &p.from == from && &p.to == to)
    }

    /// Fraction of the timeline reached, for "SEQUENCE n/total" displays
    #[must_use]
    pub fn progress_fraction(&self, total_steps: usize) -> f64 {
        match self.current_step {
            Some(index) if total_steps > 0 => (index + 1) as f64 / total_steps as f64,
            _ => 0.0,
        }
    }

    /// Last transcript entry, if any
    #[must_use]
    pub fn last_chat(&self) -> Option<&ChatEntry> {
        self.chat_history.last()
    }

    /// Whether the state matches the canonical idle shape (transcript aside)
    #[must_use]
    pub fn is_idle(&self) -> bool {
        !self.simulating
            && !self.paused
            && self.current_step.is_none()
            && self.packets.is_empty()
            && self.active_node.is_none()
            && !self.beam_active
            && !self.agent_selector_visible
    }
}
