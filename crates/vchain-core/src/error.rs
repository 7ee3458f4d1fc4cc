//! Error types for the animation core
//!
//! Covers:
//! - Static table validation (fails at load time, never mid-run)
//! - Configuration loading
//! - Runtime actor communication
//! - Audio cue playback (always swallowed by the engine)

use crate::types::NodeId;
use std::path::PathBuf;

/// Static catalog validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// Two layers share an id
    #[error("duplicate node id: {0}")]
    DuplicateNode(NodeId),

    /// A layer connects to a node that does not exist
    #[error("node {from} connects to unknown node {to}")]
    UnknownConnection { from: NodeId, to: NodeId },

    /// A step lists an unknown active node
    #[error("step {step} references unknown node {node}")]
    UnknownStepNode { step: usize, node: NodeId },

    /// A step spawns a packet from or to an unknown node
    #[error("step {step} spawns a packet on unknown node {node}")]
    UnknownPacketEndpoint { step: usize, node: NodeId },

    /// A step has no active nodes to highlight
    #[error("step {step} has no active nodes")]
    EmptyActiveNodes { step: usize },

    /// The timeline holds no steps
    #[error("timeline is empty")]
    EmptyTimeline,

    /// Tables could not be decoded
    #[error("invalid catalog document: {0}")]
    Decode(String),
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading the config file
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed TOML
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range
    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        field: &'static str,
        reason: String,
    },
}

impl ConfigError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Runtime actor errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuntimeError {
    /// The actor task has stopped
    #[error("simulation runtime is closed")]
    Closed,
}

/// Audio cue playback failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CueError {
    /// No output device or context
    #[error("audio unavailable: {0}")]
    Unavailable(String),
}
