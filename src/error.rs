//! Error types for operations at the scene/engine boundary.

use std::fmt;

/// Main error type for the bridge.
///
/// Creation errors (`ShapeConstruction`, `InvalidTopology`, `InvalidParameter`)
/// are local to one body-creation call: the caller should skip that body and
/// may log, but the session stays usable. `EngineInit`, `CapacityExceeded`,
/// and `StepFailed` are session-level and require reconfiguration.
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeError {
    /// The native engine could not be initialized.
    EngineInit(String),
    /// A collider shape had degenerate or non-finite dimensions.
    ShapeConstruction(String),
    /// Mesh data handed to the geometry bridge was malformed.
    InvalidTopology(String),
    /// A per-body parameter was out of range.
    InvalidParameter { name: &'static str, value: f32 },
    /// The configured body capacity would be exceeded.
    CapacityExceeded { limit: usize, requested: usize },
    /// The engine reported an unrecoverable failure while stepping.
    StepFailed(String),
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EngineInit(msg) => write!(f, "engine initialization failed: {msg}"),
            Self::ShapeConstruction(msg) => write!(f, "shape construction failed: {msg}"),
            Self::InvalidTopology(msg) => write!(f, "invalid mesh topology: {msg}"),
            Self::InvalidParameter { name, value } => {
                write!(f, "invalid parameter `{name}`: {value}")
            }
            Self::CapacityExceeded { limit, requested } => {
                write!(f, "body capacity exceeded: {requested} requested, limit is {limit}")
            }
            Self::StepFailed(msg) => write!(f, "simulation step failed: {msg}"),
        }
    }
}

impl std::error::Error for BridgeError {}
