//! Snapshot error types.

use crate::core::FsmError;
use thiserror::Error;

/// Errors that can occur while capturing or restoring a snapshot
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Serialization to JSON or binary format failed
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Deserialization from JSON or binary format failed
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    /// Snapshot version is not supported by this version
    #[error("Unsupported snapshot version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// The snapshot resumes at a state the restored engine does not know
    #[error("Snapshot current state {id} is not a known state")]
    UnknownCurrentState { id: String },

    /// Rebuilding or validating the engine failed
    #[error(transparent)]
    Engine(#[from] FsmError),
}
