//! Edit-preview error types
//!
//! These are recoverable: the engine logs them, records the most recent one
//! for [`EditPreviewEngine::last_error`](super::EditPreviewEngine::last_error)
//! and falls back to a defined state.

use crate::ecs::{EcsError, Entity};
use thiserror::Error;

/// Edit-preview failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PreviewError {
    /// Target cannot be previewed
    #[error("cannot preview {entity}: {reason}")]
    PreconditionFailed {
        /// Requested target
        entity: Entity,
        /// What was missing
        reason: &'static str,
    },

    /// An operation rejected its input or produced an invalid mesh
    #[error("operation {operation} failed: {reason}")]
    OperationFailed {
        /// Operation name
        operation: String,
        /// Diagnostic from the operation
        reason: String,
    },

    /// No operation registered under this name
    #[error("unknown operation '{0}'")]
    UnknownOperation(String),

    /// Session call without an active session
    #[error("no active preview session")]
    NoActiveSession,

    /// The ghost entity or its mesh disappeared during the session
    #[error("ghost entity {0} lost its mesh")]
    GhostMeshLost(Entity),

    /// Underlying registry violation
    #[error(transparent)]
    Ecs(#[from] EcsError),
}

/// Result alias for preview operations
pub type Result<T> = std::result::Result<T, PreviewError>;
