//! Scene error types

use crate::ecs::{EcsError, Entity};
use thiserror::Error;

/// Scene-level failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// Underlying registry violation
    #[error(transparent)]
    Ecs(#[from] EcsError),

    /// The requested parent is the child or one of its descendants
    #[error("cannot parent {child} under {parent}: {child} is an ancestor of {parent}")]
    HierarchyCycle {
        /// Requested parent
        parent: Entity,
        /// Requested child
        child: Entity,
    },

    /// An entity cannot be its own parent
    #[error("entity {0} cannot be its own parent")]
    SelfParent(Entity),

    /// Hierarchy edit on an entity without a Hierarchy component
    #[error("entity {0} has no hierarchy")]
    NoHierarchy(Entity),
}

/// Result alias for scene operations
pub type Result<T> = std::result::Result<T, SceneError>;

pub(crate) fn fail<T>(err: SceneError) -> Result<T> {
    log::error!("Scene edit rejected: {err}");
    Err(err)
}
