//! ECS error types
//!
//! Every variant here is a programmer error: the caller broke a registry
//! contract. They are logged at `error` where detected and returned so the
//! caller still gets a defined result in release builds.

use super::Entity;
use thiserror::Error;

/// Registry-level failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// Null, out-of-range or destroyed entity
    #[error("invalid entity {0}")]
    InvalidEntity(Entity),

    /// Entity pool is empty
    #[error("entity pool exhausted ({max_entities} ids, {living} alive)")]
    ResourceExhausted {
        /// Configured pool size
        max_entities: u32,
        /// Entities alive at the time of the request
        living: u32,
    },

    /// Component or system type registered twice
    #[error("{0} is already registered")]
    AlreadyRegistered(&'static str),

    /// Component or system type used before registration
    #[error("{0} is not registered")]
    NotRegistered(&'static str),

    /// Component added to an entity that already has one of that type
    #[error("entity {entity} already has a {component} component")]
    DuplicateComponent {
        /// Target entity
        entity: Entity,
        /// Component type name
        component: &'static str,
    },

    /// Component removed or read from an entity that has none of that type
    #[error("entity {entity} has no {component} component")]
    MissingComponent {
        /// Target entity
        entity: Entity,
        /// Component type name
        component: &'static str,
    },

    /// Every signature bit is already assigned
    #[error("cannot register {component}: all {max} component slots are in use")]
    ComponentLimitReached {
        /// Component type name
        component: &'static str,
        /// Signature width
        max: usize,
    },
}

/// Result alias for ECS operations
pub type Result<T> = std::result::Result<T, EcsError>;

/// Log a registry violation and hand it back as an `Err`
pub(crate) fn fail<T>(err: EcsError) -> Result<T> {
    log::error!("ECS contract violation: {err}");
    Err(err)
}
