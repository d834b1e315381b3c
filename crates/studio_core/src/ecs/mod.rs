//! Entity-Component-System implementation
//!
//! Entities are plain ids, components live in dense per-type arrays, and
//! systems receive the set of entities whose signature matches their mask.

pub mod world;
pub mod entity;
pub mod component;
pub mod storage;
pub mod system;
pub mod error;
pub mod components;
pub mod systems;

pub use world::{World, WorldConfig};
pub use entity::{ComponentType, Entity, EntityManager, Signature, MAX_COMPONENTS, MAX_ENTITIES};
pub use component::Component;
pub use storage::{ComponentArray, ComponentStore};
pub use system::{AsAny, System, SystemHandle, SystemManager, SystemType};
pub use error::EcsError;
