//! Shared asset handles
//!
//! The ECS never owns geometry or shading data directly. Components hold
//! reference-counted handles; mutation means building a new asset and swapping
//! the handle, so older handles keep seeing the data they were created with.

pub mod material;
pub mod mesh;

pub use material::{Material, MaterialHandle};
pub use mesh::{Mesh, MeshError, MeshHandle, Vertex};
