//! Scene management
//!
//! Domain layer over the ECS world: named entities, parent/child hierarchies,
//! and factories for objects, cameras and lights.
//!
//! ## Architecture
//!
//! ```text
//! Host / tools
//!      ↓
//! SceneManager, EditPreviewEngine
//!      ↓
//! World (entities, components, systems)
//! ```

mod error;
mod scene_manager;
mod statistics;

pub use error::{Result, SceneError};
pub use scene_manager::{SceneConfig, SceneManager};
pub use statistics::SceneStatistics;
