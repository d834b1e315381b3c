//! Camera system
//!
//! Picks the active camera each tick and caches its view and projection.
//! A camera flagged `is_main` wins; otherwise the lowest-id active camera is used.

use super::hierarchy_system::resolve_world_matrix;
use crate::ecs::components::{CameraComponent, TransformComponent};
use crate::ecs::error::Result;
use crate::ecs::{Entity, Signature, System, SystemType, World};
use crate::foundation::math::Mat4;

/// Active camera selection
#[derive(Debug)]
pub struct CameraSystem {
    active_camera: Option<Entity>,
    view: Mat4,
    projection: Mat4,
    camera_count: usize,
}

impl CameraSystem {
    /// Create a new camera system
    pub fn new() -> Self {
        Self {
            active_camera: None,
            view: Mat4::identity(),
            projection: Mat4::identity(),
            camera_count: 0,
        }
    }

    /// Camera renderers should draw from
    pub fn active_camera(&self) -> Option<Entity> {
        self.active_camera
    }

    /// View matrix of the active camera (identity when there is none)
    pub fn view_matrix(&self) -> &Mat4 {
        &self.view
    }

    /// Projection matrix of the active camera (identity when there is none)
    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection
    }

    /// Projection × view
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    /// Number of cameras seen during the last update
    pub fn camera_count(&self) -> usize {
        self.camera_count
    }

    fn choose(world: &World, entities: &[Entity]) -> Option<Entity> {
        let active = || {
            entities.iter().copied().filter(|&entity| {
                world
                    .get_component::<CameraComponent>(entity)
                    .is_some_and(|camera| camera.is_active)
            })
        };
        active()
            .find(|&entity| {
                world
                    .get_component::<CameraComponent>(entity)
                    .is_some_and(|camera| camera.is_main)
            })
            .or_else(|| active().next())
    }
}

impl Default for CameraSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for CameraSystem {
    fn update(&mut self, world: &mut World, entities: &[Entity], _delta_time: f32) {
        self.camera_count = entities.len();
        let chosen = Self::choose(world, entities);
        if chosen != self.active_camera {
            log::debug!("CameraSystem: active camera {:?} -> {:?}", self.active_camera, chosen);
        }
        self.active_camera = chosen;

        let Some(entity) = chosen else {
            self.view = Mat4::identity();
            self.projection = Mat4::identity();
            return;
        };
        let camera_to_world = resolve_world_matrix(world, entity).unwrap_or_else(Mat4::identity);
        self.view = camera_to_world.try_inverse().unwrap_or_else(|| {
            log::warn!("CameraSystem: camera {entity} has a singular transform");
            Mat4::identity()
        });
        self.projection = world
            .get_component::<CameraComponent>(entity)
            .map_or_else(Mat4::identity, CameraComponent::projection_matrix);
    }
}

impl SystemType for CameraSystem {
    const TYPE_NAME: &'static str = "CameraSystem";

    fn required_signature(world: &World) -> Result<Signature> {
        Ok(Signature::EMPTY
            .with(world.component_type::<TransformComponent>()?)
            .with(world.component_type::<CameraComponent>()?))
    }
}
