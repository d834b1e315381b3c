//! Lighting system for converting light entities to render data
//!
//! Systems contain logic, components contain data: position and direction of
//! each light come from its entity's world matrix, everything else from its
//! [`LightComponent`].

use super::hierarchy_system::resolve_world_matrix;
use crate::ecs::components::{LightComponent, LightKind, TransformComponent};
use crate::ecs::error::Result;
use crate::ecs::{Entity, Signature, System, SystemType, World};
use crate::foundation::math::{Mat4, Vec3, Vec4};

/// Maximum number of directional lights in one environment
pub const MAX_DIRECTIONAL_LIGHTS: usize = 4;
/// Maximum number of point lights in one environment
pub const MAX_POINT_LIGHTS: usize = 8;
/// Maximum number of spot lights in one environment
pub const MAX_SPOT_LIGHTS: usize = 8;
/// Maximum number of area lights in one environment
pub const MAX_AREA_LIGHTS: usize = 4;

/// A light resolved into world space
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLight {
    /// Source entity
    pub entity: Entity,
    /// World-space position (unused by directional lights)
    pub position: Vec3,
    /// World-space direction the light points along
    pub direction: Vec3,
    /// Light parameters as authored
    pub light: LightComponent,
}

/// Lights grouped by kind, ready for a renderer
#[derive(Debug, Clone, PartialEq)]
pub struct LightEnvironment {
    /// Ambient RGB in xyz, intensity in w
    pub ambient: Vec4,
    /// Directional lights
    pub directional: Vec<ResolvedLight>,
    /// Point lights
    pub point: Vec<ResolvedLight>,
    /// Spot lights
    pub spot: Vec<ResolvedLight>,
    /// Area lights
    pub area: Vec<ResolvedLight>,
}

impl LightEnvironment {
    fn new(ambient: Vec4) -> Self {
        Self {
            ambient,
            directional: Vec::new(),
            point: Vec::new(),
            spot: Vec::new(),
            area: Vec::new(),
        }
    }

    /// Total number of lights across kinds
    pub fn light_count(&self) -> usize {
        self.directional.len() + self.point.len() + self.spot.len() + self.area.len()
    }

    fn slot(&mut self, kind: LightKind) -> (&mut Vec<ResolvedLight>, usize) {
        match kind {
            LightKind::Directional => (&mut self.directional, MAX_DIRECTIONAL_LIGHTS),
            LightKind::Point => (&mut self.point, MAX_POINT_LIGHTS),
            LightKind::Spot => (&mut self.spot, MAX_SPOT_LIGHTS),
            LightKind::Area => (&mut self.area, MAX_AREA_LIGHTS),
        }
    }
}

impl Default for LightEnvironment {
    fn default() -> Self {
        Self::new(Vec4::new(0.1, 0.1, 0.1, 1.0))
    }
}

/// Lighting system that processes light entities and produces rendering data
#[derive(Debug)]
pub struct LightingSystem {
    ambient: Vec4,
    environment: LightEnvironment,
    dropped: usize,
}

impl LightingSystem {
    /// Creates a new lighting system with the default ambient term
    pub fn new() -> Self {
        let environment = LightEnvironment::default();
        Self {
            ambient: environment.ambient,
            environment,
            dropped: 0,
        }
    }

    /// Set the ambient color and intensity used from the next update on
    pub fn set_ambient(&mut self, color: Vec3, intensity: f32) {
        self.ambient = Vec4::new(color.x, color.y, color.z, intensity);
    }

    /// Environment built during the last update
    pub fn environment(&self) -> &LightEnvironment {
        &self.environment
    }

    /// Enabled lights that did not fit their kind's limit during the last update
    pub fn dropped_lights(&self) -> usize {
        self.dropped
    }

    fn resolve(world: &World, entity: Entity, light: &LightComponent) -> Option<ResolvedLight> {
        let model: Mat4 = resolve_world_matrix(world, entity)?;
        let position = Vec3::new(model.m14, model.m24, model.m34);
        let direction = model
            .transform_vector(&Vec3::new(0.0, 0.0, -1.0))
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(|| Vec3::new(0.0, 0.0, -1.0));
        Some(ResolvedLight {
            entity,
            position,
            direction,
            light: light.clone(),
        })
    }
}

impl Default for LightingSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for LightingSystem {
    fn update(&mut self, world: &mut World, entities: &[Entity], _delta_time: f32) {
        self.environment = LightEnvironment::new(self.ambient);
        self.dropped = 0;

        for &entity in entities {
            let Some(light) = world.get_component::<LightComponent>(entity) else {
                continue;
            };
            if !light.enabled {
                continue;
            }
            let Some(resolved) = Self::resolve(world, entity, light) else {
                continue;
            };
            let (lights, limit) = self.environment.slot(light.kind);
            if lights.len() < limit {
                lights.push(resolved);
            } else {
                self.dropped += 1;
            }
        }

        if self.dropped > 0 {
            log::warn!("LightingSystem: {} lights over the per-kind limit were ignored", self.dropped);
        }
        log::trace!(
            "LightingSystem: Final counts - Dir: {}, Point: {}, Spot: {}, Area: {}",
            self.environment.directional.len(),
            self.environment.point.len(),
            self.environment.spot.len(),
            self.environment.area.len()
        );
    }
}

impl SystemType for LightingSystem {
    const TYPE_NAME: &'static str = "LightingSystem";

    fn required_signature(world: &World) -> Result<Signature> {
        Ok(Signature::EMPTY
            .with(world.component_type::<TransformComponent>()?)
            .with(world.component_type::<LightComponent>()?))
    }
}
