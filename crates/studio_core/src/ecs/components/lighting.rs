//! Lighting component for ECS
//!
//! Pure data component. Position and direction come from the entity's
//! transform; the lighting system resolves them each tick.

use crate::ecs::Component;
use crate::foundation::math::Vec3;

/// Types of lights supported by the lighting system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightKind {
    /// Directional light (like sunlight) with parallel rays
    Directional,
    /// Point light that radiates in all directions from a position
    Point,
    /// Spot light that creates a cone of light from a position
    Spot,
    /// Rectangular area light
    Area,
}

/// Shadow map settings of a light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowSettings {
    /// Whether this light should cast shadows
    pub enabled: bool,
    /// Depth bias against acne
    pub bias: f32,
    /// Normal-offset bias
    pub normal_bias: f32,
    /// Shadow map resolution in texels
    pub resolution: u32,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            bias: 0.005,
            normal_bias: 0.02,
            resolution: 2048,
        }
    }
}

/// Pure data component for lights
#[derive(Debug, Clone, PartialEq)]
pub struct LightComponent {
    /// The type of light
    pub kind: LightKind,
    /// RGB color values for the light (0.0 to 1.0 range)
    pub color: Vec3,
    /// Light intensity multiplier
    pub intensity: f32,
    /// Maximum range for point, spot and area lights
    pub range: f32,
    /// Inner cone angle for spot lights in degrees
    pub inner_cone_degrees: f32,
    /// Outer cone angle for spot lights in degrees
    pub outer_cone_degrees: f32,
    /// Width and height of area lights
    pub area_size: [f32; 2],
    /// Whether the light is currently enabled/active
    pub enabled: bool,
    /// Shadow parameters
    pub shadows: ShadowSettings,
}

impl Component for LightComponent {
    const TYPE_NAME: &'static str = "Light";
}

impl LightComponent {
    /// Light of `kind` with the usual defaults for that kind
    pub fn new(kind: LightKind, color: Vec3, intensity: f32) -> Self {
        let (range, inner, outer) = match kind {
            LightKind::Directional => (0.0, 0.0, 0.0),
            LightKind::Point | LightKind::Area => (10.0, 0.0, 0.0),
            LightKind::Spot => (10.0, 20.0, 30.0),
        };
        Self {
            kind,
            color,
            intensity,
            range,
            inner_cone_degrees: inner,
            outer_cone_degrees: outer,
            area_size: [1.0, 1.0],
            enabled: true,
            shadows: ShadowSettings {
                enabled: kind == LightKind::Directional,
                ..ShadowSettings::default()
            },
        }
    }

    /// Whether this light has a position that matters
    pub fn is_positional(&self) -> bool {
        self.kind != LightKind::Directional
    }
}

/// Factory functions for creating light components
pub struct LightFactory;

impl LightFactory {
    /// Directional light
    pub fn directional(color: Vec3, intensity: f32) -> LightComponent {
        LightComponent::new(LightKind::Directional, color, intensity)
    }

    /// Point light with explicit range
    pub fn point(color: Vec3, intensity: f32, range: f32) -> LightComponent {
        LightComponent {
            range,
            ..LightComponent::new(LightKind::Point, color, intensity)
        }
    }

    /// Spot light with cone angles in degrees. The inner angle is clamped to the outer one.
    pub fn spot(
        color: Vec3,
        intensity: f32,
        range: f32,
        inner_cone_degrees: f32,
        outer_cone_degrees: f32,
    ) -> LightComponent {
        LightComponent {
            range,
            inner_cone_degrees: inner_cone_degrees.min(outer_cone_degrees),
            outer_cone_degrees,
            ..LightComponent::new(LightKind::Spot, color, intensity)
        }
    }

    /// Rectangular area light
    pub fn area(color: Vec3, intensity: f32, width: f32, height: f32) -> LightComponent {
        LightComponent {
            area_size: [width, height],
            ..LightComponent::new(LightKind::Area, color, intensity)
        }
    }
}
