//! Material component

use crate::assets::MaterialHandle;
use crate::ecs::Component;
use crate::foundation::math::Vec3;

/// Material reference with scalar PBR fallbacks
///
/// Renderers use the fallbacks when no material asset is attached or the
/// asset fails to load.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialComponent {
    /// Shared material asset
    pub material: Option<MaterialHandle>,
    /// Fallback base color (linear RGB)
    pub albedo: Vec3,
    /// Fallback metallic factor
    pub metallic: f32,
    /// Fallback roughness factor
    pub roughness: f32,
    /// Fallback emissive color (linear RGB)
    pub emissive: Vec3,
}

impl Component for MaterialComponent {
    const TYPE_NAME: &'static str = "Material";
}

impl Default for MaterialComponent {
    fn default() -> Self {
        Self {
            material: None,
            albedo: Vec3::new(0.8, 0.8, 0.8),
            metallic: 0.0,
            roughness: 0.5,
            emissive: Vec3::zeros(),
        }
    }
}

impl MaterialComponent {
    /// Component referencing a material asset
    pub fn with_material(material: MaterialHandle) -> Self {
        Self {
            material: Some(material),
            ..Default::default()
        }
    }

    /// Component with only fallback values
    pub fn from_albedo(albedo: Vec3) -> Self {
        Self {
            albedo,
            ..Default::default()
        }
    }
}
