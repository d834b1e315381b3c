//! Shared material handles

use crate::foundation::math::Vec3;
use std::fmt;
use std::sync::Arc;

/// Externally authored material description
///
/// Shader selection and textures belong to the renderer; the core only keeps
/// a name and the scalar PBR inputs a renderer may fall back to.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Material name as authored
    pub name: String,
    /// Base color (linear RGB)
    pub albedo: Vec3,
    /// Metallic factor
    pub metallic: f32,
    /// Roughness factor
    pub roughness: f32,
}

impl Material {
    /// Create a named material with neutral PBR inputs
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            albedo: Vec3::new(0.8, 0.8, 0.8),
            metallic: 0.0,
            roughness: 0.5,
        }
    }
}

/// Shared, immutable material handle with identity equality
#[derive(Clone)]
pub struct MaterialHandle(Arc<Material>);

impl MaterialHandle {
    /// Wrap a material in a new handle
    pub fn new(material: Material) -> Self {
        Self(Arc::new(material))
    }

    /// Whether two handles share one allocation
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Access the material
    pub fn get(&self) -> &Material {
        &self.0
    }
}

impl PartialEq for MaterialHandle {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for MaterialHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MaterialHandle").field(&self.0.name).finish()
    }
}
