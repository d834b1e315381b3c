//! Edit operations and their registry
//!
//! An operation is a pure function from a mesh and parameters to a new mesh.
//! It receives the input by reference and returns an owned mesh, so it can
//! never mutate the shared original. Geometry kernels for the heavier
//! operations live in the host and are installed with
//! [`OperationRegistry::install_kernel`].

use super::error::{PreviewError, Result};
use super::params::PreviewParams;
use crate::assets::Mesh;
use crate::foundation::math::{utils, Mat4, Quat, Unit, Vec3};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

/// Built-in operation tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OperationKind {
    /// Subdivide faces
    Subdivision,
    /// Extrude faces along their normals
    Extrude,
    /// Bevel edges
    Bevel,
    /// Scale about a pivot (`factor`: float or vec3, `pivot`: vec3)
    Scale,
    /// Rotate about an axis through a pivot (`axis`: vec3, `angle`: degrees, `pivot`: vec3)
    Rotate,
    /// Laplacian smoothing (`iterations`: int, `factor`: 0..1)
    Smooth,
    /// Reduce triangle count
    Decimate,
    /// Boolean combination with another mesh
    Boolean,
    /// Host-defined, dispatched by name
    Custom,
}

impl OperationKind {
    /// Every built-in tag
    pub const ALL: [Self; 9] = [
        Self::Subdivision,
        Self::Extrude,
        Self::Bevel,
        Self::Scale,
        Self::Rotate,
        Self::Smooth,
        Self::Decimate,
        Self::Boolean,
        Self::Custom,
    ];

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            Self::Subdivision => "Subdivision",
            Self::Extrude => "Extrude",
            Self::Bevel => "Bevel",
            Self::Scale => "Scale",
            Self::Rotate => "Rotate",
            Self::Smooth => "Smooth",
            Self::Decimate => "Decimate",
            Self::Boolean => "Boolean",
            Self::Custom => "Custom",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a session applies: a built-in tag or a registered custom name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OperationId {
    /// Built-in operation
    Builtin(OperationKind),
    /// Custom operation registered by name
    Named(String),
}

impl From<OperationKind> for OperationId {
    fn from(kind: OperationKind) -> Self {
        Self::Builtin(kind)
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin(kind) => kind.fmt(f),
            Self::Named(name) => write!(f, "custom '{name}'"),
        }
    }
}

/// Operation function type
pub type OperationFn = Arc<dyn Fn(&Mesh, &PreviewParams) -> Result<Mesh> + Send + Sync>;

/// Routes operation ids to their implementations
pub struct OperationRegistry {
    kernels: HashMap<OperationKind, OperationFn>,
    custom: HashMap<String, OperationFn>,
}

impl OperationRegistry {
    /// Registry with the built-in Scale, Rotate and Smooth operations
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.install_kernel(OperationKind::Scale, Arc::new(scale));
        registry.install_kernel(OperationKind::Rotate, Arc::new(rotate));
        registry.install_kernel(OperationKind::Smooth, Arc::new(smooth));
        registry
    }

    /// Registry with nothing installed
    pub fn empty() -> Self {
        Self {
            kernels: HashMap::new(),
            custom: HashMap::new(),
        }
    }

    /// Install or replace the implementation of a built-in tag
    pub fn install_kernel(&mut self, kind: OperationKind, operation: OperationFn) {
        if self.kernels.insert(kind, operation).is_some() {
            log::debug!("Replaced {kind} kernel");
        }
    }

    /// Register or replace a custom operation
    pub fn register_custom(&mut self, name: impl Into<String>, operation: OperationFn) {
        let name = name.into();
        if self.custom.insert(name.clone(), operation).is_some() {
            log::debug!("Replaced custom operation '{name}'");
        }
    }

    /// Whether `kind` has an implementation
    pub fn has_kernel(&self, kind: OperationKind) -> bool {
        self.kernels.contains_key(&kind)
    }

    /// Whether `id` can be dispatched at all
    pub fn contains(&self, id: &OperationId) -> bool {
        match id {
            OperationId::Builtin(OperationKind::Custom) => false,
            OperationId::Builtin(_) => true,
            OperationId::Named(name) => self.custom.contains_key(name),
        }
    }

    /// Registered custom names, sorted
    pub fn custom_names(&self) -> BTreeSet<&str> {
        self.custom.keys().map(String::as_str).collect()
    }

    /// Run `id` on `mesh`. Built-in tags without a kernel report an
    /// [`PreviewError::OperationFailed`] diagnostic.
    pub fn apply(&self, id: &OperationId, mesh: &Mesh, params: &PreviewParams) -> Result<Mesh> {
        let operation = match id {
            OperationId::Builtin(OperationKind::Custom) => {
                return Err(PreviewError::UnknownOperation(
                    "Custom (use a registered name)".to_owned(),
                ))
            }
            OperationId::Builtin(kind) => {
                self.kernels
                    .get(kind)
                    .ok_or_else(|| PreviewError::OperationFailed {
                        operation: kind.to_string(),
                        reason: "no kernel installed".to_owned(),
                    })?
            }
            OperationId::Named(name) => self
                .custom
                .get(name)
                .ok_or_else(|| PreviewError::UnknownOperation(name.clone()))?,
        };

        let output = operation(mesh, params)?;
        output.validate().map_err(|err| PreviewError::OperationFailed {
            operation: id.to_string(),
            reason: err.to_string(),
        })?;
        Ok(output)
    }
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for OperationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kernels: Vec<OperationKind> = self.kernels.keys().copied().collect();
        kernels.sort();
        f.debug_struct("OperationRegistry")
            .field("kernels", &kernels)
            .field("custom", &self.custom_names())
            .finish()
    }
}

fn about_pivot(params: &PreviewParams, linear: Mat4) -> Mat4 {
    let pivot = params.get_vec3("pivot").unwrap_or_else(Vec3::zeros);
    Mat4::new_translation(&pivot) * linear * Mat4::new_translation(&-pivot)
}

/// Scale about `pivot` by `factor`
pub fn scale(mesh: &Mesh, params: &PreviewParams) -> Result<Mesh> {
    let factor = params
        .get_vec3("factor")
        .unwrap_or_else(|| Vec3::new(1.0, 1.0, 1.0));
    if factor.iter().any(|f| !f.is_finite() || *f == 0.0) {
        return Err(PreviewError::OperationFailed {
            operation: OperationKind::Scale.to_string(),
            reason: format!("degenerate factor {factor:?}"),
        });
    }
    Ok(mesh.transformed(&about_pivot(params, Mat4::new_nonuniform_scaling(&factor))))
}

/// Rotate by `angle` degrees about `axis` through `pivot`
pub fn rotate(mesh: &Mesh, params: &PreviewParams) -> Result<Mesh> {
    let axis = params.get_vec3("axis").unwrap_or_else(Vec3::y);
    let angle = params.float_or("angle", 0.0);
    let Some(axis) = Unit::try_new(axis, f32::EPSILON) else {
        return Err(PreviewError::OperationFailed {
            operation: OperationKind::Rotate.to_string(),
            reason: "rotation axis has zero length".to_owned(),
        });
    };
    let rotation = Quat::from_axis_angle(&axis, utils::deg_to_rad(angle));
    Ok(mesh.transformed(&about_pivot(params, rotation.to_homogeneous())))
}

/// Move every vertex towards the average of its edge neighbours
pub fn smooth(mesh: &Mesh, params: &PreviewParams) -> Result<Mesh> {
    let iterations = params.int_or("iterations", 1).max(0);
    let factor = params.float_or("factor", 0.5).clamp(0.0, 1.0);

    let mut neighbours: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); mesh.vertex_count()];
    for [a, b, c] in mesh.triangles() {
        let (a, b, c) = (a as usize, b as usize, c as usize);
        for (from, to) in [(a, b), (b, c), (c, a)] {
            if from < neighbours.len() && to < neighbours.len() {
                neighbours[from].insert(to);
                neighbours[to].insert(from);
            }
        }
    }

    let mut output = mesh.clone();
    for _ in 0..iterations {
        let positions: Vec<Vec3> = output.vertices.iter().map(|v| v.position_vec()).collect();
        for (index, vertex) in output.vertices.iter_mut().enumerate() {
            let ring = &neighbours[index];
            if ring.is_empty() {
                continue;
            }
            let average = ring.iter().map(|&n| positions[n]).sum::<Vec3>() / ring.len() as f32;
            let moved = positions[index] + (average - positions[index]) * factor;
            vertex.position = [moved.x, moved.y, moved.z];
        }
    }
    output.recompute_normals();
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn bounds(mesh: &Mesh) -> (Vec3, Vec3) {
        mesh.bounds().unwrap()
    }

    #[test]
    fn test_scale_uniform() {
        let cube = Mesh::cube();
        let (min, max) = bounds(&cube);
        let scaled = scale(&cube, &PreviewParams::new().with("factor", 2.0)).unwrap();
        let (smin, smax) = bounds(&scaled);
        assert_relative_eq!(smin, min * 2.0, epsilon = 1e-5);
        assert_relative_eq!(smax, max * 2.0, epsilon = 1e-5);
        assert_eq!(scaled.indices, cube.indices);
    }

    #[test]
    fn test_scale_about_pivot() {
        let cube = Mesh::cube();
        let (min, _) = bounds(&cube);
        let params = PreviewParams::new().with("factor", 3.0).with("pivot", min);
        let (smin, _) = bounds(&scale(&cube, &params).unwrap());
        assert_relative_eq!(smin, min, epsilon = 1e-5);
    }

    #[test]
    fn test_scale_zero_rejected() {
        let result = scale(&Mesh::cube(), &PreviewParams::new().with("factor", 0.0));
        assert!(matches!(result, Err(PreviewError::OperationFailed { .. })));
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let mesh = Mesh::plane(2.0);
        let params = PreviewParams::new()
            .with("axis", Vec3::new(0.0, 1.0, 0.0))
            .with("angle", 90.0);
        let rotated = rotate(&mesh, &params).unwrap();
        let (min, max) = bounds(&rotated);
        let (omin, omax) = bounds(&mesh);
        assert_relative_eq!(min, omin, epsilon = 1e-5);
        assert_relative_eq!(max, omax, epsilon = 1e-5);
        assert_eq!(rotated.vertex_count(), mesh.vertex_count());
    }

    #[test]
    fn test_rotate_zero_axis_rejected() {
        let params = PreviewParams::new().with("axis", Vec3::zeros()).with("angle", 45.0);
        assert!(rotate(&Mesh::cube(), &params).is_err());
    }

    #[test]
    fn test_smooth_is_pure() {
        let cube = Mesh::cube();
        let params = PreviewParams::new().with("iterations", 2);
        let a = smooth(&cube, &params).unwrap();
        let b = smooth(&cube, &params).unwrap();
        assert_eq!(a, b);
        assert_eq!(cube, Mesh::cube());
    }

    #[test]
    fn test_smooth_zero_iterations_keeps_positions() {
        let cube = Mesh::cube();
        let smoothed = smooth(&cube, &PreviewParams::new().with("iterations", 0)).unwrap();
        for (a, b) in smoothed.vertices.iter().zip(&cube.vertices) {
            assert_eq!(a.position, b.position);
        }
    }

    #[test]
    fn test_registry_dispatch() {
        let mut registry = OperationRegistry::new();
        let cube = Mesh::cube();
        let params = PreviewParams::new();

        assert!(registry.apply(&OperationKind::Scale.into(), &cube, &params).is_ok());
        assert_eq!(
            registry.apply(&OperationKind::Bevel.into(), &cube, &params),
            Err(PreviewError::OperationFailed {
                operation: "Bevel".to_owned(),
                reason: "no kernel installed".to_owned(),
            })
        );
        assert!(matches!(
            registry.apply(&OperationId::Named("twist".to_owned()), &cube, &params),
            Err(PreviewError::UnknownOperation(_))
        ));

        registry.install_kernel(OperationKind::Bevel, Arc::new(|mesh: &Mesh, _: &PreviewParams| Ok(mesh.clone())));
        assert!(registry.has_kernel(OperationKind::Bevel));
        assert_eq!(registry.apply(&OperationKind::Bevel.into(), &cube, &params).unwrap(), cube);
    }

    #[test]
    fn test_invalid_output_rejected() {
        let mut registry = OperationRegistry::empty();
        registry.register_custom(
            "broken",
            Arc::new(|mesh: &Mesh, _: &PreviewParams| {
                let mut out = mesh.clone();
                out.indices.push(0);
                Ok(out)
            }),
        );
        let id = OperationId::Named("broken".to_owned());
        assert!(registry.contains(&id));
        assert!(matches!(
            registry.apply(&id, &Mesh::cube(), &PreviewParams::new()),
            Err(PreviewError::OperationFailed { .. })
        ));
    }
}
