//! Mesh data and shared mesh handles
//!
//! `Mesh` is a backend-agnostic triangle list. Renderers and mesh kernels are
//! free to use richer representations internally; the core only needs vertex
//! positions for its built-in edit operations and a stable handle identity.

use crate::foundation::math::{Mat4, Point3, Vec3};
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;
use thiserror::Error;

/// Structural problems found by [`Mesh::validate`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    /// Index buffer length is not a multiple of three
    #[error("index count {0} is not a multiple of 3")]
    NotTriangles(usize),

    /// An index points past the vertex buffer
    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        /// Offending index value
        index: u32,
        /// Number of vertices in the mesh
        vertex_count: usize,
    },

    /// A vertex position is NaN or infinite
    #[error("vertex {0} has a non-finite position")]
    NonFinitePosition(usize),
}

/// 3D vertex data structure
///
/// `#[repr(C)]` keeps the layout predictable for renderers that upload the
/// vertex buffer as-is.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Position in 3D space
    pub position: [f32; 3],

    /// Normal vector
    pub normal: [f32; 3],

    /// Texture coordinates
    pub tex_coord: [f32; 2],
}

impl Vertex {
    /// Create a new vertex
    pub fn new(position: [f32; 3], normal: [f32; 3], tex_coord: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            tex_coord,
        }
    }

    /// Position as a vector
    pub fn position_vec(&self) -> Vec3 {
        Vec3::from(self.position)
    }
}

/// Triangle mesh
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    /// Human readable label, carried through edit operations
    pub label: String,

    /// Vertex buffer
    pub vertices: Vec<Vertex>,

    /// Triangle list indices
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Create a new mesh
    pub fn new(label: impl Into<String>, vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self {
            label: label.into(),
            vertices,
            indices,
        }
    }

    /// Unit cube centred on the origin with half extent 1
    pub fn cube() -> Self {
        let vertices = vec![
            // Front face
            Vertex::new([-1.0, -1.0, 1.0], [0.0, 0.0, 1.0], [0.0, 0.0]),
            Vertex::new([1.0, -1.0, 1.0], [0.0, 0.0, 1.0], [1.0, 0.0]),
            Vertex::new([1.0, 1.0, 1.0], [0.0, 0.0, 1.0], [1.0, 1.0]),
            Vertex::new([-1.0, 1.0, 1.0], [0.0, 0.0, 1.0], [0.0, 1.0]),
            // Back face
            Vertex::new([-1.0, -1.0, -1.0], [0.0, 0.0, -1.0], [1.0, 0.0]),
            Vertex::new([-1.0, 1.0, -1.0], [0.0, 0.0, -1.0], [1.0, 1.0]),
            Vertex::new([1.0, 1.0, -1.0], [0.0, 0.0, -1.0], [0.0, 1.0]),
            Vertex::new([1.0, -1.0, -1.0], [0.0, 0.0, -1.0], [0.0, 0.0]),
        ];

        let indices = vec![
            // Front
            0, 1, 2, 2, 3, 0,
            // Back
            4, 5, 6, 6, 7, 4,
            // Left
            4, 0, 3, 3, 5, 4,
            // Right
            1, 7, 6, 6, 2, 1,
            // Top
            3, 2, 6, 6, 5, 3,
            // Bottom
            4, 7, 1, 1, 0, 4,
        ];

        Self::new("cube", vertices, indices)
    }

    /// Square in the XZ plane, facing +Y, with half extent `size / 2`
    pub fn plane(size: f32) -> Self {
        let h = size * 0.5;
        let up = [0.0, 1.0, 0.0];
        let vertices = vec![
            Vertex::new([-h, 0.0, -h], up, [0.0, 0.0]),
            Vertex::new([h, 0.0, -h], up, [1.0, 0.0]),
            Vertex::new([h, 0.0, h], up, [1.0, 1.0]),
            Vertex::new([-h, 0.0, h], up, [0.0, 1.0]),
        ];
        Self::new("plane", vertices, vec![0, 2, 1, 0, 3, 2])
    }

    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterate triangles as index triples
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|tri| [tri[0], tri[1], tri[2]])
    }

    /// Axis-aligned bounds `(min, max)`, `None` for an empty mesh
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut iter = self.vertices.iter().map(Vertex::position_vec);
        let first = iter.next()?;
        Some(iter.fold((first, first), |(min, max), p| (min.inf(&p), max.sup(&p))))
    }

    /// Check the index buffer and vertex positions for structural errors
    pub fn validate(&self) -> Result<(), MeshError> {
        if self.indices.len() % 3 != 0 {
            return Err(MeshError::NotTriangles(self.indices.len()));
        }
        let vertex_count = self.vertices.len();
        if let Some(&index) = self.indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(MeshError::IndexOutOfRange { index, vertex_count });
        }
        if let Some(bad) = self
            .vertices
            .iter()
            .position(|v| v.position.iter().any(|c| !c.is_finite()))
        {
            return Err(MeshError::NonFinitePosition(bad));
        }
        Ok(())
    }

    /// Copy of this mesh with every vertex transformed by `matrix`.
    ///
    /// Normals use the inverse-transpose; non-invertible matrices keep the
    /// original normals.
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        let normal_matrix = matrix
            .fixed_view::<3, 3>(0, 0)
            .into_owned()
            .try_inverse()
            .map(|inv| inv.transpose());

        let vertices = self
            .vertices
            .iter()
            .map(|v| {
                let p = matrix.transform_point(&Point3::from(v.position));
                let normal = normal_matrix
                    .as_ref()
                    .map(|nm| {
                        let n = nm * Vec3::from(v.normal);
                        if n.magnitude() > 0.0 { n.normalize() } else { n }
                    })
                    .unwrap_or_else(|| Vec3::from(v.normal));
                Vertex::new([p.x, p.y, p.z], [normal.x, normal.y, normal.z], v.tex_coord)
            })
            .collect();

        Self::new(self.label.clone(), vertices, self.indices.clone())
    }

    /// Replace vertex normals with area-weighted face normals
    pub fn recompute_normals(&mut self) {
        let mut accum = vec![Vec3::zeros(); self.vertices.len()];
        for [a, b, c] in self.triangles() {
            let (a, b, c) = (a as usize, b as usize, c as usize);
            let (Some(pa), Some(pb), Some(pc)) =
                (self.vertices.get(a), self.vertices.get(b), self.vertices.get(c))
            else {
                continue;
            };
            let face = (pb.position_vec() - pa.position_vec())
                .cross(&(pc.position_vec() - pa.position_vec()));
            accum[a] += face;
            accum[b] += face;
            accum[c] += face;
        }
        for (vertex, n) in self.vertices.iter_mut().zip(accum) {
            if n.magnitude() > 0.0 {
                let n = n.normalize();
                vertex.normal = [n.x, n.y, n.z];
            }
        }
    }
}

/// Shared, immutable mesh handle
///
/// Cloning a handle bumps the reference count; equality is identity, so two
/// handles compare equal only when they point at the same allocation.
#[derive(Clone)]
pub struct MeshHandle(Arc<Mesh>);

impl MeshHandle {
    /// Wrap a mesh in a new handle
    pub fn new(mesh: Mesh) -> Self {
        Self(Arc::new(mesh))
    }

    /// Whether two handles share one allocation
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Whether two handles hold equal geometry, shared or not
    pub fn same_content(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.0 == *other.0
    }

    /// Number of live handles to this mesh
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.0)
    }

    /// Deep copy into a fresh allocation
    pub fn deep_copy(&self) -> Self {
        Self::new((*self.0).clone())
    }
}

impl Deref for MeshHandle {
    type Target = Mesh;

    fn deref(&self) -> &Mesh {
        &self.0
    }
}

impl PartialEq for MeshHandle {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for MeshHandle {}

impl From<Mesh> for MeshHandle {
    fn from(mesh: Mesh) -> Self {
        Self::new(mesh)
    }
}

impl fmt::Debug for MeshHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MeshHandle")
            .field("label", &self.0.label)
            .field("vertices", &self.0.vertex_count())
            .field("triangles", &self.0.triangle_count())
            .field("ptr", &Arc::as_ptr(&self.0))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cube_is_valid() {
        let cube = Mesh::cube();
        assert_eq!(cube.vertex_count(), 8);
        assert_eq!(cube.triangle_count(), 12);
        assert!(cube.validate().is_ok());
    }

    #[test]
    fn test_validate_catches_bad_indices() {
        let mut mesh = Mesh::plane(2.0);
        mesh.indices.push(0);
        assert_eq!(mesh.validate(), Err(MeshError::NotTriangles(7)));

        let mut mesh = Mesh::plane(2.0);
        mesh.indices[0] = 99;
        assert!(matches!(mesh.validate(), Err(MeshError::IndexOutOfRange { index: 99, .. })));
    }

    #[test]
    fn test_bounds() {
        let (min, max) = Mesh::cube().bounds().unwrap();
        assert_relative_eq!(min, Vec3::new(-1.0, -1.0, -1.0));
        assert_relative_eq!(max, Vec3::new(1.0, 1.0, 1.0));
        assert!(Mesh::default().bounds().is_none());
    }

    #[test]
    fn test_transformed_does_not_touch_source() {
        let cube = Mesh::cube();
        let scaled = cube.transformed(&Mat4::new_scaling(2.0));
        assert_eq!(cube, Mesh::cube());
        let (_, max) = scaled.bounds().unwrap();
        assert_relative_eq!(max, Vec3::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn test_handle_identity() {
        let a = MeshHandle::new(Mesh::cube());
        let b = a.clone();
        let c = a.deep_copy();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.same_content(&c));
        assert_eq!(a.ref_count(), 2);
    }
}
