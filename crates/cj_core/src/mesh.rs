//! Mesh geometry representation for the city scene graph.
//!
//! A CityJSON document stores one vertex pool for the whole file and every
//! city object indexes into it. `Mesh` keeps that layout: the pool is shared
//! through an `Arc` and each mesh only owns its face loops.

use std::sync::Arc;

use cj_math::{Aabb, DVec3};

/// A polygon loop: ordered indices into the shared vertex pool.
///
/// Winding order is preserved from the source document, it decides the
/// normal direction downstream.
pub type Face = Vec<u32>;

/// A polygonal mesh referencing a shared vertex pool.
#[derive(Clone, Debug)]
pub struct Mesh {
    /// Shared vertex pool (the whole document's vertices)
    pub vertices: Arc<[DVec3]>,

    /// Face loops, each an ordered list of indices into `vertices`
    pub faces: Vec<Face>,

    /// Bounds of the vertices actually referenced by `faces`
    pub bounds: Aabb,
}

impl Mesh {
    /// Create a new mesh from a shared vertex pool and face loops.
    pub fn new(vertices: Arc<[DVec3]>, faces: Vec<Face>) -> Self {
        let bounds = Self::compute_bounds(&vertices, &faces);
        Self {
            vertices,
            faces,
            bounds,
        }
    }

    /// Compute the bounding box over referenced vertices only.
    ///
    /// The pool is shared by every object, so its full extent would give each
    /// building the bounds of the whole city.
    fn compute_bounds(vertices: &[DVec3], faces: &[Face]) -> Aabb {
        let mut bounds = Aabb::empty();

        for face in faces {
            for &index in face {
                match vertices.get(index as usize) {
                    Some(vertex) => bounds.include_point(*vertex),
                    None => log::warn!(
                        "Face index {} out of range, vertex count: {}",
                        index,
                        vertices.len()
                    ),
                }
            }
        }

        bounds
    }

    /// Number of triangles a fan triangulation of `faces` would produce.
    pub fn fan_triangle_count(faces: &[Face]) -> usize {
        faces.iter().map(|face| face.len().saturating_sub(2)).sum()
    }

    /// Get the number of face loops in the mesh.
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Get the number of triangles after fan triangulation.
    pub fn triangle_count(&self) -> usize {
        Self::fan_triangle_count(&self.faces)
    }

    /// Get the size of the (shared) vertex pool.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// True if both meshes index into the same vertex pool allocation.
    pub fn shares_pool_with(&self, other: &Mesh) -> bool {
        Arc::ptr_eq(&self.vertices, &other.vertices)
    }
}
