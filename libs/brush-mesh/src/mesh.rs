//! # Mesh Data Structure
//!
//! Polygon mesh with per-loop UVs and optional per-loop colors, plus the
//! flat buffer exports the scene sink consumes.

use config::constants::{DEFAULT_LOOP_COLOR, PARALLEL_EPSILON};
use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

use crate::geometry::polygon_normal;

// =============================================================================
// FACE
// =============================================================================

/// One polygon: vertex indices with a UV (and optionally a color) per loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Face {
    /// Indices into the mesh vertices, in winding order.
    pub indices: Vec<u32>,
    /// One UV per index.
    pub uvs: Vec<DVec2>,
    /// One RGBA color per index, if the face carries colors.
    pub colors: Option<Vec<[f32; 4]>>,
    /// Index into the owning entity's material table.
    pub material_index: u32,
}

impl Face {
    /// Creates an uncolored face.
    pub fn new(indices: Vec<u32>, uvs: Vec<DVec2>, material_index: u32) -> Self {
        Self {
            indices,
            uvs,
            colors: None,
            material_index,
        }
    }

    /// Attaches per-loop colors.
    pub fn with_colors(mut self, colors: Vec<[f32; 4]>) -> Self {
        self.colors = Some(colors);
        self
    }

    /// Number of loops (corners).
    #[inline]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Returns true if the face has no loops.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Reverses the winding, keeping the first loop in place.
    pub fn flip(&mut self) {
        if self.indices.len() < 2 {
            return;
        }
        self.indices[1..].reverse();
        if self.uvs.len() > 1 {
            self.uvs[1..].reverse();
        }
        if let Some(colors) = &mut self.colors {
            if colors.len() > 1 {
                colors[1..].reverse();
            }
        }
    }
}

// =============================================================================
// POLYGON MESH
// =============================================================================

/// A polygon mesh with vertices and faces.
///
/// All geometry calculations use f64 internally. Export to f32 only
/// happens in the flat buffer exports.
///
/// # Example
///
/// ```rust
/// use brush_mesh::mesh::{Face, PolygonMesh};
/// use glam::{DVec2, DVec3};
///
/// let mut mesh = PolygonMesh::new();
/// mesh.add_vertex(DVec3::new(0.0, 0.0, 0.0));
/// mesh.add_vertex(DVec3::new(1.0, 0.0, 0.0));
/// mesh.add_vertex(DVec3::new(0.0, 1.0, 0.0));
/// mesh.add_face(Face::new(vec![0, 1, 2], vec![DVec2::ZERO; 3], 0));
/// assert_eq!(mesh.loop_count(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolygonMesh {
    /// Vertex positions
    vertices: Vec<DVec3>,
    /// Polygons
    faces: Vec<Face>,
}

impl PolygonMesh {
    /// Creates an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mesh with pre-allocated capacity.
    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
        }
    }

    /// Creates a mesh from existing buffers.
    pub fn from_parts(vertices: Vec<DVec3>, faces: Vec<Face>) -> Self {
        Self { vertices, faces }
    }

    /// Returns the number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the number of faces.
    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Returns the total number of loops over all faces.
    pub fn loop_count(&self) -> usize {
        self.faces.iter().map(Face::len).sum()
    }

    /// Returns true if the mesh has no faces.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Adds a vertex and returns its index.
    pub fn add_vertex(&mut self, position: DVec3) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(position);
        index
    }

    /// Adds a face.
    pub fn add_face(&mut self, face: Face) {
        self.faces.push(face);
    }

    /// Returns a reference to the vertices.
    #[inline]
    pub fn vertices(&self) -> &[DVec3] {
        &self.vertices
    }

    /// Returns a reference to the faces.
    #[inline]
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Returns the vertex at the given index.
    #[inline]
    pub fn vertex(&self, index: u32) -> DVec3 {
        self.vertices[index as usize]
    }

    /// Returns the face at the given index.
    #[inline]
    pub fn face(&self, index: usize) -> &Face {
        &self.faces[index]
    }

    /// Unit normal implied by a face's winding, or zero for a degenerate
    /// face.
    pub fn face_normal(&self, index: usize) -> DVec3 {
        let normal = polygon_normal(self.faces[index].indices.iter().map(|&i| self.vertex(i)));
        normal.try_normalize().unwrap_or(DVec3::ZERO)
    }

    /// Returns true if any face carries colors.
    pub fn has_colors(&self) -> bool {
        self.faces.iter().any(|face| face.colors.is_some())
    }

    /// Reverses the winding of every face.
    pub fn flip_winding(&mut self) {
        for face in &mut self.faces {
            face.flip();
        }
    }

    /// Flips every face when the winding normals disagree, in sum, with the
    /// expected per-face normals. Returns true if the mesh was flipped.
    pub fn orient_to(&mut self, expected_normals: &[DVec3]) -> bool {
        let agreement: f64 = expected_normals
            .iter()
            .enumerate()
            .map(|(i, expected)| self.face_normal(i).dot(*expected))
            .sum();
        if agreement < 0.0 {
            self.flip_winding();
            true
        } else {
            false
        }
    }

    /// Computes the axis-aligned bounding box.
    ///
    /// Returns (min, max) corners of the bounding box.
    pub fn bounding_box(&self) -> (DVec3, DVec3) {
        if self.vertices.is_empty() {
            return (DVec3::ZERO, DVec3::ZERO);
        }

        let mut min = self.vertices[0];
        let mut max = self.vertices[0];

        for v in &self.vertices[1..] {
            min = min.min(*v);
            max = max.max(*v);
        }

        (min, max)
    }

    /// Validates the mesh for correctness.
    ///
    /// Checks:
    /// - Every face has at least 3 loops and matching UV/color counts
    /// - All indices are valid and not repeated within a face
    /// - No zero-area faces
    ///
    /// Returns true if valid.
    pub fn validate(&self) -> bool {
        let vertex_count = self.vertices.len() as u32;

        self.faces.iter().all(|face| {
            if face.len() < 3 || face.uvs.len() != face.len() {
                return false;
            }
            if face.colors.as_ref().is_some_and(|c| c.len() != face.len()) {
                return false;
            }
            if face.indices.iter().any(|&index| index >= vertex_count) {
                return false;
            }
            let mut sorted = face.indices.clone();
            sorted.sort_unstable();
            sorted.dedup();
            if sorted.len() != face.len() {
                return false;
            }
            let area = polygon_normal(face.indices.iter().map(|&v| self.vertex(v))).length();
            area > PARALLEL_EPSILON
        })
    }

    // =========================================================================
    // FLAT EXPORTS
    // =========================================================================

    /// Exports vertices as f32 array.
    ///
    /// Returns flattened [x, y, z, x, y, z, ...] array.
    pub fn vertices_f32(&self) -> Vec<f32> {
        let mut result = Vec::with_capacity(self.vertices.len() * 3);
        for v in &self.vertices {
            result.push(v.x as f32);
            result.push(v.y as f32);
            result.push(v.z as f32);
        }
        result
    }

    /// Loop count of each face.
    pub fn polygon_loop_totals(&self) -> Vec<u32> {
        self.faces.iter().map(|face| face.len() as u32).collect()
    }

    /// Index of each face's first loop in the flat loop arrays.
    pub fn polygon_loop_starts(&self) -> Vec<u32> {
        let mut start = 0u32;
        self.faces
            .iter()
            .map(|face| {
                let current = start;
                start += face.len() as u32;
                current
            })
            .collect()
    }

    /// Vertex index of every loop, face by face.
    pub fn polygon_vertices(&self) -> Vec<u32> {
        self.faces
            .iter()
            .flat_map(|face| face.indices.iter().copied())
            .collect()
    }

    /// Material table index of each face.
    pub fn polygon_material_indices(&self) -> Vec<u32> {
        self.faces.iter().map(|face| face.material_index).collect()
    }

    /// Flattened [u, v, u, v, ...] per loop.
    pub fn loop_uvs(&self) -> Vec<f32> {
        let mut result = Vec::with_capacity(self.loop_count() * 2);
        for uv in self.faces.iter().flat_map(|face| face.uvs.iter()) {
            result.push(uv.x as f32);
            result.push(uv.y as f32);
        }
        result
    }

    /// Flattened [r, g, b, a, ...] per loop; uncolored faces export the
    /// default loop color.
    pub fn loop_colors(&self) -> Vec<f32> {
        let mut result = Vec::with_capacity(self.loop_count() * 4);
        for face in &self.faces {
            match &face.colors {
                Some(colors) => {
                    for color in colors {
                        result.extend_from_slice(color);
                    }
                }
                None => {
                    for _ in 0..face.len() {
                        result.extend_from_slice(&DEFAULT_LOOP_COLOR);
                    }
                }
            }
        }
        result
    }
}
