//! # Brush Reconstruction
//!
//! Turns a plane-bounded solid into a polygon mesh:
//!
//! 1. Side planes from the editor's three points
//! 2. Corners by three-plane intersection, clipped by every other half-space
//! 3. Per-side vertex ordering and planar UVs
//! 4. Displacement grids replacing their quad sides
//! 5. Winding checked against the plane normals
//!
//! The built geometry of every side is returned alongside the mesh for the
//! overlay stage.

mod displacement;
mod faces;
mod uv;
mod vertices;

pub use displacement::{expand, start_corner, triangulate, DisplacementGrid};
pub use faces::sort_face_vertices;
pub use uv::{normalization_offset, normalize_uvs, project_uv};
pub use vertices::{enumerate_vertices, SolidVertices};

use brush_ir::Solid;
use config::constants::ImportConfig;
use glam::DVec2;
use serde::Serialize;

use crate::error::BuildError;
use crate::geometry::{Plane, Tolerance};
use crate::material::{MaterialInfo, MaterialRef, MaterialResolver, MaterialTable};
use crate::mesh::{Face, PolygonMesh};
use crate::side_cache::SideGeometry;

/// A finished solid, ready for the scene sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuiltSolid {
    /// Solid id from the map.
    pub id: i32,
    /// `{classname}_{id}`.
    pub name: String,
    /// Every side uses an invisible tool material.
    pub is_tool: bool,
    /// The mesh holds displacement grids instead of plain sides.
    pub is_displacement: bool,
    /// Reconstructed geometry.
    pub mesh: PolygonMesh,
    /// Material slots referenced by `Face::material_index`.
    pub materials: Vec<MaterialRef>,
    /// Built geometry of each side, for overlay clipping.
    #[serde(skip)]
    pub side_geometry: Vec<SideGeometry>,
}

/// Builds one solid.
///
/// Returns `Ok(None)` when the solid is an invisible tool brush and
/// `skip_tools` is set.
pub fn build_solid(
    solid: &Solid,
    class_name: &str,
    resolver: &dyn MaterialResolver,
    config: &ImportConfig,
) -> Result<Option<BuiltSolid>, BuildError> {
    solid.validate()?;
    let name = format!("{}_{}", class_name, solid.id);

    let mut table = MaterialTable::new();
    let side_materials: Vec<(u32, MaterialInfo)> = solid
        .sides
        .iter()
        .map(|side| table.slot(&side.material, resolver))
        .collect();
    let is_tool = table.all_nodraw();
    if is_tool && config.skip_tools {
        tracing::debug!("Skipping tool brush {}", name);
        return Ok(None);
    }
    tracing::debug!("Building {}...", name);

    let planes = solid
        .sides
        .iter()
        .map(|side| {
            let [p1, p2, p3] = side.plane;
            Plane::from_points(p1, p2, p3)
                .ok_or(BuildError::DegeneratePlane { side_id: side.id })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let SolidVertices {
        vertices,
        mut side_vertices,
    } = enumerate_vertices(&planes, Tolerance::merge(config.merge_epsilon));

    for (index, side) in solid.sides.iter().enumerate() {
        let count = side_vertices[index].len();
        if count < 3 {
            log_side_planes(&name, solid, &side_vertices);
            return Err(BuildError::not_enough_vertices(side.id, count));
        }
        sort_face_vertices(&mut side_vertices[index], &vertices, &planes[index]);
    }

    let mut side_geometry: Vec<SideGeometry> = solid
        .sides
        .iter()
        .zip(&side_vertices)
        .zip(&planes)
        .map(|((side, indices), plane)| {
            let positions = indices.iter().map(|&i| vertices[i]).collect();
            SideGeometry::polygon(side.id, positions, plane.normal())
        })
        .collect();

    let side_uvs: Vec<Vec<DVec2>> = solid
        .sides
        .iter()
        .zip(&side_vertices)
        .zip(&side_materials)
        .map(|((side, indices), (_, info))| {
            let mut uvs: Vec<DVec2> = indices
                .iter()
                .map(|&i| project_uv(vertices[i], side, info.width, info.height))
                .collect();
            normalize_uvs(&mut uvs);
            uvs
        })
        .collect();

    let is_displacement = solid.has_displacement();
    let mut expected_normals = Vec::new();
    let mut mesh;

    if is_displacement {
        mesh = PolygonMesh::new();
        for (index, side) in solid.sides.iter().enumerate() {
            let Some(disp) = &side.disp_info else {
                continue;
            };
            let indices = &side_vertices[index];
            if indices.len() != 4 {
                return Err(BuildError::invalid_displacement(side.id, indices.len()));
            }

            let corners = [0, 1, 2, 3].map(|k| vertices[indices[k]]);
            let corner_uvs = [0, 1, 2, 3].map(|k| side_uvs[index][k]);
            let normal = planes[index].normal();
            let grid = expand(&corners, &corner_uvs, disp, normal);

            let base = mesh.vertex_count() as u32;
            for &position in &grid.positions {
                mesh.add_vertex(position);
            }
            let material = side_materials[index].0;
            for triangle in &grid.triangles {
                let face = Face::new(
                    triangle.iter().map(|&n| base + n as u32).collect(),
                    triangle.iter().map(|&n| grid.uvs[n]).collect(),
                    material,
                )
                .with_colors(triangle.iter().map(|&n| grid.colors[n]).collect());
                mesh.add_face(face);
                expected_normals.push(normal);
            }

            side_geometry[index] = SideGeometry {
                side_id: side.id,
                positions: grid.positions,
                faces: grid.triangles.iter().map(|t| t.to_vec()).collect(),
                normal,
            };
        }
    } else {
        mesh = PolygonMesh::with_capacity(vertices.len(), solid.sides.len());
        for &position in &vertices {
            mesh.add_vertex(position);
        }
        for (index, indices) in side_vertices.iter().enumerate() {
            mesh.add_face(Face::new(
                indices.iter().map(|&i| i as u32).collect(),
                side_uvs[index].clone(),
                side_materials[index].0,
            ));
            expected_normals.push(planes[index].normal());
        }
    }

    if mesh.orient_to(&expected_normals) {
        tracing::debug!("Flipped winding of {}", name);
    }

    Ok(Some(BuiltSolid {
        id: solid.id,
        name,
        is_tool,
        is_displacement,
        mesh,
        materials: table.into_refs(),
        side_geometry,
    }))
}

/// Dumps a malformed solid's side planes and the corners found on them.
fn log_side_planes(name: &str, solid: &Solid, side_vertices: &[Vec<usize>]) {
    tracing::debug!("Invalid solid {}: map is malformed or merge epsilon is too large", name);
    for (side, indices) in solid.sides.iter().zip(side_vertices) {
        let [p1, p2, p3] = side.plane;
        tracing::debug!(
            "  side {} plane ({:?}, {:?}, {:?}) corners {:?}",
            side.id,
            p1,
            p2,
            p3,
            indices
        );
    }
}
