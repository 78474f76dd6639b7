//! # Brush Merging
//!
//! Joins the built solids of one brush entity into a single mesh with one
//! material table. Plain solids share welded vertices; displacement grids
//! are appended last without welding.

use config::constants::ImportConfig;
use glam::DVec3;
use serde::Serialize;

use crate::brush::BuiltSolid;
use crate::geometry::{Tolerance, VertexWelder};
use crate::material::{MaterialRef, MaterialResolver, MaterialTable};
use crate::mesh::{Face, PolygonMesh};

/// Every built solid of one brush entity as one mesh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedBrush {
    /// `{classname}_{id of the entity's first solid}`.
    pub name: String,
    /// Owning entity class.
    pub class_name: String,
    /// Merged solid ids, plain solids before displacements.
    pub solid_ids: Vec<i32>,
    /// Every material is an invisible tool texture.
    pub is_tool: bool,
    pub mesh: PolygonMesh,
    /// Material slots referenced by `Face::material_index`.
    pub materials: Vec<MaterialRef>,
}

/// Merges built solids into one mesh. `None` when there is nothing to
/// merge.
pub fn merge_solids(
    name: String,
    class_name: &str,
    solids: &[&BuiltSolid],
    resolver: &dyn MaterialResolver,
    config: &ImportConfig,
) -> Option<MergedBrush> {
    if solids.is_empty() {
        return None;
    }
    let (plain, displaced): (Vec<&BuiltSolid>, Vec<&BuiltSolid>) =
        solids.iter().copied().partition(|solid| !solid.is_displacement);

    let extent = plain
        .iter()
        .flat_map(|solid| solid.mesh.vertices())
        .map(|p| p.abs().max_element())
        .fold(0.0, f64::max);
    let mut welder = VertexWelder::new(DVec3::ZERO, Tolerance::merge(config.merge_epsilon), extent);
    let mut table = MaterialTable::new();
    let mut faces = Vec::with_capacity(solids.iter().map(|solid| solid.mesh.face_count()).sum());

    for solid in &plain {
        let vertex_map: Vec<u32> = solid
            .mesh
            .vertices()
            .iter()
            .map(|&point| welder.weld(point).0 as u32)
            .collect();
        append_faces(solid, &vertex_map, &mut table, resolver, &mut faces);
    }

    let mut vertices = welder.into_points();
    for solid in &displaced {
        let base = vertices.len() as u32;
        vertices.extend_from_slice(solid.mesh.vertices());
        let vertex_map: Vec<u32> = (base..base + solid.mesh.vertex_count() as u32).collect();
        append_faces(solid, &vertex_map, &mut table, resolver, &mut faces);
    }

    tracing::debug!(
        "Merged {} solids into {} ({} vertices)",
        solids.len(),
        name,
        vertices.len()
    );

    Some(MergedBrush {
        name,
        class_name: class_name.to_string(),
        solid_ids: plain.iter().chain(&displaced).map(|solid| solid.id).collect(),
        is_tool: table.all_nodraw(),
        mesh: PolygonMesh::from_parts(vertices, faces),
        materials: table.into_refs(),
    })
}

/// Copies a solid's faces with vertex and material indices remapped into
/// the merged mesh.
fn append_faces(
    solid: &BuiltSolid,
    vertex_map: &[u32],
    table: &mut MaterialTable,
    resolver: &dyn MaterialResolver,
    faces: &mut Vec<Face>,
) {
    let material_map: Vec<u32> = solid
        .materials
        .iter()
        .map(|material| table.slot(&material.name, resolver).0)
        .collect();
    for face in solid.mesh.faces() {
        let mut face = face.clone();
        for index in &mut face.indices {
            *index = vertex_map[*index as usize];
        }
        face.material_index = material_map[face.material_index as usize];
        faces.push(face);
    }
}
