//! # Overlay Construction
//!
//! Builds a decal mesh from the cached geometry of the sides an overlay
//! references:
//!
//! 1. Gather and weld the sides' faces, lifted off the surface
//! 2. Clip them against the four borders of the decal quad
//! 3. Map surviving vertices to texture space with a projective transform
//!
//! Runs only after every solid is built, since it reads the side cache.

mod clip;
mod projective;

pub use clip::{Border, ClipMesh, ClippedFaces};
pub use projective::Homography;

use brush_ir::Overlay;
use config::constants::{
    ImportConfig, BORDER_RECHECK_EPSILON, OVERLAY_SURFACE_OFFSET, PARALLEL_EPSILON,
};
use glam::{DMat3, DVec2, DVec3};
use serde::Serialize;

use crate::error::BuildError;
use crate::geometry::{Tolerance, VertexWelder};
use crate::material::{resolve_or_placeholder, MaterialRef, MaterialResolver};
use crate::mesh::{Face, PolygonMesh};
use crate::side_cache::SideArena;

/// A finished overlay, ready for the scene sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuiltOverlay {
    /// Overlay entity id.
    pub id: i32,
    /// `info_overlay_{id}`.
    pub name: String,
    /// Clipped decal geometry.
    pub mesh: PolygonMesh,
    /// The overlay's single material slot.
    pub materials: Vec<MaterialRef>,
}

/// Distance the overlay is lifted off its sides.
pub fn surface_offset(render_order: Option<u32>) -> f64 {
    OVERLAY_SURFACE_OFFSET * (1.0 + f64::from(render_order.unwrap_or(0)))
}

/// Texture coordinates the four decal corners map to.
fn corner_uvs(overlay: &Overlay) -> [DVec2; 4] {
    let (u1, u2) = (overlay.start_u, overlay.end_u);
    let (v1, v2) = (1.0 - overlay.end_v, 1.0 - overlay.start_v);
    [
        DVec2::new(u1, v2),
        DVec2::new(u1, v1),
        DVec2::new(u2, v1),
        DVec2::new(u2, v2),
    ]
}

/// Builds one overlay against the side cache.
pub fn build_overlay(
    overlay: &Overlay,
    sides: &SideArena,
    resolver: &dyn MaterialResolver,
    config: &ImportConfig,
) -> Result<BuiltOverlay, BuildError> {
    overlay.validate()?;
    let name = format!("info_overlay_{}", overlay.id);
    tracing::debug!("Building {}...", name);

    let frame = DMat3::from_cols(overlay.basis_u, overlay.basis_v, overlay.basis_normal);
    if frame.determinant().abs() < PARALLEL_EPSILON {
        return Err(BuildError::DegenerateBasis {
            overlay_id: overlay.id,
        });
    }
    let borders = Border::quad(&overlay.uv_points).ok_or(BuildError::DegenerateUvQuad {
        overlay_id: overlay.id,
    })?;

    let mut referenced = Vec::with_capacity(overlay.sides.len());
    for &side_id in &overlay.sides {
        let side = sides.get(side_id).ok_or(BuildError::MissingSide {
            overlay_id: overlay.id,
            side_id,
        })?;
        referenced.push(side);
    }

    // Gather: weld shared vertices, each lifted once along its first side.
    let offset = surface_offset(overlay.render_order);
    let extent = referenced
        .iter()
        .flat_map(|side| side.positions.iter())
        .map(|p| p.abs().max_element())
        .fold(0.0, f64::max)
        + offset;
    let tolerance = Tolerance::merge(config.merge_epsilon);
    let mut gather = VertexWelder::new(DVec3::ZERO, tolerance, extent);
    let mut lift: Vec<DVec3> = Vec::new();
    let mut faces = Vec::new();
    let mut face_normals = Vec::new();
    for side in &referenced {
        for face in &side.faces {
            let indices = face
                .iter()
                .map(|&local| {
                    let (index, created) = gather.weld(side.positions[local]);
                    if created {
                        lift.push(side.normal * offset);
                    }
                    index
                })
                .collect();
            faces.push(indices);
            face_normals.push(side.normal);
        }
    }

    let mut lifted = VertexWelder::new(DVec3::ZERO, tolerance, extent);
    for (point, lift) in gather.points().iter().zip(&lift) {
        lifted.insert(*point + *lift);
    }

    let mut clip = ClipMesh::new(lifted, faces, face_normals, overlay.basis_origin, frame);
    for border in &borders {
        clip.clip(border);
    }
    clip.recheck(&borders, BORDER_RECHECK_EPSILON);
    let clipped = clip.finish();
    if clipped.faces.is_empty() {
        return Err(BuildError::EmptyOverlay {
            overlay_id: overlay.id,
        });
    }

    let quad = overlay.uv_points.map(|p| p.truncate());
    let to_uv = Homography::from_quads(quad, corner_uvs(overlay)).ok_or(
        BuildError::DegenerateUvQuad {
            overlay_id: overlay.id,
        },
    )?;
    let uvs = clipped
        .local
        .iter()
        .map(|p| to_uv.apply(p.truncate()))
        .collect::<Option<Vec<DVec2>>>()
        .ok_or(BuildError::DegenerateUvQuad {
            overlay_id: overlay.id,
        })?;

    let mut mesh = PolygonMesh::with_capacity(clipped.world.len(), clipped.faces.len());
    for &point in &clipped.world {
        mesh.add_vertex(point);
    }
    for face in &clipped.faces {
        mesh.add_face(Face::new(
            face.iter().map(|&v| v as u32).collect(),
            face.iter().map(|&v| uvs[v]).collect(),
            0,
        ));
    }
    if mesh.orient_to(&clipped.face_normals) {
        tracing::debug!("Flipped winding of {}", name);
    }

    let material = resolve_or_placeholder(resolver, &overlay.material);
    Ok(BuiltOverlay {
        id: overlay.id,
        name,
        mesh,
        materials: vec![MaterialRef {
            name: overlay.material.clone(),
            handle: material.handle,
        }],
    })
}

#[cfg(test)]
mod tests;
