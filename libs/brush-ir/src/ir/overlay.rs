//! Overlay (decal) records.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use super::SideId;
use crate::error::IrError;

/// A decal projected onto one or more sides.
///
/// The four UV points are corners of the decal quad in the local frame
/// spanned by `basis_u`, `basis_v` and `basis_normal` around
/// `basis_origin`. Editor overlays list them clockwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    /// Editor-assigned entity id.
    pub id: i32,
    /// Sides the overlay is painted onto.
    pub sides: Vec<SideId>,
    /// Material reference.
    pub material: String,
    /// Origin of the local projection frame.
    pub basis_origin: DVec3,
    /// Frame normal.
    pub basis_normal: DVec3,
    /// Frame u axis.
    pub basis_u: DVec3,
    /// Frame v axis.
    pub basis_v: DVec3,
    /// Quad corners in the local frame (z ignored).
    pub uv_points: [DVec3; 4],
    /// Texture sub-range start along u.
    pub start_u: f64,
    /// Texture sub-range end along u.
    pub end_u: f64,
    /// Texture sub-range start along v.
    pub start_v: f64,
    /// Texture sub-range end along v.
    pub end_v: f64,
    /// Draw order among stacked overlays; raises the surface offset.
    pub render_order: Option<u32>,
}

impl Overlay {
    /// Creates an overlay with a world-aligned frame at the origin, a unit
    /// quad and the full texture range.
    pub fn new(id: i32, material: impl Into<String>, sides: Vec<SideId>) -> Self {
        Self {
            id,
            sides,
            material: material.into(),
            basis_origin: DVec3::ZERO,
            basis_normal: DVec3::Z,
            basis_u: DVec3::X,
            basis_v: DVec3::Y,
            uv_points: [
                DVec3::new(-0.5, -0.5, 0.0),
                DVec3::new(-0.5, 0.5, 0.0),
                DVec3::new(0.5, 0.5, 0.0),
                DVec3::new(0.5, -0.5, 0.0),
            ],
            start_u: 0.0,
            end_u: 1.0,
            start_v: 0.0,
            end_v: 1.0,
            render_order: None,
        }
    }

    /// Sets the projection frame.
    pub fn with_basis(mut self, origin: DVec3, u: DVec3, v: DVec3, normal: DVec3) -> Self {
        self.basis_origin = origin;
        self.basis_u = u;
        self.basis_v = v;
        self.basis_normal = normal;
        self
    }

    /// Sets the quad corners.
    pub fn with_uv_points(mut self, uv_points: [DVec3; 4]) -> Self {
        self.uv_points = uv_points;
        self
    }

    /// Sets the texture sub-range.
    pub fn with_uv_range(mut self, start_u: f64, end_u: f64, start_v: f64, end_v: f64) -> Self {
        self.start_u = start_u;
        self.end_u = end_u;
        self.start_v = start_v;
        self.end_v = end_v;
        self
    }

    /// Sets the render order.
    pub fn with_render_order(mut self, render_order: u32) -> Self {
        self.render_order = Some(render_order);
        self
    }

    /// Checks the overlay references at least one side.
    pub fn validate(&self) -> Result<(), IrError> {
        if self.sides.is_empty() {
            return Err(IrError::OverlayWithoutSides {
                overlay_id: self.id,
            });
        }
        Ok(())
    }
}
