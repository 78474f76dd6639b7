//! Records for solids and their sides.
//!
//! Plane points arrive in the editor's winding: for points `p1, p2, p3` the
//! outward normal is `(p1 - p2) × (p3 - p2)`.

mod displacement;
mod overlay;

pub use displacement::DispInfo;
pub use overlay::Overlay;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::error::IrError;

/// Editor-assigned side identifier, unique across the map.
pub type SideId = i32;

// =============================================================================
// TEXTURE AXIS
// =============================================================================

/// One axis of a side's planar texture projection.
///
/// The v axis is stored with the editor's sign convention; the UV projector
/// negates it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextureAxis {
    /// Projection direction.
    pub axis: DVec3,
    /// Texel offset along the axis.
    pub translation: f64,
    /// World units per texel.
    pub scale: f64,
}

impl TextureAxis {
    /// Creates a texture axis.
    pub fn new(axis: DVec3, translation: f64, scale: f64) -> Self {
        Self {
            axis,
            translation,
            scale,
        }
    }
}

// =============================================================================
// SIDE
// =============================================================================

/// One bounding half-space of a [`Solid`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Side {
    /// Map-wide side id, referenced by overlays.
    pub id: SideId,
    /// Three points on the plane, in editor winding.
    pub plane: [DVec3; 3],
    /// Material reference, resolved by the material collaborator.
    pub material: String,
    /// Texture u axis.
    pub u_axis: TextureAxis,
    /// Texture v axis.
    pub v_axis: TextureAxis,
    /// Displacement descriptor, only valid on quad sides.
    pub disp_info: Option<DispInfo>,
}

impl Side {
    /// Creates a side without displacement.
    pub fn new(
        id: SideId,
        plane: [DVec3; 3],
        material: impl Into<String>,
        u_axis: TextureAxis,
        v_axis: TextureAxis,
    ) -> Self {
        Self {
            id,
            plane,
            material: material.into(),
            u_axis,
            v_axis,
            disp_info: None,
        }
    }

    /// Attaches a displacement descriptor.
    pub fn with_displacement(mut self, disp_info: DispInfo) -> Self {
        self.disp_info = Some(disp_info);
        self
    }

    /// Checks texture scales and the displacement grid, if any.
    pub fn validate(&self) -> Result<(), IrError> {
        if self.u_axis.scale == 0.0 {
            return Err(IrError::ZeroTextureScale {
                side_id: self.id,
                axis: 'u',
            });
        }
        if self.v_axis.scale == 0.0 {
            return Err(IrError::ZeroTextureScale {
                side_id: self.id,
                axis: 'v',
            });
        }
        match &self.disp_info {
            Some(disp) => disp.validate(self.id),
            None => Ok(()),
        }
    }
}

// =============================================================================
// SOLID
// =============================================================================

/// A convex volume bounded by its sides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solid {
    /// Editor-assigned solid id.
    pub id: i32,
    /// Bounding sides, in file order.
    pub sides: Vec<Side>,
}

impl Solid {
    /// Creates a solid from its sides.
    pub fn new(id: i32, sides: Vec<Side>) -> Self {
        Self { id, sides }
    }

    /// Creates an axis-aligned block the way the editor's block tool does.
    ///
    /// Side ids are `first_side_id..first_side_id + 6`, ordered top, bottom,
    /// -X, +X, +Y, -Y. Texture axes use the editor defaults (scale 0.25).
    ///
    /// # Examples
    /// ```
    /// use brush_ir::Solid;
    /// use glam::DVec3;
    /// let block = Solid::block(7, 10, DVec3::ZERO, DVec3::splat(64.0), "tools/toolsnodraw");
    /// assert_eq!(block.sides[0].id, 10);
    /// assert_eq!(block.sides[5].id, 15);
    /// ```
    pub fn block(id: i32, first_side_id: SideId, min: DVec3, max: DVec3, material: &str) -> Self {
        let (x0, y0, z0) = (min.x, min.y, min.z);
        let (x1, y1, z1) = (max.x, max.y, max.z);
        let p = DVec3::new;

        let floor_u = TextureAxis::new(DVec3::X, 0.0, 0.25);
        let floor_v = TextureAxis::new(DVec3::NEG_Y, 0.0, 0.25);
        let x_wall_u = TextureAxis::new(DVec3::Y, 0.0, 0.25);
        let y_wall_u = TextureAxis::new(DVec3::X, 0.0, 0.25);
        let wall_v = TextureAxis::new(DVec3::NEG_Z, 0.0, 0.25);

        let planes: [([DVec3; 3], TextureAxis, TextureAxis); 6] = [
            ([p(x0, y1, z1), p(x1, y1, z1), p(x1, y0, z1)], floor_u, floor_v),
            ([p(x0, y0, z0), p(x1, y0, z0), p(x1, y1, z0)], floor_u, floor_v),
            ([p(x0, y1, z1), p(x0, y0, z1), p(x0, y0, z0)], x_wall_u, wall_v),
            ([p(x1, y1, z0), p(x1, y0, z0), p(x1, y0, z1)], x_wall_u, wall_v),
            ([p(x1, y1, z1), p(x0, y1, z1), p(x0, y1, z0)], y_wall_u, wall_v),
            ([p(x1, y0, z0), p(x0, y0, z0), p(x0, y0, z1)], y_wall_u, wall_v),
        ];

        let sides = planes
            .into_iter()
            .zip(first_side_id..)
            .map(|((plane, u_axis, v_axis), side_id)| {
                Side::new(side_id, plane, material, u_axis, v_axis)
            })
            .collect();

        Self::new(id, sides)
    }

    /// Returns true if any side carries a displacement.
    pub fn has_displacement(&self) -> bool {
        self.sides.iter().any(|side| side.disp_info.is_some())
    }

    /// Validates every side.
    pub fn validate(&self) -> Result<(), IrError> {
        if self.sides.is_empty() {
            return Err(IrError::EmptySolid { solid_id: self.id });
        }
        self.sides.iter().try_for_each(Side::validate)
    }
}

// =============================================================================
// ENTITIES
// =============================================================================

/// A brush entity: the solids owned by one entity class, e.g. `worldspawn`
/// or `func_detail`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolidEntity {
    /// Entity class name, used to name built solids.
    pub class_name: String,
    /// Owned solids.
    pub solids: Vec<Solid>,
}

impl SolidEntity {
    /// Creates a brush entity.
    pub fn new(class_name: impl Into<String>, solids: Vec<Solid>) -> Self {
        Self {
            class_name: class_name.into(),
            solids,
        }
    }
}

/// Everything the geometry engine needs from one parsed map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapRecords {
    /// Brush entities, world first.
    pub entities: Vec<SolidEntity>,
    /// Overlay entities.
    pub overlays: Vec<Overlay>,
}

impl MapRecords {
    /// Total solid count across all entities.
    pub fn solid_count(&self) -> usize {
        self.entities.iter().map(|entity| entity.solids.len()).sum()
    }

    /// Iterates `(class_name, solid)` pairs in entity order.
    pub fn solids(&self) -> impl Iterator<Item = (&str, &Solid)> {
        self.entities.iter().flat_map(|entity| {
            entity
                .solids
                .iter()
                .map(move |solid| (entity.class_name.as_str(), solid))
        })
    }
}
