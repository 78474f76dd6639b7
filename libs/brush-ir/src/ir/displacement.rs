//! Displacement descriptors.

use config::constants::MAX_DISPLACEMENT_POWER;
use glam::DVec3;
use serde::{Deserialize, Serialize};

use super::SideId;
use crate::error::IrError;

/// Grid displacement attached to a quadrilateral side.
///
/// Grids are stored row-major with `dimension()²` entries each.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispInfo {
    /// Subdivision power; the grid dimension is `2^power + 1`.
    pub power: u32,
    /// Corner of the quad the grid starts at.
    pub start_position: DVec3,
    /// Uniform offset along the side normal.
    pub elevation: f64,
    /// Per-node displacement direction.
    pub normals: Vec<DVec3>,
    /// Per-node distance along `normals`.
    pub distances: Vec<f64>,
    /// Per-node free offset.
    pub offsets: Vec<DVec3>,
    /// Per-node blend weight, `0..=255`.
    pub alphas: Vec<f64>,
}

impl DispInfo {
    /// Creates an undisplaced grid: zero normals, distances, offsets and
    /// alphas.
    ///
    /// # Examples
    /// ```
    /// use brush_ir::DispInfo;
    /// use glam::DVec3;
    /// let disp = DispInfo::flat(2, DVec3::ZERO);
    /// assert_eq!(disp.dimension(), 5);
    /// assert_eq!(disp.distances.len(), 25);
    /// ```
    pub fn flat(power: u32, start_position: DVec3) -> Self {
        let dimension = (1usize << power) + 1;
        let nodes = dimension * dimension;
        Self {
            power,
            start_position,
            elevation: 0.0,
            normals: vec![DVec3::ZERO; nodes],
            distances: vec![0.0; nodes],
            offsets: vec![DVec3::ZERO; nodes],
            alphas: vec![0.0; nodes],
        }
    }

    /// Number of nodes along one grid edge.
    #[inline]
    pub fn dimension(&self) -> usize {
        (1usize << self.power) + 1
    }

    /// Row-major index of node `(row, col)`.
    #[inline]
    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.dimension() + col
    }

    /// Total displacement of node `(row, col)` for a side with the given
    /// plane normal.
    pub fn node_displacement(&self, row: usize, col: usize, plane_normal: DVec3) -> DVec3 {
        let i = self.index(row, col);
        self.offsets[i] + self.normals[i] * self.distances[i] + plane_normal * self.elevation
    }

    /// Alpha of node `(row, col)` normalized to `0..=1`.
    pub fn node_alpha(&self, row: usize, col: usize) -> f32 {
        (self.alphas[self.index(row, col)] / 255.0) as f32
    }

    /// Validates power, grid lengths and alpha range.
    pub fn validate(&self, side_id: SideId) -> Result<(), IrError> {
        if self.power == 0 || self.power > MAX_DISPLACEMENT_POWER {
            return Err(IrError::InvalidDisplacementPower {
                side_id,
                power: self.power,
            });
        }

        let expected = self.dimension() * self.dimension();
        let lengths = [
            ("normals", self.normals.len()),
            ("distances", self.distances.len()),
            ("offsets", self.offsets.len()),
            ("alphas", self.alphas.len()),
        ];
        if let Some(&(field, len)) = lengths.iter().find(|(_, len)| *len != expected) {
            return Err(IrError::GridSizeMismatch {
                side_id,
                field,
                len,
                expected,
            });
        }

        if let Some(&alpha) = self.alphas.iter().find(|a| !(0.0..=255.0).contains(*a)) {
            return Err(IrError::AlphaOutOfRange { side_id, alpha });
        }
        Ok(())
    }
}
