//! # IR Errors
//!
//! Validation errors for records received from the map parser.

use thiserror::Error;

use crate::ir::SideId;

/// Errors raised when a record fails validation.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum IrError {
    /// Displacement power outside the supported range.
    #[error("side {side_id}: displacement power {power} is not supported")]
    InvalidDisplacementPower { side_id: SideId, power: u32 },

    /// Displacement grid array does not hold `dimension²` entries.
    #[error("side {side_id}: displacement {field} has {len} entries, expected {expected}")]
    GridSizeMismatch {
        side_id: SideId,
        field: &'static str,
        len: usize,
        expected: usize,
    },

    /// Displacement alpha outside `0..=255`.
    #[error("side {side_id}: displacement alpha {alpha} outside 0..=255")]
    AlphaOutOfRange { side_id: SideId, alpha: f64 },

    /// Texture axis scale of zero would divide by zero.
    #[error("side {side_id}: texture {axis} axis has zero scale")]
    ZeroTextureScale { side_id: SideId, axis: char },

    /// A solid without any sides.
    #[error("solid {solid_id} has no sides")]
    EmptySolid { solid_id: i32 },

    /// An overlay that references no sides.
    #[error("overlay {overlay_id} references no sides")]
    OverlayWithoutSides { overlay_id: i32 },
}
