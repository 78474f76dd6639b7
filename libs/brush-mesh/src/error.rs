//! # Build Errors
//!
//! Error types for solid and overlay reconstruction. Every error is local
//! to one entity; the importer records it and moves on.

use brush_ir::{IrError, SideId};
use thiserror::Error;

/// Errors raised by the material collaborator.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MaterialError {
    /// The material name could not be resolved to texture metadata.
    #[error("material '{name}' not found")]
    NotFound { name: String },

    /// The material exists but its metadata is unusable.
    #[error("material '{name}' is invalid: {message}")]
    Invalid { name: String, message: String },

    /// The texture for a resolved material could not be decoded.
    #[error("texture for '{name}' failed to decode: {message}")]
    DecodeFailed { name: String, message: String },
}

impl MaterialError {
    /// Creates a not-found error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Creates an invalid-metadata error.
    pub fn invalid(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates a decode failure.
    pub fn decode_failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DecodeFailed {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Errors that can occur while building one solid or overlay.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BuildError {
    /// The record failed validation before any geometry was built.
    #[error("Invalid record: {0}")]
    InvalidRecord(#[from] IrError),

    /// A side's three plane points are collinear.
    #[error("side {side_id}: plane points are collinear")]
    DegeneratePlane { side_id: SideId },

    /// A face ended up with fewer than three vertices.
    #[error("side {side_id}: face has {count} vertices")]
    NotEnoughVertices { side_id: SideId, count: usize },

    /// A displacement is attached to a side that is not a quad.
    #[error("side {side_id}: displacement needs a 4-vertex face, found {count}")]
    InvalidDisplacement { side_id: SideId, count: usize },

    /// An overlay references a side id no built solid provides.
    #[error("overlay {overlay_id}: side {side_id} not found")]
    MissingSide { overlay_id: i32, side_id: SideId },

    /// The overlay's u/v/normal frame is not invertible.
    #[error("overlay {overlay_id}: projection basis is degenerate")]
    DegenerateBasis { overlay_id: i32 },

    /// The overlay's UV quad cannot define a projective map.
    #[error("overlay {overlay_id}: uv quad is degenerate")]
    DegenerateUvQuad { overlay_id: i32 },

    /// Clipping removed every face of the overlay.
    #[error("overlay {overlay_id}: nothing left after clipping")]
    EmptyOverlay { overlay_id: i32 },
}

impl BuildError {
    /// Creates a not-enough-vertices error.
    pub fn not_enough_vertices(side_id: SideId, count: usize) -> Self {
        Self::NotEnoughVertices { side_id, count }
    }

    /// Creates an invalid displacement error.
    pub fn invalid_displacement(side_id: SideId, count: usize) -> Self {
        Self::InvalidDisplacement { side_id, count }
    }
}
