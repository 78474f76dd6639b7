//! # Brush IR
//!
//! Records describing map brushes and overlays, as produced by the map
//! parser and consumed by `brush-mesh`.
//!
//! ## Architecture
//!
//! ```text
//! map parser → brush-ir (Solid, Side, DispInfo, Overlay) → brush-mesh
//! ```
//!
//! ## Example
//!
//! ```rust
//! use brush_ir::Solid;
//! use glam::DVec3;
//!
//! let solid = Solid::block(1, 1, DVec3::splat(-32.0), DVec3::splat(32.0), "dev/dev_measuregeneric01");
//! assert_eq!(solid.sides.len(), 6);
//! assert!(solid.validate().is_ok());
//! ```

pub mod error;
pub mod ir;

pub use error::IrError;
pub use ir::{
    DispInfo, MapRecords, Overlay, Side, SideId, Solid, SolidEntity, TextureAxis,
};
