//! # Brush Mesh
//!
//! Surface reconstruction for plane-bounded solids and the overlays
//! projected onto them.
//!
//! ## Architecture
//!
//! ```text
//! brush-ir (MapRecords) → brush (solid meshes + side cache) → merge → overlay → sink
//! ```
//!
//! ## Algorithms
//!
//! - **Corners**: three-plane intersection with half-space cut-off
//! - **Faces**: angular ordering around the face centroid
//! - **Texturing**: planar projection, normalized by whole tiles
//! - **Displacements**: interpolated grids with checkerboard triangulation
//! - **Overlays**: border clipping and a projective UV map
//! - **Merging**: one welded mesh per brush entity
//!
//! ## Usage
//!
//! ```rust
//! use brush_ir::Solid;
//! use brush_mesh::{build_solid, MaterialLibrary};
//! use config::constants::ImportConfig;
//! use glam::DVec3;
//!
//! let solid = Solid::block(1, 1, DVec3::ZERO, DVec3::splat(64.0), "brick");
//! let built = build_solid(&solid, "worldspawn", &MaterialLibrary::new(), &ImportConfig::default())
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(built.mesh.vertex_count(), 8);
//! assert_eq!(built.mesh.face_count(), 6);
//! ```

pub mod brush;
pub mod error;
pub mod geometry;
pub mod import;
pub mod material;
pub mod merge;
pub mod mesh;
pub mod overlay;
pub mod side_cache;

pub use brush::{build_solid, BuiltSolid};
pub use error::{BuildError, MaterialError};
pub use import::{BuildOutcome, ImportOutput, ImportSummary, Importer, MeshSink, SinkMesh};
pub use material::{MaterialLibrary, MaterialResolver, TextureDecoder};
pub use merge::{merge_solids, MergedBrush};
pub use mesh::PolygonMesh;
pub use overlay::{build_overlay, BuiltOverlay};
