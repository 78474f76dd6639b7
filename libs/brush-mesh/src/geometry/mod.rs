//! # Geometry Primitives
//!
//! Plane math and vertex welding shared by the brush and overlay builders.

mod plane;
mod weld;

pub use plane::{polygon_normal, signed_angle_cw, Line, Plane};
pub use weld::{Tolerance, VertexWelder};
