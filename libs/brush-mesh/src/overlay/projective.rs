//! Projective (homography) maps between quads.

use config::constants::PARALLEL_EPSILON;
use glam::{DMat3, DVec2, DVec3};

/// A 2D projective transform in homogeneous coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Homography {
    matrix: DMat3,
}

impl Homography {
    /// The transform taking each `from[k]` to `to[k]`.
    ///
    /// Returns `None` when either quad has three collinear corners.
    pub fn from_quads(from: [DVec2; 4], to: [DVec2; 4]) -> Option<Self> {
        let basis_to_from = quad_basis(from)?;
        let basis_to_to = quad_basis(to)?;
        let from_to_basis = basis_to_from.inverse();
        Some(Self {
            matrix: basis_to_to * from_to_basis,
        })
    }

    /// Maps a point. `None` when it lands on the line at infinity.
    pub fn apply(&self, point: DVec2) -> Option<DVec2> {
        let mapped = self.matrix * point.extend(1.0);
        if mapped.z.abs() < PARALLEL_EPSILON {
            return None;
        }
        Some(mapped.truncate() / mapped.z)
    }
}

/// Matrix taking the projective basis (the unit vectors and `(1, 1, 1)`) to
/// the four quad corners.
fn quad_basis(points: [DVec2; 4]) -> Option<DMat3> {
    let corners = DMat3::from_cols(
        points[0].extend(1.0),
        points[1].extend(1.0),
        points[2].extend(1.0),
    );
    if corners.determinant().abs() < PARALLEL_EPSILON {
        return None;
    }
    let scale: DVec3 = corners.inverse() * points[3].extend(1.0);
    let basis = DMat3::from_cols(
        corners.x_axis * scale.x,
        corners.y_axis * scale.y,
        corners.z_axis * scale.z,
    );
    if basis.determinant().abs() < PARALLEL_EPSILON {
        return None;
    }
    Some(basis)
}
