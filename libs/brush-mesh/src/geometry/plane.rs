//! # Plane Math
//!
//! Planes with point/normal representation, plane intersections and the
//! 2D helpers used to order face vertices.

use config::constants::PARALLEL_EPSILON;
use glam::{DQuat, DVec2, DVec3};

// =============================================================================
// PLANE
// =============================================================================

/// A plane in 3D space defined by a point on it and a unit normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Reference point on the plane.
    point: DVec3,
    /// Unit normal, pointing out of the solid.
    normal: DVec3,
}

impl Plane {
    /// Creates a plane from a point and a (not necessarily unit) normal.
    ///
    /// Returns `None` for a zero-length normal.
    pub fn new(point: DVec3, normal: DVec3) -> Option<Self> {
        let normal = normal.try_normalize()?;
        Some(Self { point, normal })
    }

    /// Creates a plane from three points in editor winding.
    ///
    /// The normal is `(p1 - p2) × (p3 - p2)`; the reference point is the
    /// midpoint of `p1` and `p3`. Returns `None` for collinear points.
    ///
    /// # Example
    ///
    /// ```rust
    /// use brush_mesh::geometry::Plane;
    /// use glam::DVec3;
    ///
    /// let plane = Plane::from_points(
    ///     DVec3::new(-1.0, 1.0, 1.0),
    ///     DVec3::new(1.0, 1.0, 1.0),
    ///     DVec3::new(1.0, -1.0, 1.0),
    /// ).unwrap();
    /// assert_eq!(plane.normal(), DVec3::Z);
    /// ```
    pub fn from_points(p1: DVec3, p2: DVec3, p3: DVec3) -> Option<Self> {
        let normal = (p1 - p2).cross(p3 - p2);
        if normal.length_squared() < PARALLEL_EPSILON {
            return None;
        }
        Self::new((p1 + p3) / 2.0, normal)
    }

    /// Reference point on the plane.
    #[inline]
    pub fn point(&self) -> DVec3 {
        self.point
    }

    /// Unit normal.
    #[inline]
    pub fn normal(&self) -> DVec3 {
        self.normal
    }

    /// Signed distance from point to plane.
    ///
    /// Positive = in front (outside the solid), negative = behind.
    #[inline]
    pub fn signed_distance(&self, point: DVec3) -> f64 {
        self.normal.dot(point - self.point)
    }

    /// Intersects two planes. Returns `None` if they are parallel.
    pub fn intersect_plane(&self, other: &Plane) -> Option<Line> {
        let direction = self.normal.cross(other.normal);
        let det = direction.length_squared();
        if det < PARALLEL_EPSILON {
            return None;
        }

        // Point on the line as a combination of both normals.
        let d1 = self.normal.dot(self.point);
        let d2 = other.normal.dot(other.point);
        let n1n2 = self.normal.dot(other.normal);
        let c1 = (d1 - d2 * n1n2) / det;
        let c2 = (d2 - d1 * n1n2) / det;
        let origin = self.normal * c1 + other.normal * c2;

        Some(Line {
            origin,
            direction: direction / det.sqrt(),
        })
    }

    /// Common point of three planes, intersecting the first two into a line
    /// and the line with the third. `None` when any step is parallel.
    pub fn intersect_three(a: &Plane, b: &Plane, c: &Plane) -> Option<DVec3> {
        a.intersect_plane(b)?.intersect_plane(c)
    }

    /// Rotation taking this plane's normal onto +Z.
    pub fn rotation_to_z(&self) -> DQuat {
        DQuat::from_rotation_arc(self.normal, DVec3::Z)
    }
}

// =============================================================================
// LINE
// =============================================================================

/// An infinite line with a unit direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    /// Point on the line.
    pub origin: DVec3,
    /// Unit direction.
    pub direction: DVec3,
}

impl Line {
    /// Intersects the line with a plane. `None` if they are parallel.
    pub fn intersect_plane(&self, plane: &Plane) -> Option<DVec3> {
        let denom = plane.normal.dot(self.direction);
        if denom.abs() < PARALLEL_EPSILON {
            return None;
        }
        let t = -plane.signed_distance(self.origin) / denom;
        Some(self.origin + self.direction * t)
    }
}

// =============================================================================
// 2D HELPERS
// =============================================================================

/// Signed angle from `from` to `to`, clockwise positive, in `(-π, π]`.
#[inline]
pub fn signed_angle_cw(from: DVec2, to: DVec2) -> f64 {
    -from.perp_dot(to).atan2(from.dot(to))
}

/// Unnormalized polygon normal by Newell's method.
///
/// Robust for non-planar and slightly concave loops; zero for degenerate
/// ones.
pub fn polygon_normal(points: impl IntoIterator<Item = DVec3>) -> DVec3 {
    let points: Vec<DVec3> = points.into_iter().collect();
    let mut normal = DVec3::ZERO;
    for (i, current) in points.iter().enumerate() {
        let next = points[(i + 1) % points.len()];
        normal.x += (current.y - next.y) * (current.z + next.z);
        normal.y += (current.z - next.z) * (current.x + next.x);
        normal.z += (current.x - next.x) * (current.y + next.y);
    }
    normal
}

// =============================================================================
// TESTS
// =============================================================================
