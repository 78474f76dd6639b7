//! # Vertex Welding
//!
//! Tolerance comparison for near-coincident vertices, and a spatial hash
//! that finds merge candidates without scanning every vertex.
//!
//! ## Example
//!
//! ```rust
//! use brush_mesh::geometry::{Tolerance, VertexWelder};
//! use glam::DVec3;
//!
//! let mut welder = VertexWelder::new(DVec3::ZERO, Tolerance::merge(0.01), 10.0);
//! let (a, _) = welder.weld(DVec3::new(1.0, 1.0, 1.0));
//! let (b, created) = welder.weld(DVec3::new(1.005, 1.0, 1.0));
//! assert_eq!(a, b);
//! assert!(!created);
//! ```

use config::constants::MERGE_RELATIVE_TOLERANCE;
use glam::DVec3;
use std::collections::HashMap;

// =============================================================================
// TOLERANCE
// =============================================================================

/// Combined relative and absolute tolerance, applied per axis relative to a
/// reference point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Absolute tolerance in map units.
    pub absolute: f64,
    /// Tolerance relative to the larger distance from the reference.
    pub relative: f64,
}

impl Tolerance {
    /// Vertex merge tolerance for the given configurable epsilon.
    pub fn merge(merge_epsilon: f64) -> Self {
        Self {
            absolute: merge_epsilon,
            relative: MERGE_RELATIVE_TOLERANCE,
        }
    }

    /// Whether `a` and `b` are the same point on every axis.
    pub fn is_close(&self, a: DVec3, b: DVec3, reference: DVec3) -> bool {
        let a = a - reference;
        let b = b - reference;
        let allowed = (a.abs().max(b.abs()) * self.relative).max(DVec3::splat(self.absolute));
        (a - b).abs().cmple(allowed).all()
    }

    /// Largest per-axis distance at which a point this far from the
    /// reference can still match another.
    fn reach(&self, offset_from_reference: f64) -> f64 {
        let relative = if self.relative < 1.0 {
            self.relative * offset_from_reference / (1.0 - self.relative)
        } else {
            f64::INFINITY
        };
        self.absolute.max(relative)
    }
}

// =============================================================================
// SPATIAL HASH
// =============================================================================

/// 3D cell coordinate for spatial hashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CellCoord {
    x: i64,
    y: i64,
    z: i64,
}

impl CellCoord {
    /// Creates a cell coordinate from a position relative to the reference.
    fn from_offset(offset: DVec3, cell_size: f64) -> Self {
        let cell = (offset / cell_size).floor();
        Self {
            x: cell.x as i64,
            y: cell.y as i64,
            z: cell.z as i64,
        }
    }
}

/// Deduplicating vertex store.
///
/// Cells are at least as large as the merge reach for any point within
/// `extent` of the reference, so candidates are always in adjacent cells.
/// Among several matches the lowest index wins, which keeps results
/// independent of hash ordering.
#[derive(Debug)]
pub struct VertexWelder {
    reference: DVec3,
    tolerance: Tolerance,
    cell_size: f64,
    grid: HashMap<CellCoord, Vec<usize>>,
    points: Vec<DVec3>,
}

impl VertexWelder {
    /// Creates an empty welder for points within `extent` (per axis) of
    /// `reference`.
    pub fn new(reference: DVec3, tolerance: Tolerance, extent: f64) -> Self {
        let cell_size = tolerance.reach(extent.abs()).max(f64::EPSILON);
        Self {
            reference,
            tolerance,
            cell_size,
            grid: HashMap::new(),
            points: Vec::new(),
        }
    }

    /// Number of stored points.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if nothing has been stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Stored points in insertion order.
    #[inline]
    pub fn points(&self) -> &[DVec3] {
        &self.points
    }

    /// Consumes the welder, returning the stored points.
    pub fn into_points(self) -> Vec<DVec3> {
        self.points
    }

    /// Lowest index of a stored point matching `point`, if any.
    pub fn find(&self, point: DVec3) -> Option<usize> {
        let offset = point - self.reference;
        let reach = self.tolerance.reach(offset.abs().max_element());
        let radius = (reach / self.cell_size).ceil().max(1.0) as i64;
        let center = CellCoord::from_offset(offset, self.cell_size);

        let mut best: Option<usize> = None;
        for x in center.x - radius..=center.x + radius {
            for y in center.y - radius..=center.y + radius {
                for z in center.z - radius..=center.z + radius {
                    let Some(candidates) = self.grid.get(&CellCoord { x, y, z }) else {
                        continue;
                    };
                    for &index in candidates {
                        if best.is_some_and(|b| b <= index) {
                            continue;
                        }
                        if self
                            .tolerance
                            .is_close(self.points[index], point, self.reference)
                        {
                            best = Some(index);
                        }
                    }
                }
            }
        }
        best
    }

    /// Stores `point` unconditionally and returns its index.
    pub fn insert(&mut self, point: DVec3) -> usize {
        let index = self.points.len();
        let cell = CellCoord::from_offset(point - self.reference, self.cell_size);
        self.grid.entry(cell).or_default().push(index);
        self.points.push(point);
        index
    }

    /// Returns the index of a matching stored point, storing `point` if
    /// there is none. The flag is true when a new point was stored.
    pub fn weld(&mut self, point: DVec3) -> (usize, bool) {
        match self.find(point) {
            Some(index) => (index, false),
            None => (self.insert(point), true),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tolerance_absolute() {
        let tolerance = Tolerance::merge(0.001);
        let a = DVec3::new(1.0, 2.0, 3.0);
        assert!(tolerance.is_close(a, a + DVec3::splat(0.0009), DVec3::ZERO));
        assert!(!tolerance.is_close(a, a + DVec3::new(0.0, 0.002, 0.0), DVec3::ZERO));
    }

    #[test]
    fn test_tolerance_relative_grows_with_distance() {
        let tolerance = Tolerance::merge(0.001);
        let far = DVec3::new(10_000.0, 0.0, 0.0);
        // 1e-6 * 10000 = 0.01 allowed on x.
        assert!(tolerance.is_close(far, far + DVec3::new(0.005, 0.0, 0.0), DVec3::ZERO));
        // Measured from a nearby reference only the absolute part applies.
        assert!(!tolerance.is_close(far, far + DVec3::new(0.005, 0.0, 0.0), far));
    }

    #[test]
    fn test_welder_merges_within_tolerance() {
        let mut welder = VertexWelder::new(DVec3::ZERO, Tolerance::merge(0.01), 100.0);
        let (a, created_a) = welder.weld(DVec3::new(5.0, 5.0, 5.0));
        let (b, created_b) = welder.weld(DVec3::new(5.004, 4.996, 5.0));
        let (c, created_c) = welder.weld(DVec3::new(6.0, 5.0, 5.0));
        assert!(created_a);
        assert!(!created_b);
        assert!(created_c);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(welder.len(), 2);
    }

    #[test]
    fn test_welder_finds_across_cell_boundary() {
        let mut welder = VertexWelder::new(DVec3::ZERO, Tolerance::merge(0.01), 1.0);
        // Straddles the boundary between two cells on every axis.
        let index = welder.insert(DVec3::splat(0.0099));
        assert_eq!(welder.find(DVec3::splat(0.0101)), Some(index));
        assert_eq!(welder.find(DVec3::splat(-0.00005)), Some(index));
    }

    #[test]
    fn test_welder_prefers_lowest_index() {
        let mut welder = VertexWelder::new(DVec3::ZERO, Tolerance::merge(0.01), 10.0);
        welder.insert(DVec3::new(1.0, 0.0, 0.0));
        welder.insert(DVec3::new(1.008, 0.0, 0.0));
        // Within tolerance of both; the first stored wins.
        assert_eq!(welder.find(DVec3::new(1.004, 0.0, 0.0)), Some(0));
    }

    #[test]
    fn test_welder_far_from_reference() {
        let origin = DVec3::new(-12_000.0, 8_000.0, 512.0);
        let mut welder = VertexWelder::new(DVec3::ZERO, Tolerance::merge(0.001), 16_384.0);
        let index = welder.insert(origin);
        assert_eq!(welder.find(origin + DVec3::splat(0.0005)), Some(index));
        assert_eq!(welder.find(origin + DVec3::new(1.0, 0.0, 0.0)), None);
        assert_eq!(welder.into_points(), vec![origin]);
    }
}
