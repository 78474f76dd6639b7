//! Vertex enumeration from bounding planes.

use config::constants::CUT_EPSILON;
use glam::DVec3;

use crate::geometry::{Plane, Tolerance};

/// Corners of a solid and the corners lying on each side.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolidVertices {
    /// Unique corner positions.
    pub vertices: Vec<DVec3>,
    /// For each side, indices into `vertices` in discovery order.
    pub side_vertices: Vec<Vec<usize>>,
}

/// Intersects every triple of planes and keeps the points inside all other
/// half-spaces.
///
/// A candidate is discarded when any other plane has it more than
/// [`CUT_EPSILON`] in front. Surviving points are merged with a corner
/// already on one of the three planes when within `tolerance`, measured
/// around the mean of the three plane reference points; the first match in
/// plane order wins.
pub fn enumerate_vertices(planes: &[Plane], tolerance: Tolerance) -> SolidVertices {
    let mut vertices: Vec<DVec3> = Vec::new();
    let mut side_vertices: Vec<Vec<usize>> = vec![Vec::new(); planes.len()];

    for a in 0..planes.len() {
        for b in a + 1..planes.len() {
            for c in b + 1..planes.len() {
                let Some(point) = Plane::intersect_three(&planes[a], &planes[b], &planes[c])
                else {
                    continue;
                };

                let cut_off = planes.iter().enumerate().any(|(i, plane)| {
                    i != a && i != b && i != c && plane.signed_distance(point) > CUT_EPSILON
                });
                if cut_off {
                    continue;
                }

                let reference = (planes[a].point() + planes[b].point() + planes[c].point()) / 3.0;
                let existing = side_vertices[a]
                    .iter()
                    .chain(&side_vertices[b])
                    .chain(&side_vertices[c])
                    .copied()
                    .find(|&i| tolerance.is_close(vertices[i], point, reference));

                let index = existing.unwrap_or_else(|| {
                    vertices.push(point);
                    vertices.len() - 1
                });

                for side in [a, b, c] {
                    if !side_vertices[side].contains(&index) {
                        side_vertices[side].push(index);
                    }
                }
            }
        }
    }

    SolidVertices {
        vertices,
        side_vertices,
    }
}
