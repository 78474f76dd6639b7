//! Face vertex ordering.

use glam::{DVec2, DVec3};

use crate::geometry::{signed_angle_cw, Plane};

/// Orders a face's vertex indices by angle around the face centroid.
///
/// Vertices are rotated into the plane's frame (normal onto +Z). Starting
/// from the first vertex, each step picks the remaining vertex with the
/// smallest clockwise angle from the previous one; counter-clockwise angles
/// never win. Ties keep the earliest candidate.
pub fn sort_face_vertices(indices: &mut [usize], vertices: &[DVec3], plane: &Plane) {
    if indices.len() < 3 {
        return;
    }

    let rotation = plane.rotation_to_z();
    let mut points: Vec<DVec2> = indices
        .iter()
        .map(|&i| (rotation * vertices[i]).truncate())
        .collect();
    let center = points.iter().copied().sum::<DVec2>() / points.len() as f64;

    let mut last = points[0] - center;
    for slot in 1..indices.len() {
        let mut best = slot;
        let mut best_angle = f64::INFINITY;
        for (candidate, point) in points.iter().enumerate().skip(slot) {
            let angle = signed_angle_cw(last, *point - center);
            let angle = if angle < 0.0 { f64::INFINITY } else { angle };
            if angle < best_angle {
                best = candidate;
                best_angle = angle;
            }
        }

        indices.swap(slot, best);
        points.swap(slot, best);
        last = points[slot] - center;
    }
}
