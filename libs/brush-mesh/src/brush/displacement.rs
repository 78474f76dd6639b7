//! Displacement grid expansion.

use brush_ir::DispInfo;
use glam::{DVec2, DVec3};

/// A displaced side: grid nodes in row-major order and their triangles.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplacementGrid {
    /// Grid dimension (nodes per edge).
    pub dimension: usize,
    /// Displaced node positions.
    pub positions: Vec<DVec3>,
    /// Interpolated node UVs.
    pub uvs: Vec<DVec2>,
    /// Node colors, alpha carrying the blend weight.
    pub colors: Vec<[f32; 4]>,
    /// Triangles as grid node indices.
    pub triangles: Vec<[usize; 3]>,
}

/// Index of the corner nearest to `start`; the first wins a tie.
pub fn start_corner(corners: &[DVec3; 4], start: DVec3) -> usize {
    (0..4)
        .min_by(|&a, &b| {
            corners[a]
                .distance_squared(start)
                .total_cmp(&corners[b].distance_squared(start))
        })
        .unwrap_or(0)
}

/// Expands a quad side into its displacement grid.
///
/// The corner nearest `start_position` becomes node (0, 0). Going around
/// the sorted quad from there, corner `s+1` is the last row's first node,
/// `s+2` the last node and `s+3` the end of the first row. Rows are
/// interpolated between the left and right edges, then each node moves by
/// its offset, normal × distance and the side-wide elevation.
pub fn expand(
    corners: &[DVec3; 4],
    corner_uvs: &[DVec2; 4],
    disp: &DispInfo,
    plane_normal: DVec3,
) -> DisplacementGrid {
    let dimension = disp.dimension();
    let last = dimension - 1;

    let start = start_corner(corners, disp.start_position);
    let top_left = start;
    let top_right = (start + 3) % 4;
    let bottom_right = (start + 2) % 4;
    let bottom_left = (start + 1) % 4;

    let mut positions = Vec::with_capacity(dimension * dimension);
    let mut uvs = Vec::with_capacity(dimension * dimension);
    let mut colors = Vec::with_capacity(dimension * dimension);

    for row in 0..dimension {
        let left = along(corners[top_left], corners[bottom_left], row, last);
        let right = along(corners[top_right], corners[bottom_right], row, last);
        let left_uv = along_uv(corner_uvs[top_left], corner_uvs[bottom_left], row, last);
        let right_uv = along_uv(corner_uvs[top_right], corner_uvs[bottom_right], row, last);

        for col in 0..dimension {
            let base = along(left, right, col, last);
            positions.push(base + disp.node_displacement(row, col, plane_normal));
            uvs.push(along_uv(left_uv, right_uv, col, last));
            colors.push([0.0, 0.0, 0.0, disp.node_alpha(row, col)]);
        }
    }

    DisplacementGrid {
        dimension,
        positions,
        uvs,
        colors,
        triangles: triangulate(dimension),
    }
}

/// Point `step / last` of the way from `a` to `b`; both ends are exact
/// copies so grid borders weld onto neighbouring geometry.
fn along(a: DVec3, b: DVec3, step: usize, last: usize) -> DVec3 {
    if step == last {
        b
    } else {
        a.lerp(b, step as f64 / last as f64)
    }
}

fn along_uv(a: DVec2, b: DVec2, step: usize, last: usize) -> DVec2 {
    if step == last {
        b
    } else {
        a.lerp(b, step as f64 / last as f64)
    }
}

/// Two triangles per grid cell with the diagonal alternating in a
/// checkerboard.
pub fn triangulate(dimension: usize) -> Vec<[usize; 3]> {
    let node = |row: usize, col: usize| row * dimension + col;
    let cells = dimension.saturating_sub(1);
    let mut triangles = Vec::with_capacity(cells * cells * 2);

    for row in 0..cells {
        for col in 0..cells {
            if row % 2 == col % 2 {
                triangles.push([node(row + 1, col), node(row, col), node(row + 1, col + 1)]);
                triangles.push([node(row, col), node(row, col + 1), node(row + 1, col + 1)]);
            } else {
                triangles.push([node(row + 1, col), node(row, col), node(row, col + 1)]);
                triangles.push([node(row + 1, col), node(row, col + 1), node(row + 1, col + 1)]);
            }
        }
    }

    triangles
}
