//! Planar texture projection.

use brush_ir::Side;
use glam::{DVec2, DVec3};

/// Projects a world position onto a side's texture axes.
///
/// `u = p·u_axis / (w·u_scale) + u_trans / w`, and v likewise with the
/// result negated to match the editor's downward v.
pub fn project_uv(position: DVec3, side: &Side, width: u32, height: u32) -> DVec2 {
    let width = f64::from(width);
    let height = f64::from(height);
    let u = position.dot(side.u_axis.axis) / (width * side.u_axis.scale)
        + side.u_axis.translation / width;
    let v = position.dot(side.v_axis.axis) / (height * side.v_axis.scale)
        + side.v_axis.translation / height;
    DVec2::new(u, -v)
}

/// Whole-tile shift for one UV coordinate of a face.
///
/// Among the values with magnitude above 1, the one closest to zero is
/// rounded toward zero. Returns 0 when no value exceeds 1.
pub fn normalization_offset(values: impl IntoIterator<Item = f64>) -> f64 {
    let nearest = values
        .into_iter()
        .filter(|value| value.abs() > 1.0)
        .min_by(|a, b| a.abs().total_cmp(&b.abs()));
    match nearest {
        Some(value) if value > 0.0 => value.floor(),
        Some(value) => value.ceil(),
        None => 0.0,
    }
}

/// Shifts a face's UVs by whole tiles toward the origin, per axis.
pub fn normalize_uvs(uvs: &mut [DVec2]) {
    let offset = DVec2::new(
        normalization_offset(uvs.iter().map(|uv| uv.x)),
        normalization_offset(uvs.iter().map(|uv| uv.y)),
    );
    for uv in uvs {
        *uv -= offset;
    }
}
