//! Tests for overlay construction.

use super::*;
use crate::brush::build_solid;
use crate::material::{MaterialHandle, MaterialInfo, MaterialLibrary};
use approx::assert_relative_eq;
use brush_ir::{DispInfo, Solid};

fn library() -> MaterialLibrary {
    MaterialLibrary::new()
        .with("brick", MaterialInfo::new(64, 64, MaterialHandle(1)))
        .with("decals/stain", MaterialInfo::new(128, 128, MaterialHandle(9)))
}

fn arena(solids: &[Solid]) -> SideArena {
    let config = ImportConfig::default();
    let sides = solids
        .iter()
        .map(|solid| {
            build_solid(solid, "worldspawn", &library(), &config)
                .unwrap()
                .unwrap()
                .side_geometry
        })
        .collect();
    SideArena::new(sides)
}

fn slab() -> Solid {
    Solid::block(1, 1, DVec3::ZERO, DVec3::new(64.0, 64.0, 16.0), "brick")
}

/// Overlay centered on `origin` in a world-aligned frame, `half` units
/// to each side.
fn decal(sides: Vec<i32>, origin: DVec3, half: f64) -> Overlay {
    Overlay::new(3, "decals/stain", sides)
        .with_basis(origin, DVec3::X, DVec3::Y, DVec3::Z)
        .with_uv_points([
            DVec3::new(-half, -half, 0.0),
            DVec3::new(-half, half, 0.0),
            DVec3::new(half, half, 0.0),
            DVec3::new(half, -half, 0.0),
        ])
}

fn build(overlay: &Overlay, arena: &SideArena) -> Result<BuiltOverlay, BuildError> {
    build_overlay(overlay, arena, &library(), &ImportConfig::default())
}

/// UV of the loop whose vertex sits at `xy`.
fn uv_at(mesh: &PolygonMesh, xy: DVec2) -> DVec2 {
    mesh.faces()
        .iter()
        .flat_map(|face| face.indices.iter().zip(&face.uvs))
        .find(|&(&v, _)| (mesh.vertex(v).truncate() - xy).length() < 1e-6)
        .map(|(_, uv)| *uv)
        .unwrap()
}

#[test]
fn matching_corners_reproduce_the_side() {
    let arena = arena(&[slab()]);
    let overlay = decal(vec![1], DVec3::new(32.0, 32.0, 16.0), 32.0)
        .with_uv_range(0.25, 0.75, 0.1, 0.9);
    let built = build(&overlay, &arena).unwrap();

    assert_eq!(built.name, "info_overlay_3");
    assert_eq!(built.mesh.vertex_count(), 4);
    assert_eq!(built.mesh.face_count(), 1);
    assert_eq!(built.materials[0].handle, Some(MaterialHandle(9)));

    let mesh = &built.mesh;
    assert_relative_eq!(uv_at(mesh, DVec2::new(0.0, 0.0)), DVec2::new(0.25, 0.9), epsilon = 1e-9);
    assert_relative_eq!(uv_at(mesh, DVec2::new(0.0, 64.0)), DVec2::new(0.25, 0.1), epsilon = 1e-9);
    assert_relative_eq!(uv_at(mesh, DVec2::new(64.0, 64.0)), DVec2::new(0.75, 0.1), epsilon = 1e-9);
    assert_relative_eq!(uv_at(mesh, DVec2::new(64.0, 0.0)), DVec2::new(0.75, 0.9), epsilon = 1e-9);
}

#[test]
fn overlay_is_lifted_and_faces_the_side() {
    let arena = arena(&[slab()]);
    let built = build(&decal(vec![1], DVec3::new(32.0, 32.0, 16.0), 32.0), &arena).unwrap();
    assert!(built
        .mesh
        .vertices()
        .iter()
        .all(|v| (v.z - 16.1).abs() < 1e-9));
    assert_relative_eq!(built.mesh.face_normal(0), DVec3::Z, epsilon = 1e-9);
}

#[test]
fn render_order_raises_the_offset() {
    assert_relative_eq!(surface_offset(None), 0.1);
    assert_relative_eq!(surface_offset(Some(2)), 0.3);

    let arena = arena(&[slab()]);
    let overlay = decal(vec![1], DVec3::new(32.0, 32.0, 16.0), 32.0).with_render_order(2);
    let built = build(&overlay, &arena).unwrap();
    assert!(built
        .mesh
        .vertices()
        .iter()
        .all(|v| (v.z - 16.3).abs() < 1e-9));
}

#[test]
fn smaller_decal_is_clipped_to_its_quad() {
    let arena = arena(&[slab()]);
    let built = build(&decal(vec![1], DVec3::new(32.0, 32.0, 16.0), 16.0), &arena).unwrap();

    assert_eq!(built.mesh.vertex_count(), 4);
    assert_eq!(built.mesh.face_count(), 1);
    let (min, max) = built.mesh.bounding_box();
    assert_relative_eq!(min, DVec3::new(16.0, 16.0, 16.1), epsilon = 1e-9);
    assert_relative_eq!(max, DVec3::new(48.0, 48.0, 16.1), epsilon = 1e-9);

    let mesh = &built.mesh;
    assert_relative_eq!(uv_at(mesh, DVec2::new(16.0, 16.0)), DVec2::new(0.0, 1.0), epsilon = 1e-9);
    assert_relative_eq!(uv_at(mesh, DVec2::new(48.0, 48.0)), DVec2::new(1.0, 0.0), epsilon = 1e-9);
}

#[test]
fn decal_across_two_sides_shares_the_seam() {
    let left = slab();
    let right = Solid::block(2, 7, DVec3::new(64.0, 0.0, 0.0), DVec3::new(128.0, 64.0, 16.0), "brick");
    let arena = arena(&[left, right]);
    let built = build(&decal(vec![1, 7], DVec3::new(64.0, 32.0, 16.0), 32.0), &arena).unwrap();

    assert_eq!(built.mesh.face_count(), 2);
    assert_eq!(built.mesh.vertex_count(), 6);
    assert!(built.mesh.validate());
    let (min, max) = built.mesh.bounding_box();
    assert_relative_eq!(min.x, 32.0, epsilon = 1e-9);
    assert_relative_eq!(max.x, 96.0, epsilon = 1e-9);
}

#[test]
fn mirrored_frame_still_faces_the_side() {
    let arena = arena(&[slab()]);
    let overlay = decal(vec![1], DVec3::new(32.0, 32.0, 16.0), 32.0).with_basis(
        DVec3::new(32.0, 32.0, 16.0),
        DVec3::X,
        DVec3::NEG_Y,
        DVec3::NEG_Z,
    );
    let built = build(&overlay, &arena).unwrap();
    assert_eq!(built.mesh.face_count(), 1);
    assert_relative_eq!(built.mesh.face_normal(0), DVec3::Z, epsilon = 1e-9);
}

#[test]
fn overlay_on_displacement_uses_the_grid() {
    let mut solid = slab();
    solid.sides[0].disp_info = Some(DispInfo::flat(1, DVec3::ZERO));
    let arena = arena(&[solid]);
    let built = build(&decal(vec![1], DVec3::new(32.0, 32.0, 16.0), 32.0), &arena).unwrap();

    assert_eq!(built.mesh.vertex_count(), 9);
    assert_eq!(built.mesh.face_count(), 8);
    for index in 0..built.mesh.face_count() {
        assert_relative_eq!(built.mesh.face_normal(index), DVec3::Z, epsilon = 1e-9);
    }
}

#[test]
fn missing_side_fails() {
    let arena = arena(&[slab()]);
    let result = build(&decal(vec![1, 40], DVec3::ZERO, 32.0), &arena);
    assert_eq!(
        result,
        Err(BuildError::MissingSide {
            overlay_id: 3,
            side_id: 40
        })
    );
}

#[test]
fn decal_off_the_side_is_empty() {
    let arena = arena(&[slab()]);
    let result = build(&decal(vec![1], DVec3::new(500.0, 500.0, 16.0), 16.0), &arena);
    assert_eq!(result, Err(BuildError::EmptyOverlay { overlay_id: 3 }));
}

#[test]
fn degenerate_basis_fails() {
    let arena = arena(&[slab()]);
    let overlay = decal(vec![1], DVec3::ZERO, 32.0).with_basis(DVec3::ZERO, DVec3::X, DVec3::X, DVec3::Z);
    assert_eq!(
        build(&overlay, &arena),
        Err(BuildError::DegenerateBasis { overlay_id: 3 })
    );
}

#[test]
fn collapsed_uv_quad_fails() {
    let arena = arena(&[slab()]);
    let overlay = decal(vec![1], DVec3::ZERO, 32.0).with_uv_points([DVec3::ZERO; 4]);
    assert_eq!(
        build(&overlay, &arena),
        Err(BuildError::DegenerateUvQuad { overlay_id: 3 })
    );
}

#[test]
fn border_normals_point_out_of_clockwise_quads() {
    let corners = [
        DVec3::new(-1.0, -1.0, 0.0),
        DVec3::new(-1.0, 1.0, 0.0),
        DVec3::new(1.0, 1.0, 0.0),
        DVec3::new(1.0, -1.0, 0.0),
    ];
    let borders = Border::quad(&corners).unwrap();
    for border in &borders {
        assert!(border.distance(DVec3::ZERO) < 0.0);
        assert!(border.distance(DVec3::new(0.0, 0.0, 5.0)) < 0.0);
    }
    assert_relative_eq!(borders[0].distance(DVec3::new(-3.0, 0.0, 0.0)), 2.0);
}
