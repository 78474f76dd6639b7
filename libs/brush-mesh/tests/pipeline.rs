use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use brush_ir::{DispInfo, MapRecords, Overlay, Solid, SolidEntity};
use brush_mesh::import::{BuildOutcome, Importer, SinkMesh};
use brush_mesh::material::{MaterialHandle, MaterialInfo, MaterialLibrary, TextureDecoder};
use brush_mesh::{BuildError, MaterialError};
use config::constants::ImportConfig;
use glam::DVec3;

fn library() -> MaterialLibrary {
    MaterialLibrary::new()
        .with("brick", MaterialInfo::new(64, 64, MaterialHandle(1)))
        .with("grass", MaterialInfo::new(256, 256, MaterialHandle(2)))
        .with("tools/toolsnodraw", MaterialInfo::new(64, 64, MaterialHandle(3)).with_nodraw(true))
        .with("decals/stain", MaterialInfo::new(128, 128, MaterialHandle(4)))
}

/// A block with a redundant plane floating above it; that side never gets
/// any corners.
fn malformed_block() -> Solid {
    let mut block = Solid::block(3, 13, DVec3::new(0.0, 128.0, 0.0), DVec3::new(64.0, 192.0, 16.0), "brick");
    let mut floating = block.sides[0].clone();
    floating.id = 19;
    for point in &mut floating.plane {
        point.z = 100.0;
    }
    block.sides.push(floating);
    block
}

fn displaced_block() -> Solid {
    let mut block = Solid::block(5, 30, DVec3::new(128.0, 0.0, 0.0), DVec3::new(192.0, 64.0, 16.0), "grass");
    let mut disp = DispInfo::flat(2, DVec3::new(128.0, 0.0, 16.0));
    disp.normals = vec![DVec3::Z; 25];
    disp.distances = (0..25).map(|i| f64::from(i % 5)).collect();
    disp.alphas = (0..25).map(|i| f64::from(i * 10)).collect();
    block.sides[0].disp_info = Some(disp);
    block
}

fn stain(id: i32, sides: Vec<i32>, origin: DVec3, half: f64) -> Overlay {
    Overlay::new(id, "decals/stain", sides)
        .with_basis(origin, DVec3::X, DVec3::Y, DVec3::Z)
        .with_uv_points([
            DVec3::new(-half, -half, 0.0),
            DVec3::new(-half, half, 0.0),
            DVec3::new(half, half, 0.0),
            DVec3::new(half, -half, 0.0),
        ])
}

fn map() -> MapRecords {
    MapRecords {
        entities: vec![
            SolidEntity::new(
                "worldspawn",
                vec![
                    Solid::block(1, 1, DVec3::ZERO, DVec3::new(64.0, 64.0, 16.0), "brick"),
                    malformed_block(),
                    displaced_block(),
                ],
            ),
            SolidEntity::new(
                "func_detail",
                vec![
                    Solid::block(2, 7, DVec3::new(64.0, 0.0, 0.0), DVec3::new(128.0, 64.0, 16.0), "brick"),
                    Solid::block(4, 40, DVec3::new(0.0, 0.0, 64.0), DVec3::splat(96.0), "tools/toolsnodraw"),
                ],
            ),
        ],
        overlays: vec![
            stain(100, vec![1, 7], DVec3::new(64.0, 32.0, 16.0), 32.0),
            stain(101, vec![1, 99], DVec3::new(32.0, 32.0, 16.0), 8.0),
            stain(102, vec![7], DVec3::new(500.0, 500.0, 16.0), 8.0),
        ],
    }
}

#[test]
fn imports_a_mixed_map() {
    let library = library();
    let output = Importer::new(&library, ImportConfig::default()).import(&map());

    assert_eq!(output.summary.solids.built, 4);
    assert_eq!(output.summary.solids.failed, 1);
    assert_eq!(output.summary.overlays.built, 1);
    assert_eq!(output.summary.overlays.failed, 2);
    assert_eq!(
        output.summary.to_string(),
        "Imported 4 solids (1 failed), 1 overlays (2 failed)"
    );

    let names: Vec<&str> = output.built_solids().map(|s| s.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["worldspawn_1", "worldspawn_5", "func_detail_2", "func_detail_4"]
    );
    assert_eq!(
        output.solids[1],
        BuildOutcome::Invalid(BuildError::NotEnoughVertices {
            side_id: 19,
            count: 0
        })
    );
}

#[test]
fn overlay_failures_are_reported_per_overlay() {
    let library = library();
    let output = Importer::new(&library, ImportConfig::default()).import(&map());

    let overlay = output.overlays[0].built().unwrap();
    assert_eq!(overlay.name, "info_overlay_100");
    assert_eq!(overlay.mesh.face_count(), 2);
    assert_eq!(
        output.overlays[1].error(),
        Some(&BuildError::MissingSide {
            overlay_id: 101,
            side_id: 99
        })
    );
    assert_eq!(
        output.overlays[2].error(),
        Some(&BuildError::EmptyOverlay { overlay_id: 102 })
    );
}

#[test]
fn displacement_solid_emits_only_its_grid() {
    let library = library();
    let output = Importer::new(&library, ImportConfig::default()).import(&map());

    let displaced = output
        .built_solids()
        .find(|s| s.id == 5)
        .unwrap();
    assert!(displaced.is_displacement);
    assert_eq!(displaced.mesh.vertex_count(), 25);
    assert_eq!(displaced.mesh.face_count(), 32);
    let (_, max) = displaced.mesh.bounding_box();
    assert!((max.z - 20.0).abs() < 1e-9);
}

#[test]
fn repeated_imports_are_byte_identical() {
    let library = library();
    let records = map();
    let importer = Importer::new(&library, ImportConfig::default());

    let first = serde_json::to_string(&importer.import(&records)).unwrap();
    let second = serde_json::to_string(&importer.import(&records)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn sink_receives_flat_buffers_in_order() {
    let library = library();
    let config = ImportConfig::default().with_merge_solids(false);
    let output = Importer::new(&library, config).import(&map());
    assert!(output.brushes.is_none());

    let mut sink: Vec<SinkMesh> = Vec::new();
    output.emit(&mut sink);
    let names: Vec<&str> = sink.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "worldspawn_1",
            "worldspawn_5",
            "func_detail_2",
            "func_detail_4",
            "info_overlay_100"
        ]
    );

    for mesh in &sink {
        let loops: u32 = mesh.loop_totals.iter().sum();
        assert_eq!(mesh.polygon_vertices.len(), loops as usize);
        assert_eq!(mesh.loop_uvs.len(), loops as usize * 2);
        assert_eq!(mesh.loop_colors.len(), loops as usize * 4);
        assert_eq!(mesh.material_indices.len(), mesh.loop_totals.len());
    }
    assert!(sink[3].wireframe);
    assert!(!sink[0].wireframe);
    // Plain solids export opaque white loops.
    assert!(sink[0].loop_colors.iter().all(|&c| c == 1.0));
}

#[test]
fn solids_merge_into_one_mesh_per_entity() {
    let library = library();
    let merged = Importer::new(&library, ImportConfig::default()).import(&map());
    let separate =
        Importer::new(&library, ImportConfig::default().with_merge_solids(false)).import(&map());

    // Merging changes what the sink receives, not the per-solid tally.
    assert_eq!(merged.summary, separate.summary);
    assert_eq!(merged.summary.solids.failed, 1);

    let brushes = merged.brushes.as_ref().unwrap();
    assert_eq!(brushes.len(), 2);

    let world = &brushes[0];
    assert_eq!(world.name, "worldspawn_1");
    assert_eq!(world.solid_ids, vec![1, 5]);
    assert_eq!(world.mesh.vertex_count(), 8 + 25);
    assert_eq!(world.mesh.face_count(), 6 + 32);
    assert_eq!(world.materials.len(), 2);
    assert!(world.mesh.validate());

    let detail = &brushes[1];
    assert_eq!(detail.name, "func_detail_2");
    assert_eq!(detail.solid_ids, vec![2, 4]);
    assert!(!detail.is_tool);
    assert_eq!(detail.materials.len(), 2);

    let merged_faces: usize = brushes.iter().map(|b| b.mesh.face_count()).sum();
    let separate_faces: usize = separate.built_solids().map(|s| s.mesh.face_count()).sum();
    assert_eq!(merged_faces, separate_faces);

    let mut sink: Vec<SinkMesh> = Vec::new();
    merged.emit(&mut sink);
    let names: Vec<&str> = sink.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["worldspawn_1", "func_detail_2", "info_overlay_100"]);
    assert!(!sink[1].wireframe);
}

#[test]
fn touching_solids_weld_when_merged() {
    let records = MapRecords {
        entities: vec![SolidEntity::new(
            "func_detail",
            vec![
                Solid::block(1, 1, DVec3::ZERO, DVec3::new(64.0, 64.0, 16.0), "brick"),
                Solid::block(2, 7, DVec3::new(64.0, 0.0, 0.0), DVec3::new(128.0, 64.0, 16.0), "brick"),
            ],
        )],
        overlays: Vec::new(),
    };
    let library = library();
    let output = Importer::new(&library, ImportConfig::default()).import(&records);

    let brushes = output.brushes.unwrap();
    assert_eq!(brushes.len(), 1);
    assert_eq!(brushes[0].mesh.vertex_count(), 12);
    assert_eq!(brushes[0].materials.len(), 1);
}

#[test]
fn tool_brushes_can_be_skipped() {
    let library = library();
    let config = ImportConfig::default().with_skip_tools(true);
    let output = Importer::new(&library, config).import(&map());

    assert_eq!(output.summary.solids.built, 3);
    assert_eq!(output.summary.solids.skipped, 1);
    assert_eq!(output.solids[4], BuildOutcome::Skipped);
}

#[test]
fn switches_disable_stages() {
    let library = library();

    let no_overlays = ImportConfig::default().with_overlays(false);
    let output = Importer::new(&library, no_overlays).import(&map());
    assert_eq!(output.summary.solids.built, 4);
    assert_eq!(output.summary.overlays.skipped, 3);

    let no_solids = ImportConfig::default().with_solids(false);
    let output = Importer::new(&library, no_solids).import(&map());
    assert_eq!(output.summary.solids.skipped, 5);
    // Overlays need the side cache.
    assert_eq!(output.summary.overlays.skipped, 3);
}

#[test]
fn cancelled_batch_starts_nothing() {
    let library = library();
    let flag = Arc::new(AtomicBool::new(true));
    let output = Importer::new(&library, ImportConfig::default())
        .with_cancel_flag(flag)
        .import(&map());

    assert_eq!(output.summary.solids.cancelled, 5);
    assert_eq!(output.summary.overlays.cancelled, 3);
    assert_eq!(output.built_solids().count(), 0);
}

struct RecordingDecoder {
    batches: Vec<Vec<MaterialHandle>>,
}

impl TextureDecoder for RecordingDecoder {
    fn decode_batch(&mut self, handles: &[MaterialHandle]) -> Vec<Result<(), MaterialError>> {
        self.batches.push(handles.to_vec());
        handles
            .iter()
            .map(|handle| {
                if *handle == MaterialHandle(3) {
                    Err(MaterialError::decode_failed("tools/toolsnodraw", "unsupported format"))
                } else {
                    Ok(())
                }
            })
            .collect()
    }
}

#[test]
fn textures_are_decoded_in_one_batch() {
    let library = library();
    let output = Importer::new(&library, ImportConfig::default()).import(&map());

    assert_eq!(
        output.texture_handles(),
        vec![
            MaterialHandle(1),
            MaterialHandle(2),
            MaterialHandle(3),
            MaterialHandle(4)
        ]
    );

    let mut decoder = RecordingDecoder { batches: Vec::new() };
    assert_eq!(output.decode_textures(&mut decoder), 3);
    assert_eq!(decoder.batches.len(), 1);
}
