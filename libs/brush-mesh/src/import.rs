//! # Batch Import
//!
//! Builds every solid of a map, then every overlay against the resulting
//! side cache. Entities are built on the rayon pool; each result lands in
//! the slot of its input, so output order never depends on scheduling.
//! With `merge_solids` set, the built solids of each brush entity are also
//! joined into one mesh and the sink receives those instead.
//!
//! A failing entity is recorded and skipped; nothing aborts the batch.
//!
//! ## Example
//!
//! ```rust
//! use brush_ir::{MapRecords, Solid, SolidEntity};
//! use brush_mesh::import::Importer;
//! use brush_mesh::material::MaterialLibrary;
//! use config::constants::ImportConfig;
//! use glam::DVec3;
//!
//! let records = MapRecords {
//!     entities: vec![SolidEntity::new(
//!         "worldspawn",
//!         vec![Solid::block(1, 1, DVec3::ZERO, DVec3::splat(64.0), "brick")],
//!     )],
//!     overlays: Vec::new(),
//! };
//! let library = MaterialLibrary::new();
//! let output = Importer::new(&library, ImportConfig::default()).import(&records);
//! assert_eq!(output.summary.solids.built, 1);
//! ```

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use brush_ir::{MapRecords, SolidEntity};
use config::constants::ImportConfig;
use serde::{Serialize, Serializer};

use crate::brush::{build_solid, BuiltSolid};
use crate::error::BuildError;
use crate::material::{MaterialHandle, MaterialRef, MaterialResolver, TextureDecoder};
use crate::merge::{merge_solids, MergedBrush};
use crate::mesh::PolygonMesh;
use crate::overlay::{build_overlay, BuiltOverlay};
use crate::side_cache::SideArena;

// =============================================================================
// OUTCOMES
// =============================================================================

/// What happened to one entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum BuildOutcome<T> {
    /// Built successfully.
    Built(T),
    /// Not built on purpose (switched off, or a skipped tool brush).
    Skipped,
    /// Not started because the batch was cancelled.
    Cancelled,
    /// Malformed input; the entity was dropped.
    Invalid(#[serde(serialize_with = "serialize_error")] BuildError),
}

fn serialize_error<S: Serializer>(error: &BuildError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

impl<T> BuildOutcome<T> {
    /// The built value, if any.
    pub fn built(&self) -> Option<&T> {
        match self {
            Self::Built(value) => Some(value),
            _ => None,
        }
    }

    /// The failure, if any.
    pub fn error(&self) -> Option<&BuildError> {
        match self {
            Self::Invalid(error) => Some(error),
            _ => None,
        }
    }
}

impl<T> From<Result<Option<T>, BuildError>> for BuildOutcome<T> {
    fn from(result: Result<Option<T>, BuildError>) -> Self {
        match result {
            Ok(Some(value)) => Self::Built(value),
            Ok(None) => Self::Skipped,
            Err(error) => Self::Invalid(error),
        }
    }
}

/// Outcome counts for one kind of entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EntityTally {
    pub built: usize,
    pub skipped: usize,
    pub cancelled: usize,
    pub failed: usize,
}

impl EntityTally {
    /// Tallies a list of outcomes.
    pub fn count<T>(outcomes: &[BuildOutcome<T>]) -> Self {
        let mut tally = Self::default();
        for outcome in outcomes {
            match outcome {
                BuildOutcome::Built(_) => tally.built += 1,
                BuildOutcome::Skipped => tally.skipped += 1,
                BuildOutcome::Cancelled => tally.cancelled += 1,
                BuildOutcome::Invalid(_) => tally.failed += 1,
            }
        }
        tally
    }
}

/// Per-kind tallies for one import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub solids: EntityTally,
    pub overlays: EntityTally,
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Imported {} solids ({} failed), {} overlays ({} failed)",
            self.solids.built, self.solids.failed, self.overlays.built, self.overlays.failed
        )?;
        let skipped = self.solids.skipped + self.overlays.skipped;
        if skipped > 0 {
            write!(f, ", {} skipped", skipped)?;
        }
        let cancelled = self.solids.cancelled + self.overlays.cancelled;
        if cancelled > 0 {
            write!(f, ", {} cancelled", cancelled)?;
        }
        Ok(())
    }
}

// =============================================================================
// SINK
// =============================================================================

/// Flat buffers for one entity, in the layout mesh sinks consume.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SinkMesh {
    pub name: String,
    /// Display as wireframe (tool brushes).
    pub wireframe: bool,
    pub vertices: Vec<f32>,
    pub loop_totals: Vec<u32>,
    pub loop_starts: Vec<u32>,
    pub polygon_vertices: Vec<u32>,
    pub material_indices: Vec<u32>,
    pub loop_uvs: Vec<f32>,
    pub loop_colors: Vec<f32>,
    pub materials: Vec<MaterialRef>,
}

impl SinkMesh {
    /// Flattens a mesh.
    pub fn new(name: &str, mesh: &PolygonMesh, materials: &[MaterialRef], wireframe: bool) -> Self {
        Self {
            name: name.to_string(),
            wireframe,
            vertices: mesh.vertices_f32(),
            loop_totals: mesh.polygon_loop_totals(),
            loop_starts: mesh.polygon_loop_starts(),
            polygon_vertices: mesh.polygon_vertices(),
            material_indices: mesh.polygon_material_indices(),
            loop_uvs: mesh.loop_uvs(),
            loop_colors: mesh.loop_colors(),
            materials: materials.to_vec(),
        }
    }
}

/// Receives finished entities, solids first, in input order.
pub trait MeshSink {
    fn add_mesh(&mut self, mesh: SinkMesh);
}

impl MeshSink for Vec<SinkMesh> {
    fn add_mesh(&mut self, mesh: SinkMesh) {
        self.push(mesh);
    }
}

// =============================================================================
// IMPORT OUTPUT
// =============================================================================

/// Everything one import produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportOutput {
    /// One outcome per solid, in map order.
    pub solids: Vec<BuildOutcome<BuiltSolid>>,
    /// One mesh per brush entity with built solids, in map order. `None`
    /// when solids are emitted separately.
    pub brushes: Option<Vec<MergedBrush>>,
    /// One outcome per overlay, in map order.
    pub overlays: Vec<BuildOutcome<BuiltOverlay>>,
    pub summary: ImportSummary,
}

impl ImportOutput {
    /// Successfully built solids.
    pub fn built_solids(&self) -> impl Iterator<Item = &BuiltSolid> {
        self.solids.iter().filter_map(BuildOutcome::built)
    }

    /// Successfully built overlays.
    pub fn built_overlays(&self) -> impl Iterator<Item = &BuiltOverlay> {
        self.overlays.iter().filter_map(BuildOutcome::built)
    }

    /// Distinct material handles in first-use order, for one decode batch.
    pub fn texture_handles(&self) -> Vec<MaterialHandle> {
        let mut seen = HashSet::new();
        self.built_solids()
            .flat_map(|solid| solid.materials.iter())
            .chain(self.built_overlays().flat_map(|overlay| overlay.materials.iter()))
            .filter_map(|material| material.handle)
            .filter(|handle| seen.insert(*handle))
            .collect()
    }

    /// Decodes every referenced texture in one batch. Returns the number
    /// decoded; failures are logged.
    pub fn decode_textures(&self, decoder: &mut dyn TextureDecoder) -> usize {
        let handles = self.texture_handles();
        if handles.is_empty() {
            return 0;
        }
        tracing::info!("Decoding {} textures", handles.len());
        decoder
            .decode_batch(&handles)
            .into_iter()
            .filter(|result| match result {
                Ok(()) => true,
                Err(error) => {
                    tracing::warn!("{}", error);
                    false
                }
            })
            .count()
    }

    /// Hands every built entity to the sink: merged brushes when present,
    /// otherwise each solid on its own.
    pub fn emit(&self, sink: &mut dyn MeshSink) {
        match &self.brushes {
            Some(brushes) => {
                for brush in brushes {
                    sink.add_mesh(SinkMesh::new(&brush.name, &brush.mesh, &brush.materials, brush.is_tool));
                }
            }
            None => {
                for solid in self.built_solids() {
                    sink.add_mesh(SinkMesh::new(&solid.name, &solid.mesh, &solid.materials, solid.is_tool));
                }
            }
        }
        for overlay in self.built_overlays() {
            sink.add_mesh(SinkMesh::new(&overlay.name, &overlay.mesh, &overlay.materials, false));
        }
    }
}

// =============================================================================
// IMPORTER
// =============================================================================

/// Runs the two-phase import: solids, then overlays.
pub struct Importer<'a> {
    resolver: &'a dyn MaterialResolver,
    config: ImportConfig,
    cancel: Option<Arc<AtomicBool>>,
}

impl<'a> Importer<'a> {
    /// Creates an importer.
    pub fn new(resolver: &'a dyn MaterialResolver, config: ImportConfig) -> Self {
        Self {
            resolver,
            config,
            cancel: None,
        }
    }

    /// Stops starting new entities once `flag` is set.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Imports a map.
    pub fn import(&self, records: &MapRecords) -> ImportOutput {
        use rayon::prelude::*;

        let solids: Vec<(&str, &brush_ir::Solid)> = records.solids().collect();
        tracing::info!(
            "Importing {} solids and {} overlays",
            records.solid_count(),
            records.overlays.len()
        );

        let mut solid_outcomes: Vec<BuildOutcome<BuiltSolid>> = if self.config.import_solids {
            solids
                .par_iter()
                .map(|&(class_name, solid)| {
                    if self.is_cancelled() {
                        return BuildOutcome::Cancelled;
                    }
                    let outcome =
                        BuildOutcome::from(build_solid(solid, class_name, self.resolver, &self.config));
                    if let BuildOutcome::Invalid(error) = &outcome {
                        tracing::warn!("Failed to build {}_{}: {}", class_name, solid.id, error);
                    }
                    outcome
                })
                .collect()
        } else {
            solids.iter().map(|_| BuildOutcome::Skipped).collect()
        };

        let brushes = self
            .config
            .merge_solids
            .then(|| self.merge_entities(&records.entities, &solid_outcomes));

        let arena = SideArena::new(
            solid_outcomes
                .iter_mut()
                .filter_map(|outcome| match outcome {
                    BuildOutcome::Built(solid) => Some(std::mem::take(&mut solid.side_geometry)),
                    _ => None,
                })
                .collect(),
        );

        let overlay_outcomes: Vec<BuildOutcome<BuiltOverlay>> = if self.config.builds_overlays() {
            records
                .overlays
                .par_iter()
                .map(|overlay| {
                    if self.is_cancelled() {
                        return BuildOutcome::Cancelled;
                    }
                    match build_overlay(overlay, &arena, self.resolver, &self.config) {
                        Ok(built) => BuildOutcome::Built(built),
                        Err(error) => {
                            tracing::warn!("Failed to build info_overlay_{}: {}", overlay.id, error);
                            BuildOutcome::Invalid(error)
                        }
                    }
                })
                .collect()
        } else {
            records.overlays.iter().map(|_| BuildOutcome::Skipped).collect()
        };

        let summary = ImportSummary {
            solids: EntityTally::count(&solid_outcomes),
            overlays: EntityTally::count(&overlay_outcomes),
        };
        tracing::info!("{}", summary);

        ImportOutput {
            solids: solid_outcomes,
            brushes,
            overlays: overlay_outcomes,
            summary,
        }
    }
}

impl Importer<'_> {
    /// Joins each entity's built solids. `outcomes` holds one slot per
    /// solid, in entity order.
    fn merge_entities(
        &self,
        entities: &[SolidEntity],
        outcomes: &[BuildOutcome<BuiltSolid>],
    ) -> Vec<MergedBrush> {
        use rayon::prelude::*;

        let mut start = 0;
        let groups: Vec<(&SolidEntity, &[BuildOutcome<BuiltSolid>])> = entities
            .iter()
            .map(|entity| {
                let end = (start + entity.solids.len()).min(outcomes.len());
                let group = &outcomes[start..end];
                start = end;
                (entity, group)
            })
            .collect();

        let brushes: Vec<MergedBrush> = groups
            .par_iter()
            .filter_map(|&(entity, group)| {
                let first = entity.solids.first()?;
                let built: Vec<&BuiltSolid> = group.iter().filter_map(BuildOutcome::built).collect();
                merge_solids(
                    format!("{}_{}", entity.class_name, first.id),
                    &entity.class_name,
                    &built,
                    self.resolver,
                    &self.config,
                )
            })
            .collect();
        tracing::info!("Merged solids into {} brush meshes", brushes.len());
        brushes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_from_result() {
        let built: BuildOutcome<u8> = Ok(Some(3)).into();
        assert_eq!(built.built(), Some(&3));
        let skipped: BuildOutcome<u8> = Ok(None).into();
        assert_eq!(skipped, BuildOutcome::Skipped);
        let failed: BuildOutcome<u8> =
            Err(BuildError::EmptyOverlay { overlay_id: 1 }).into();
        assert!(failed.error().is_some());
    }

    #[test]
    fn test_tally_and_summary() {
        let outcomes: Vec<BuildOutcome<u8>> = vec![
            BuildOutcome::Built(1),
            BuildOutcome::Built(2),
            BuildOutcome::Invalid(BuildError::EmptyOverlay { overlay_id: 1 }),
            BuildOutcome::Skipped,
        ];
        let summary = ImportSummary {
            solids: EntityTally::count(&outcomes),
            overlays: EntityTally::default(),
        };
        assert_eq!(summary.solids.built, 2);
        assert_eq!(summary.solids.failed, 1);
        assert_eq!(
            summary.to_string(),
            "Imported 2 solids (1 failed), 0 overlays (0 failed), 1 skipped"
        );
    }
}
