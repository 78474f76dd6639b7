//! # Side Geometry Cache
//!
//! Built geometry of every side, kept after solids are finished so
//! overlays can be clipped against the sides they reference.

use brush_ir::SideId;
use glam::DVec3;

/// Geometry of one built side.
///
/// Plain sides hold their face polygon; displacement sides hold the
/// displaced grid nodes and their triangles.
#[derive(Debug, Clone, PartialEq)]
pub struct SideGeometry {
    /// Side id from the map.
    pub side_id: SideId,
    /// Vertex positions, local to this side.
    pub positions: Vec<DVec3>,
    /// Polygons as indices into `positions`.
    pub faces: Vec<Vec<usize>>,
    /// Plane normal of the side.
    pub normal: DVec3,
}

impl SideGeometry {
    /// Geometry for a plain polygonal side.
    pub fn polygon(side_id: SideId, positions: Vec<DVec3>, normal: DVec3) -> Self {
        let face = (0..positions.len()).collect();
        Self {
            side_id,
            positions,
            faces: vec![face],
            normal,
        }
    }
}

/// Slot of a side in the arena: solid index, then side index within it.
type Slot = (u32, u32);

/// Arena of side geometry grouped by solid, with a sorted side-id lookup.
///
/// When two sides share an id the one added later wins.
#[derive(Debug, Default)]
pub struct SideArena {
    solids: Vec<Vec<SideGeometry>>,
    lookup: Vec<(SideId, Slot)>,
}

impl SideArena {
    /// Builds the arena from per-solid side records, in solid order.
    pub fn new(solids: Vec<Vec<SideGeometry>>) -> Self {
        let mut lookup: Vec<(SideId, Slot)> = solids
            .iter()
            .enumerate()
            .flat_map(|(solid, sides)| {
                sides
                    .iter()
                    .enumerate()
                    .map(move |(local, side)| (side.side_id, (solid as u32, local as u32)))
            })
            .collect();

        // Latest slot first within each id, so dedup keeps it.
        lookup.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));
        lookup.dedup_by_key(|entry| entry.0);

        Self { solids, lookup }
    }

    /// Number of distinct side ids.
    #[inline]
    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    /// Returns true if no side is cached.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }

    /// Geometry of the side with the given id.
    pub fn get(&self, side_id: SideId) -> Option<&SideGeometry> {
        let position = self
            .lookup
            .binary_search_by_key(&side_id, |entry| entry.0)
            .ok()?;
        let (solid, local) = self.lookup[position].1;
        self.solids
            .get(solid as usize)
            .and_then(|sides| sides.get(local as usize))
    }
}
