//! # Materials
//!
//! Material access in two phases: a cheap synchronous [`MaterialResolver`]
//! that reports texture dimensions and an opaque handle, and a
//! [`TextureDecoder`] that decodes the collected handles in one batch after
//! geometry is built.

use std::collections::HashMap;

use config::constants::PLACEHOLDER_TEXTURE_SIZE;
use serde::{Deserialize, Serialize};

use crate::error::MaterialError;

// =============================================================================
// RESOLVER
// =============================================================================

/// Opaque handle a resolver hands out for later decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaterialHandle(pub u64);

/// What the geometry engine needs to know about a material.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialInfo {
    /// Texture width in pixels.
    pub width: u32,
    /// Texture height in pixels.
    pub height: u32,
    /// Handle for deferred decoding; `None` for placeholders.
    pub handle: Option<MaterialHandle>,
    /// Invisible tool texture (nodraw, clip, trigger, ...).
    pub nodraw: bool,
}

impl MaterialInfo {
    /// Creates a visible material.
    pub fn new(width: u32, height: u32, handle: MaterialHandle) -> Self {
        Self {
            width,
            height,
            handle: Some(handle),
            nodraw: false,
        }
    }

    /// 1×1 stand-in used when a material cannot be resolved.
    pub fn placeholder() -> Self {
        Self {
            width: PLACEHOLDER_TEXTURE_SIZE,
            height: PLACEHOLDER_TEXTURE_SIZE,
            handle: None,
            nodraw: false,
        }
    }

    /// Marks the material as an invisible tool texture.
    pub fn with_nodraw(mut self, nodraw: bool) -> Self {
        self.nodraw = nodraw;
        self
    }
}

/// Synchronous material lookup, shared across worker threads.
pub trait MaterialResolver: Sync {
    /// Resolves a material reference to its dimensions and handle.
    fn resolve(&self, name: &str) -> Result<MaterialInfo, MaterialError>;
}

/// Decodes textures for a batch of handles, after all geometry is built.
pub trait TextureDecoder {
    /// Decodes every handle. Failures are reported per handle.
    fn decode_batch(&mut self, handles: &[MaterialHandle]) -> Vec<Result<(), MaterialError>>;
}

/// Invisible tool textures recognized by name when the resolver cannot say.
///
/// Everything under `tools/` is invisible except the few that render.
pub fn is_invisible_tool(name: &str) -> bool {
    const VISIBLE_TOOLS: [&str; 3] = ["tools/toolsblack", "tools/toolsblack_noportal", "tools/toolswhite"];
    let name = name.to_ascii_lowercase();
    name.starts_with("tools/") && !VISIBLE_TOOLS.contains(&name.as_str())
}

/// Resolves `name`, falling back to the placeholder on failure.
pub fn resolve_or_placeholder(resolver: &dyn MaterialResolver, name: &str) -> MaterialInfo {
    match resolver.resolve(name) {
        Ok(info) if info.width > 0 && info.height > 0 => info,
        Ok(info) => {
            let error = MaterialError::invalid(
                name,
                format!("zero texture size {}x{}", info.width, info.height),
            );
            tracing::warn!("{}, using placeholder", error);
            MaterialInfo::placeholder().with_nodraw(info.nodraw)
        }
        Err(error) => {
            tracing::warn!("{}, using placeholder", error);
            MaterialInfo::placeholder().with_nodraw(is_invisible_tool(name))
        }
    }
}

// =============================================================================
// IN-MEMORY LIBRARY
// =============================================================================

/// A resolver backed by a map of known materials, keyed case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct MaterialLibrary {
    materials: HashMap<String, MaterialInfo>,
}

impl MaterialLibrary {
    /// Creates an empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a material.
    pub fn insert(&mut self, name: &str, info: MaterialInfo) {
        self.materials.insert(name.to_ascii_lowercase(), info);
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, name: &str, info: MaterialInfo) -> Self {
        self.insert(name, info);
        self
    }
}

impl MaterialResolver for MaterialLibrary {
    fn resolve(&self, name: &str) -> Result<MaterialInfo, MaterialError> {
        self.materials
            .get(&name.to_ascii_lowercase())
            .copied()
            .ok_or_else(|| MaterialError::not_found(name))
    }
}

// =============================================================================
// PER-ENTITY TABLE
// =============================================================================

/// One slot of an entity's material table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialRef {
    /// Material name as first referenced.
    pub name: String,
    /// Resolved handle, if any.
    pub handle: Option<MaterialHandle>,
}

/// Material slots of one entity, in first-use order.
///
/// Names are compared case-insensitively; each distinct material is
/// resolved once.
#[derive(Debug, Default)]
pub struct MaterialTable {
    refs: Vec<MaterialRef>,
    infos: Vec<MaterialInfo>,
    slots: HashMap<String, u32>,
}

impl MaterialTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot index and metadata for `name`, resolving it on first use.
    pub fn slot(&mut self, name: &str, resolver: &dyn MaterialResolver) -> (u32, MaterialInfo) {
        let key = name.to_ascii_lowercase();
        if let Some(&slot) = self.slots.get(&key) {
            return (slot, self.infos[slot as usize]);
        }
        let info = resolve_or_placeholder(resolver, name);
        let slot = self.refs.len() as u32;
        self.refs.push(MaterialRef {
            name: name.to_string(),
            handle: info.handle,
        });
        self.infos.push(info);
        self.slots.insert(key, slot);
        (slot, info)
    }

    /// Returns true if every slot is an invisible tool texture.
    pub fn all_nodraw(&self) -> bool {
        !self.infos.is_empty() && self.infos.iter().all(|info| info.nodraw)
    }

    /// Consumes the table, returning the slots.
    pub fn into_refs(self) -> Vec<MaterialRef> {
        self.refs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library() -> MaterialLibrary {
        MaterialLibrary::new()
            .with("Brick/Brick01", MaterialInfo::new(512, 256, MaterialHandle(1)))
            .with("tools/toolsnodraw", MaterialInfo::new(64, 64, MaterialHandle(2)).with_nodraw(true))
    }

    #[test]
    fn test_library_is_case_insensitive() {
        let info = library().resolve("BRICK/brick01").unwrap();
        assert_eq!((info.width, info.height), (512, 256));
    }

    #[test]
    fn test_missing_material_falls_back() {
        let info = resolve_or_placeholder(&library(), "missing/texture");
        assert_eq!(info, MaterialInfo::placeholder());
        // Unknown tool textures are still recognized by name.
        assert!(resolve_or_placeholder(&library(), "TOOLS/toolsclip").nodraw);
    }

    #[test]
    fn test_zero_size_material_falls_back() {
        let library = MaterialLibrary::new()
            .with("broken", MaterialInfo::new(0, 64, MaterialHandle(7)))
            .with("tools/toolsclip", MaterialInfo::new(64, 0, MaterialHandle(8)).with_nodraw(true));
        assert_eq!(resolve_or_placeholder(&library, "broken"), MaterialInfo::placeholder());
        // The resolver's nodraw flag survives the fallback.
        assert!(resolve_or_placeholder(&library, "tools/toolsclip").nodraw);
    }

    #[test]
    fn test_invisible_tool_names() {
        assert!(is_invisible_tool("tools/toolsskybox"));
        assert!(!is_invisible_tool("tools/toolsblack"));
        assert!(!is_invisible_tool("concrete/concretefloor001a"));
    }

    #[test]
    fn test_table_assigns_slots_in_first_use_order() {
        let library = library();
        let mut table = MaterialTable::new();
        assert_eq!(table.slot("brick/brick01", &library).0, 0);
        assert_eq!(table.slot("tools/toolsnodraw", &library).0, 1);
        assert_eq!(table.slot("BRICK/BRICK01", &library).0, 0);
        assert!(!table.all_nodraw());

        let refs = table.into_refs();
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].name, "brick/brick01");
        assert_eq!(refs[1].handle, Some(MaterialHandle(2)));
    }

    #[test]
    fn test_all_nodraw() {
        let library = library();
        let mut table = MaterialTable::new();
        assert!(!table.all_nodraw());
        table.slot("tools/toolsnodraw", &library);
        assert!(table.all_nodraw());
    }
}
