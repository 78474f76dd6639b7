//! Centralized configuration values shared across the brush geometry
//! pipeline.
//!
//! Each public item in this module documents its purpose and provides a
//! minimal usage example so that downstream crates can remain declarative
//! and avoid scattering literals.

use std::fmt;

// =============================================================================
// PRECISION CONSTANTS
// =============================================================================

/// Maximum distance a candidate vertex may lie in front of another side's
/// plane before it is cut off.
///
/// Independent of the merge tolerance: this one decides whether a plane
/// triple intersection is a vertex of the solid at all.
///
/// # Examples
/// ```
/// use config::constants::CUT_EPSILON;
/// let distance_to_plane = 0.004;
/// assert!(distance_to_plane <= CUT_EPSILON);
/// ```
pub const CUT_EPSILON: f64 = 0.01;

/// Default absolute tolerance, in map units, for merging near-coincident
/// vertices.
///
/// # Examples
/// ```
/// use config::constants::{DEFAULT_MERGE_EPSILON, CUT_EPSILON};
/// assert!(DEFAULT_MERGE_EPSILON < CUT_EPSILON);
/// ```
pub const DEFAULT_MERGE_EPSILON: f64 = 0.001;

/// Relative component of the vertex merge tolerance, scaled by the distance
/// of the compared points from their reference center.
///
/// # Examples
/// ```
/// use config::constants::MERGE_RELATIVE_TOLERANCE;
/// // A point 10k units from its reference merges within 1cm.
/// assert!(MERGE_RELATIVE_TOLERANCE * 10_000.0 <= 0.01);
/// ```
pub const MERGE_RELATIVE_TOLERANCE: f64 = 1.0e-6;

/// Tolerance for the final overlay border re-check. Vertices further than
/// this outside any border after clipping are dropped.
///
/// # Examples
/// ```
/// use config::constants::BORDER_RECHECK_EPSILON;
/// assert!(BORDER_RECHECK_EPSILON > 0.0);
/// ```
pub const BORDER_RECHECK_EPSILON: f64 = 0.005;

/// Squared-length / dot-product threshold below which two planes or a line
/// and a plane are treated as parallel.
///
/// # Examples
/// ```
/// use config::constants::PARALLEL_EPSILON;
/// assert!(PARALLEL_EPSILON < 1.0e-6);
/// ```
pub const PARALLEL_EPSILON: f64 = 1.0e-9;

// =============================================================================
// OVERLAY CONSTANTS
// =============================================================================

/// Distance an overlay is lifted off its sides along the side normal.
/// Multiplied by `1 + render_order` when the overlay has a render order.
///
/// # Examples
/// ```
/// use config::constants::OVERLAY_SURFACE_OFFSET;
/// let render_order = 2;
/// let offset = OVERLAY_SURFACE_OFFSET * (1 + render_order) as f64;
/// assert!((offset - 0.3).abs() < 1.0e-12);
/// ```
pub const OVERLAY_SURFACE_OFFSET: f64 = 0.1;

// =============================================================================
// MATERIAL / DISPLACEMENT CONSTANTS
// =============================================================================

/// Width and height reported for materials the resolver cannot find.
///
/// # Examples
/// ```
/// use config::constants::PLACEHOLDER_TEXTURE_SIZE;
/// assert_eq!(PLACEHOLDER_TEXTURE_SIZE, 1);
/// ```
pub const PLACEHOLDER_TEXTURE_SIZE: u32 = 1;

/// Largest displacement power accepted. A power `p` gives a grid dimension
/// of `2^p + 1`.
///
/// # Examples
/// ```
/// use config::constants::MAX_DISPLACEMENT_POWER;
/// assert_eq!((1usize << MAX_DISPLACEMENT_POWER) + 1, 17);
/// ```
pub const MAX_DISPLACEMENT_POWER: u32 = 4;

/// Vertex color used for loops of meshes without a color layer.
pub const DEFAULT_LOOP_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

// =============================================================================
// IMPORT CONFIG
// =============================================================================

/// Immutable snapshot of the per-import settings shared between the
/// reconstruction kernels and the batch driver.
///
/// # Examples
/// ```
/// use config::constants::ImportConfig;
/// let config = ImportConfig::default();
/// assert!(config.import_solids && config.import_overlays);
/// assert!(!config.skip_tools);
/// assert!(config.merge_solids);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImportConfig {
    /// Absolute tolerance for merging near-coincident vertices.
    pub merge_epsilon: f64,
    /// Build solids at all.
    pub import_solids: bool,
    /// Build overlays. Has no effect unless solids are built, since overlays
    /// are projected onto solid sides.
    pub import_overlays: bool,
    /// Skip solids made entirely of tool materials.
    pub skip_tools: bool,
    /// Join the solids of each brush entity into one mesh instead of
    /// emitting one mesh per solid.
    pub merge_solids: bool,
}

impl ImportConfig {
    /// Builds a configuration with the given merge tolerance, rejecting
    /// non-positive or non-finite values.
    ///
    /// # Examples
    /// ```
    /// use config::constants::ImportConfig;
    /// let cfg = ImportConfig::new(0.01).expect("valid config");
    /// assert_eq!(cfg.merge_epsilon, 0.01);
    /// assert!(ImportConfig::new(0.0).is_err());
    /// ```
    pub fn new(merge_epsilon: f64) -> Result<Self, ConfigError> {
        if !merge_epsilon.is_finite() || merge_epsilon <= 0.0 {
            return Err(ConfigError::InvalidEpsilon(merge_epsilon));
        }
        Ok(Self {
            merge_epsilon,
            ..Self::default()
        })
    }

    /// Enables or disables solid import.
    pub fn with_solids(mut self, enabled: bool) -> Self {
        self.import_solids = enabled;
        self
    }

    /// Enables or disables overlay import.
    pub fn with_overlays(mut self, enabled: bool) -> Self {
        self.import_overlays = enabled;
        self
    }

    /// Enables or disables skipping of tool-only solids.
    pub fn with_skip_tools(mut self, enabled: bool) -> Self {
        self.skip_tools = enabled;
        self
    }

    /// Chooses between one mesh per brush entity and one per solid.
    pub fn with_merge_solids(mut self, enabled: bool) -> Self {
        self.merge_solids = enabled;
        self
    }

    /// Whether overlays will actually be built.
    pub fn builds_overlays(&self) -> bool {
        self.import_solids && self.import_overlays
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            merge_epsilon: DEFAULT_MERGE_EPSILON,
            import_solids: true,
            import_overlays: true,
            skip_tools: false,
            merge_solids: true,
        }
    }
}

/// Error returned when invalid configuration values are provided.
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// Raised when the merge tolerance is zero, negative or not finite.
    InvalidEpsilon(f64),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidEpsilon(value) => {
                write!(f, "merge epsilon must be positive and finite: {value}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
