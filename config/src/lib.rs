//! # Config Crate
//!
//! Centralized tolerances and import switches for the brush geometry
//! pipeline. Every magic number the reconstruction kernels depend on lives
//! here so the separate epsilons can be tuned independently.
//!
//! ## Usage
//!
//! ```rust
//! use config::constants::{ImportConfig, CUT_EPSILON, DEFAULT_MERGE_EPSILON};
//!
//! // The cut-off tolerance is fixed, the merge tolerance is configurable.
//! let config = ImportConfig::default();
//! assert_eq!(config.merge_epsilon, DEFAULT_MERGE_EPSILON);
//! assert!(CUT_EPSILON > config.merge_epsilon);
//! ```
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All constants defined once, used everywhere
//! - **Separate Tolerances**: Cut-off, merge and border re-check epsilons
//!   address different failure modes and are never unified
//! - **Well-Documented**: Every constant has clear documentation

pub mod constants;
