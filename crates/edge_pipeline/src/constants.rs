//! Tuning constants for edge generation.
//!
//! Sampling counts, spatial grid sizing and default generation parameters
//! live here so every stage of the pipeline agrees on them.
//!
//! # Sample count selection
//!
//! ```text
//! lines (or lines-only mode)   exactly 2 points
//! other curves                 clamp(max(4, round(len * density * 0.5)), 4, 100)
//!   circle / ellipse           floor raised to 16
//!   bezier / b-spline          floor raised to 12
//! ```
//!
//! # Intersection search
//!
//! ```text
//! candidate pruning   uniform grid, ~8 edges per cell, dims capped at 32
//! pair test           (16+1)² closest-approach probe, refined locally when
//!                     the coarse minimum lands near the tolerance
//! dedup               against the 20 most recent accepted points
//! batches             100 candidate pairs between cancellation checks
//! ```

/// Samples used for straight lines (endpoints only)
pub const LINE_SAMPLE_COUNT: usize = 2;

/// Minimum samples for any non-line curve
pub const MIN_CURVE_SAMPLES: usize = 4;

/// Maximum samples for any curve
pub const MAX_CURVE_SAMPLES: usize = 100;

/// Sample floor for circles and ellipses
pub const CONIC_SAMPLE_FLOOR: usize = 16;

/// Sample floor for bezier and b-spline curves
pub const SPLINE_SAMPLE_FLOOR: usize = 12;

/// Scale applied to `length * density` when selecting sample counts
pub const SAMPLE_DENSITY_SCALE: f64 = 0.5;

/// Default sampling density for original edges
pub const DEFAULT_EDGE_DENSITY: f64 = 80.0;

/// Default minimum edge extent; shorter edges are dropped
pub const DEFAULT_MIN_EDGE_LENGTH: f64 = 0.01;

/// Default dihedral angle threshold for feature edges, in degrees
pub const DEFAULT_FEATURE_ANGLE_DEG: f64 = 15.0;

/// Default minimum length for feature edge candidates
pub const DEFAULT_FEATURE_MIN_LENGTH: f64 = 0.005;

/// Default sampling density for feature edge polylines
pub const DEFAULT_FEATURE_DENSITY: f64 = 20.0;

/// Default sampling density for silhouette polylines
pub const DEFAULT_SILHOUETTE_DENSITY: f64 = 40.0;

/// Chord length below which an edge counts as closed (parameter range is used
/// as its extent instead)
pub const CLOSED_CHORD_EPS: f64 = 1e-6;

/// Surface normals shorter than this are treated as degenerate
pub const DEGENERATE_NORMAL_EPS: f64 = 1e-7;

/// Dihedral angles below this count as perfectly smooth
pub const SMOOTH_ANGLE_EPS: f64 = 1e-10;

/// Dot products within this band of zero count as grazing for silhouettes
pub const SILHOUETTE_GRAZING_EPS: f64 = 1e-6;

/// Tolerances below this select the adaptive rule (fraction of scene size)
pub const AUTO_TOLERANCE_EPS: f64 = 1e-6;

/// Adaptive intersection tolerance as a fraction of the scene AABB diagonal
pub const AUTO_TOLERANCE_DIAGONAL_SCALE: f64 = 0.001;

/// AABB margin applied to edges before grid insertion, as a tolerance multiple
pub const GRID_MARGIN_SCALE: f64 = 2.0;

/// Target number of edges per grid cell
pub const TARGET_EDGES_PER_CELL: usize = 8;

/// Maximum grid cells along any axis
pub const MAX_GRID_DIM: usize = 32;

/// Edge counts below this skip the grid and test all pairs
pub const ALL_PAIRS_CUTOFF: usize = 50;

/// Parameter subdivisions per curve in the closest-approach probe
pub const PAIR_PROBE_DIVISIONS: usize = 16;

/// Shrinking-window iterations refining the best probe pair. Each iteration
/// halves the parameter window, so the final resolution is the probe spacing
/// divided by 2^20.
pub const PAIR_REFINE_ITERATIONS: usize = 20;

/// Candidate pairs tested between cancellation checks
pub const INTERSECTION_BATCH_SIZE: usize = 100;

/// Recent accepted points checked when deduplicating intersections
pub const DEDUP_WINDOW: usize = 20;

/// Default world-space length of vertex and face normal indicator segments
pub const DEFAULT_NORMAL_INDICATOR_LENGTH: f64 = 0.5;

/// Distance band that must be crossed before a LOD switch, in world units
pub const DEFAULT_LOD_HYSTERESIS: f64 = 10.0;

/// Estimated bytes per stored point (three f64 components)
pub const BYTES_PER_POINT: usize = 24;

/// Fixed per-drawable overhead used in memory estimates
pub const DRAWABLE_OVERHEAD_BYTES: usize = 64;

/// How long `cancel_and_wait` blocks before giving up, in milliseconds
pub const CANCEL_WAIT_TIMEOUT_MS: u64 = 5000;

#[cfg(test)]
#[path = "constants_test.rs"]
mod constants_test;
