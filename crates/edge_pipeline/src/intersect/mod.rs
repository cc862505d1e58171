//! Edge-edge intersection search.
//!
//! Finds points where sampled curves pass within a tolerance of each other,
//! without any closed-form curve-curve solving.
//!
//! ```text
//! ┌───────────┐    ┌──────────────┐    ┌────────────┐    ┌────────┐
//! │ Prefilter ├───►│ Spatial grid ├───►│ Pair probe ├───►│ Dedup  │
//! └───────────┘    └──────────────┘    └────────────┘    └────────┘
//!  17 probe pts     bucket by AABB      17x17 distance    vs last 20
//!  per edge         center, 26-cell     minimum under     accepted
//!                   neighborhood        tolerance
//! ```
//!
//! Small inputs skip the grid and test every pair. The search runs either in
//! one parallel pass ([`engine::find_intersections`]) or in resumable batches
//! with cancellation checks in between ([`progressive::ProgressiveIntersection`]).

pub mod engine;
pub mod grid;
pub mod progressive;

// Re-exports
pub use engine::{find_intersections, IntersectionParams, IntersectionResult};
pub use grid::SpatialGrid;
pub use progressive::ProgressiveIntersection;
