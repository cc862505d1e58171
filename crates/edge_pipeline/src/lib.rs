//! edge_pipeline - Framework/engine independent edge visualization pipeline
//!
//! This crate turns boundary-representation geometry (edges backed by
//! parametric curves, faces backed by surfaces) and triangle meshes into flat
//! line-segment buffers ready for rendering: original edges, feature edges,
//! mesh wireframes, silhouettes, normal indicators and edge-edge intersection
//! markers.
//!
//! # Features
//!
//! - **Curve Sampling**: density-driven polyline sampling with per-kind
//!   sample floors and degenerate-edge filtering
//! - **Edge Classification**: dihedral-angle feature detection, boundary
//!   edges, convex/concave filtering, view-dependent silhouettes
//! - **Intersection Search**: uniform-grid candidate pruning with numeric
//!   closest-approach testing, progressive batches and cancellation
//! - **LOD**: five eagerly generated detail levels selected by camera
//!   distance with hysteresis
//! - **Async Coordination**: rayon workers, channel handoff, atomic progress,
//!   stale-result detection via epochs
//!
//! # Example
//!
//! ```ignore
//! use edge_pipeline::{extract_edges, EdgeShape, SamplingParams};
//!
//! let shape = EdgeShape::new(edges).with_mesh(mesh);
//!
//! // Sample every edge into a flat segment buffer
//! let params = SamplingParams::default();
//! let (buffer, stats) = extract_edges(&shape, &params);
//!
//! println!("Sampled {} segments from {} edges",
//!     buffer.segment_count(), stats.edges_sampled);
//! ```

pub mod constants;
pub mod error;
pub mod types;

// Re-export commonly used items
pub use error::{EdgeError, Result};
pub use types::{
  Appearance, DisplayFlags, EdgeType, Epoch, LineStyle, MarkerShape, SegmentBuffer,
};

// Bounding volumes
pub mod aabb;
pub use aabb::Aabb;

// Parametric curves and surface normal sources
pub mod curve;
pub use curve::{AdjacentFace, CurveKind, ParametricCurve, SurfaceNormalSource};

// Geometry containers consumed by the pipeline
pub mod shape;
pub use shape::{BrepEdge, EdgeShape, GeometryId, TriangleMesh};

// Curve sampling
pub mod sampler;
pub use sampler::{extract_edges, SampledEdge, SamplingParams, SamplingStats};

// Feature and silhouette classification
pub mod classify;
pub use classify::{EdgeClass, FeatureParams, SilhouetteParams};

// Edge-edge intersection search
pub mod intersect;
pub use intersect::{IntersectionParams, IntersectionResult, ProgressiveIntersection};

// Triangle mesh wireframes and normal indicators
pub mod mesh_edges;
pub use mesh_edges::MeshEdgeMode;

// Camera-distance level of detail
pub mod lod;
pub use lod::{EdgeLodSet, LodLevel, LodThresholds};

// Async generation coordination
pub mod coordinator;
pub use coordinator::{
  CancelFlag, GenerationCoordinator, GenerationOutcome, GenerationReport, GenerationState,
  WorkerContext,
};

// Parameter-keyed result caching
pub mod cache;
pub use cache::EdgeCache;

// Engine-agnostic metrics (collection gated by the `metrics` feature)
pub mod metrics;
