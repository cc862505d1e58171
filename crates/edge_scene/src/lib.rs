//! edge_scene - Scene-side state for the edge visualization pipeline
//!
//! Where `edge_pipeline` computes flat segment buffers, this crate owns what
//! a viewer does with them: a drawable arena with generational single-owner
//! handles, per-geometry attachment slots re-evaluated from display flags,
//! and the display manager that orchestrates caching, async generation and
//! repaint requests. It stays renderer-agnostic: hosts read visible
//! [`LineDrawable`]s and submit them however they draw lines.
//!
//! # Example
//!
//! ```ignore
//! use edge_pipeline::EdgeType;
//! use edge_scene::EdgeDisplayManager;
//!
//! let mut manager = EdgeDisplayManager::new();
//! let id = manager.register_geometry(shape);
//! manager.toggle(EdgeType::Feature, true);
//!
//! // Consumer thread, once per frame:
//! manager.pump();
//! for (_key, drawable) in manager.store().visible() {
//!     // submit drawable.buffer with drawable.appearance
//! }
//! ```

pub mod drawable;
pub use drawable::{DrawableKey, DrawableStore, LineDrawable};

pub mod attachment;
pub use attachment::EdgeSceneAttachment;

pub mod markers;
pub use markers::{marker_segments, MarkerStyle};

pub mod manager;
pub use manager::{
  CompletionStatus, EdgeDisplayManager, GenerationEvents, GenerationParams, RepaintReason,
  RepaintSink,
};
