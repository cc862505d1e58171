use thiserror::Error;

/// Result alias used throughout the edge pipeline.
pub type Result<T> = std::result::Result<T, EdgeError>;

/// Errors produced by edge generation.
///
/// Per-edge problems (evaluation, projection, degenerate data) are caught at
/// the edge that raised them and reported as skips; they never abort a batch.
/// Run-level variants travel through completion callbacks.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EdgeError {
  #[error("curve evaluation failed at parameter {parameter}")]
  CurveEvaluation { parameter: f64 },

  #[error("surface projection failed near ({x}, {y}, {z})")]
  ProjectionFailed { x: f64, y: f64, z: f64 },

  #[error("degenerate surface normal (magnitude {magnitude:e})")]
  DegenerateNormal { magnitude: f64 },

  #[error("generation cancelled")]
  Cancelled,

  #[error("generation worker did not stop within {timeout_ms} ms")]
  CancelTimeout { timeout_ms: u64 },

  #[error("generation failed: {0}")]
  Generation(String),
}
