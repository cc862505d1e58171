//! Edge classification.
//!
//! Splits B-rep edges into boundary, feature, smooth and excluded sets, and
//! picks silhouette edges for a view direction. Both paths read the oriented
//! normals of the faces bordering an edge at the curve midpoint; any failure
//! along the way quietly demotes the edge instead of aborting the run.

use glam::DVec3;
use rayon::prelude::*;
use web_time::Instant;

use crate::constants::{
  CLOSED_CHORD_EPS, DEFAULT_FEATURE_ANGLE_DEG, DEFAULT_FEATURE_DENSITY,
  DEFAULT_FEATURE_MIN_LENGTH, DEFAULT_SILHOUETTE_DENSITY, SILHOUETTE_GRAZING_EPS,
  SMOOTH_ANGLE_EPS,
};
use crate::sampler::{collect_segments, sample_edge, SampledEdge, SamplingParams, SamplingStats};
use crate::shape::{BrepEdge, EdgeShape};
use crate::types::SegmentBuffer;

/// Parameters controlling feature edge selection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FeatureParams {
  /// Dihedral angle threshold in degrees.
  pub angle_threshold_deg: f64,
  /// Open edges shorter than this are excluded. Closed edges skip this
  /// filter.
  pub min_length: f64,
  /// Sampling density for selected edges.
  pub density: f64,
  /// Keep only convex features.
  pub only_convex: bool,
  /// Keep only concave features.
  pub only_concave: bool,
}

impl Default for FeatureParams {
  fn default() -> Self {
    Self {
      angle_threshold_deg: DEFAULT_FEATURE_ANGLE_DEG,
      min_length: DEFAULT_FEATURE_MIN_LENGTH,
      density: DEFAULT_FEATURE_DENSITY,
      only_convex: false,
      only_concave: false,
    }
  }
}

impl FeatureParams {
  pub fn with_angle_threshold_deg(mut self, degrees: f64) -> Self {
    self.angle_threshold_deg = degrees;
    self
  }

  pub fn with_min_length(mut self, min_length: f64) -> Self {
    self.min_length = min_length;
    self
  }

  pub fn with_only_convex(mut self, only_convex: bool) -> Self {
    self.only_convex = only_convex;
    self
  }

  pub fn with_only_concave(mut self, only_concave: bool) -> Self {
    self.only_concave = only_concave;
    self
  }
}

/// Parameters controlling silhouette edge selection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SilhouetteParams {
  /// Sampling density for selected edges.
  pub density: f64,
}

impl Default for SilhouetteParams {
  fn default() -> Self {
    Self {
      density: DEFAULT_SILHOUETTE_DENSITY,
    }
  }
}

impl SilhouetteParams {
  pub fn with_density(mut self, density: f64) -> Self {
    self.density = density;
    self
  }
}

/// Outcome of classifying one edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeClass {
  /// Bordered by exactly one face.
  Boundary,
  /// Dihedral angle at or above the threshold. `convex` is `None` when no
  /// convexity filter asked for it.
  Feature { convex: Option<bool> },
  /// Dihedral angle below the threshold, or no usable adjacency.
  Smooth,
  /// Removed by the length or convexity filter.
  Excluded,
}

impl EdgeClass {
  /// Whether the edge is drawn by the feature pass.
  #[inline]
  pub fn is_feature(&self) -> bool {
    matches!(self, EdgeClass::Boundary | EdgeClass::Feature { .. })
  }
}

/// Dihedral angle and normal dot product at the curve midpoint.
///
/// Returns `(0.0, 0.0)` when the midpoint or either oriented normal cannot
/// be evaluated, which lands the edge in the smooth set.
fn dihedral(edge: &BrepEdge) -> (f64, f64) {
  let point = match edge.curve.point_at(edge.midpoint_parameter()) {
    Ok(point) => point,
    Err(_) => return (0.0, 0.0),
  };
  let n1 = match edge.faces[0].oriented_normal_near(point) {
    Ok(normal) => normal,
    Err(_) => return (0.0, 0.0),
  };
  let n2 = match edge.faces[1].oriented_normal_near(point) {
    Ok(normal) => normal,
    Err(_) => return (0.0, 0.0),
  };
  let dot = n1.dot(n2).clamp(-1.0, 1.0);
  (dot.acos(), dot)
}

/// Classify a single edge against the feature parameters.
pub fn classify_edge(edge: &BrepEdge, params: &FeatureParams) -> EdgeClass {
  let closed = edge.curve.is_closed() || edge.chord_length < CLOSED_CHORD_EPS;
  if !closed && edge.chord_length < params.min_length {
    return EdgeClass::Excluded;
  }

  match edge.faces.len() {
    1 => EdgeClass::Boundary,
    2 => {
      let (angle, dot) = dihedral(edge);
      if angle < SMOOTH_ANGLE_EPS || angle < params.angle_threshold_deg.to_radians() {
        return EdgeClass::Smooth;
      }
      if !params.only_convex && !params.only_concave {
        return EdgeClass::Feature { convex: None };
      }
      if params.only_convex && dot > 0.0 {
        return EdgeClass::Feature {
          convex: Some(true),
        };
      }
      if params.only_concave && dot < 0.0 {
        return EdgeClass::Feature {
          convex: Some(false),
        };
      }
      EdgeClass::Excluded
    }
    _ => EdgeClass::Smooth,
  }
}

/// Classify every edge of a shape.
pub fn classify_all(shape: &EdgeShape, params: &FeatureParams) -> Vec<EdgeClass> {
  shape
    .edges
    .par_iter()
    .map(|edge| classify_edge(edge, params))
    .collect()
}

/// Sample boundary and feature edges into a flat segment buffer.
///
/// Classification applies its own length filter, so selected edges are
/// sampled without a second one.
#[cfg_attr(
  feature = "tracing",
  tracing::instrument(skip_all, name = "classify::extract_feature_edges")
)]
pub fn extract_feature_edges(
  shape: &EdgeShape,
  params: &FeatureParams,
) -> (SegmentBuffer, SamplingStats) {
  let start = Instant::now();
  let sampling = SamplingParams::default()
    .with_density(params.density)
    .with_min_length(0.0);

  let sampled: Vec<Option<SampledEdge>> = shape
    .edges
    .par_iter()
    .enumerate()
    .map(|(index, edge)| {
      if classify_edge(edge, params).is_feature() {
        sample_edge(index, edge, &sampling)
      } else {
        None
      }
    })
    .collect();

  let (buffer, mut stats) = collect_segments(&sampled);
  stats.elapsed_us = start.elapsed().as_micros() as u64;
  (buffer, stats)
}

/// Whether an edge separates front-facing from back-facing surface for the
/// given unit view direction.
pub fn is_silhouette_edge(edge: &BrepEdge, view: DVec3) -> bool {
  if edge.faces.len() != 2 {
    return false;
  }
  let point = match edge.curve.point_at(edge.midpoint_parameter()) {
    Ok(point) => point,
    Err(_) => return false,
  };
  let n1 = match edge.faces[0].oriented_normal_near(point) {
    Ok(normal) => normal,
    Err(_) => return false,
  };
  let n2 = match edge.faces[1].oriented_normal_near(point) {
    Ok(normal) => normal,
    Err(_) => return false,
  };
  let d1 = n1.dot(view);
  let d2 = n2.dot(view);
  (d1 > SILHOUETTE_GRAZING_EPS && d2 < -SILHOUETTE_GRAZING_EPS)
    || (d1 < -SILHOUETTE_GRAZING_EPS && d2 > SILHOUETTE_GRAZING_EPS)
}

/// Sample silhouette edges for a view direction into a flat segment buffer.
///
/// A zero view direction selects nothing.
#[cfg_attr(
  feature = "tracing",
  tracing::instrument(skip_all, name = "classify::extract_silhouette_edges")
)]
pub fn extract_silhouette_edges(
  shape: &EdgeShape,
  view_dir: DVec3,
  params: &SilhouetteParams,
) -> (SegmentBuffer, SamplingStats) {
  let start = Instant::now();

  let Some(view) = view_dir.try_normalize() else {
    let stats = SamplingStats {
      edges_skipped: shape.edge_count(),
      elapsed_us: start.elapsed().as_micros() as u64,
      ..SamplingStats::default()
    };
    return (SegmentBuffer::new(), stats);
  };

  let sampling = SamplingParams::default()
    .with_density(params.density)
    .with_min_length(0.0);

  let sampled: Vec<Option<SampledEdge>> = shape
    .edges
    .par_iter()
    .enumerate()
    .map(|(index, edge)| {
      if is_silhouette_edge(edge, view) {
        sample_edge(index, edge, &sampling)
      } else {
        None
      }
    })
    .collect();

  let (buffer, mut stats) = collect_segments(&sampled);
  stats.elapsed_us = start.elapsed().as_micros() as u64;
  (buffer, stats)
}

#[cfg(test)]
#[path = "classify_test.rs"]
mod classify_test;
