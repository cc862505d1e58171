//! One-shot parallel intersection search.

use std::sync::{Arc, Mutex};

use glam::DVec3;
use rayon::prelude::*;
use web_time::Instant;

use crate::aabb::Aabb;
use crate::constants::{
  ALL_PAIRS_CUTOFF, AUTO_TOLERANCE_DIAGONAL_SCALE, AUTO_TOLERANCE_EPS, DEDUP_WINDOW,
  DEFAULT_MIN_EDGE_LENGTH, GRID_MARGIN_SCALE, PAIR_PROBE_DIVISIONS, PAIR_REFINE_ITERATIONS,
};
use crate::curve::{CurveKind, ParametricCurve};
use crate::intersect::grid::SpatialGrid;
use crate::sampler::filter_length;
use crate::shape::EdgeShape;

/// Parameters controlling the intersection search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntersectionParams {
  /// Acceptance distance. Values below 1e-6 select the adaptive rule:
  /// a fixed fraction of the scene's bounding box diagonal.
  pub tolerance: f64,
  /// Pre-filter: edges below this extent never enter the search.
  pub min_length: f64,
  /// Pre-filter: restrict the search to line edges.
  pub lines_only: bool,
}

impl Default for IntersectionParams {
  fn default() -> Self {
    Self {
      tolerance: 0.0,
      min_length: DEFAULT_MIN_EDGE_LENGTH,
      lines_only: false,
    }
  }
}

impl IntersectionParams {
  pub fn with_tolerance(mut self, tolerance: f64) -> Self {
    self.tolerance = tolerance;
    self
  }

  pub fn with_min_length(mut self, min_length: f64) -> Self {
    self.min_length = min_length;
    self
  }

  pub fn with_lines_only(mut self, lines_only: bool) -> Self {
    self.lines_only = lines_only;
    self
  }
}

/// Outcome of an intersection search.
#[derive(Clone, Debug, Default)]
pub struct IntersectionResult {
  /// Accepted intersection points.
  pub points: Vec<DVec3>,
  /// Candidate pairs actually probed.
  pub pairs_tested: usize,
  /// True when the run was cancelled before testing every candidate.
  /// Partial results must not be cached as final.
  pub partial: bool,
  /// The tolerance the run actually used, after adaptive resolution.
  pub tolerance: f64,
  /// Wall time of the run in microseconds.
  pub elapsed_us: u64,
}

/// An edge reduced to its probe points, keeping the curve for refinement.
pub(crate) struct ProbedEdge {
  pub points: [DVec3; PAIR_PROBE_DIVISIONS + 1],
  pub aabb: Aabb,
  curve: Arc<dyn ParametricCurve>,
  first: f64,
  /// Signed parameter distance between consecutive probes.
  step: f64,
  /// Largest world-space distance between consecutive probe points.
  max_spacing: f64,
}

impl ProbedEdge {
  fn param_bounds(&self) -> (f64, f64) {
    let last = self.first + self.step * PAIR_PROBE_DIVISIONS as f64;
    (self.first.min(last), self.first.max(last))
  }

  fn param_at(&self, index: usize) -> f64 {
    self.first + self.step * index as f64
  }
}

/// Evaluate surviving edges at the probe parameters.
///
/// Applies the same length and type filters as sampling first. Edges whose
/// curve fails at any probe are left out of the search.
pub(crate) fn probe_edges(shape: &EdgeShape, params: &IntersectionParams) -> Vec<ProbedEdge> {
  shape
    .edges
    .iter()
    .filter_map(|edge| {
      filter_length(edge, params.min_length)?;
      if params.lines_only && edge.kind != CurveKind::Line {
        return None;
      }
      let mut points = [DVec3::ZERO; PAIR_PROBE_DIVISIONS + 1];
      let step = (edge.last - edge.first) / PAIR_PROBE_DIVISIONS as f64;
      for (k, point) in points.iter_mut().enumerate() {
        let t = edge.first + step * k as f64;
        *point = edge.curve.point_at(t).ok()?;
      }
      let aabb = Aabb::from_points(points.iter().copied());
      let max_spacing = points
        .windows(2)
        .map(|pair| pair[0].distance(pair[1]))
        .fold(0.0, f64::max);
      Some(ProbedEdge {
        points,
        aabb,
        curve: Arc::clone(&edge.curve),
        first: edge.first,
        step,
        max_spacing,
      })
    })
    .collect()
}

/// Resolve the working tolerance for a set of probed edges.
pub(crate) fn resolve_tolerance(requested: f64, probed: &[ProbedEdge]) -> f64 {
  if requested >= AUTO_TOLERANCE_EPS {
    return requested;
  }
  let mut total = Aabb::empty();
  for edge in probed {
    total.encapsulate_aabb(&edge.aabb);
  }
  total.diagonal() * AUTO_TOLERANCE_DIAGONAL_SCALE
}

/// Minimum distance between two edges and the midpoint of the closest pair.
///
/// A coarse scan over the probe lattice locates the nearest region. When the
/// coarse minimum cannot rule the pair out against `tolerance`, the result is
/// refined on the actual curves, so crossings between probe points are still
/// found.
pub(crate) fn closest_approach(a: &ProbedEdge, b: &ProbedEdge, tolerance: f64) -> (f64, DVec3) {
  let mut best_sq = f64::INFINITY;
  let mut best_point = DVec3::ZERO;
  let mut best_indices = (0, 0);
  for (ka, pa) in a.points.iter().enumerate() {
    for (kb, pb) in b.points.iter().enumerate() {
      let dist_sq = pa.distance_squared(*pb);
      if dist_sq < best_sq {
        best_sq = dist_sq;
        best_point = (*pa + *pb) * 0.5;
        best_indices = (ka, kb);
      }
    }
  }

  // The true minimum undercuts the lattice minimum by at most one probe
  // spacing per edge. Pairs beyond that bound cannot reach the tolerance.
  let coarse = best_sq.sqrt();
  if coarse >= tolerance + a.max_spacing + b.max_spacing {
    return (coarse, best_point);
  }
  refine_approach(a, b, best_indices, best_sq, best_point)
}

/// Shrinking-window minimization on the curves around the best probe pair.
fn refine_approach(
  a: &ProbedEdge,
  b: &ProbedEdge,
  (ka, kb): (usize, usize),
  mut best_sq: f64,
  mut best_point: DVec3,
) -> (f64, DVec3) {
  let (a_lo, a_hi) = a.param_bounds();
  let (b_lo, b_hi) = b.param_bounds();
  let mut ta = a.param_at(ka);
  let mut tb = b.param_at(kb);
  let mut half_a = a.step.abs();
  let mut half_b = b.step.abs();

  for _ in 0..PAIR_REFINE_ITERATIONS {
    let mut center = (ta, tb);
    for i in -2i32..=2 {
      let sa = (ta + half_a * 0.5 * f64::from(i)).clamp(a_lo, a_hi);
      let pa = match a.curve.point_at(sa) {
        Ok(point) => point,
        Err(_) => continue,
      };
      for j in -2i32..=2 {
        let sb = (tb + half_b * 0.5 * f64::from(j)).clamp(b_lo, b_hi);
        let pb = match b.curve.point_at(sb) {
          Ok(point) => point,
          Err(_) => continue,
        };
        let dist_sq = pa.distance_squared(pb);
        if dist_sq < best_sq {
          best_sq = dist_sq;
          best_point = (pa + pb) * 0.5;
          center = (sa, sb);
        }
      }
    }
    ta = center.0;
    tb = center.1;
    half_a *= 0.5;
    half_b *= 0.5;
  }
  (best_sq.sqrt(), best_point)
}

/// Whether a point repeats one of the recently accepted points.
pub(crate) fn is_duplicate(accepted: &[DVec3], candidate: DVec3, tolerance: f64) -> bool {
  accepted
    .iter()
    .rev()
    .take(DEDUP_WINDOW)
    .any(|point| point.distance(candidate) < tolerance)
}

/// Candidate pairs for a set of probed edges.
///
/// Small inputs test every pair; larger ones go through the spatial grid
/// with margin-enlarged boxes.
pub(crate) fn candidate_pairs(probed: &[ProbedEdge], tolerance: f64) -> Vec<(usize, usize)> {
  if probed.len() < ALL_PAIRS_CUTOFF {
    let mut pairs = Vec::with_capacity(probed.len() * probed.len() / 2);
    for i in 0..probed.len() {
      for j in (i + 1)..probed.len() {
        pairs.push((i, j));
      }
    }
    return pairs;
  }

  let margin = tolerance * GRID_MARGIN_SCALE;
  let enlarged: Vec<Aabb> = probed.iter().map(|edge| edge.aabb.expanded(margin)).collect();
  let grid = SpatialGrid::build(&enlarged);
  grid.candidate_pairs(&enlarged)
}

/// Search a shape's edges for mutual near-approaches in one parallel pass.
#[cfg_attr(
  feature = "tracing",
  tracing::instrument(skip_all, name = "intersect::find_intersections")
)]
pub fn find_intersections(shape: &EdgeShape, params: &IntersectionParams) -> IntersectionResult {
  let start = Instant::now();

  let probed = probe_edges(shape, params);
  let tolerance = resolve_tolerance(params.tolerance, &probed);
  let pairs = candidate_pairs(&probed, tolerance);

  let accepted = Mutex::new(Vec::new());
  pairs.par_iter().for_each(|&(i, j)| {
    let (distance, point) = closest_approach(&probed[i], &probed[j], tolerance);
    if distance < tolerance {
      let mut accepted = match accepted.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
      };
      if !is_duplicate(&accepted, point, tolerance) {
        accepted.push(point);
      }
    }
  });

  IntersectionResult {
    points: accepted.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner()),
    pairs_tested: pairs.len(),
    partial: false,
    tolerance,
    elapsed_us: start.elapsed().as_micros() as u64,
  }
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;
