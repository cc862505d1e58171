//! Curve sampling.
//!
//! Turns B-rep edges into flat segment buffers. Lines collapse to their two
//! endpoints; curved edges get a density-driven point count with per-kind
//! floors. Degenerate and too-short edges are dropped before any curve
//! evaluation happens, and an evaluation failure empties only the edge that
//! raised it.

use glam::DVec3;
use rayon::prelude::*;
use web_time::Instant;

use crate::constants::{
  CLOSED_CHORD_EPS, CONIC_SAMPLE_FLOOR, DEFAULT_EDGE_DENSITY, DEFAULT_MIN_EDGE_LENGTH,
  LINE_SAMPLE_COUNT, MAX_CURVE_SAMPLES, MIN_CURVE_SAMPLES, SAMPLE_DENSITY_SCALE,
  SPLINE_SAMPLE_FLOOR,
};
use crate::curve::CurveKind;
use crate::shape::{BrepEdge, EdgeShape};
use crate::types::SegmentBuffer;

/// Parameters controlling curve sampling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SamplingParams {
  /// Samples per unit of parameter length.
  pub density: f64,
  /// Edges with a smaller extent are dropped.
  pub min_length: f64,
  /// Emit only endpoints for every edge, regardless of curve kind.
  pub lines_only: bool,
}

impl Default for SamplingParams {
  fn default() -> Self {
    Self {
      density: DEFAULT_EDGE_DENSITY,
      min_length: DEFAULT_MIN_EDGE_LENGTH,
      lines_only: false,
    }
  }
}

impl SamplingParams {
  pub fn with_density(mut self, density: f64) -> Self {
    self.density = density;
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

/// Statistics from one sampling run.
#[derive(Clone, Copy, Debug, Default)]
pub struct SamplingStats {
  /// Edges that produced segments.
  pub edges_sampled: usize,
  /// Edges dropped by filters or emptied by evaluation failure.
  pub edges_skipped: usize,
  /// Segment endpoints appended to the output buffer.
  pub points_emitted: usize,
  /// Wall time of the run in microseconds.
  pub elapsed_us: u64,
}

/// One sampled edge: the source interval plus its cached polyline.
#[derive(Clone, Debug)]
pub struct SampledEdge {
  /// Index of the edge in the source shape.
  pub edge_index: usize,
  /// Curve family tag.
  pub kind: CurveKind,
  /// Parameter interval start.
  pub first: f64,
  /// Parameter interval end.
  pub last: f64,
  /// Extent used for filtering: chord length, or parameter range for closed
  /// edges.
  pub length: f64,
  /// Sampled polyline. Empty when curve evaluation failed.
  pub points: Vec<DVec3>,
}

/// Number of polyline points sampled for an edge.
///
/// Lines (or lines-only mode) always get exactly 2. Everything else gets
/// `clamp(max(4, round(param_length * density * 0.5)), 4, 100)` with floors
/// of 16 for conics and 12 for splines.
pub fn sample_count(kind: CurveKind, param_length: f64, density: f64, lines_only: bool) -> usize {
  if lines_only || kind == CurveKind::Line {
    return LINE_SAMPLE_COUNT;
  }

  let scaled = (param_length * density * SAMPLE_DENSITY_SCALE).round();
  let mut count = if scaled.is_finite() && scaled > 0.0 {
    scaled as usize
  } else {
    0
  };
  count = count.max(MIN_CURVE_SAMPLES);

  let floor = match kind {
    CurveKind::Circle | CurveKind::Ellipse => CONIC_SAMPLE_FLOOR,
    CurveKind::Bezier | CurveKind::BSpline => SPLINE_SAMPLE_FLOOR,
    CurveKind::Line | CurveKind::Other => MIN_CURVE_SAMPLES,
  };
  count.max(floor).min(MAX_CURVE_SAMPLES)
}

/// Edge extent used by the degenerate filter, or `None` when the edge is
/// dropped.
///
/// Open edges measure their chord; closed edges (including those whose chord
/// collapses) measure their parameter range instead.
pub(crate) fn filter_length(edge: &BrepEdge, min_length: f64) -> Option<f64> {
  let closed = edge.curve.is_closed() || edge.chord_length < CLOSED_CHORD_EPS;
  if closed {
    let range = edge.param_length();
    (range > min_length).then_some(range)
  } else {
    (edge.chord_length >= min_length).then_some(edge.chord_length)
  }
}

/// Sample a single edge.
///
/// Returns `None` when the edge is dropped before sampling: degenerate
/// (chord shorter than `min_length`) or, for closed curves, a parameter range
/// not exceeding `min_length`. An edge whose curve fails to evaluate is
/// returned with empty `points` so the caller can count the skip.
pub fn sample_edge(edge_index: usize, edge: &BrepEdge, params: &SamplingParams) -> Option<SampledEdge> {
  let length = filter_length(edge, params.min_length)?;

  if params.lines_only && edge.kind != CurveKind::Line {
    return None;
  }

  let count = sample_count(edge.kind, edge.param_length(), params.density, params.lines_only);
  let mut points = Vec::with_capacity(count);
  let step = if count > 1 {
    (edge.last - edge.first) / (count - 1) as f64
  } else {
    0.0
  };

  for i in 0..count {
    let t = edge.first + step * i as f64;
    match edge.curve.point_at(t) {
      Ok(point) => points.push(point),
      Err(_) => {
        // One bad edge never takes the batch down
        points.clear();
        break;
      }
    }
  }

  Some(SampledEdge {
    edge_index,
    kind: edge.kind,
    first: edge.first,
    last: edge.last,
    length,
    points,
  })
}

/// Sample every edge of a shape into a flat segment buffer.
///
/// Edges are sampled in parallel; output keeps the shape's edge order.
#[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "sampler::extract_edges"))]
pub fn extract_edges(shape: &EdgeShape, params: &SamplingParams) -> (SegmentBuffer, SamplingStats) {
  let start = Instant::now();

  let sampled: Vec<Option<SampledEdge>> = shape
    .edges
    .par_iter()
    .enumerate()
    .map(|(index, edge)| sample_edge(index, edge, params))
    .collect();

  let (buffer, mut stats) = collect_segments(&sampled);
  stats.elapsed_us = start.elapsed().as_micros() as u64;
  (buffer, stats)
}

/// Sample only the listed edges of a shape.
///
/// Out-of-range indices are skipped. Used for highlight edges, where the
/// host names the edges to draw.
pub fn extract_edge_subset(
  shape: &EdgeShape,
  edge_indices: &[usize],
  params: &SamplingParams,
) -> (SegmentBuffer, SamplingStats) {
  let start = Instant::now();

  let sampled: Vec<Option<SampledEdge>> = edge_indices
    .iter()
    .filter_map(|&index| shape.edges.get(index).map(|edge| (index, edge)))
    .map(|(index, edge)| sample_edge(index, edge, params))
    .collect();

  let (buffer, mut stats) = collect_segments(&sampled);
  stats.elapsed_us = start.elapsed().as_micros() as u64;
  (buffer, stats)
}

pub(crate) fn collect_segments(sampled: &[Option<SampledEdge>]) -> (SegmentBuffer, SamplingStats) {
  let point_estimate: usize = sampled
    .iter()
    .flatten()
    .map(|edge| edge.points.len().saturating_sub(1) * 2)
    .sum();

  let mut buffer = SegmentBuffer::with_capacity(point_estimate / 2);
  let mut stats = SamplingStats::default();

  for entry in sampled {
    match entry {
      Some(edge) if edge.points.len() >= 2 => {
        buffer.push_polyline(&edge.points);
        stats.edges_sampled += 1;
      }
      Some(_) | None => stats.edges_skipped += 1,
    }
  }
  stats.points_emitted = buffer.points.len();
  (buffer, stats)
}

#[cfg(test)]
#[path = "sampler_test.rs"]
mod sampler_test;
