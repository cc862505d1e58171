use std::f64::consts::TAU;
use std::sync::Arc;

use approx::assert_relative_eq;
use glam::DVec3;
use smallvec::SmallVec;

use super::*;
use crate::curve::{Circle, CubicBezier, ParametricCurve};
use crate::error::EdgeError;

fn line_edge(start: DVec3, end: DVec3) -> BrepEdge {
  BrepEdge::over_full_domain(
    Arc::new(crate::curve::LineSegment::new(start, end)),
    SmallVec::new(),
  )
}

fn circle_edge(radius: f64) -> BrepEdge {
  BrepEdge::over_full_domain(Arc::new(Circle::new(DVec3::ZERO, radius)), SmallVec::new())
}

/// Evaluates fine near the interval ends but fails in the middle.
struct FlakyCurve;

impl ParametricCurve for FlakyCurve {
  fn point_at(&self, t: f64) -> crate::Result<DVec3> {
    if t > 0.3 && t < 0.7 {
      Err(EdgeError::CurveEvaluation { parameter: t })
    } else {
      Ok(DVec3::new(t, 0.0, 0.0))
    }
  }

  fn domain(&self) -> (f64, f64) {
    (0.0, 1.0)
  }

  fn kind(&self) -> CurveKind {
    CurveKind::Other
  }
}

#[test]
fn test_line_samples_two_points() {
  let edge = line_edge(DVec3::ZERO, DVec3::new(3.0, 0.0, 0.0));
  let sampled = match sample_edge(0, &edge, &SamplingParams::default()) {
    Some(sampled) => sampled,
    None => panic!("line edge should survive the filters"),
  };
  assert_eq!(sampled.points.len(), 2);
  assert_relative_eq!(sampled.points[1].x, 3.0);
  assert_relative_eq!(sampled.length, 3.0);
}

#[test]
fn test_sample_count_formula() {
  // round(1.0 * 40.0 * 0.5) = 20
  assert_eq!(sample_count(CurveKind::Other, 1.0, 40.0, false), 20);
  // Zero extent still gets the minimum
  assert_eq!(sample_count(CurveKind::Other, 0.0, 80.0, false), 4);
  // Large extents cap out
  assert_eq!(sample_count(CurveKind::Other, 10.0, 80.0, false), 100);
}

#[test]
fn test_sample_count_kind_floors() {
  assert_eq!(sample_count(CurveKind::Circle, 0.1, 10.0, false), 16);
  assert_eq!(sample_count(CurveKind::Ellipse, 0.1, 10.0, false), 16);
  assert_eq!(sample_count(CurveKind::Bezier, 0.1, 10.0, false), 12);
  assert_eq!(sample_count(CurveKind::BSpline, 0.1, 10.0, false), 12);
  // Lines-only overrides everything
  assert_eq!(sample_count(CurveKind::Circle, 10.0, 80.0, true), 2);
}

#[test]
fn test_counts_stay_within_bounds() {
  let kinds = [
    CurveKind::Line,
    CurveKind::Circle,
    CurveKind::Ellipse,
    CurveKind::Bezier,
    CurveKind::BSpline,
    CurveKind::Other,
  ];
  for kind in kinds {
    for density in [0.1, 5.0, 80.0, 1.0e6] {
      for param_length in [1.0e-9, 0.5, 7.0, 1.0e9] {
        let count = sample_count(kind, param_length, density, false);
        assert!((2..=100).contains(&count), "{kind:?} gave {count}");
      }
    }
  }
}

#[test]
fn test_short_open_edge_dropped() {
  let edge = line_edge(DVec3::ZERO, DVec3::new(0.001, 0.0, 0.0));
  assert!(sample_edge(0, &edge, &SamplingParams::default()).is_none());
}

#[test]
fn test_closed_curve_filtered_by_param_range() {
  // A full circle has a near-zero chord but a TAU parameter range
  let edge = circle_edge(5.0);
  let sampled = match sample_edge(0, &edge, &SamplingParams::default()) {
    Some(sampled) => sampled,
    None => panic!("closed circle should pass the range filter"),
  };
  assert_relative_eq!(sampled.length, TAU);

  let strict = SamplingParams::default().with_min_length(10.0);
  assert!(sample_edge(0, &edge, &strict).is_none());
}

#[test]
fn test_lines_only_drops_curved_edges() {
  let shape = EdgeShape::new(vec![
    line_edge(DVec3::ZERO, DVec3::new(1.0, 0.0, 0.0)),
    circle_edge(2.0),
  ]);
  let params = SamplingParams::default().with_lines_only(true);
  let (buffer, stats) = extract_edges(&shape, &params);
  assert_eq!(stats.edges_sampled, 1);
  assert_eq!(stats.edges_skipped, 1);
  assert_eq!(buffer.points.len(), 2);
}

#[test]
fn test_eval_failure_skips_only_that_edge() {
  let flaky = BrepEdge::new(Arc::new(FlakyCurve), 0.0, 1.0, SmallVec::new());
  let shape = EdgeShape::new(vec![
    flaky,
    line_edge(DVec3::ZERO, DVec3::new(1.0, 1.0, 0.0)),
  ]);
  let (buffer, stats) = extract_edges(&shape, &SamplingParams::default());
  assert_eq!(stats.edges_sampled, 1);
  assert_eq!(stats.edges_skipped, 1);
  // Only the healthy line contributed points
  assert_eq!(buffer.points.len(), 2);
  assert_relative_eq!(buffer.points[1].y, 1.0);
}

#[test]
fn test_extract_preserves_edge_order() {
  let shape = EdgeShape::new(vec![
    line_edge(DVec3::ZERO, DVec3::new(1.0, 0.0, 0.0)),
    line_edge(DVec3::ZERO, DVec3::new(0.0, 1.0, 0.0)),
  ]);
  let (buffer, stats) = extract_edges(&shape, &SamplingParams::default());
  assert_eq!(stats.edges_sampled, 2);
  assert_relative_eq!(buffer.points[1].x, 1.0);
  assert_relative_eq!(buffer.points[3].y, 1.0);
}

#[test]
fn test_segment_pairing() {
  // TAU * 80 * 0.5 rounds past the cap, so the circle gets 100 points
  let shape = EdgeShape::new(vec![circle_edge(1.0)]);
  let (buffer, stats) = extract_edges(&shape, &SamplingParams::default());
  assert_eq!(buffer.points.len(), 2 * 99);
  assert_eq!(stats.points_emitted, 198);
  assert_eq!(buffer.segment_count(), 99);
}

#[test]
fn test_polyline_covers_interval() {
  let p0 = DVec3::ZERO;
  let p3 = DVec3::new(3.0, 0.0, 0.0);
  let edge = BrepEdge::over_full_domain(
    Arc::new(CubicBezier::new(
      p0,
      DVec3::new(1.0, 2.0, 0.0),
      DVec3::new(2.0, 2.0, 0.0),
      p3,
    )),
    SmallVec::new(),
  );
  let sampled = match sample_edge(0, &edge, &SamplingParams::default()) {
    Some(sampled) => sampled,
    None => panic!("bezier should survive the filters"),
  };
  assert_relative_eq!(sampled.points[0].distance(p0), 0.0, epsilon = 1.0e-12);
  let last = sampled.points.len() - 1;
  assert_relative_eq!(sampled.points[last].distance(p3), 0.0, epsilon = 1.0e-12);
}

#[test]
fn test_subset_ignores_out_of_range() {
  let shape = EdgeShape::new(vec![line_edge(DVec3::ZERO, DVec3::new(1.0, 0.0, 0.0))]);
  let (buffer, stats) = extract_edge_subset(&shape, &[0, 99], &SamplingParams::default());
  assert_eq!(stats.edges_sampled, 1);
  assert_eq!(buffer.points.len(), 2);
}
