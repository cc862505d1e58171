use std::sync::Arc;

use glam::DVec3;
use smallvec::SmallVec;

use super::*;
use crate::curve::LineSegment;
use crate::intersect::engine::find_intersections;
use crate::shape::BrepEdge;

fn line(start: DVec3, end: DVec3) -> BrepEdge {
  BrepEdge::over_full_domain(Arc::new(LineSegment::new(start, end)), SmallVec::new())
}

/// Ten isolated crossings spread along x: 20 edges, 190 candidate pairs.
fn crossing_field() -> EdgeShape {
  let mut edges = Vec::new();
  for i in 0..10 {
    let center = DVec3::new(20.0 * i as f64, 0.0, 0.0);
    edges.push(line(center - DVec3::X, center + DVec3::X));
    edges.push(line(center - DVec3::Y, center + DVec3::Y));
  }
  EdgeShape::new(edges)
}

fn params() -> IntersectionParams {
  IntersectionParams::default().with_tolerance(0.01)
}

#[test]
fn test_single_pair_completes_in_one_step() {
  let shape = EdgeShape::new(vec![
    line(-DVec3::X, DVec3::X),
    line(-DVec3::Y, DVec3::Y),
  ]);
  let mut search = ProgressiveIntersection::new(&shape, &params());
  assert_eq!(search.total_pairs(), 1);
  assert!(!search.is_done());

  assert_eq!(search.step(), 1);
  assert!(search.is_done());

  let result = search.finish();
  assert!(!result.partial);
  assert_eq!(result.points.len(), 1);
  assert_eq!(result.pairs_tested, 1);
}

#[test]
fn test_progress_runs_batch_scale() {
  let mut search = ProgressiveIntersection::new(&crossing_field(), &params());
  assert_eq!(search.total_pairs(), 190);
  assert_eq!(search.progress_percent(), 35);

  search.step();
  assert_eq!(search.pairs_tested(), 100);
  // 35 + 60 * 100 / 190
  assert_eq!(search.progress_percent(), 66);

  search.step();
  assert!(search.is_done());
  assert_eq!(search.progress_percent(), 100);
}

#[test]
fn test_cancel_marks_partial() {
  let mut search = ProgressiveIntersection::new(&crossing_field(), &params());
  search.step();
  search.cancel();

  let result = search.finish();
  assert!(result.partial);
  assert_eq!(result.pairs_tested, 100);
}

#[test]
fn test_step_after_cancel_is_a_noop() {
  let mut search = ProgressiveIntersection::new(&crossing_field(), &params());
  search.cancel();
  assert_eq!(search.step(), 0);
  assert_eq!(search.pairs_tested(), 0);
  assert!(search.finish().partial);
}

#[test]
fn test_no_candidates_is_done_immediately() {
  let shape = EdgeShape::new(vec![line(DVec3::ZERO, DVec3::X)]);
  let search = ProgressiveIntersection::new(&shape, &params());
  assert_eq!(search.total_pairs(), 0);
  assert!(search.is_done());
  assert_eq!(search.progress_percent(), 100);

  let result = search.finish();
  assert!(!result.partial);
  assert!(result.points.is_empty());
}

#[test]
fn test_matches_one_shot_search() {
  let shape = crossing_field();
  let one_shot = find_intersections(&shape, &params());

  let mut search = ProgressiveIntersection::new(&shape, &params());
  while !search.is_done() {
    search.step();
  }
  let batched = search.finish();

  assert_eq!(batched.points.len(), one_shot.points.len());
  assert_eq!(batched.pairs_tested, one_shot.pairs_tested);
}
