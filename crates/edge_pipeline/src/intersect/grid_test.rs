use glam::DVec3;

use super::*;

fn aabb(min: (f64, f64, f64), max: (f64, f64, f64)) -> Aabb {
  Aabb::new(
    DVec3::new(min.0, min.1, min.2),
    DVec3::new(max.0, max.1, max.2),
  )
}

#[test]
fn test_empty_input_no_pairs() {
  let grid = SpatialGrid::build(&[]);
  assert_eq!(grid.cell_count(), 1);
  assert!(grid.candidate_pairs(&[]).is_empty());
}

#[test]
fn test_tight_cluster_lands_in_one_cell() {
  let boxes: Vec<Aabb> = (0..16).map(|_| aabb((0.0, 0.0, 0.0), (1.0, 1.0, 1.0))).collect();
  let grid = SpatialGrid::build(&boxes);
  assert_eq!(grid.dims(), [1, 1, 1]);
  assert_eq!(grid.candidate_pairs(&boxes).len(), 16 * 15 / 2);
}

#[test]
fn test_same_cell_pairs_skip_overlap_check() {
  // Disjoint boxes sharing a cell still pair up
  let boxes = vec![
    aabb((0.0, 0.0, 0.0), (0.1, 1.0, 1.0)),
    aabb((0.45, 0.0, 0.0), (0.55, 1.0, 1.0)),
    aabb((0.9, 0.0, 0.0), (1.0, 1.0, 1.0)),
  ];
  let grid = SpatialGrid::build(&boxes);
  assert_eq!(grid.dims(), [1, 1, 1]);
  let mut pairs = grid.candidate_pairs(&boxes);
  pairs.sort_unstable();
  assert_eq!(pairs, vec![(0, 1), (0, 2), (1, 2)]);
}

#[test]
fn test_chain_yields_consecutive_pairs() {
  // 32 boxes along x, each overlapping only its successor
  let boxes: Vec<Aabb> = (0..32)
    .map(|i| {
      let x = 10.0 * i as f64;
      aabb((x, 0.0, 0.0), (x + 12.0, 1.0, 1.0))
    })
    .collect();
  let grid = SpatialGrid::build(&boxes);
  assert_eq!(grid.dims()[0], 32);

  let mut pairs = grid.candidate_pairs(&boxes);
  pairs.sort_unstable();
  let expected: Vec<(usize, usize)> = (0..31).map(|i| (i, i + 1)).collect();
  assert_eq!(pairs, expected);
}

#[test]
fn test_distant_boxes_never_pair() {
  let boxes: Vec<Aabb> = (0..16)
    .map(|i| {
      let x = 1000.0 * i as f64;
      aabb((x, 0.0, 0.0), (x + 1.0, 1.0, 1.0))
    })
    .collect();
  let grid = SpatialGrid::build(&boxes);
  assert!(grid.candidate_pairs(&boxes).is_empty());
}
