//! Intersection search benchmarks.
//!
//! - **find**: full search on crossing grids of increasing size
//! - **candidates**: all-pairs versus grid-pruned candidate generation
//!   (the strategy cutoff sits at 50 edges)
//! - **progressive**: batched execution against the one-shot engine

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::DVec3;
use smallvec::smallvec;

use edge_pipeline::curve::{LineSegment, ParametricCurve};
use edge_pipeline::intersect::find_intersections;
use edge_pipeline::{BrepEdge, EdgeShape, IntersectionParams, ProgressiveIntersection};

// =============================================================================
// Edge fixtures
// =============================================================================

fn line_edge(start: DVec3, end: DVec3) -> BrepEdge {
  let curve: Arc<dyn ParametricCurve> = Arc::new(LineSegment::new(start, end));
  BrepEdge::over_full_domain(curve, smallvec![])
}

/// `n` horizontal and `n` vertical lines in the XY plane; every pair of
/// opposite orientations crosses once.
fn crossing_grid(n: usize) -> EdgeShape {
  let extent = n as f64;
  let mut edges = Vec::with_capacity(2 * n);
  for i in 0..n {
    let offset = i as f64 + 0.5;
    edges.push(line_edge(
      DVec3::new(0.0, offset, 0.0),
      DVec3::new(extent, offset, 0.0),
    ));
    edges.push(line_edge(
      DVec3::new(offset, 0.0, 0.0),
      DVec3::new(offset, extent, 0.0),
    ));
  }
  EdgeShape::new(edges)
}

/// Deterministic scattered line field with few contacts.
fn scattered_lines(count: usize, spread: f64) -> EdgeShape {
  let edges = (0..count as u32)
    .map(|i| {
      let start = DVec3::new(
        hash_unit(i, 0) * spread,
        hash_unit(i, 1) * spread,
        hash_unit(i, 2) * spread,
      );
      let direction = DVec3::new(
        hash_unit(i, 3) - 0.5,
        hash_unit(i, 4) - 0.5,
        hash_unit(i, 5) - 0.5,
      );
      line_edge(start, start + direction * 2.0)
    })
    .collect();
  EdgeShape::new(edges)
}

/// Hash to a float in [0, 1).
fn hash_unit(index: u32, lane: u32) -> f64 {
  let mut h = index.wrapping_mul(0x85eb_ca6b) ^ lane.wrapping_mul(0xc2b2_ae35);
  h ^= h >> 15;
  h = h.wrapping_mul(0x27d4_eb2d);
  h ^= h >> 13;
  (h as f64) / (u32::MAX as f64 + 1.0)
}

// =============================================================================
// Search benchmarks
// =============================================================================

fn bench_find_intersections(c: &mut Criterion) {
  let mut group = c.benchmark_group("intersect/find");
  let params = IntersectionParams::default().with_tolerance(0.05);

  for n in [10, 30] {
    let shape = crossing_grid(n);
    group.bench_with_input(BenchmarkId::new("crossing_grid", 2 * n), &n, |b, _| {
      b.iter(|| find_intersections(black_box(&shape), black_box(&params)))
    });
  }

  group.finish();
}

fn bench_candidate_strategies(c: &mut Criterion) {
  let mut group = c.benchmark_group("intersect/candidates");
  let params = IntersectionParams::default().with_tolerance(0.01);

  // 32 edges stays on the all-pairs path; the larger fields go through the
  // uniform grid
  for count in [32, 128, 512] {
    let shape = scattered_lines(count, 40.0);
    group.bench_with_input(BenchmarkId::new("scattered", count), &count, |b, _| {
      b.iter(|| find_intersections(black_box(&shape), black_box(&params)))
    });
  }

  group.finish();
}

fn bench_progressive(c: &mut Criterion) {
  let mut group = c.benchmark_group("intersect/progressive");
  let params = IntersectionParams::default().with_tolerance(0.05);
  // 40 edges, 780 candidate pairs
  let shape = crossing_grid(20);

  group.bench_function("stepped_40_edges", |b| {
    b.iter(|| {
      let mut search = ProgressiveIntersection::new(black_box(&shape), black_box(&params));
      while !search.is_done() {
        search.step();
      }
      search.finish()
    })
  });

  group.bench_function("one_shot_40_edges", |b| {
    b.iter(|| find_intersections(black_box(&shape), black_box(&params)))
  });

  group.finish();
}

criterion_group!(
  intersection,
  bench_find_intersections,
  bench_candidate_strategies,
  bench_progressive,
);

criterion_main!(intersection);
