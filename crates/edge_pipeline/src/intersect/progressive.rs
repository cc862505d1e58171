//! Resumable batched intersection search.
//!
//! Same search as [`super::engine`], but candidate pairs are consumed in
//! fixed-size batches so a driver can publish partial results and honor a
//! cancellation request between batches.

use glam::DVec3;
use web_time::Instant;

use crate::constants::INTERSECTION_BATCH_SIZE;
use crate::intersect::engine::{
  candidate_pairs, closest_approach, is_duplicate, probe_edges, resolve_tolerance,
  IntersectionParams, IntersectionResult, ProbedEdge,
};
use crate::shape::EdgeShape;

/// Progress scale: preparation ends at 35, batches fill up to 95, and a
/// finished run reports 100.
const BATCH_PROGRESS_START: u8 = 35;
const BATCH_PROGRESS_SPAN: u8 = 60;

/// An intersection search that advances one batch at a time.
pub struct ProgressiveIntersection {
  probed: Vec<ProbedEdge>,
  pairs: Vec<(usize, usize)>,
  tolerance: f64,
  cursor: usize,
  points: Vec<DVec3>,
  cancelled: bool,
  started: Instant,
}

impl ProgressiveIntersection {
  /// Prepare the search: probe edges, resolve the tolerance and generate
  /// candidate pairs.
  pub fn new(shape: &EdgeShape, params: &IntersectionParams) -> Self {
    let started = Instant::now();
    let probed = probe_edges(shape, params);
    let tolerance = resolve_tolerance(params.tolerance, &probed);
    let pairs = candidate_pairs(&probed, tolerance);
    Self {
      probed,
      pairs,
      tolerance,
      cursor: 0,
      points: Vec::new(),
      cancelled: false,
      started,
    }
  }

  /// The tolerance the search uses, after adaptive resolution.
  pub fn tolerance(&self) -> f64 {
    self.tolerance
  }

  pub fn total_pairs(&self) -> usize {
    self.pairs.len()
  }

  pub fn pairs_tested(&self) -> usize {
    self.cursor
  }

  /// Whether the search has consumed every candidate or was cancelled.
  pub fn is_done(&self) -> bool {
    self.cancelled || self.cursor >= self.pairs.len()
  }

  /// Points accepted so far.
  pub fn points(&self) -> &[DVec3] {
    &self.points
  }

  /// Stop the search; remaining candidates are abandoned.
  pub fn cancel(&mut self) {
    self.cancelled = true;
  }

  /// Process up to one batch of candidate pairs.
  ///
  /// Returns how many new points the batch accepted. Does nothing once the
  /// search is done.
  pub fn step(&mut self) -> usize {
    if self.is_done() {
      return 0;
    }
    let end = (self.cursor + INTERSECTION_BATCH_SIZE).min(self.pairs.len());
    let mut found = 0;
    for &(i, j) in &self.pairs[self.cursor..end] {
      let (distance, point) =
        closest_approach(&self.probed[i], &self.probed[j], self.tolerance);
      if distance < self.tolerance && !is_duplicate(&self.points, point, self.tolerance) {
        self.points.push(point);
        found += 1;
      }
    }
    self.cursor = end;
    found
  }

  /// Progress on the coordinator's percent scale.
  pub fn progress_percent(&self) -> u8 {
    if self.cursor >= self.pairs.len() && !self.cancelled {
      return 100;
    }
    let span = BATCH_PROGRESS_SPAN as usize * self.cursor / self.pairs.len().max(1);
    BATCH_PROGRESS_START + span as u8
  }

  /// Finish the search and package the result.
  ///
  /// A cancelled run with untested candidates is marked partial.
  pub fn finish(self) -> IntersectionResult {
    let partial = self.cancelled && self.cursor < self.pairs.len();
    IntersectionResult {
      points: self.points,
      pairs_tested: self.cursor,
      partial,
      tolerance: self.tolerance,
      elapsed_us: self.started.elapsed().as_micros() as u64,
    }
  }
}

#[cfg(test)]
#[path = "progressive_test.rs"]
mod progressive_test;
