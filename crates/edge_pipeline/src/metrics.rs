//! Engine-agnostic metrics collection for edge pipeline statistics.
//!
//! Feature-gated and runtime-toggled to ensure zero overhead when disabled.
//!
//! # Usage
//!
//! ```ignore
//! use edge_pipeline::metrics::{PipelineMetrics, COLLECT_METRICS};
//!
//! // Compile with --features metrics
//! // Runtime toggle:
//! COLLECT_METRICS.store(false, Ordering::Relaxed);
//!
//! // Record a sampling run:
//! metrics.record_sampling(&stats);
//!
//! // Track a committed buffer:
//! metrics.record_buffer(EdgeType::Original, &buffer);
//! ```

use std::collections::VecDeque;
#[cfg(feature = "metrics")]
use std::sync::atomic::Ordering;
use std::sync::atomic::AtomicBool;

use crate::intersect::IntersectionResult;
use crate::sampler::SamplingStats;
use crate::types::{EdgeType, SegmentBuffer};

/// Runtime toggle for metrics collection.
/// Set to false to disable metrics gathering at runtime.
pub static COLLECT_METRICS: AtomicBool = AtomicBool::new(true);

/// Check if metrics collection is enabled (both compile-time and runtime).
#[inline]
pub fn is_enabled() -> bool {
  #[cfg(feature = "metrics")]
  {
    COLLECT_METRICS.load(Ordering::Relaxed)
  }
  #[cfg(not(feature = "metrics"))]
  {
    false
  }
}

/// Rolling window for storing recent values (e.g., timing history).
#[derive(Debug, Clone)]
pub struct RollingWindow<T> {
  buffer: VecDeque<T>,
  capacity: usize,
}

impl<T> RollingWindow<T> {
  /// Create a new rolling window with the given capacity.
  pub fn new(capacity: usize) -> Self {
    Self {
      buffer: VecDeque::with_capacity(capacity),
      capacity,
    }
  }

  /// Push a new value, evicting the oldest if at capacity.
  pub fn push(&mut self, value: T) {
    if self.buffer.len() >= self.capacity {
      self.buffer.pop_front();
    }
    self.buffer.push_back(value);
  }

  /// Get the number of values in the window.
  pub fn len(&self) -> usize {
    self.buffer.len()
  }

  /// Check if the window is empty.
  pub fn is_empty(&self) -> bool {
    self.buffer.is_empty()
  }

  /// Clear all values.
  pub fn clear(&mut self) {
    self.buffer.clear();
  }

  /// Iterate over values (oldest to newest).
  pub fn iter(&self) -> impl Iterator<Item = &T> {
    self.buffer.iter()
  }

  /// Get the most recent value.
  pub fn last(&self) -> Option<&T> {
    self.buffer.back()
  }

  /// Get all values as a slice (for histogram rendering).
  pub fn as_slice(&self) -> &VecDeque<T> {
    &self.buffer
  }
}

impl<T: Copy + Default + std::ops::Add<Output = T>> RollingWindow<T> {
  /// Compute the sum of all values.
  pub fn sum(&self) -> T {
    self.buffer.iter().copied().fold(T::default(), |acc, x| acc + x)
  }
}

impl RollingWindow<u64> {
  /// Compute the average of all values.
  pub fn average(&self) -> f64 {
    if self.buffer.is_empty() {
      0.0
    } else {
      self.sum() as f64 / self.buffer.len() as f64
    }
  }

  /// Get min and max values.
  pub fn min_max(&self) -> Option<(u64, u64)> {
    let min = *self.buffer.iter().min()?;
    let max = *self.buffer.iter().max()?;
    Some((min, max))
  }
}

impl Default for RollingWindow<u64> {
  fn default() -> Self {
    Self::new(128) // 128 recent generation runs
  }
}

/// Pipeline-level statistics updated as buffers are generated and dropped.
#[derive(Debug, Clone)]
pub struct PipelineMetrics {
  // Buffer distribution
  /// Count of live buffers per edge category (index = `EdgeType::index()`).
  pub buffers_per_type: [u32; EdgeType::COUNT],
  /// Segment count per edge category.
  pub segments_per_type: [u64; EdgeType::COUNT],

  // Memory
  /// Approximate resident buffer memory across all categories.
  pub buffer_memory_bytes: u64,

  // Timing
  /// Rolling window of sampling run times in microseconds.
  pub sample_timings: RollingWindow<u64>,
  /// Rolling window of intersection search times in microseconds.
  pub intersection_timings: RollingWindow<u64>,

  // Last run snapshot (for UI)
  /// Last generation run time in microseconds.
  pub last_generation_us: u64,
  /// Edges dropped by filters or evaluation failure in the last run.
  pub last_edges_skipped: u64,
  /// Edge pairs distance-tested in the last intersection search.
  pub last_pairs_tested: u64,
  /// Total buffers generated this session.
  pub total_generations: u64,
}

impl Default for PipelineMetrics {
  fn default() -> Self {
    Self {
      buffers_per_type: [0; EdgeType::COUNT],
      segments_per_type: [0; EdgeType::COUNT],
      buffer_memory_bytes: 0,
      sample_timings: RollingWindow::new(128),
      intersection_timings: RollingWindow::new(128),
      last_generation_us: 0,
      last_edges_skipped: 0,
      last_pairs_tested: 0,
      total_generations: 0,
    }
  }
}

impl PipelineMetrics {
  /// Create new metrics with default values.
  pub fn new() -> Self {
    Self::default()
  }

  /// Reset all metrics to zero.
  pub fn reset(&mut self) {
    self.buffers_per_type.fill(0);
    self.segments_per_type.fill(0);
    self.buffer_memory_bytes = 0;
    self.sample_timings.clear();
    self.intersection_timings.clear();
    self.last_generation_us = 0;
    self.last_edges_skipped = 0;
    self.last_pairs_tested = 0;
    // Don't reset total_generations - it's cumulative
  }

  /// Record the outcome of one sampling run.
  pub fn record_sampling(&mut self, stats: &SamplingStats) {
    if is_enabled() {
      self.sample_timings.push(stats.elapsed_us);
      self.last_generation_us = stats.elapsed_us;
      self.last_edges_skipped = stats.edges_skipped as u64;
    }
  }

  /// Record the outcome of one intersection search.
  pub fn record_intersection(&mut self, result: &IntersectionResult) {
    if is_enabled() {
      self.intersection_timings.push(result.elapsed_us);
      self.last_generation_us = result.elapsed_us;
      self.last_pairs_tested = result.pairs_tested as u64;
    }
  }

  /// Record a committed buffer (segment count, memory).
  pub fn record_buffer(&mut self, edge_type: EdgeType, buffer: &SegmentBuffer) {
    if !is_enabled() {
      return;
    }

    let idx = edge_type.index();
    self.buffers_per_type[idx] += 1;
    self.segments_per_type[idx] += buffer.segment_count() as u64;
    self.buffer_memory_bytes += buffer.memory_estimate_bytes() as u64;
    self.total_generations += 1;
  }

  /// Remove buffer statistics (when a drawable is detached or replaced).
  pub fn remove_buffer(&mut self, edge_type: EdgeType, buffer: &SegmentBuffer) {
    if !is_enabled() {
      return;
    }

    let idx = edge_type.index();
    self.buffers_per_type[idx] = self.buffers_per_type[idx].saturating_sub(1);
    self.segments_per_type[idx] =
      self.segments_per_type[idx].saturating_sub(buffer.segment_count() as u64);
    self.buffer_memory_bytes = self
      .buffer_memory_bytes
      .saturating_sub(buffer.memory_estimate_bytes() as u64);
  }

  /// Get the total live buffer count across all categories.
  pub fn total_buffers(&self) -> u32 {
    self.buffers_per_type.iter().sum()
  }

  /// Get the total segment count across all categories.
  pub fn total_segments(&self) -> u64 {
    self.segments_per_type.iter().sum()
  }

  /// Get average sampling run time in microseconds.
  pub fn avg_sample_timing_us(&self) -> f64 {
    self.sample_timings.average()
  }

  /// Get average intersection search time in microseconds.
  pub fn avg_intersection_timing_us(&self) -> f64 {
    self.intersection_timings.average()
  }

  /// Buffer memory as megabytes.
  pub fn buffer_memory_mb(&self) -> f64 {
    self.buffer_memory_bytes as f64 / 1_048_576.0
  }
}

#[cfg(all(test, feature = "metrics"))]
mod tests {
  use glam::DVec3;

  use super::*;

  fn segment_buffer(segments: usize) -> SegmentBuffer {
    let mut buffer = SegmentBuffer::new();
    for i in 0..segments {
      buffer.push_segment(DVec3::ZERO, DVec3::new(i as f64 + 1.0, 0.0, 0.0));
    }
    buffer
  }

  #[test]
  fn test_rolling_window() {
    let mut window = RollingWindow::new(3);
    assert!(window.is_empty());

    window.push(10u64);
    window.push(20);
    window.push(30);
    assert_eq!(window.len(), 3);
    assert_eq!(window.sum(), 60);
    assert_eq!(window.average(), 20.0);

    // Push one more, oldest should be evicted
    window.push(40);
    assert_eq!(window.len(), 3);
    assert_eq!(window.sum(), 90);
    assert_eq!(window.average(), 30.0);

    let (min, max) = match window.min_max() {
      Some(bounds) => bounds,
      None => panic!("window is not empty"),
    };
    assert_eq!(min, 20);
    assert_eq!(max, 40);
  }

  #[test]
  fn test_buffer_accounting() {
    let mut metrics = PipelineMetrics::new();
    let original = segment_buffer(10);
    let feature = segment_buffer(4);

    metrics.record_buffer(EdgeType::Original, &original);
    metrics.record_buffer(EdgeType::Feature, &feature);

    assert_eq!(metrics.buffers_per_type[EdgeType::Original.index()], 1);
    assert_eq!(metrics.segments_per_type[EdgeType::Feature.index()], 4);
    assert_eq!(metrics.total_buffers(), 2);
    assert_eq!(metrics.total_segments(), 14);
    assert_eq!(
      metrics.buffer_memory_bytes,
      (original.memory_estimate_bytes() + feature.memory_estimate_bytes()) as u64
    );
    assert_eq!(metrics.total_generations, 2);

    // Removal is symmetric except for the cumulative counter
    metrics.remove_buffer(EdgeType::Original, &original);
    assert_eq!(metrics.total_buffers(), 1);
    assert_eq!(metrics.total_segments(), 4);
    assert_eq!(metrics.total_generations, 2);
  }

  #[test]
  fn test_timing_recording() {
    let mut metrics = PipelineMetrics::new();

    let mut stats = SamplingStats::default();
    for elapsed in [1000, 2000, 3000] {
      stats.elapsed_us = elapsed;
      stats.edges_skipped = 5;
      metrics.record_sampling(&stats);
    }

    assert_eq!(metrics.sample_timings.len(), 3);
    assert_eq!(metrics.avg_sample_timing_us(), 2000.0);
    assert_eq!(metrics.last_generation_us, 3000);
    assert_eq!(metrics.last_edges_skipped, 5);
  }

  #[test]
  fn test_reset_keeps_cumulative_total() {
    let mut metrics = PipelineMetrics::new();
    metrics.record_buffer(EdgeType::Mesh, &segment_buffer(2));
    metrics.reset();

    assert_eq!(metrics.total_buffers(), 0);
    assert_eq!(metrics.buffer_memory_bytes, 0);
    assert_eq!(metrics.total_generations, 1);
  }
}
