//! Level-of-detail management for sampled edges.
//!
//! Five fixed levels, generated eagerly from coarse to fine by re-sampling
//! at different density / minimum-length pairs and then thinning the result
//! by a per-level segment stride. Level selection runs against four ordered
//! distance thresholds with a hysteresis band so a camera hovering near a
//! boundary cannot make the active level flap.

use std::sync::Arc;

use glam::DVec3;
use web_time::Instant;

use crate::constants::DEFAULT_LOD_HYSTERESIS;
use crate::sampler::{extract_edges, SamplingParams};
use crate::shape::EdgeShape;
use crate::types::SegmentBuffer;

/// Detail level, coarsest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LodLevel {
  Minimal,
  Low,
  Medium,
  High,
  Maximum,
}

/// Sampling recipe for one level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LodProfile {
  pub density: f64,
  pub min_length: f64,
  /// Keep every Nth segment; 1 keeps everything.
  pub stride: usize,
}

impl LodLevel {
  pub const COUNT: usize = 5;

  /// All levels, coarsest first.
  pub const ALL: [LodLevel; Self::COUNT] = [
    LodLevel::Minimal,
    LodLevel::Low,
    LodLevel::Medium,
    LodLevel::High,
    LodLevel::Maximum,
  ];

  /// Position in [`Self::ALL`]; doubles as a detail rank.
  #[inline]
  pub const fn index(self) -> usize {
    match self {
      LodLevel::Minimal => 0,
      LodLevel::Low => 1,
      LodLevel::Medium => 2,
      LodLevel::High => 3,
      LodLevel::Maximum => 4,
    }
  }

  pub const fn profile(self) -> LodProfile {
    match self {
      LodLevel::Minimal => LodProfile {
        density: 5.0,
        min_length: 5.0,
        stride: 12,
      },
      LodLevel::Low => LodProfile {
        density: 10.0,
        min_length: 2.0,
        stride: 8,
      },
      LodLevel::Medium => LodProfile {
        density: 40.0,
        min_length: 1.0,
        stride: 4,
      },
      LodLevel::High => LodProfile {
        density: 60.0,
        min_length: 0.5,
        stride: 2,
      },
      LodLevel::Maximum => LodProfile {
        density: 80.0,
        min_length: 0.01,
        stride: 1,
      },
    }
  }
}

/// Ordered distance thresholds plus the hysteresis band.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LodThresholds {
  /// Above this the coarsest level applies.
  pub minimal: f64,
  pub low: f64,
  pub medium: f64,
  pub high: f64,
  /// How far past a boundary the distance must move before a switch.
  pub hysteresis: f64,
}

impl Default for LodThresholds {
  fn default() -> Self {
    Self {
      minimal: 1000.0,
      low: 500.0,
      medium: 200.0,
      high: 50.0,
      hysteresis: DEFAULT_LOD_HYSTERESIS,
    }
  }
}

impl LodThresholds {
  /// Plain table lookup, no hysteresis.
  pub fn select(&self, distance: f64) -> LodLevel {
    if distance > self.minimal {
      LodLevel::Minimal
    } else if distance > self.low {
      LodLevel::Low
    } else if distance > self.medium {
      LodLevel::Medium
    } else if distance > self.high {
      LodLevel::High
    } else {
      LodLevel::Maximum
    }
  }

  /// Distance above which the level's region starts.
  fn lower_bound(&self, level: LodLevel) -> f64 {
    match level {
      LodLevel::Minimal => self.minimal,
      LodLevel::Low => self.low,
      LodLevel::Medium => self.medium,
      LodLevel::High => self.high,
      LodLevel::Maximum => f64::NEG_INFINITY,
    }
  }
}

/// Size figures for one generated level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LodStats {
  pub segments: usize,
  pub points: usize,
  pub memory_bytes: usize,
  pub build_us: u64,
}

struct LodLevelData {
  buffer: Arc<SegmentBuffer>,
  build_us: u64,
}

/// All five generated levels for one shape, plus the active selection.
pub struct EdgeLodSet {
  levels: [LodLevelData; LodLevel::COUNT],
  thresholds: LodThresholds,
  center: Option<DVec3>,
  current: LodLevel,
}

impl EdgeLodSet {
  /// Distance from the camera to the shape's bounding box center.
  ///
  /// A shape without valid bounds reports 0.0 and therefore full detail.
  pub fn distance_to(shape: &EdgeShape, camera: DVec3) -> f64 {
    let bounds = shape.bounding_box();
    if bounds.is_valid() {
      camera.distance(bounds.center())
    } else {
      0.0
    }
  }

  /// Generate every level eagerly and select one for the given camera.
  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "lod::generate"))]
  pub fn generate(shape: &EdgeShape, camera: DVec3, thresholds: LodThresholds) -> Self {
    let levels = LodLevel::ALL.map(|level| {
      let started = Instant::now();
      let profile = level.profile();
      let params = SamplingParams::default()
        .with_density(profile.density)
        .with_min_length(profile.min_length);
      let (buffer, _) = extract_edges(shape, &params);
      LodLevelData {
        buffer: Arc::new(buffer.thinned(profile.stride)),
        build_us: started.elapsed().as_micros() as u64,
      }
    });

    let bounds = shape.bounding_box();
    let center = bounds.is_valid().then(|| bounds.center());
    let distance = center.map_or(0.0, |c| camera.distance(c));

    Self {
      levels,
      thresholds,
      center,
      current: thresholds.select(distance),
    }
  }

  pub fn current(&self) -> LodLevel {
    self.current
  }

  pub fn thresholds(&self) -> LodThresholds {
    self.thresholds
  }

  /// Segment buffer of one level. Buffers never change after generation.
  pub fn buffer(&self, level: LodLevel) -> &Arc<SegmentBuffer> {
    &self.levels[level.index()].buffer
  }

  pub fn current_buffer(&self) -> &Arc<SegmentBuffer> {
    self.buffer(self.current)
  }

  pub fn stats(&self, level: LodLevel) -> LodStats {
    let data = &self.levels[level.index()];
    LodStats {
      segments: data.buffer.segment_count(),
      points: data.buffer.points.len(),
      memory_bytes: data.buffer.memory_estimate_bytes(),
      build_us: data.build_us,
    }
  }

  /// Re-select for a camera position. Returns whether the level changed.
  pub fn update(&mut self, camera: DVec3) -> bool {
    let distance = self.center.map_or(0.0, |c| camera.distance(c));
    self.update_distance(distance)
  }

  /// Re-select for a known distance, honoring hysteresis.
  ///
  /// A switch to a coarser level needs the distance above the candidate's
  /// boundary by more than the band; a switch to a finer level needs it
  /// below the current level's boundary by more than the band.
  pub fn update_distance(&mut self, distance: f64) -> bool {
    let candidate = self.thresholds.select(distance);
    if candidate == self.current {
      return false;
    }

    let band = self.thresholds.hysteresis;
    let switches = if candidate.index() < self.current.index() {
      distance > self.thresholds.lower_bound(candidate) + band
    } else {
      distance < self.thresholds.lower_bound(self.current) - band
    };
    if switches {
      self.current = candidate;
    }
    switches
  }
}

#[cfg(test)]
#[path = "lod_test.rs"]
mod lod_test;
