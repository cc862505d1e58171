//! Intersection marker glyphs.
//!
//! Intersection search produces bare points; the scene draws them as small
//! line glyphs so they share the line-set drawable path with every other edge
//! category.

use edge_pipeline::types::MarkerShape;
use edge_pipeline::SegmentBuffer;
use glam::DVec3;

/// Glyph recipe for intersection markers.
///
/// Color comes from the slot's [`Appearance`](edge_pipeline::Appearance);
/// this only decides the glyph geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarkerStyle {
  pub shape: MarkerShape,
  /// Glyph extent in world units.
  pub size: f64,
}

impl Default for MarkerStyle {
  fn default() -> Self {
    Self {
      shape: MarkerShape::default(),
      size: 3.0,
    }
  }
}

impl MarkerStyle {
  pub fn with_shape(mut self, shape: MarkerShape) -> Self {
    self.shape = shape;
    self
  }

  pub fn with_size(mut self, size: f64) -> Self {
    self.size = size;
    self
  }

  /// Segments one glyph contributes.
  pub const fn segments_per_marker(&self) -> usize {
    match self.shape {
      MarkerShape::Point => 1,
      MarkerShape::Cross => 3,
      MarkerShape::Cube => 12,
      MarkerShape::Sphere => 24,
    }
  }
}

/// Build glyph segments for a set of marker points.
pub fn marker_segments(points: &[DVec3], style: MarkerStyle) -> SegmentBuffer {
  let mut buffer = SegmentBuffer::with_capacity(points.len() * style.segments_per_marker());
  for &point in points {
    push_marker(&mut buffer, point, style);
  }
  buffer
}

/// Append one glyph centered on `point`.
pub fn push_marker(buffer: &mut SegmentBuffer, point: DVec3, style: MarkerStyle) {
  let half = style.size * 0.5;
  match style.shape {
    // A zero-length segment; renderers that draw round caps show it as a dot
    MarkerShape::Point => buffer.push_segment(point, point),
    MarkerShape::Cross => {
      buffer.push_segment(point - DVec3::X * half, point + DVec3::X * half);
      buffer.push_segment(point - DVec3::Y * half, point + DVec3::Y * half);
      buffer.push_segment(point - DVec3::Z * half, point + DVec3::Z * half);
    }
    MarkerShape::Cube => push_cube(buffer, point, half),
    MarkerShape::Sphere => {
      // Three orthogonal octagon rings read as a sphere at marker scale
      push_ring(buffer, point, DVec3::X, DVec3::Y, half);
      push_ring(buffer, point, DVec3::Y, DVec3::Z, half);
      push_ring(buffer, point, DVec3::Z, DVec3::X, half);
    }
  }
}

fn push_cube(buffer: &mut SegmentBuffer, center: DVec3, half: f64) {
  let corner = |x: f64, y: f64, z: f64| center + DVec3::new(x, y, z) * half;
  let bottom = [
    corner(-1.0, -1.0, -1.0),
    corner(1.0, -1.0, -1.0),
    corner(1.0, 1.0, -1.0),
    corner(-1.0, 1.0, -1.0),
  ];
  let top = [
    corner(-1.0, -1.0, 1.0),
    corner(1.0, -1.0, 1.0),
    corner(1.0, 1.0, 1.0),
    corner(-1.0, 1.0, 1.0),
  ];
  for i in 0..4 {
    let j = (i + 1) % 4;
    buffer.push_segment(bottom[i], bottom[j]);
    buffer.push_segment(top[i], top[j]);
    buffer.push_segment(bottom[i], top[i]);
  }
}

fn push_ring(buffer: &mut SegmentBuffer, center: DVec3, u: DVec3, v: DVec3, radius: f64) {
  const SIDES: usize = 8;
  let vertex = |k: usize| {
    let angle = std::f64::consts::TAU * k as f64 / SIDES as f64;
    center + (u * angle.cos() + v * angle.sin()) * radius
  };
  for k in 0..SIDES {
    buffer.push_segment(vertex(k), vertex((k + 1) % SIDES));
  }
}
