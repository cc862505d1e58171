//! Axis-aligned bounding boxes with double precision.

use glam::DVec3;

/// Double-precision axis-aligned bounding box.
///
/// Starts inverted when built through [`Aabb::empty`] so that any point
/// encapsulated afterwards becomes the box. An inverted box reports
/// `is_valid() == false` and a zero diagonal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
  /// Minimum corner (inclusive).
  pub min: DVec3,
  /// Maximum corner (inclusive).
  pub max: DVec3,
}

impl Aabb {
  /// Create a new AABB from min and max corners.
  ///
  /// # Panics
  /// Debug-asserts that min <= max on all axes.
  pub fn new(min: DVec3, max: DVec3) -> Self {
    debug_assert!(
      min.x <= max.x && min.y <= max.y && min.z <= max.z,
      "AABB min must be <= max on all axes"
    );
    Self { min, max }
  }

  /// Create an AABB with inverted extents, ready for encapsulation.
  pub fn empty() -> Self {
    Self {
      min: DVec3::INFINITY,
      max: DVec3::NEG_INFINITY,
    }
  }

  /// Build the tight box around an iterator of points.
  pub fn from_points<I: IntoIterator<Item = DVec3>>(points: I) -> Self {
    let mut aabb = Self::empty();
    for point in points {
      aabb.encapsulate(point);
    }
    aabb
  }

  /// Whether the box holds at least one point.
  #[inline]
  pub fn is_valid(&self) -> bool {
    self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
  }

  /// Grow the box to include a point.
  #[inline]
  pub fn encapsulate(&mut self, point: DVec3) {
    self.min = self.min.min(point);
    self.max = self.max.max(point);
  }

  /// Grow the box to include another box.
  #[inline]
  pub fn encapsulate_aabb(&mut self, other: &Aabb) {
    self.min = self.min.min(other.min);
    self.max = self.max.max(other.max);
  }

  /// Return a copy expanded by `margin` on every side.
  pub fn expanded(&self, margin: f64) -> Aabb {
    Aabb {
      min: self.min - DVec3::splat(margin),
      max: self.max + DVec3::splat(margin),
    }
  }

  /// Check if this AABB overlaps with another.
  ///
  /// Boxes sharing only boundary points still count as overlapping.
  #[inline]
  pub fn overlaps(&self, other: &Aabb) -> bool {
    self.min.x <= other.max.x
      && self.max.x >= other.min.x
      && self.min.y <= other.max.y
      && self.max.y >= other.min.y
      && self.min.z <= other.max.z
      && self.max.z >= other.min.z
  }

  /// Check if this AABB contains a point.
  #[inline]
  pub fn contains_point(&self, point: DVec3) -> bool {
    point.x >= self.min.x
      && point.x <= self.max.x
      && point.y >= self.min.y
      && point.y <= self.max.y
      && point.z >= self.min.z
      && point.z <= self.max.z
  }

  /// Get the size of the AABB (max - min).
  #[inline]
  pub fn size(&self) -> DVec3 {
    self.max - self.min
  }

  /// Get the center of the AABB.
  #[inline]
  pub fn center(&self) -> DVec3 {
    (self.min + self.max) * 0.5
  }

  /// Corner-to-corner length, 0.0 for an invalid box.
  #[inline]
  pub fn diagonal(&self) -> f64 {
    if self.is_valid() {
      self.size().length()
    } else {
      0.0
    }
  }
}

impl Default for Aabb {
  fn default() -> Self {
    Self::empty()
  }
}
