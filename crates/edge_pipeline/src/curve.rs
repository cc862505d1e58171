//! Parametric curves and surface normal sources.
//!
//! The pipeline never talks to a modeling kernel directly. Edges carry a
//! [`ParametricCurve`] evaluated by parameter, and their adjacent faces carry
//! a [`SurfaceNormalSource`] queried near points on the edge. The concrete
//! shapes in this module are deterministic implementations used both by
//! callers without a kernel and by the test suite.

use std::fmt;
use std::sync::Arc;

use glam::DVec3;

use crate::constants::DEGENERATE_NORMAL_EPS;
use crate::error::{EdgeError, Result};

/// Curve family tag.
///
/// Drives per-kind sample floors; `Line` curves short-circuit to
/// endpoint-only sampling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CurveKind {
  Line,
  Circle,
  Ellipse,
  Bezier,
  BSpline,
  Other,
}

/// A curve evaluated by parameter.
///
/// Implementations must be cheap to evaluate and safe to call from rayon
/// workers. Evaluation failure is an error for the single edge being
/// processed, never for the batch.
pub trait ParametricCurve: Send + Sync {
  /// Position at parameter `t`.
  fn point_at(&self, t: f64) -> Result<DVec3>;

  /// Parameter interval `(first, last)` covering the whole curve.
  fn domain(&self) -> (f64, f64);

  /// Curve family tag.
  fn kind(&self) -> CurveKind;

  /// Whether the curve is periodic (closed).
  fn is_closed(&self) -> bool {
    false
  }
}

impl ParametricCurve for Box<dyn ParametricCurve> {
  fn point_at(&self, t: f64) -> Result<DVec3> {
    (**self).point_at(t)
  }

  fn domain(&self) -> (f64, f64) {
    (**self).domain()
  }

  fn kind(&self) -> CurveKind {
    (**self).kind()
  }

  fn is_closed(&self) -> bool {
    (**self).is_closed()
  }
}

impl ParametricCurve for Arc<dyn ParametricCurve> {
  fn point_at(&self, t: f64) -> Result<DVec3> {
    (**self).point_at(t)
  }

  fn domain(&self) -> (f64, f64) {
    (**self).domain()
  }

  fn kind(&self) -> CurveKind {
    (**self).kind()
  }

  fn is_closed(&self) -> bool {
    (**self).is_closed()
  }
}

/// Supplies surface normals near query points.
///
/// `normal_near` projects the query point onto the surface and returns the
/// surface normal at the projection. The returned vector does not have to be
/// unit length; callers normalize and reject degenerate results.
pub trait SurfaceNormalSource: Send + Sync {
  fn normal_near(&self, point: DVec3) -> Result<DVec3>;
}

impl SurfaceNormalSource for Arc<dyn SurfaceNormalSource> {
  fn normal_near(&self, point: DVec3) -> Result<DVec3> {
    (**self).normal_near(point)
  }
}

/// A face bordering a B-rep edge.
///
/// Faces whose orientation is reversed relative to their surface flip the
/// surface normal, so classification always sees outward normals.
#[derive(Clone)]
pub struct AdjacentFace {
  /// Normal provider for the face's surface.
  pub surface: Arc<dyn SurfaceNormalSource>,
  /// Face orientation is reversed relative to its surface.
  pub reversed: bool,
}

impl AdjacentFace {
  pub fn new(surface: Arc<dyn SurfaceNormalSource>) -> Self {
    Self {
      surface,
      reversed: false,
    }
  }

  pub fn reversed(mut self) -> Self {
    self.reversed = true;
    self
  }

  /// Oriented unit normal near `point`.
  ///
  /// Normals shorter than `DEGENERATE_NORMAL_EPS` are rejected; the edge they
  /// belong to is excluded from classification.
  pub fn oriented_normal_near(&self, point: DVec3) -> Result<DVec3> {
    let normal = self.surface.normal_near(point)?;
    let magnitude = normal.length();
    if magnitude < DEGENERATE_NORMAL_EPS {
      return Err(EdgeError::DegenerateNormal { magnitude });
    }
    let unit = normal / magnitude;
    Ok(if self.reversed { -unit } else { unit })
  }
}

impl fmt::Debug for AdjacentFace {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("AdjacentFace")
      .field("reversed", &self.reversed)
      .finish()
  }
}

/// Straight line segment parameterized over `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineSegment {
  pub start: DVec3,
  pub end: DVec3,
}

impl LineSegment {
  pub fn new(start: DVec3, end: DVec3) -> Self {
    Self { start, end }
  }
}

impl ParametricCurve for LineSegment {
  fn point_at(&self, t: f64) -> Result<DVec3> {
    if !t.is_finite() {
      return Err(EdgeError::CurveEvaluation { parameter: t });
    }
    Ok(self.start + (self.end - self.start) * t)
  }

  fn domain(&self) -> (f64, f64) {
    (0.0, 1.0)
  }

  fn kind(&self) -> CurveKind {
    CurveKind::Line
  }
}

/// Circle parameterized by angle over `[0, TAU]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
  pub center: DVec3,
  pub radius: f64,
  /// Unit direction at angle 0.
  pub x_axis: DVec3,
  /// Unit direction at a quarter turn.
  pub y_axis: DVec3,
}

impl Circle {
  /// Circle of `radius` around `center` in the XY plane.
  pub fn new(center: DVec3, radius: f64) -> Self {
    Self {
      center,
      radius,
      x_axis: DVec3::X,
      y_axis: DVec3::Y,
    }
  }

  /// Re-orient the circle plane; axes are normalized.
  pub fn with_axes(mut self, x_axis: DVec3, y_axis: DVec3) -> Self {
    self.x_axis = x_axis.normalize_or_zero();
    self.y_axis = y_axis.normalize_or_zero();
    self
  }
}

impl ParametricCurve for Circle {
  fn point_at(&self, t: f64) -> Result<DVec3> {
    if !t.is_finite() {
      return Err(EdgeError::CurveEvaluation { parameter: t });
    }
    Ok(
      self.center
        + self.x_axis * (self.radius * t.cos())
        + self.y_axis * (self.radius * t.sin()),
    )
  }

  fn domain(&self) -> (f64, f64) {
    (0.0, std::f64::consts::TAU)
  }

  fn kind(&self) -> CurveKind {
    CurveKind::Circle
  }

  fn is_closed(&self) -> bool {
    true
  }
}

/// Cubic bezier curve over `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubicBezier {
  pub control_points: [DVec3; 4],
}

impl CubicBezier {
  pub fn new(p0: DVec3, p1: DVec3, p2: DVec3, p3: DVec3) -> Self {
    Self {
      control_points: [p0, p1, p2, p3],
    }
  }
}

impl ParametricCurve for CubicBezier {
  fn point_at(&self, t: f64) -> Result<DVec3> {
    if !t.is_finite() {
      return Err(EdgeError::CurveEvaluation { parameter: t });
    }
    let [p0, p1, p2, p3] = self.control_points;
    let u = 1.0 - t;
    Ok(
      p0 * (u * u * u)
        + p1 * (3.0 * u * u * t)
        + p2 * (3.0 * u * t * t)
        + p3 * (t * t * t),
    )
  }

  fn domain(&self) -> (f64, f64) {
    (0.0, 1.0)
  }

  fn kind(&self) -> CurveKind {
    CurveKind::Bezier
  }
}

/// Infinite plane with a fixed normal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaneSurface {
  pub origin: DVec3,
  pub normal: DVec3,
}

impl PlaneSurface {
  pub fn new(origin: DVec3, normal: DVec3) -> Self {
    Self { origin, normal }
  }
}

impl SurfaceNormalSource for PlaneSurface {
  fn normal_near(&self, _point: DVec3) -> Result<DVec3> {
    Ok(self.normal)
  }
}

/// Sphere with radial normals.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SphereSurface {
  pub center: DVec3,
  pub radius: f64,
}

impl SphereSurface {
  pub fn new(center: DVec3, radius: f64) -> Self {
    Self { center, radius }
  }
}

impl SurfaceNormalSource for SphereSurface {
  fn normal_near(&self, point: DVec3) -> Result<DVec3> {
    let radial = point - self.center;
    // Projection onto the sphere is undefined at its center
    if radial.length_squared() < DEGENERATE_NORMAL_EPS * DEGENERATE_NORMAL_EPS {
      return Err(EdgeError::ProjectionFailed {
        x: point.x,
        y: point.y,
        z: point.z,
      });
    }
    Ok(radial)
  }
}

#[cfg(test)]
#[path = "curve_test.rs"]
mod curve_test;
