//! Geometry containers consumed by the pipeline.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use glam::DVec3;
use smallvec::SmallVec;

use crate::aabb::Aabb;
use crate::curve::{AdjacentFace, CurveKind, ParametricCurve};

/// Unique identifier for a piece of geometry registered with the pipeline.
///
/// Ids are process-unique and never reused. Id 0 is never issued, so it can
/// serve as a sentinel in host-side tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeometryId(u64);

impl GeometryId {
  /// Allocate a fresh id.
  pub fn new() -> Self {
    static NEXT_ID: AtomicU64 = AtomicU64::new(1);
    Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
  }

  /// Raw id value.
  pub fn raw(&self) -> u64 {
    self.0
  }
}

impl Default for GeometryId {
  fn default() -> Self {
    Self::new()
  }
}

/// One boundary-representation edge.
///
/// Carries the backing curve, the parameter interval this edge covers, the
/// faces bordering it (0, 1 or 2 for manifold input) and a precomputed chord
/// length between the interval endpoints.
#[derive(Clone)]
pub struct BrepEdge {
  /// Backing parametric curve.
  pub curve: Arc<dyn ParametricCurve>,
  /// Parameter interval start.
  pub first: f64,
  /// Parameter interval end.
  pub last: f64,
  /// Straight-line distance between the interval endpoints.
  ///
  /// 0.0 when an endpoint failed to evaluate; such edges are dropped by the
  /// degenerate filter before sampling.
  pub chord_length: f64,
  /// Curve family tag, cached from the curve.
  pub kind: CurveKind,
  /// Faces bordering this edge.
  pub faces: SmallVec<[AdjacentFace; 2]>,
}

impl BrepEdge {
  /// Build an edge over `[first, last]` of the given curve.
  pub fn new(
    curve: Arc<dyn ParametricCurve>,
    first: f64,
    last: f64,
    faces: SmallVec<[AdjacentFace; 2]>,
  ) -> Self {
    let chord_length = match (curve.point_at(first), curve.point_at(last)) {
      (Ok(a), Ok(b)) => a.distance(b),
      _ => 0.0,
    };
    let kind = curve.kind();
    Self {
      curve,
      first,
      last,
      chord_length,
      kind,
      faces,
    }
  }

  /// Build an edge spanning the curve's whole domain.
  pub fn over_full_domain(
    curve: Arc<dyn ParametricCurve>,
    faces: SmallVec<[AdjacentFace; 2]>,
  ) -> Self {
    let (first, last) = curve.domain();
    Self::new(curve, first, last, faces)
  }

  /// Width of the parameter interval.
  #[inline]
  pub fn param_length(&self) -> f64 {
    (self.last - self.first).abs()
  }

  /// Parameter at the middle of the interval.
  #[inline]
  pub fn midpoint_parameter(&self) -> f64 {
    (self.first + self.last) * 0.5
  }
}

impl fmt::Debug for BrepEdge {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("BrepEdge")
      .field("kind", &self.kind)
      .field("first", &self.first)
      .field("last", &self.last)
      .field("chord_length", &self.chord_length)
      .field("faces", &self.faces.len())
      .finish()
  }
}

/// Indexed triangle mesh.
#[derive(Clone, Default)]
pub struct TriangleMesh {
  /// Vertex positions.
  pub vertices: Vec<DVec3>,
  /// Per-vertex normals. Either empty (no normals) or one per vertex.
  pub normals: Vec<DVec3>,
  /// Triangles as vertex index triples.
  pub triangles: Vec<[u32; 3]>,
}

impl TriangleMesh {
  pub fn new(vertices: Vec<DVec3>, triangles: Vec<[u32; 3]>) -> Self {
    Self {
      vertices,
      normals: Vec::new(),
      triangles,
    }
  }

  pub fn with_normals(mut self, normals: Vec<DVec3>) -> Self {
    self.normals = normals;
    self
  }

  #[inline]
  pub fn triangle_count(&self) -> usize {
    self.triangles.len()
  }

  /// Whether the mesh carries one normal per vertex.
  #[inline]
  pub fn has_normals(&self) -> bool {
    !self.normals.is_empty() && self.normals.len() == self.vertices.len()
  }

  /// Tight box around the vertices.
  pub fn bounding_box(&self) -> Aabb {
    Aabb::from_points(self.vertices.iter().copied())
  }
}

impl fmt::Debug for TriangleMesh {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("TriangleMesh")
      .field("vertices", &self.vertices.len())
      .field("triangles", &self.triangles.len())
      .field("has_normals", &self.has_normals())
      .finish()
  }
}

/// A shape handed to the pipeline: B-rep edges plus an optional mesh.
#[derive(Clone, Debug)]
pub struct EdgeShape {
  pub id: GeometryId,
  pub edges: Vec<BrepEdge>,
  pub mesh: Option<TriangleMesh>,
}

impl EdgeShape {
  pub fn new(edges: Vec<BrepEdge>) -> Self {
    Self {
      id: GeometryId::new(),
      edges,
      mesh: None,
    }
  }

  pub fn with_mesh(mut self, mesh: TriangleMesh) -> Self {
    self.mesh = Some(mesh);
    self
  }

  #[inline]
  pub fn edge_count(&self) -> usize {
    self.edges.len()
  }

  /// Approximate bounds of the shape.
  ///
  /// Uses the mesh when present, otherwise a coarse sweep over every edge.
  /// Returns an invalid box for an empty shape.
  pub fn bounding_box(&self) -> Aabb {
    if let Some(mesh) = &self.mesh {
      if !mesh.vertices.is_empty() {
        return mesh.bounding_box();
      }
    }

    let mut aabb = Aabb::empty();
    for edge in &self.edges {
      // A handful of probes per edge is enough for camera-distance queries
      for i in 0..=4 {
        let t = edge.first + (edge.last - edge.first) * i as f64 / 4.0;
        if let Ok(point) = edge.curve.point_at(t) {
          aabb.encapsulate(point);
        }
      }
    }
    aabb
  }
}
