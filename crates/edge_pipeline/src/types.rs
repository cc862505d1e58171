//! Core data types shared across the edge pipeline.

use glam::DVec3;

use crate::constants::{BYTES_PER_POINT, DRAWABLE_OVERHEAD_BYTES};

/// Category of renderable edge data.
///
/// Every drawable the pipeline produces belongs to exactly one category, and
/// every `(geometry, category)` pair owns at most one drawable slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeType {
  /// B-rep edges sampled from their backing curves.
  Original,
  /// Edges whose dihedral angle crosses the feature threshold.
  Feature,
  /// Triangle mesh wireframe edges.
  Mesh,
  /// Explicitly highlighted edges.
  Highlight,
  /// View-dependent silhouette edges.
  Silhouette,
  /// Vertex normal indicator lines.
  VertexNormal,
  /// Face normal indicator lines.
  FaceNormal,
  /// Edge-edge intersection markers.
  IntersectionMarker,
}

impl EdgeType {
  /// Number of categories.
  pub const COUNT: usize = 8;

  /// Every category in slot order.
  pub const ALL: [EdgeType; Self::COUNT] = [
    EdgeType::Original,
    EdgeType::Feature,
    EdgeType::Mesh,
    EdgeType::Highlight,
    EdgeType::Silhouette,
    EdgeType::VertexNormal,
    EdgeType::FaceNormal,
    EdgeType::IntersectionMarker,
  ];

  /// Stable slot index for per-geometry drawable arrays.
  #[inline]
  pub const fn index(self) -> usize {
    match self {
      EdgeType::Original => 0,
      EdgeType::Feature => 1,
      EdgeType::Mesh => 2,
      EdgeType::Highlight => 3,
      EdgeType::Silhouette => 4,
      EdgeType::VertexNormal => 5,
      EdgeType::FaceNormal => 6,
      EdgeType::IntersectionMarker => 7,
    }
  }

  /// Whether generation for this category runs on worker threads.
  ///
  /// Curve sampling over whole shapes and intersection search are heavy;
  /// mesh-derived lines and highlights are cheap enough to build inline.
  #[inline]
  pub const fn is_async(self) -> bool {
    matches!(
      self,
      EdgeType::Original | EdgeType::Feature | EdgeType::IntersectionMarker
    )
  }

  /// Whether this category is derived from the triangle mesh.
  #[inline]
  pub const fn is_mesh_derived(self) -> bool {
    matches!(
      self,
      EdgeType::Mesh | EdgeType::VertexNormal | EdgeType::FaceNormal
    )
  }
}

/// Per-category visibility switches.
///
/// Flags decide attachment only. Toggling a flag never discards generated
/// data; caches survive until a parameter change invalidates them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct DisplayFlags {
  pub original: bool,
  pub feature: bool,
  pub mesh: bool,
  pub highlight: bool,
  pub silhouette: bool,
  pub vertex_normals: bool,
  pub face_normals: bool,
  pub intersections: bool,
  /// Restrict display to the selected geometry set.
  pub only_selected: bool,
  /// Fast mode: draw silhouettes in place of original edges.
  pub silhouette_only: bool,
}

impl DisplayFlags {
  /// Whether drawables of the given category should be visible.
  ///
  /// `silhouette_only` substitutes silhouettes for original edges without
  /// touching the stored `original`/`silhouette` switches.
  pub fn shows(&self, edge_type: EdgeType) -> bool {
    match edge_type {
      EdgeType::Original => self.original && !self.silhouette_only,
      EdgeType::Feature => self.feature,
      EdgeType::Mesh => self.mesh,
      EdgeType::Highlight => self.highlight,
      EdgeType::Silhouette => self.silhouette || self.silhouette_only,
      EdgeType::VertexNormal => self.vertex_normals,
      EdgeType::FaceNormal => self.face_normals,
      EdgeType::IntersectionMarker => self.intersections,
    }
  }

  /// Flip the switch backing the given category.
  pub fn set(&mut self, edge_type: EdgeType, on: bool) {
    match edge_type {
      EdgeType::Original => self.original = on,
      EdgeType::Feature => self.feature = on,
      EdgeType::Mesh => self.mesh = on,
      EdgeType::Highlight => self.highlight = on,
      EdgeType::Silhouette => self.silhouette = on,
      EdgeType::VertexNormal => self.vertex_normals = on,
      EdgeType::FaceNormal => self.face_normals = on,
      EdgeType::IntersectionMarker => self.intersections = on,
    }
  }

  /// True when any mesh-derived category is switched on.
  pub fn any_mesh_derived(&self) -> bool {
    self.mesh || self.vertex_normals || self.face_normals
  }
}

/// Stroke pattern for line drawables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LineStyle {
  #[default]
  Solid,
  Dashed,
  Dotted,
  DashDot,
}

/// Geometric glyph used for intersection markers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MarkerShape {
  Sphere,
  #[default]
  Point,
  Cross,
  Cube,
}

/// Render appearance of a drawable, independent of its geometry.
///
/// Changing appearance re-styles an existing drawable; it never requires
/// regenerating point data.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Appearance {
  /// RGBA color, each channel in [0, 1].
  pub color: [f32; 4],
  /// Line width (or marker size) in pixels.
  pub width: f32,
  /// Stroke pattern.
  pub style: LineStyle,
}

impl Default for Appearance {
  fn default() -> Self {
    Self {
      color: [1.0, 1.0, 1.0, 1.0],
      width: 1.0,
      style: LineStyle::Solid,
    }
  }
}

impl Appearance {
  /// Default appearance for each edge category.
  pub fn for_edge_type(edge_type: EdgeType) -> Self {
    match edge_type {
      EdgeType::Original => Self::default(),
      EdgeType::Feature => Self {
        color: [1.0, 0.0, 0.0, 1.0],
        width: 2.0,
        ..Self::default()
      },
      EdgeType::Mesh => Self {
        color: [0.0, 0.0, 0.0, 1.0],
        width: 1.0,
        ..Self::default()
      },
      EdgeType::Highlight => Self {
        color: [1.0, 0.8, 0.0, 1.0],
        width: 3.0,
        ..Self::default()
      },
      EdgeType::Silhouette => Self {
        color: [0.0, 0.0, 0.0, 1.0],
        width: 2.0,
        ..Self::default()
      },
      EdgeType::VertexNormal => Self {
        color: [0.0, 0.8, 0.2, 1.0],
        width: 1.0,
        ..Self::default()
      },
      EdgeType::FaceNormal => Self {
        color: [0.2, 0.4, 1.0, 1.0],
        width: 1.0,
        ..Self::default()
      },
      EdgeType::IntersectionMarker => Self {
        color: [1.0, 0.0, 0.0, 1.0],
        width: 3.0,
        ..Self::default()
      },
    }
  }

  pub fn with_color(mut self, color: [f32; 4]) -> Self {
    self.color = color;
    self
  }

  pub fn with_width(mut self, width: f32) -> Self {
    self.width = width;
    self
  }

  pub fn with_style(mut self, style: LineStyle) -> Self {
    self.style = style;
    self
  }
}

/// Flat line-segment soup.
///
/// Points are stored as consecutive pairs: segment `i` spans
/// `points[2i] .. points[2i + 1]`. Polylines are flattened by duplicating
/// interior points.
#[derive(Clone, Default, PartialEq)]
pub struct SegmentBuffer {
  /// Segment endpoints, two per segment.
  pub points: Vec<DVec3>,
}

impl SegmentBuffer {
  pub fn new() -> Self {
    Self { points: Vec::new() }
  }

  pub fn with_capacity(segments: usize) -> Self {
    Self {
      points: Vec::with_capacity(segments * 2),
    }
  }

  /// Number of complete segments.
  #[inline]
  pub fn segment_count(&self) -> usize {
    self.points.len() / 2
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.points.is_empty()
  }

  /// Append one segment.
  #[inline]
  pub fn push_segment(&mut self, a: DVec3, b: DVec3) {
    self.points.push(a);
    self.points.push(b);
  }

  /// Append a polyline as segments, duplicating interior points.
  pub fn push_polyline(&mut self, polyline: &[DVec3]) {
    for pair in polyline.windows(2) {
      self.points.push(pair[0]);
      self.points.push(pair[1]);
    }
  }

  /// Append all segments from another buffer.
  pub fn append(&mut self, other: &SegmentBuffer) {
    self.points.extend_from_slice(&other.points);
  }

  /// Clear stored points but retain allocated capacity for reuse.
  pub fn clear(&mut self) {
    self.points.clear();
  }

  /// Keep every `stride`-th segment, dropping the rest.
  ///
  /// Used by LOD generation to thin coarse levels. A stride of 0 or 1
  /// returns the buffer unchanged.
  pub fn thinned(&self, stride: usize) -> SegmentBuffer {
    if stride <= 1 {
      return self.clone();
    }
    let mut out = SegmentBuffer::with_capacity(self.segment_count() / stride + 1);
    for (i, pair) in self.points.chunks_exact(2).enumerate() {
      if i % stride == 0 {
        out.push_segment(pair[0], pair[1]);
      }
    }
    out
  }

  /// Estimated resident size in bytes.
  pub fn memory_estimate_bytes(&self) -> usize {
    self.points.len() * BYTES_PER_POINT + DRAWABLE_OVERHEAD_BYTES
  }
}

impl std::fmt::Debug for SegmentBuffer {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SegmentBuffer")
      .field("segments", &self.segment_count())
      .finish()
  }
}

/// Generation counter for stale-work detection.
///
/// Parameter changes increment the epoch; results that come back carrying an
/// older epoch are discarded on arrival instead of overwriting newer state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Epoch(pub u64);

impl Epoch {
  pub fn new() -> Self {
    Self(0)
  }

  /// Advance to the next epoch, returning the new value.
  pub fn increment(&mut self) -> Epoch {
    self.0 += 1;
    *self
  }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
