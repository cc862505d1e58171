//! Mesh-derived edges.
//!
//! Wireframe and boundary segments from indexed triangle meshes, plus the
//! short indicator segments that visualize vertex and face normals. These
//! run synchronously; their cost is bounded by the mesh size.

use std::collections::HashMap;

use crate::constants::DEGENERATE_NORMAL_EPS;
use crate::shape::TriangleMesh;
use crate::types::SegmentBuffer;

/// Which mesh edges to extract.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MeshEdgeMode {
  /// Every triangle edge, duplicated across shared edges.
  #[default]
  All,
  /// Only edges used by exactly one triangle.
  Boundary,
}

#[inline]
fn triangle_edges(triangle: &[u32; 3]) -> [(u32, u32); 3] {
  [
    (triangle[0], triangle[1]),
    (triangle[1], triangle[2]),
    (triangle[2], triangle[0]),
  ]
}

#[inline]
fn undirected(i: u32, j: u32) -> (u32, u32) {
  if i <= j {
    (i, j)
  } else {
    (j, i)
  }
}

/// Extract mesh edges as segment pairs.
///
/// All-edges mode emits exactly `6 * triangle_count` points for a valid
/// mesh. Triangles with out-of-range vertex indices are skipped.
pub fn extract_mesh_edges(mesh: &TriangleMesh, mode: MeshEdgeMode) -> SegmentBuffer {
  match mode {
    MeshEdgeMode::All => extract_all_edges(mesh),
    MeshEdgeMode::Boundary => extract_boundary_edges(mesh),
  }
}

fn extract_all_edges(mesh: &TriangleMesh) -> SegmentBuffer {
  let mut buffer = SegmentBuffer::with_capacity(mesh.triangle_count() * 3);
  for triangle in &mesh.triangles {
    let (Some(&a), Some(&b), Some(&c)) = (
      mesh.vertices.get(triangle[0] as usize),
      mesh.vertices.get(triangle[1] as usize),
      mesh.vertices.get(triangle[2] as usize),
    ) else {
      continue;
    };
    buffer.push_segment(a, b);
    buffer.push_segment(b, c);
    buffer.push_segment(c, a);
  }
  buffer
}

fn extract_boundary_edges(mesh: &TriangleMesh) -> SegmentBuffer {
  let mut counts: HashMap<(u32, u32), u32> =
    HashMap::with_capacity(mesh.triangle_count() * 3);
  for triangle in &mesh.triangles {
    for (i, j) in triangle_edges(triangle) {
      *counts.entry(undirected(i, j)).or_insert(0) += 1;
    }
  }

  // Second pass keeps the output in triangle order
  let mut buffer = SegmentBuffer::new();
  for triangle in &mesh.triangles {
    for (i, j) in triangle_edges(triangle) {
      if counts.get(&undirected(i, j)) != Some(&1) {
        continue;
      }
      if let (Some(&a), Some(&b)) = (
        mesh.vertices.get(i as usize),
        mesh.vertices.get(j as usize),
      ) {
        buffer.push_segment(a, b);
      }
    }
  }
  buffer
}

/// One indicator segment per vertex, from the vertex along its unit normal.
///
/// Returns an empty buffer when the mesh carries no usable normals; vertices
/// with a degenerate normal are skipped.
pub fn extract_vertex_normal_indicators(mesh: &TriangleMesh, length: f64) -> SegmentBuffer {
  if !mesh.has_normals() {
    return SegmentBuffer::new();
  }
  let mut buffer = SegmentBuffer::with_capacity(mesh.vertices.len());
  for (vertex, normal) in mesh.vertices.iter().zip(&mesh.normals) {
    let magnitude = normal.length();
    if magnitude < DEGENERATE_NORMAL_EPS {
      continue;
    }
    buffer.push_segment(*vertex, *vertex + *normal / magnitude * length);
  }
  buffer
}

/// One indicator segment per triangle, from the centroid along the face
/// normal computed from the winding order.
///
/// Degenerate triangles and triangles with out-of-range indices are skipped.
pub fn extract_face_normal_indicators(mesh: &TriangleMesh, length: f64) -> SegmentBuffer {
  let mut buffer = SegmentBuffer::with_capacity(mesh.triangle_count());
  for triangle in &mesh.triangles {
    let (Some(&a), Some(&b), Some(&c)) = (
      mesh.vertices.get(triangle[0] as usize),
      mesh.vertices.get(triangle[1] as usize),
      mesh.vertices.get(triangle[2] as usize),
    ) else {
      continue;
    };
    let cross = (b - a).cross(c - a);
    let magnitude = cross.length();
    if magnitude < DEGENERATE_NORMAL_EPS {
      continue;
    }
    let centroid = (a + b + c) / 3.0;
    buffer.push_segment(centroid, centroid + cross / magnitude * length);
  }
  buffer
}

#[cfg(test)]
#[path = "mesh_edges_test.rs"]
mod mesh_edges_test;
