use std::sync::Arc;

use glam::DVec3;
use smallvec::smallvec;

use super::*;
use crate::curve::{AdjacentFace, Circle, LineSegment, PlaneSurface};

fn plane_face(normal: DVec3) -> AdjacentFace {
  AdjacentFace::new(Arc::new(PlaneSurface::new(DVec3::ZERO, normal)))
}

fn unit_line(faces: smallvec::SmallVec<[AdjacentFace; 2]>) -> BrepEdge {
  BrepEdge::over_full_domain(
    Arc::new(LineSegment::new(DVec3::ZERO, DVec3::new(1.0, 0.0, 0.0))),
    faces,
  )
}

fn dihedral_edge(n1: DVec3, n2: DVec3) -> BrepEdge {
  unit_line(smallvec![plane_face(n1), plane_face(n2)])
}

/// Normal 60 degrees away from +X, in the XY plane.
fn sixty_deg_normal() -> DVec3 {
  DVec3::new(0.5, 3.0f64.sqrt() / 2.0, 0.0)
}

#[test]
fn test_single_face_is_boundary() {
  let edge = unit_line(smallvec![plane_face(DVec3::Y)]);
  assert_eq!(
    classify_edge(&edge, &FeatureParams::default()),
    EdgeClass::Boundary
  );
}

#[test]
fn test_parallel_faces_are_smooth() {
  let edge = dihedral_edge(DVec3::Y, DVec3::Y);
  assert_eq!(
    classify_edge(&edge, &FeatureParams::default()),
    EdgeClass::Smooth
  );
}

#[test]
fn test_shallow_angle_is_smooth() {
  let five_deg = 5.0f64.to_radians();
  let edge = dihedral_edge(DVec3::Y, DVec3::new(five_deg.sin(), five_deg.cos(), 0.0));
  assert_eq!(
    classify_edge(&edge, &FeatureParams::default()),
    EdgeClass::Smooth
  );
}

#[test]
fn test_sharp_angle_is_feature() {
  let edge = dihedral_edge(DVec3::X, DVec3::Y);
  assert_eq!(
    classify_edge(&edge, &FeatureParams::default()),
    EdgeClass::Feature { convex: None }
  );
}

#[test]
fn test_convex_filter() {
  let edge = dihedral_edge(DVec3::X, sixty_deg_normal());
  let convex_only = FeatureParams::default().with_only_convex(true);
  assert_eq!(
    classify_edge(&edge, &convex_only),
    EdgeClass::Feature {
      convex: Some(true)
    }
  );
  let concave_only = FeatureParams::default().with_only_concave(true);
  assert_eq!(classify_edge(&edge, &concave_only), EdgeClass::Excluded);
}

#[test]
fn test_concave_filter() {
  let edge = dihedral_edge(DVec3::X, DVec3::new(-0.5, 3.0f64.sqrt() / 2.0, 0.0));
  let concave_only = FeatureParams::default().with_only_concave(true);
  assert_eq!(
    classify_edge(&edge, &concave_only),
    EdgeClass::Feature {
      convex: Some(false)
    }
  );
  let convex_only = FeatureParams::default().with_only_convex(true);
  assert_eq!(classify_edge(&edge, &convex_only), EdgeClass::Excluded);
}

#[test]
fn test_short_open_edge_excluded() {
  let edge = BrepEdge::over_full_domain(
    Arc::new(LineSegment::new(DVec3::ZERO, DVec3::new(1.0e-4, 0.0, 0.0))),
    smallvec![plane_face(DVec3::X), plane_face(DVec3::Y)],
  );
  assert_eq!(
    classify_edge(&edge, &FeatureParams::default()),
    EdgeClass::Excluded
  );
}

#[test]
fn test_closed_edge_skips_length_filter() {
  // Closed curves have a near-zero chord but still classify by angle
  let edge = BrepEdge::over_full_domain(
    Arc::new(Circle::new(DVec3::ZERO, 0.001)),
    smallvec![plane_face(DVec3::X), plane_face(DVec3::Y)],
  );
  assert_eq!(
    classify_edge(&edge, &FeatureParams::default()),
    EdgeClass::Feature { convex: None }
  );
}

#[test]
fn test_face_order_is_symmetric() {
  let n2 = sixty_deg_normal();
  let convex_only = FeatureParams::default().with_only_convex(true);
  let forward = classify_edge(&dihedral_edge(DVec3::X, n2), &convex_only);
  let swapped = classify_edge(&dihedral_edge(n2, DVec3::X), &convex_only);
  assert_eq!(forward, swapped);

  let defaults = FeatureParams::default();
  let forward = classify_edge(&dihedral_edge(DVec3::X, DVec3::Y), &defaults);
  let swapped = classify_edge(&dihedral_edge(DVec3::Y, DVec3::X), &defaults);
  assert_eq!(forward, swapped);
}

#[test]
fn test_reversed_face_flips_convexity() {
  let faces = smallvec![
    plane_face(DVec3::X),
    plane_face(sixty_deg_normal()).reversed(),
  ];
  let edge = unit_line(faces);
  let concave_only = FeatureParams::default().with_only_concave(true);
  assert_eq!(
    classify_edge(&edge, &concave_only),
    EdgeClass::Feature {
      convex: Some(false)
    }
  );
}

#[test]
fn test_degenerate_normal_is_smooth() {
  let edge = dihedral_edge(DVec3::ZERO, DVec3::Y);
  assert_eq!(
    classify_edge(&edge, &FeatureParams::default()),
    EdgeClass::Smooth
  );
}

#[test]
fn test_feature_extraction_selects_boundary_and_sharp() {
  let shape = EdgeShape::new(vec![
    unit_line(smallvec![plane_face(DVec3::Y)]),
    dihedral_edge(DVec3::Y, DVec3::Y),
    dihedral_edge(DVec3::X, DVec3::Y),
  ]);
  let (buffer, stats) = extract_feature_edges(&shape, &FeatureParams::default());
  assert_eq!(stats.edges_sampled, 2);
  assert_eq!(stats.edges_skipped, 1);
  assert_eq!(buffer.points.len(), 4);
}

#[test]
fn test_classify_all_matches_single_calls() {
  let shape = EdgeShape::new(vec![
    unit_line(smallvec![plane_face(DVec3::Y)]),
    dihedral_edge(DVec3::X, DVec3::Y),
  ]);
  let params = FeatureParams::default();
  let classes = classify_all(&shape, &params);
  assert_eq!(classes.len(), 2);
  assert_eq!(classes[0], classify_edge(&shape.edges[0], &params));
  assert_eq!(classes[1], classify_edge(&shape.edges[1], &params));
}

#[test]
fn test_silhouette_sign_split() {
  let front = DVec3::new(1.0, 0.0, 1.0).normalize();
  let back = DVec3::new(-1.0, 0.0, 1.0).normalize();
  let crossing = dihedral_edge(front, back);
  assert!(is_silhouette_edge(&crossing, DVec3::X));

  let same_side = dihedral_edge(front, DVec3::new(1.0, 0.0, -1.0).normalize());
  assert!(!is_silhouette_edge(&same_side, DVec3::X));
}

#[test]
fn test_silhouette_grazing_excluded() {
  let edge = dihedral_edge(DVec3::Z, DVec3::new(-1.0, 0.0, 0.0));
  assert!(!is_silhouette_edge(&edge, DVec3::X));
}

#[test]
fn test_silhouette_requires_two_faces() {
  let edge = unit_line(smallvec![plane_face(DVec3::X)]);
  assert!(!is_silhouette_edge(&edge, DVec3::X));
}

#[test]
fn test_silhouette_zero_view_selects_nothing() {
  let shape = EdgeShape::new(vec![dihedral_edge(
    DVec3::new(1.0, 0.0, 1.0).normalize(),
    DVec3::new(-1.0, 0.0, 1.0).normalize(),
  )]);
  let (buffer, stats) =
    extract_silhouette_edges(&shape, DVec3::ZERO, &SilhouetteParams::default());
  assert!(buffer.is_empty());
  assert_eq!(stats.edges_skipped, 1);
}

#[test]
fn test_silhouette_extraction_buffers_crossing_edges() {
  let front = DVec3::new(1.0, 0.0, 1.0).normalize();
  let back = DVec3::new(-1.0, 0.0, 1.0).normalize();
  let shape = EdgeShape::new(vec![
    dihedral_edge(front, back),
    dihedral_edge(front, front),
  ]);
  let (buffer, stats) =
    extract_silhouette_edges(&shape, DVec3::X, &SilhouetteParams::default());
  assert_eq!(stats.edges_sampled, 1);
  assert_eq!(stats.edges_skipped, 1);
  assert_eq!(buffer.points.len(), 2);
}
