use glam::DVec3;

use super::*;

fn segments(count: usize) -> Arc<SegmentBuffer> {
  let mut buffer = SegmentBuffer::new();
  for i in 0..count {
    buffer.push_segment(DVec3::ZERO, DVec3::new(i as f64 + 1.0, 0.0, 0.0));
  }
  Arc::new(buffer)
}

fn is_visible(store: &DrawableStore, key: Option<DrawableKey>) -> bool {
  key
    .and_then(|key| store.get(key))
    .is_some_and(|drawable| drawable.visible)
}

#[test]
fn test_set_replaces_and_releases_old_exactly_once() {
  let mut store = DrawableStore::new();
  let mut attachment = EdgeSceneAttachment::new();
  let geometry = GeometryId::new();

  let first = attachment.set(
    &mut store,
    geometry,
    EdgeType::Original,
    segments(1),
    Appearance::default(),
  );
  let second = attachment.set(
    &mut store,
    geometry,
    EdgeType::Original,
    segments(2),
    Appearance::default(),
  );

  assert_ne!(first, second);
  assert_eq!(store.len(), 1);
  assert!(store.get(first).is_none());
  assert_eq!(attachment.key(geometry, EdgeType::Original), Some(second));
  // The replaced key is gone from the arena; releasing it again is refused
  assert!(!store.release(first));
}

#[test]
fn test_slots_are_independent_per_type_and_geometry() {
  let mut store = DrawableStore::new();
  let mut attachment = EdgeSceneAttachment::new();
  let a = GeometryId::new();
  let b = GeometryId::new();

  attachment.set(&mut store, a, EdgeType::Original, segments(1), Appearance::default());
  attachment.set(&mut store, a, EdgeType::Feature, segments(1), Appearance::default());
  attachment.set(&mut store, b, EdgeType::Original, segments(1), Appearance::default());

  assert_eq!(store.len(), 3);
  assert_eq!(attachment.geometry_count(), 2);
  assert_eq!(attachment.drawable_count(), 3);
  assert!(attachment.key(b, EdgeType::Feature).is_none());
}

#[test]
fn test_clear_releases_and_empties_slot() {
  let mut store = DrawableStore::new();
  let mut attachment = EdgeSceneAttachment::new();
  let geometry = GeometryId::new();

  attachment.set(&mut store, geometry, EdgeType::Mesh, segments(1), Appearance::default());
  assert!(attachment.clear(&mut store, geometry, EdgeType::Mesh));
  assert!(store.is_empty());
  assert!(attachment.key(geometry, EdgeType::Mesh).is_none());
  // Clearing an already empty slot reports nothing to release
  assert!(!attachment.clear(&mut store, geometry, EdgeType::Mesh));
}

#[test]
fn test_remove_geometry_releases_every_slot() {
  let mut store = DrawableStore::new();
  let mut attachment = EdgeSceneAttachment::new();
  let doomed = GeometryId::new();
  let kept = GeometryId::new();

  attachment.set(&mut store, doomed, EdgeType::Original, segments(1), Appearance::default());
  attachment.set(&mut store, doomed, EdgeType::Mesh, segments(1), Appearance::default());
  attachment.set(&mut store, kept, EdgeType::Original, segments(1), Appearance::default());

  assert_eq!(attachment.remove_geometry(&mut store, doomed), 2);
  assert_eq!(store.len(), 1);
  assert_eq!(attachment.geometry_count(), 1);
  assert_eq!(attachment.remove_geometry(&mut store, doomed), 0);
}

#[test]
fn test_update_appearance_touches_one_type() {
  let mut store = DrawableStore::new();
  let mut attachment = EdgeSceneAttachment::new();
  let a = GeometryId::new();
  let b = GeometryId::new();

  let feature_a =
    attachment.set(&mut store, a, EdgeType::Feature, segments(1), Appearance::default());
  let feature_b =
    attachment.set(&mut store, b, EdgeType::Feature, segments(1), Appearance::default());
  let original_a =
    attachment.set(&mut store, a, EdgeType::Original, segments(1), Appearance::default());

  let restyled = Appearance::default().with_width(5.0);
  assert_eq!(attachment.update_appearance(&mut store, EdgeType::Feature, restyled), 2);

  for key in [feature_a, feature_b] {
    match store.get(key) {
      Some(drawable) => assert_eq!(drawable.appearance.width, 5.0),
      None => panic!("feature drawable must survive a restyle"),
    }
  }
  match store.get(original_a) {
    Some(drawable) => assert_eq!(drawable.appearance.width, 1.0),
    None => panic!("original drawable must survive a restyle"),
  }
}

#[test]
fn test_visibility_follows_flags() {
  let mut store = DrawableStore::new();
  let mut attachment = EdgeSceneAttachment::new();
  let geometry = GeometryId::new();

  attachment.set(&mut store, geometry, EdgeType::Original, segments(1), Appearance::default());
  attachment.set(&mut store, geometry, EdgeType::Mesh, segments(1), Appearance::default());

  let mut flags = DisplayFlags::default();
  flags.original = true;
  attachment.apply_visibility(&mut store, &flags, &HashSet::new());

  assert!(is_visible(&store, attachment.key(geometry, EdgeType::Original)));
  assert!(!is_visible(&store, attachment.key(geometry, EdgeType::Mesh)));

  flags.original = false;
  attachment.apply_visibility(&mut store, &flags, &HashSet::new());
  assert!(!is_visible(&store, attachment.key(geometry, EdgeType::Original)));
}

#[test]
fn test_only_selected_restricts_geometries() {
  let mut store = DrawableStore::new();
  let mut attachment = EdgeSceneAttachment::new();
  let chosen = GeometryId::new();
  let other = GeometryId::new();

  attachment.set(&mut store, chosen, EdgeType::Original, segments(1), Appearance::default());
  attachment.set(&mut store, other, EdgeType::Original, segments(1), Appearance::default());

  let mut flags = DisplayFlags::default();
  flags.original = true;
  flags.only_selected = true;
  let selected: HashSet<GeometryId> = [chosen].into_iter().collect();
  attachment.apply_visibility(&mut store, &flags, &selected);

  assert!(is_visible(&store, attachment.key(chosen, EdgeType::Original)));
  assert!(!is_visible(&store, attachment.key(other, EdgeType::Original)));
}

#[test]
fn test_silhouette_suppresses_original_until_mesh_shown() {
  let mut store = DrawableStore::new();
  let mut attachment = EdgeSceneAttachment::new();
  let geometry = GeometryId::new();

  attachment.set(&mut store, geometry, EdgeType::Original, segments(2), Appearance::default());
  attachment.set(&mut store, geometry, EdgeType::Silhouette, segments(1), Appearance::default());
  attachment.set(&mut store, geometry, EdgeType::Mesh, segments(3), Appearance::default());

  let mut flags = DisplayFlags::default();
  flags.original = true;
  flags.silhouette = true;
  attachment.apply_visibility(&mut store, &flags, &HashSet::new());

  assert!(!is_visible(&store, attachment.key(geometry, EdgeType::Original)));
  assert!(is_visible(&store, attachment.key(geometry, EdgeType::Silhouette)));

  // Hidden-line style: showing the wireframe restores original edges
  flags.mesh = true;
  attachment.apply_visibility(&mut store, &flags, &HashSet::new());
  assert!(is_visible(&store, attachment.key(geometry, EdgeType::Original)));
}

#[test]
fn test_empty_silhouette_does_not_suppress_original() {
  let mut store = DrawableStore::new();
  let mut attachment = EdgeSceneAttachment::new();
  let geometry = GeometryId::new();

  attachment.set(&mut store, geometry, EdgeType::Original, segments(2), Appearance::default());
  attachment.set(
    &mut store,
    geometry,
    EdgeType::Silhouette,
    Arc::new(SegmentBuffer::new()),
    Appearance::default(),
  );

  let mut flags = DisplayFlags::default();
  flags.original = true;
  flags.silhouette = true;
  attachment.apply_visibility(&mut store, &flags, &HashSet::new());

  assert!(is_visible(&store, attachment.key(geometry, EdgeType::Original)));
}
