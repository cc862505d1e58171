//! Per-geometry drawable slots.
//!
//! Each registered geometry owns one slot per edge category. A slot holds at
//! most one [`DrawableKey`]; replacing it releases the previous drawable
//! exactly once. Visibility is never stored here beyond the drawable flag:
//! it is recomputed from the display flags on every display-state change.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use edge_pipeline::shape::GeometryId;
use edge_pipeline::{Appearance, DisplayFlags, EdgeType, SegmentBuffer};

use crate::drawable::{DrawableKey, DrawableStore};

type SlotArray = [Option<DrawableKey>; EdgeType::COUNT];

/// Slot table mapping `(geometry, edge type)` to its single drawable.
#[derive(Default)]
pub struct EdgeSceneAttachment {
  slots: HashMap<GeometryId, SlotArray>,
}

impl EdgeSceneAttachment {
  pub fn new() -> Self {
    Self {
      slots: HashMap::new(),
    }
  }

  /// Key stored in a slot, if any.
  pub fn key(&self, geometry: GeometryId, edge_type: EdgeType) -> Option<DrawableKey> {
    self.slots.get(&geometry)?[edge_type.index()]
  }

  /// Store a drawable for a slot, releasing the previous one exactly once.
  pub fn set(
    &mut self,
    store: &mut DrawableStore,
    geometry: GeometryId,
    edge_type: EdgeType,
    buffer: Arc<SegmentBuffer>,
    appearance: Appearance,
  ) -> DrawableKey {
    let key = store.create(geometry, edge_type, buffer, appearance);
    let slot = &mut self.slots.entry(geometry).or_default()[edge_type.index()];
    if let Some(old) = slot.replace(key) {
      store.release(old);
    }
    key
  }

  /// Release a slot's drawable. Returns `false` when the slot was empty.
  pub fn clear(&mut self, store: &mut DrawableStore, geometry: GeometryId, edge_type: EdgeType) -> bool {
    let Some(slots) = self.slots.get_mut(&geometry) else {
      return false;
    };
    match slots[edge_type.index()].take() {
      Some(key) => store.release(key),
      None => false,
    }
  }

  /// Release every drawable of a geometry that left the scene.
  ///
  /// Returns how many drawables were released.
  pub fn remove_geometry(&mut self, store: &mut DrawableStore, geometry: GeometryId) -> usize {
    let Some(slots) = self.slots.remove(&geometry) else {
      return 0;
    };
    slots
      .into_iter()
      .flatten()
      .filter(|&key| store.release(key))
      .count()
  }

  /// Restyle one edge category across every geometry.
  pub fn update_appearance(
    &self,
    store: &mut DrawableStore,
    edge_type: EdgeType,
    appearance: Appearance,
  ) -> usize {
    self
      .slots
      .values()
      .filter_map(|slots| slots[edge_type.index()])
      .filter(|&key| store.update_appearance(key, appearance))
      .count()
  }

  /// Recompute every drawable's visibility from the display flags.
  ///
  /// `selected` only matters while `flags.only_selected` is set. A geometry
  /// with a non-empty silhouette drawable suppresses its original edges
  /// unless the mesh wireframe is also shown (hidden-line style keeps the
  /// full wireframe readable).
  pub fn apply_visibility(
    &self,
    store: &mut DrawableStore,
    flags: &DisplayFlags,
    selected: &HashSet<GeometryId>,
  ) {
    for (&geometry, slots) in &self.slots {
      let geometry_shown = !flags.only_selected || selected.contains(&geometry);
      let silhouette_active = flags.shows(EdgeType::Silhouette)
        && slots[EdgeType::Silhouette.index()]
          .and_then(|key| store.get(key))
          .is_some_and(|drawable| !drawable.buffer.is_empty());

      for edge_type in EdgeType::ALL {
        let Some(key) = slots[edge_type.index()] else {
          continue;
        };
        let mut visible = geometry_shown && flags.shows(edge_type);
        if edge_type == EdgeType::Original && silhouette_active && !flags.mesh {
          visible = false;
        }
        store.set_visible(key, visible);
      }
    }
  }

  /// Number of geometries holding at least one slot entry.
  pub fn geometry_count(&self) -> usize {
    self.slots.len()
  }

  /// Number of occupied slots across every geometry.
  pub fn drawable_count(&self) -> usize {
    self
      .slots
      .values()
      .map(|slots| slots.iter().flatten().count())
      .sum()
  }
}

#[cfg(test)]
#[path = "attachment_test.rs"]
mod attachment_test;
