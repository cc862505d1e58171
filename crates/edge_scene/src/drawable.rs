//! Drawable arena.
//!
//! Every attached line set lives in one slotmap keyed by [`DrawableKey`].
//! Keys are generational: a released slot invalidates its key immediately, so
//! a stale handle reads as `None` instead of aliasing whatever reused the
//! slot. This is the typed replacement for pointer-sentinel validity checks.

use std::sync::Arc;

use edge_pipeline::shape::GeometryId;
use edge_pipeline::{Appearance, EdgeType, SegmentBuffer};
use slotmap::{new_key_type, SlotMap};

new_key_type! {
  /// Handle to one drawable in the [`DrawableStore`].
  pub struct DrawableKey;
}

/// One attachable line set.
#[derive(Clone, Debug)]
pub struct LineDrawable {
  /// Geometry the drawable belongs to.
  pub geometry: GeometryId,
  /// Edge category rendered by this drawable.
  pub edge_type: EdgeType,
  /// Segment endpoints, shared with the cache that produced them.
  pub buffer: Arc<SegmentBuffer>,
  /// Current render style.
  pub appearance: Appearance,
  /// Whether the drawable is a member of the visible scene.
  pub visible: bool,
}

impl LineDrawable {
  /// Estimated resident size of the referenced buffer.
  pub fn memory_estimate_bytes(&self) -> usize {
    self.buffer.memory_estimate_bytes()
  }
}

/// Arena owning every drawable the edge display produces.
#[derive(Default)]
pub struct DrawableStore {
  drawables: SlotMap<DrawableKey, LineDrawable>,
}

impl DrawableStore {
  pub fn new() -> Self {
    Self {
      drawables: SlotMap::with_key(),
    }
  }

  /// Allocate a drawable. New drawables start invisible; attachment decides
  /// visibility from the display flags afterwards.
  pub fn create(
    &mut self,
    geometry: GeometryId,
    edge_type: EdgeType,
    buffer: Arc<SegmentBuffer>,
    appearance: Appearance,
  ) -> DrawableKey {
    self.drawables.insert(LineDrawable {
      geometry,
      edge_type,
      buffer,
      appearance,
      visible: false,
    })
  }

  /// Release a drawable. Returns `false` when the key was already released.
  pub fn release(&mut self, key: DrawableKey) -> bool {
    self.drawables.remove(key).is_some()
  }

  pub fn get(&self, key: DrawableKey) -> Option<&LineDrawable> {
    self.drawables.get(key)
  }

  pub fn contains(&self, key: DrawableKey) -> bool {
    self.drawables.contains_key(key)
  }

  /// Re-style a drawable without touching its geometry buffer.
  pub fn update_appearance(&mut self, key: DrawableKey, appearance: Appearance) -> bool {
    match self.drawables.get_mut(key) {
      Some(drawable) => {
        drawable.appearance = appearance;
        true
      }
      None => false,
    }
  }

  /// Swap the segment buffer a drawable renders (LOD switches, progressive
  /// results). Appearance and visibility are untouched.
  pub fn set_buffer(&mut self, key: DrawableKey, buffer: Arc<SegmentBuffer>) -> bool {
    match self.drawables.get_mut(key) {
      Some(drawable) => {
        drawable.buffer = buffer;
        true
      }
      None => false,
    }
  }

  pub fn set_visible(&mut self, key: DrawableKey, visible: bool) -> bool {
    match self.drawables.get_mut(key) {
      Some(drawable) => {
        drawable.visible = visible;
        true
      }
      None => false,
    }
  }

  pub fn len(&self) -> usize {
    self.drawables.len()
  }

  pub fn is_empty(&self) -> bool {
    self.drawables.is_empty()
  }

  /// Every drawable currently marked visible, for render-layer iteration.
  pub fn visible(&self) -> impl Iterator<Item = (DrawableKey, &LineDrawable)> {
    self
      .drawables
      .iter()
      .filter(|(_, drawable)| drawable.visible)
  }

  pub fn iter(&self) -> impl Iterator<Item = (DrawableKey, &LineDrawable)> {
    self.drawables.iter()
  }

  /// Estimated resident size of every stored buffer.
  pub fn memory_estimate_bytes(&self) -> usize {
    self
      .drawables
      .values()
      .map(LineDrawable::memory_estimate_bytes)
      .sum()
  }
}
