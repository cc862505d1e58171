//! Generated-edge cache.
//!
//! One entry per (geometry, edge type). Invalidation only clears the valid
//! flag; the stale buffer stays behind so the display can keep showing the
//! last good result while regeneration runs. Entries are replaced only when
//! a newer run commits successfully.

use std::collections::HashMap;
use std::sync::Arc;

use crate::shape::GeometryId;
use crate::types::{EdgeType, Epoch, SegmentBuffer};

/// One cached generation result.
#[derive(Clone, Debug)]
pub struct CacheEntry {
  pub buffer: Arc<SegmentBuffer>,
  /// Epoch of the parameters the buffer was generated under.
  pub epoch: Epoch,
  /// False once parameters changed; the buffer is then last-known-good only.
  pub valid: bool,
}

/// Cache of generated segment buffers.
#[derive(Debug, Default)]
pub struct EdgeCache {
  entries: HashMap<(GeometryId, EdgeType), CacheEntry>,
}

impl EdgeCache {
  pub fn new() -> Self {
    Self {
      entries: HashMap::new(),
    }
  }

  pub fn get(&self, geometry: GeometryId, edge_type: EdgeType) -> Option<&CacheEntry> {
    self.entries.get(&(geometry, edge_type))
  }

  /// The cached buffer, only while still valid.
  pub fn fresh(&self, geometry: GeometryId, edge_type: EdgeType) -> Option<&Arc<SegmentBuffer>> {
    self
      .get(geometry, edge_type)
      .filter(|entry| entry.valid)
      .map(|entry| &entry.buffer)
  }

  /// The cached buffer regardless of validity, for stale display.
  pub fn last_known(
    &self,
    geometry: GeometryId,
    edge_type: EdgeType,
  ) -> Option<&Arc<SegmentBuffer>> {
    self.get(geometry, edge_type).map(|entry| &entry.buffer)
  }

  /// Whether a generation run is needed to show this slot.
  pub fn needs_generation(&self, geometry: GeometryId, edge_type: EdgeType) -> bool {
    !self
      .get(geometry, edge_type)
      .is_some_and(|entry| entry.valid)
  }

  /// Commit a successful generation result.
  pub fn store(
    &mut self,
    geometry: GeometryId,
    edge_type: EdgeType,
    buffer: Arc<SegmentBuffer>,
    epoch: Epoch,
  ) {
    self.entries.insert(
      (geometry, edge_type),
      CacheEntry {
        buffer,
        epoch,
        valid: true,
      },
    );
  }

  /// Mark one slot stale without dropping its buffer.
  pub fn invalidate(&mut self, geometry: GeometryId, edge_type: EdgeType) {
    if let Some(entry) = self.entries.get_mut(&(geometry, edge_type)) {
      entry.valid = false;
    }
  }

  /// Mark one edge type stale across every geometry.
  pub fn invalidate_type(&mut self, edge_type: EdgeType) {
    for ((_, entry_type), entry) in self.entries.iter_mut() {
      if *entry_type == edge_type {
        entry.valid = false;
      }
    }
  }

  /// Mark every slot of one geometry stale.
  pub fn invalidate_geometry(&mut self, geometry: GeometryId) {
    for ((entry_geometry, _), entry) in self.entries.iter_mut() {
      if *entry_geometry == geometry {
        entry.valid = false;
      }
    }
  }

  /// Drop every slot of a geometry that left the scene.
  pub fn remove_geometry(&mut self, geometry: GeometryId) {
    self.entries.retain(|(entry_geometry, _), _| *entry_geometry != geometry);
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}
