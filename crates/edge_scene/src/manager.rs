//! Display orchestration.
//!
//! [`EdgeDisplayManager`] owns the whole scene-side state: display flags,
//! per-type generation parameters and appearances, the result cache, the
//! drawable arena and the per-family async coordinators. Hosts drive it with
//! commands (toggle, set parameters, set appearance, camera updates) and call
//! [`EdgeDisplayManager::pump`] from their consumer thread to land finished
//! generation runs.
//!
//! Heavy families (original edges, feature edges, intersection search) run on
//! the rayon pool; mesh wireframes, normal indicators, highlights and
//! silhouettes are cheap enough to build inline. A parameter change bumps the
//! family epoch so an in-flight run is discarded on arrival and restarted
//! instead of committing stale data.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use edge_pipeline::cache::EdgeCache;
use edge_pipeline::classify::{extract_feature_edges, extract_silhouette_edges};
use edge_pipeline::constants::DEFAULT_NORMAL_INDICATOR_LENGTH;
use edge_pipeline::lod::{EdgeLodSet, LodLevel, LodThresholds};
use edge_pipeline::mesh_edges::{
  extract_face_normal_indicators, extract_mesh_edges, extract_vertex_normal_indicators,
  MeshEdgeMode,
};
use edge_pipeline::metrics::PipelineMetrics;
use edge_pipeline::sampler::{extract_edge_subset, extract_edges};
use edge_pipeline::shape::{EdgeShape, GeometryId};
use edge_pipeline::{
  Appearance, DisplayFlags, EdgeType, Epoch, FeatureParams, GenerationCoordinator,
  GenerationOutcome, IntersectionParams, IntersectionResult, ProgressiveIntersection,
  SamplingParams, SamplingStats, SegmentBuffer, SilhouetteParams,
};
use glam::DVec3;

use crate::attachment::EdgeSceneAttachment;
use crate::drawable::{DrawableStore, LineDrawable};
use crate::markers::{marker_segments, push_marker, MarkerStyle};

// =============================================================================
// Host-facing callbacks
// =============================================================================

/// Why the host should redraw.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RepaintReason {
  /// Flags or selection changed which drawables are visible.
  DisplayChanged,
  /// Generation parameters changed and regeneration was kicked off.
  ParametersChanged,
  /// A drawable was restyled.
  AppearanceChanged,
  /// A generation run committed its result.
  GenerationCompleted,
  /// A progressive run published intermediate points.
  PartialResults,
  /// The camera moved far enough to switch the active detail level.
  LodChanged,
}

/// Receives redraw requests on the consumer thread.
pub trait RepaintSink {
  fn request_repaint(&mut self, reason: RepaintReason);
}

/// How a generation run ended, as reported to the host.
///
/// Cancellation is its own status so hosts never raise an error dialog for a
/// user-initiated cancel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompletionStatus {
  Success,
  Failed,
  Cancelled,
}

/// Receives generation progress and completion on the consumer thread.
pub trait GenerationEvents {
  fn on_progress(&mut self, geometry: GeometryId, edge_type: EdgeType, percent: u32, message: &str) {
    let _ = (geometry, edge_type, percent, message);
  }

  fn on_complete(
    &mut self,
    geometry: GeometryId,
    edge_type: EdgeType,
    status: CompletionStatus,
    message: &str,
  ) {
    let _ = (geometry, edge_type, status, message);
  }
}

struct NullRepaint;

impl RepaintSink for NullRepaint {
  fn request_repaint(&mut self, _reason: RepaintReason) {}
}

struct NullEvents;

impl GenerationEvents for NullEvents {}

// =============================================================================
// Generation parameters
// =============================================================================

/// Every tunable the display manager feeds into the pipeline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GenerationParams {
  /// Original edge (and highlight) sampling.
  pub sampling: SamplingParams,
  /// Feature edge selection.
  pub feature: FeatureParams,
  /// Silhouette selection.
  pub silhouette: SilhouetteParams,
  /// Intersection search.
  pub intersection: IntersectionParams,
  /// Mesh wireframe mode.
  pub mesh_mode: MeshEdgeMode,
  /// World-space length of normal indicator segments.
  pub normal_indicator_length: f64,
  /// Intersection marker glyph.
  pub marker: MarkerStyle,
}

impl Default for GenerationParams {
  fn default() -> Self {
    Self {
      sampling: SamplingParams::default(),
      feature: FeatureParams::default(),
      silhouette: SilhouetteParams::default(),
      intersection: IntersectionParams::default(),
      mesh_mode: MeshEdgeMode::default(),
      normal_indicator_length: DEFAULT_NORMAL_INDICATOR_LENGTH,
      marker: MarkerStyle::default(),
    }
  }
}

// =============================================================================
// Async plumbing
// =============================================================================

/// What an async worker hands back on completion.
#[derive(Debug, Default)]
struct GeneratedData {
  buffer: SegmentBuffer,
  /// True when the run stopped before testing every candidate.
  partial: bool,
  /// Sampling run statistics, for the sampled families.
  sampling: Option<SamplingStats>,
  /// Search statistics, for intersection runs.
  intersection: Option<IntersectionResult>,
}

/// One streamed increment from an async worker.
#[derive(Debug)]
struct ProgressNote {
  percent: u32,
  message: String,
  /// Freshly accepted intersection points, empty for non-progressive runs.
  points: Vec<DVec3>,
}

impl ProgressNote {
  fn status(percent: u32, message: impl Into<String>) -> Self {
    Self {
      percent,
      message: message.into(),
      points: Vec::new(),
    }
  }
}

/// Coordinator plus the consumer-side bookkeeping for one family.
#[derive(Default)]
struct FamilyRun {
  coordinator: GenerationCoordinator<GeneratedData, ProgressNote>,
  last_percent: u32,
  /// Glyphs accumulated from streamed batches, shown before completion.
  partial: SegmentBuffer,
}

struct GeometryEntry {
  shape: Arc<EdgeShape>,
  lod: Option<EdgeLodSet>,
  /// Edge indices drawn by the highlight pass.
  highlight: Vec<usize>,
}

// =============================================================================
// EdgeDisplayManager
// =============================================================================

/// Top-level orchestrator for edge display.
pub struct EdgeDisplayManager {
  geometries: HashMap<GeometryId, GeometryEntry>,
  flags: DisplayFlags,
  params: GenerationParams,
  appearances: [Appearance; EdgeType::COUNT],
  /// Per-family parameter epoch; bumping one strands in-flight runs.
  epochs: [Epoch; EdgeType::COUNT],
  cache: EdgeCache,
  store: DrawableStore,
  attachment: EdgeSceneAttachment,
  runs: HashMap<(GeometryId, EdgeType), FamilyRun>,
  selected: HashSet<GeometryId>,
  camera: DVec3,
  lod_thresholds: LodThresholds,
  metrics: PipelineMetrics,
  repaint: Box<dyn RepaintSink>,
  events: Box<dyn GenerationEvents>,
}

impl Default for EdgeDisplayManager {
  fn default() -> Self {
    Self::new()
  }
}

impl EdgeDisplayManager {
  pub fn new() -> Self {
    Self {
      geometries: HashMap::new(),
      flags: DisplayFlags::default(),
      params: GenerationParams::default(),
      appearances: EdgeType::ALL.map(Appearance::for_edge_type),
      epochs: [Epoch::new(); EdgeType::COUNT],
      cache: EdgeCache::new(),
      store: DrawableStore::new(),
      attachment: EdgeSceneAttachment::new(),
      runs: HashMap::new(),
      selected: HashSet::new(),
      camera: DVec3::ZERO,
      lod_thresholds: LodThresholds::default(),
      metrics: PipelineMetrics::new(),
      repaint: Box::new(NullRepaint),
      events: Box::new(NullEvents),
    }
  }

  pub fn with_repaint_sink(mut self, sink: Box<dyn RepaintSink>) -> Self {
    self.repaint = sink;
    self
  }

  pub fn with_events(mut self, events: Box<dyn GenerationEvents>) -> Self {
    self.events = events;
    self
  }

  // ---------------------------------------------------------------------------
  // Geometry registry
  // ---------------------------------------------------------------------------

  /// Register a shape and generate whatever the current flags already show.
  pub fn register_geometry(&mut self, shape: EdgeShape) -> GeometryId {
    let id = shape.id;
    self.geometries.insert(
      id,
      GeometryEntry {
        shape: Arc::new(shape),
        lod: None,
        highlight: Vec::new(),
      },
    );
    self.refresh_geometry(id);
    self.apply_visibility();
    self.repaint.request_repaint(RepaintReason::DisplayChanged);
    id
  }

  /// Drop a geometry: its drawables, cache entries and in-flight runs.
  ///
  /// Workers of abandoned runs finish on the pool and deliver into a dropped
  /// channel, which is a silent no-op.
  pub fn remove_geometry(&mut self, geometry: GeometryId) {
    for run in self
      .runs
      .iter()
      .filter(|((id, _), _)| *id == geometry)
      .map(|(_, run)| run)
    {
      run.coordinator.cancel();
    }
    self.runs.retain(|(id, _), _| *id != geometry);
    self.attachment.remove_geometry(&mut self.store, geometry);
    for edge_type in EdgeType::ALL {
      if let Some(buffer) = self.cache.last_known(geometry, edge_type) {
        self.metrics.remove_buffer(edge_type, buffer);
      }
    }
    self.cache.remove_geometry(geometry);
    self.geometries.remove(&geometry);
    self.selected.remove(&geometry);
    self.repaint.request_repaint(RepaintReason::DisplayChanged);
  }

  pub fn shape(&self, geometry: GeometryId) -> Option<&Arc<EdgeShape>> {
    self.geometries.get(&geometry).map(|entry| &entry.shape)
  }

  pub fn geometry_count(&self) -> usize {
    self.geometries.len()
  }

  // ---------------------------------------------------------------------------
  // Display state commands
  // ---------------------------------------------------------------------------

  pub fn flags(&self) -> &DisplayFlags {
    &self.flags
  }

  /// Switch one edge category on or off.
  ///
  /// Switching on only regenerates slots whose cache is missing or invalid;
  /// a valid cache is reattached untouched.
  pub fn toggle(&mut self, edge_type: EdgeType, on: bool) {
    self.flags.set(edge_type, on);
    self.refresh_needed();
    self.apply_visibility();
    self.repaint.request_repaint(RepaintReason::DisplayChanged);
  }

  /// Restrict display to the selected geometry set.
  pub fn set_only_selected(&mut self, on: bool) {
    self.flags.only_selected = on;
    self.apply_visibility();
    self.repaint.request_repaint(RepaintReason::DisplayChanged);
  }

  /// Fast mode: silhouettes stand in for original edges.
  pub fn set_silhouette_only(&mut self, on: bool) {
    self.flags.silhouette_only = on;
    self.refresh_needed();
    self.apply_visibility();
    self.repaint.request_repaint(RepaintReason::DisplayChanged);
  }

  /// Replace the selected geometry set.
  pub fn set_selected<I>(&mut self, geometries: I)
  where
    I: IntoIterator<Item = GeometryId>,
  {
    self.selected = geometries.into_iter().collect();
    self.apply_visibility();
    self.repaint.request_repaint(RepaintReason::DisplayChanged);
  }

  pub fn appearance(&self, edge_type: EdgeType) -> Appearance {
    self.appearances[edge_type.index()]
  }

  /// Restyle one category everywhere. Never touches geometry buffers.
  pub fn set_appearance(&mut self, edge_type: EdgeType, appearance: Appearance) {
    self.appearances[edge_type.index()] = appearance;
    self.attachment.update_appearance(&mut self.store, edge_type, appearance);
    self.repaint.request_repaint(RepaintReason::AppearanceChanged);
  }

  // ---------------------------------------------------------------------------
  // Parameter commands (targeted cache invalidation)
  // ---------------------------------------------------------------------------

  pub fn generation_params(&self) -> &GenerationParams {
    &self.params
  }

  /// Original edge and highlight sampling.
  pub fn set_sampling_params(&mut self, params: SamplingParams) {
    self.params.sampling = params;
    self.invalidate_types(&[EdgeType::Original, EdgeType::Highlight]);
  }

  pub fn set_feature_params(&mut self, params: FeatureParams) {
    self.params.feature = params;
    self.invalidate_types(&[EdgeType::Feature]);
  }

  pub fn set_silhouette_params(&mut self, params: SilhouetteParams) {
    self.params.silhouette = params;
    self.invalidate_types(&[EdgeType::Silhouette]);
  }

  pub fn set_intersection_params(&mut self, params: IntersectionParams) {
    self.params.intersection = params;
    self.invalidate_types(&[EdgeType::IntersectionMarker]);
  }

  pub fn set_mesh_edge_mode(&mut self, mode: MeshEdgeMode) {
    self.params.mesh_mode = mode;
    self.invalidate_types(&[EdgeType::Mesh]);
  }

  pub fn set_normal_indicator_length(&mut self, length: f64) {
    self.params.normal_indicator_length = length;
    self.invalidate_types(&[EdgeType::VertexNormal, EdgeType::FaceNormal]);
  }

  pub fn set_marker_style(&mut self, style: MarkerStyle) {
    self.params.marker = style;
    self.invalidate_types(&[EdgeType::IntersectionMarker]);
  }

  /// Name the edges drawn by the highlight pass for one geometry.
  pub fn set_highlight_edges(&mut self, geometry: GeometryId, edge_indices: Vec<usize>) {
    let Some(entry) = self.geometries.get_mut(&geometry) else {
      return;
    };
    entry.highlight = edge_indices;
    self.epochs[EdgeType::Highlight.index()].increment();
    self.cache.invalidate(geometry, EdgeType::Highlight);
    if self.flags.shows(EdgeType::Highlight) {
      self.generate(geometry, EdgeType::Highlight);
    }
    self.repaint.request_repaint(RepaintReason::DisplayChanged);
  }

  // ---------------------------------------------------------------------------
  // LOD and camera
  // ---------------------------------------------------------------------------

  pub fn set_lod_thresholds(&mut self, thresholds: LodThresholds) {
    self.lod_thresholds = thresholds;
  }

  /// Generate all detail levels for a geometry and serve original edges from
  /// them. Returns `false` for an unknown geometry.
  pub fn enable_lod(&mut self, geometry: GeometryId) -> bool {
    let camera = self.camera;
    let thresholds = self.lod_thresholds;
    let Some(entry) = self.geometries.get_mut(&geometry) else {
      return false;
    };
    entry.lod = Some(EdgeLodSet::generate(&entry.shape, camera, thresholds));
    if self.flags.shows(EdgeType::Original) {
      self.apply_lod_buffer(geometry);
      self.repaint.request_repaint(RepaintReason::LodChanged);
    }
    true
  }

  /// Drop the detail levels and fall back to direct sampling.
  pub fn disable_lod(&mut self, geometry: GeometryId) {
    let Some(entry) = self.geometries.get_mut(&geometry) else {
      return;
    };
    if entry.lod.take().is_none() {
      return;
    }
    self.cache.invalidate(geometry, EdgeType::Original);
    if self.flags.shows(EdgeType::Original) {
      self.generate(geometry, EdgeType::Original);
    }
  }

  /// Active detail level, when LOD is enabled for the geometry.
  pub fn lod_level(&self, geometry: GeometryId) -> Option<LodLevel> {
    let entry = self.geometries.get(&geometry)?;
    entry.lod.as_ref().map(EdgeLodSet::current)
  }

  /// Move the camera: re-select detail levels and refresh view-dependent
  /// silhouettes.
  pub fn update_camera(&mut self, camera: DVec3) {
    self.camera = camera;

    let mut switched: Vec<(GeometryId, Arc<SegmentBuffer>)> = Vec::new();
    for (&id, entry) in self.geometries.iter_mut() {
      if let Some(lod) = entry.lod.as_mut() {
        if lod.update(camera) {
          switched.push((id, Arc::clone(lod.current_buffer())));
        }
      }
    }
    let lod_changed = !switched.is_empty();
    for (id, buffer) in switched {
      let epoch = self.epochs[EdgeType::Original.index()];
      self.commit_buffer(id, EdgeType::Original, buffer, epoch);
    }
    if lod_changed {
      self.repaint.request_repaint(RepaintReason::LodChanged);
    }

    if self.flags.shows(EdgeType::Silhouette) {
      let ids: Vec<GeometryId> = self.geometries.keys().copied().collect();
      for id in ids {
        self.generate_sync(id, EdgeType::Silhouette);
      }
      self.repaint.request_repaint(RepaintReason::DisplayChanged);
    }
  }

  // ---------------------------------------------------------------------------
  // Generation control
  // ---------------------------------------------------------------------------

  /// Generate every shown slot whose cache is missing or invalid.
  pub fn update_all(&mut self) {
    self.refresh_needed();
    self.apply_visibility();
  }

  /// Whether an async run for this family is in flight.
  pub fn is_generating(&self, geometry: GeometryId, edge_type: EdgeType) -> bool {
    self
      .runs
      .get(&(geometry, edge_type))
      .is_some_and(|run| run.coordinator.is_running())
  }

  /// Worker-side progress of an in-flight run.
  pub fn progress_percent(&self, geometry: GeometryId, edge_type: EdgeType) -> Option<u32> {
    let run = self.runs.get(&(geometry, edge_type))?;
    run
      .coordinator
      .is_running()
      .then(|| run.coordinator.progress_percent())
  }

  /// Request cooperative cancellation of one family's run.
  pub fn cancel(&self, geometry: GeometryId, edge_type: EdgeType) {
    if let Some(run) = self.runs.get(&(geometry, edge_type)) {
      run.coordinator.cancel();
    }
  }

  /// Request cancellation of every in-flight run.
  pub fn cancel_all(&self) {
    for run in self.runs.values() {
      run.coordinator.cancel();
    }
  }

  /// Land finished async runs and publish streamed progress.
  ///
  /// Call from the consumer thread, typically once per frame. Returns how
  /// many completion reports were processed.
  pub fn pump(&mut self) -> usize {
    let keys: Vec<(GeometryId, EdgeType)> = self.runs.keys().copied().collect();
    let mut settled = 0;

    for key in keys {
      let (geometry, edge_type) = key;

      // Phase 1: take everything out of the coordinator
      let mut partial_snapshot: Option<Arc<SegmentBuffer>> = None;
      let mut heartbeat: Option<u32> = None;
      let (notes, report) = {
        let Some(run) = self.runs.get_mut(&key) else {
          continue;
        };
        let notes = run.coordinator.drain_batches();
        let report = run.coordinator.poll();

        let style = self.params.marker;
        let mut appended = false;
        for note in &notes {
          for &point in &note.points {
            push_marker(&mut run.partial, point, style);
            appended = true;
          }
        }
        if appended && report.is_none() {
          partial_snapshot = Some(Arc::new(run.partial.clone()));
        }

        if notes.is_empty() && report.is_none() && run.coordinator.is_running() {
          let percent = run.coordinator.progress_percent();
          if percent != run.last_percent {
            run.last_percent = percent;
            heartbeat = Some(percent);
          }
        }
        (notes, report)
      };

      // Phase 2: fan out to cache, scene and host callbacks
      for note in &notes {
        self
          .events
          .on_progress(geometry, edge_type, note.percent, &note.message);
      }
      if let Some(percent) = heartbeat {
        self.events.on_progress(geometry, edge_type, percent, "");
      }
      if let Some(snapshot) = partial_snapshot {
        self.show_buffer(geometry, edge_type, snapshot);
        self.repaint.request_repaint(RepaintReason::PartialResults);
      }

      let Some(report) = report else {
        continue;
      };
      settled += 1;

      let current = self.epochs[edge_type.index()];
      if report.is_stale(current) {
        // Parameters changed while the worker ran; regenerate under the new
        // epoch instead of committing stale data
        if self.geometries.contains_key(&geometry)
          && self.flags.shows(edge_type)
          && self.cache.needs_generation(geometry, edge_type)
        {
          self.start_async(geometry, edge_type);
        }
        continue;
      }

      match report.outcome {
        GenerationOutcome::Completed(data) => {
          if let Some(stats) = &data.sampling {
            self.metrics.record_sampling(stats);
          }
          if let Some(result) = &data.intersection {
            self.metrics.record_intersection(result);
          }
          let message = if data.partial {
            "generation complete (partial)"
          } else {
            "generation complete"
          };
          self.commit_buffer(geometry, edge_type, Arc::new(data.buffer), report.epoch);
          self
            .events
            .on_complete(geometry, edge_type, CompletionStatus::Success, message);
          self.repaint.request_repaint(RepaintReason::GenerationCompleted);
        }
        GenerationOutcome::Cancelled => {
          self.restore_last_known(geometry, edge_type);
          self.events.on_complete(
            geometry,
            edge_type,
            CompletionStatus::Cancelled,
            "generation cancelled",
          );
        }
        GenerationOutcome::Failed(err) => {
          self.restore_last_known(geometry, edge_type);
          self
            .events
            .on_complete(geometry, edge_type, CompletionStatus::Failed, &err.to_string());
        }
      }
    }
    settled
  }

  // ---------------------------------------------------------------------------
  // Render-layer access
  // ---------------------------------------------------------------------------

  /// Drawable attached for a slot, if any.
  pub fn drawable_for(&self, geometry: GeometryId, edge_type: EdgeType) -> Option<&LineDrawable> {
    let key = self.attachment.key(geometry, edge_type)?;
    self.store.get(key)
  }

  pub fn store(&self) -> &DrawableStore {
    &self.store
  }

  pub fn cache(&self) -> &EdgeCache {
    &self.cache
  }

  /// Pipeline statistics for live buffers and recent runs.
  ///
  /// Stays at zero unless the crate is built with the `metrics` feature and
  /// collection is enabled.
  pub fn metrics(&self) -> &PipelineMetrics {
    &self.metrics
  }

  // ---------------------------------------------------------------------------
  // Internals
  // ---------------------------------------------------------------------------

  fn apply_visibility(&mut self) {
    self
      .attachment
      .apply_visibility(&mut self.store, &self.flags, &self.selected);
  }

  /// Generate every shown slot whose cache is missing or invalid.
  fn refresh_needed(&mut self) {
    let ids: Vec<GeometryId> = self.geometries.keys().copied().collect();
    for id in ids {
      self.refresh_geometry(id);
    }
  }

  fn refresh_geometry(&mut self, geometry: GeometryId) {
    for edge_type in EdgeType::ALL {
      if self.flags.shows(edge_type) && self.cache.needs_generation(geometry, edge_type) {
        self.generate(geometry, edge_type);
      }
    }
  }

  fn generate(&mut self, geometry: GeometryId, edge_type: EdgeType) {
    let lod_active = edge_type == EdgeType::Original
      && self
        .geometries
        .get(&geometry)
        .is_some_and(|entry| entry.lod.is_some());
    if lod_active {
      self.apply_lod_buffer(geometry);
    } else if edge_type.is_async() {
      self.start_async(geometry, edge_type);
    } else {
      self.generate_sync(geometry, edge_type);
    }
  }

  /// Bump epochs, mark caches stale and regenerate what is shown.
  fn invalidate_types(&mut self, types: &[EdgeType]) {
    for &edge_type in types {
      self.epochs[edge_type.index()].increment();
      self.cache.invalidate_type(edge_type);
    }
    let ids: Vec<GeometryId> = self.geometries.keys().copied().collect();
    for &edge_type in types {
      if !self.flags.shows(edge_type) {
        continue;
      }
      for &id in &ids {
        self.generate(id, edge_type);
      }
    }
    self.repaint.request_repaint(RepaintReason::ParametersChanged);
  }

  /// Build a cheap slot inline and commit it.
  fn generate_sync(&mut self, geometry: GeometryId, edge_type: EdgeType) {
    let Some(entry) = self.geometries.get(&geometry) else {
      return;
    };
    let shape = Arc::clone(&entry.shape);
    let highlight = if edge_type == EdgeType::Highlight {
      entry.highlight.clone()
    } else {
      Vec::new()
    };

    let (buffer, stats) = match edge_type {
      EdgeType::Mesh => (
        shape
          .mesh
          .as_ref()
          .map(|mesh| extract_mesh_edges(mesh, self.params.mesh_mode))
          .unwrap_or_default(),
        None,
      ),
      EdgeType::VertexNormal => (
        shape
          .mesh
          .as_ref()
          .map(|mesh| extract_vertex_normal_indicators(mesh, self.params.normal_indicator_length))
          .unwrap_or_default(),
        None,
      ),
      EdgeType::FaceNormal => (
        shape
          .mesh
          .as_ref()
          .map(|mesh| extract_face_normal_indicators(mesh, self.params.normal_indicator_length))
          .unwrap_or_default(),
        None,
      ),
      EdgeType::Highlight => {
        let (buffer, stats) = extract_edge_subset(&shape, &highlight, &self.params.sampling);
        (buffer, Some(stats))
      }
      EdgeType::Silhouette => {
        let view = self.view_direction(&shape);
        let (buffer, stats) = extract_silhouette_edges(&shape, view, &self.params.silhouette);
        (buffer, Some(stats))
      }
      // Async families never come through here
      EdgeType::Original | EdgeType::Feature | EdgeType::IntersectionMarker => return,
    };

    if let Some(stats) = &stats {
      self.metrics.record_sampling(stats);
    }
    let epoch = self.epochs[edge_type.index()];
    self.commit_buffer(geometry, edge_type, Arc::new(buffer), epoch);
  }

  /// Serve the original-edge slot from the active detail level.
  fn apply_lod_buffer(&mut self, geometry: GeometryId) {
    let Some(buffer) = self
      .geometries
      .get(&geometry)
      .and_then(|entry| entry.lod.as_ref())
      .map(|lod| Arc::clone(lod.current_buffer()))
    else {
      return;
    };
    let epoch = self.epochs[EdgeType::Original.index()];
    self.commit_buffer(geometry, EdgeType::Original, buffer, epoch);
  }

  /// Commit a buffer: settle metrics accounting against the entry it
  /// replaces, cache it under the family's epoch and attach it to the slot.
  fn commit_buffer(
    &mut self,
    geometry: GeometryId,
    edge_type: EdgeType,
    buffer: Arc<SegmentBuffer>,
    epoch: Epoch,
  ) {
    if let Some(old) = self.cache.last_known(geometry, edge_type) {
      self.metrics.remove_buffer(edge_type, old);
    }
    self.metrics.record_buffer(edge_type, &buffer);
    self.cache.store(geometry, edge_type, Arc::clone(&buffer), epoch);
    self.show_buffer(geometry, edge_type, buffer);
  }

  fn start_async(&mut self, geometry: GeometryId, edge_type: EdgeType) {
    let Some(entry) = self.geometries.get(&geometry) else {
      return;
    };
    let shape = Arc::clone(&entry.shape);
    let epoch = self.epochs[edge_type.index()];
    let sampling = self.params.sampling;
    let feature = self.params.feature;
    let intersection = self.params.intersection;
    let marker = self.params.marker;

    let run = self.runs.entry((geometry, edge_type)).or_default();
    if run.coordinator.is_running() {
      return;
    }
    run.last_percent = 0;
    run.partial.clear();

    match edge_type {
      EdgeType::Original => {
        run.coordinator.start(epoch, move |ctx| {
          ctx.set_progress(10);
          let (buffer, stats) = extract_edges(&shape, &sampling);
          ctx.set_progress(100);
          Ok(GeneratedData {
            buffer,
            partial: false,
            sampling: Some(stats),
            intersection: None,
          })
        });
      }
      EdgeType::Feature => {
        run.coordinator.start(epoch, move |ctx| {
          ctx.set_progress(10);
          let (buffer, stats) = extract_feature_edges(&shape, &feature);
          ctx.set_progress(100);
          Ok(GeneratedData {
            buffer,
            partial: false,
            sampling: Some(stats),
            intersection: None,
          })
        });
      }
      EdgeType::IntersectionMarker => {
        run.coordinator.start(epoch, move |ctx| {
          ctx.set_progress(5);
          ctx.emit_batch(ProgressNote::status(5, "collecting candidate edges"));
          let mut search = ProgressiveIntersection::new(&shape, &intersection);
          ctx.set_progress(30);
          ctx.emit_batch(ProgressNote::status(
            30,
            format!(
              "testing {} candidate pairs at tolerance {:.6}",
              search.total_pairs(),
              search.tolerance()
            ),
          ));

          while !search.is_done() {
            if ctx.is_cancelled() {
              search.cancel();
              break;
            }
            let before = search.points().len();
            search.step();
            let percent = u32::from(search.progress_percent());
            ctx.set_progress(percent);
            let fresh: Vec<DVec3> = search.points()[before..].to_vec();
            if !fresh.is_empty() {
              ctx.emit_batch(ProgressNote {
                percent,
                message: format!("{} intersections found", search.points().len()),
                points: fresh,
              });
            }
          }

          let result = search.finish();
          ctx.set_progress(95);
          let buffer = marker_segments(&result.points, marker);
          ctx.set_progress(100);
          Ok(GeneratedData {
            buffer,
            partial: result.partial,
            sampling: None,
            intersection: Some(result),
          })
        });
      }
      _ => {}
    }
  }

  /// Point the slot's drawable at a buffer, creating the drawable on first
  /// use. Appearance and visibility rules are re-applied either way.
  fn show_buffer(&mut self, geometry: GeometryId, edge_type: EdgeType, buffer: Arc<SegmentBuffer>) {
    let swapped = self
      .attachment
      .key(geometry, edge_type)
      .is_some_and(|key| self.store.set_buffer(key, buffer.clone()));
    if !swapped {
      let appearance = self.appearances[edge_type.index()];
      self
        .attachment
        .set(&mut self.store, geometry, edge_type, buffer, appearance);
    }
    self.apply_visibility();
  }

  /// Put the last-known-good buffer back after a failed or cancelled run, or
  /// clear the slot when nothing was ever generated.
  fn restore_last_known(&mut self, geometry: GeometryId, edge_type: EdgeType) {
    match self.cache.last_known(geometry, edge_type).cloned() {
      Some(buffer) => self.show_buffer(geometry, edge_type, buffer),
      None => {
        self.attachment.clear(&mut self.store, geometry, edge_type);
      }
    }
  }

  /// Unit vector from the camera toward the shape.
  fn view_direction(&self, shape: &EdgeShape) -> DVec3 {
    let bounds = shape.bounding_box();
    let target = if bounds.is_valid() {
      bounds.center()
    } else {
      DVec3::ZERO
    };
    (target - self.camera).try_normalize().unwrap_or(DVec3::Z)
  }
}

#[cfg(test)]
#[path = "manager_test.rs"]
mod manager_test;
