//! Chunk ownership, LOD selection, and async data mediation.
//!
//! The store exclusively owns every [`Chunk`]; chunks own their height field
//! and cached per-LOD meshes. Worker completions are marshalled back through
//! [`ChunkStore::on_height_ready`] / [`ChunkStore::on_mesh_ready`] on the
//! controller thread, so chunk state is never touched concurrently.
//!
//! Per chunk the store runs a small state machine: height data pending ->
//! height data ready, and per LOD slot mesh pending -> mesh cached ->
//! attached. At most one build is ever in flight per (chunk, LOD) pair; that
//! flag is the backpressure mechanism that bounds queue growth while the
//! viewer is moving fast.

use std::collections::HashMap;
use std::sync::Arc;

use glam::Vec2;
use smallvec::SmallVec;

use crate::config::TerrainConfig;
use crate::noise::HeightSource;
use crate::streaming::{ColorMapProvider, TerrainSink};
use crate::tasks::{Completion, JobQueue};
use crate::types::{Bounds2, ChunkCoord, HeightField, LodLevel, SurfaceMesh};

/// Per-LOD mesh cache entry.
#[derive(Clone, Debug, Default)]
struct LodSlot {
  mesh: Option<Arc<SurfaceMesh>>,
  /// True while a build for this slot is in flight.
  requested: bool,
}

/// One tile of the infinite terrain grid.
pub struct Chunk {
  coord: ChunkCoord,
  position: Vec2,
  bounds: Bounds2,
  height_field: Option<Arc<HeightField>>,
  lod_meshes: SmallVec<[LodSlot; 6]>,
  attached_lod: Option<usize>,
  visible: bool,
}

impl Chunk {
  pub fn coord(&self) -> ChunkCoord {
    self.coord
  }

  pub fn position(&self) -> Vec2 {
    self.position
  }

  pub fn bounds(&self) -> Bounds2 {
    self.bounds
  }

  pub fn is_visible(&self) -> bool {
    self.visible
  }

  pub fn has_height_data(&self) -> bool {
    self.height_field.is_some()
  }

  /// LOD index of the mesh currently attached at the sink, if any.
  pub fn attached_lod(&self) -> Option<usize> {
    self.attached_lod
  }

  pub fn cached_mesh(&self, lod_index: usize) -> Option<&Arc<SurfaceMesh>> {
    self.lod_meshes.get(lod_index).and_then(|slot| slot.mesh.as_ref())
  }

  /// True while a build for this LOD slot is in flight.
  pub fn mesh_requested(&self, lod_index: usize) -> bool {
    self.lod_meshes.get(lod_index).is_some_and(|slot| slot.requested)
  }
}

/// Counters for diagnostics and tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamStats {
  pub chunks_created: u64,
  pub height_jobs: u64,
  pub height_fields_ready: u64,
  pub mesh_jobs: u64,
  pub meshes_built: u64,
  pub meshes_attached: u64,
  pub chunks_evicted: u64,
}

/// Index of the first level whose threshold `distance` does not exceed,
/// falling back to the coarsest level. Strict comparison: a distance exactly
/// on a threshold keeps the finer level.
pub fn select_lod(levels: &[LodLevel], distance: f32) -> usize {
  let mut index = 0;
  for i in 0..levels.len().saturating_sub(1) {
    if distance > levels[i].visible_dist_threshold {
      index = i + 1;
    } else {
      break;
    }
  }
  index
}

/// Owns all chunks and mediates their asynchronous production.
pub struct ChunkStore {
  config: TerrainConfig,
  source: Arc<dyn HeightSource>,
  color_provider: Option<Arc<dyn ColorMapProvider>>,
  jobs: JobQueue,
  chunks: HashMap<ChunkCoord, Chunk>,
  stats: StreamStats,
}

impl ChunkStore {
  /// Build a store over a validated config. Validation happens in the
  /// streaming controller constructor; the store assumes it.
  pub fn new(config: TerrainConfig, source: Arc<dyn HeightSource>) -> Self {
    Self {
      config,
      source,
      color_provider: None,
      jobs: JobQueue::new(),
      chunks: HashMap::new(),
      stats: StreamStats::default(),
    }
  }

  pub fn with_color_provider(mut self, provider: Arc<dyn ColorMapProvider>) -> Self {
    self.color_provider = Some(provider);
    self
  }

  /// Create the chunk on first reference and request its height field.
  ///
  /// Idempotent: an existing chunk is left untouched, and the height request
  /// is issued at most once per chunk. New chunks stay invisible until data
  /// arrives and a visibility pass runs.
  pub fn ensure_chunk(&mut self, coord: ChunkCoord) {
    if self.chunks.contains_key(&coord) {
      return;
    }

    let chunk_size = self.config.chunk_size as f32;
    let position = coord.to_world(chunk_size);
    let bounds = Bounds2::from_center_size(position, Vec2::splat(chunk_size));
    let lod_meshes = (0..self.config.lod_levels.len()).map(|_| LodSlot::default()).collect();

    self.chunks.insert(
      coord,
      Chunk {
        coord,
        position,
        bounds,
        height_field: None,
        lod_meshes,
        attached_lod: None,
        visible: false,
      },
    );
    self.stats.chunks_created += 1;

    self
      .jobs
      .spawn_height(coord, Arc::clone(&self.source), self.config.field_size(), position);
    self.stats.height_jobs += 1;
  }

  /// Store a finished height field and hand the color collaborator its one
  /// shot at the data. Completions for evicted chunks are dropped silently.
  pub fn on_height_ready(&mut self, coord: ChunkCoord, field: Arc<HeightField>, sink: &mut dyn TerrainSink) {
    let Some(chunk) = self.chunks.get_mut(&coord) else {
      return;
    };

    if let Some(provider) = &self.color_provider {
      sink.apply_color_map(coord, provider.color_map(&field));
    }

    chunk.height_field = Some(field);
    self.stats.height_fields_ready += 1;
  }

  /// Cache a finished mesh. Attachment is not decided here: the follow-up
  /// visibility pass attaches it only if the chunk still wants this LOD, so
  /// a stale result is retained for reuse instead of mis-attached.
  pub fn on_mesh_ready(&mut self, coord: ChunkCoord, lod_index: usize, mesh: Arc<SurfaceMesh>) {
    let Some(chunk) = self.chunks.get_mut(&coord) else {
      return;
    };
    let Some(slot) = chunk.lod_meshes.get_mut(lod_index) else {
      return;
    };

    slot.mesh = Some(mesh);
    slot.requested = false;
    self.stats.meshes_built += 1;
  }

  /// Re-evaluate one chunk against the viewer: visibility from edge distance,
  /// then LOD selection, then attach-or-request for the selected LOD.
  ///
  /// Returns whether the chunk ends this pass visible. Not displayable until
  /// its height data has arrived. Emits `set_visible` only on transitions,
  /// so a chunk that stays visible across passes never flickers.
  pub fn update_chunk(&mut self, coord: ChunkCoord, viewer_pos: Vec2, sink: &mut dyn TerrainSink) -> bool {
    let max_view_dist = self.config.max_view_dist();
    let Some(chunk) = self.chunks.get_mut(&coord) else {
      return false;
    };
    let Some(field) = chunk.height_field.clone() else {
      return false;
    };

    let distance = chunk.bounds.distance(viewer_pos);
    let visible = distance <= max_view_dist;

    if visible {
      let lod_index = select_lod(&self.config.lod_levels, distance);

      if chunk.attached_lod != Some(lod_index) {
        let slot = &mut chunk.lod_meshes[lod_index];
        if let Some(mesh) = &slot.mesh {
          chunk.attached_lod = Some(lod_index);
          sink.attach_mesh(coord, Arc::clone(mesh));
          self.stats.meshes_attached += 1;
        } else if !slot.requested {
          slot.requested = true;
          self.jobs.spawn_mesh(
            coord,
            lod_index,
            self.config.lod_levels[lod_index].lod,
            field,
            self.config.mesh.clone(),
          );
          self.stats.mesh_jobs += 1;
        }
      }
    }

    if chunk.visible != visible {
      chunk.visible = visible;
      sink.set_visible(coord, visible);
    }

    visible
  }

  /// Force-hide a chunk that left the visible window without being updated.
  pub fn hide_chunk(&mut self, coord: ChunkCoord, sink: &mut dyn TerrainSink) {
    if let Some(chunk) = self.chunks.get_mut(&coord) {
      if chunk.visible {
        chunk.visible = false;
        sink.set_visible(coord, false);
      }
    }
  }

  /// Drop every chunk beyond the retention band, freeing its height field
  /// and cached meshes. Returns the evicted coordinates so the controller
  /// can forget them too.
  pub fn evict_distant(&mut self, viewer_pos: Vec2, sink: &mut dyn TerrainSink) -> Vec<ChunkCoord> {
    let retention = self.config.max_view_dist() * self.config.retention_factor;
    let retention_sq = retention * retention;

    let mut evicted = Vec::new();
    self.chunks.retain(|coord, chunk| {
      if chunk.bounds.sqr_distance(viewer_pos) <= retention_sq {
        return true;
      }
      if chunk.visible {
        sink.set_visible(*coord, false);
      }
      evicted.push(*coord);
      false
    });

    self.stats.chunks_evicted += evicted.len() as u64;
    evicted
  }

  /// Take all worker completions that have arrived (non-blocking).
  pub fn drain_completions(&mut self) -> Vec<Completion> {
    self.jobs.drain()
  }

  pub fn config(&self) -> &TerrainConfig {
    &self.config
  }

  pub fn get(&self, coord: ChunkCoord) -> Option<&Chunk> {
    self.chunks.get(&coord)
  }

  pub fn chunk_count(&self) -> usize {
    self.chunks.len()
  }

  pub fn stats(&self) -> StreamStats {
    self.stats
  }

  /// Jobs spawned but not yet finished.
  pub fn in_flight_jobs(&self) -> usize {
    self.jobs.in_flight_count()
  }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;
