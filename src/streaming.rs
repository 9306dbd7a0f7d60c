//! Per-tick streaming driver.
//!
//! Each tick runs the same sequence:
//!
//! 1. drain worker completions and fold them into chunk state;
//! 2. if the viewer moved past the movement threshold since the last window
//!    recompute, enumerate the square chunk window around the viewer's chunk
//!    coordinate and re-evaluate every chunk in it;
//! 3. hide chunks that were visible last pass but fell out of this one;
//! 4. evict chunks beyond the retention band.
//!
//! The window is square; real distance culling happens per chunk against the
//! Euclidean distance to its bounds. Visibility is diffed by set difference
//! rather than hide-all-then-reshow, so a chunk that stays visible across
//! passes receives no toggle at all.

use std::collections::HashSet;
use std::sync::Arc;

use glam::Vec2;

use crate::config::{ConfigError, TerrainConfig};
use crate::noise::{HeightSource, NoiseHeightSource};
use crate::store::{ChunkStore, StreamStats};
use crate::tasks::Completion;
use crate::types::{ChunkCoord, ColorMap, HeightField, SurfaceMesh};

/// Renderable surface sink: the engine-side collaborator that owns actual
/// GPU/scene resources. All calls are made on the controller thread.
pub trait TerrainSink {
  /// A mesh became the active LOD for a chunk.
  fn attach_mesh(&mut self, coord: ChunkCoord, mesh: Arc<SurfaceMesh>);

  /// A chunk entered or left the visible set.
  fn set_visible(&mut self, coord: ChunkCoord, visible: bool);

  /// The color collaborator produced a map for a chunk. Called once per
  /// chunk, right before its height data is stored.
  fn apply_color_map(&mut self, _coord: ChunkCoord, _map: ColorMap) {}
}

/// Optional collaborator that turns a height field into a color/texture map,
/// independent of mesh LOD.
pub trait ColorMapProvider: Send + Sync {
  fn color_map(&self, field: &HeightField) -> ColorMap;
}

/// Streams terrain chunks around a moving viewpoint.
///
/// The viewer's planar position is an explicit parameter to [`tick`](Self::tick);
/// nothing in the core reads shared viewer state.
pub struct StreamingController {
  store: ChunkStore,
  chunk_size: f32,
  chunks_visible: i32,
  sqr_move_threshold: f32,
  /// Position at the last window recompute; `None` forces the first tick to
  /// recompute unconditionally.
  viewer_pos_old: Option<Vec2>,
  visible_last_update: HashSet<ChunkCoord>,
}

impl StreamingController {
  /// Controller over the built-in fractal noise source.
  pub fn new(config: TerrainConfig) -> Result<Self, ConfigError> {
    let source = Arc::new(NoiseHeightSource::new(config.noise));
    Self::with_source(config, source)
  }

  /// Controller over a custom height source.
  pub fn with_source(config: TerrainConfig, source: Arc<dyn HeightSource>) -> Result<Self, ConfigError> {
    config.validate()?;

    let chunk_size = config.chunk_size as f32;
    let chunks_visible = config.chunks_visible_in_view_dist();
    let sqr_move_threshold = config.viewer_move_threshold * config.viewer_move_threshold;

    Ok(Self {
      store: ChunkStore::new(config, source),
      chunk_size,
      chunks_visible,
      sqr_move_threshold,
      viewer_pos_old: None,
      visible_last_update: HashSet::new(),
    })
  }

  pub fn with_color_provider(mut self, provider: Arc<dyn ColorMapProvider>) -> Self {
    self.store = self.store.with_color_provider(provider);
    self
  }

  /// Advance one frame.
  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "streaming::tick"))]
  pub fn tick(&mut self, viewer_pos: Vec2, sink: &mut dyn TerrainSink) {
    // Apply completed work first so this pass sees the freshest chunk state.
    for completion in self.store.drain_completions() {
      match completion {
        Completion::Height { coord, field, .. } => {
          self.store.on_height_ready(coord, field, sink);
          self.reevaluate(coord, viewer_pos, sink);
        }
        Completion::Mesh { coord, lod_index, mesh, .. } => {
          self.store.on_mesh_ready(coord, lod_index, mesh);
          self.reevaluate(coord, viewer_pos, sink);
        }
      }
    }

    // Movement hysteresis: skip the window recompute until the viewer has
    // moved far enough from the last recompute position.
    let moved = match self.viewer_pos_old {
      None => true,
      Some(old) => old.distance_squared(viewer_pos) > self.sqr_move_threshold,
    };
    if !moved {
      return;
    }
    self.viewer_pos_old = Some(viewer_pos);

    self.update_visible_chunks(viewer_pos, sink);

    for coord in self.store.evict_distant(viewer_pos, sink) {
      self.visible_last_update.remove(&coord);
    }
  }

  /// Re-evaluate a single chunk after one of its completions landed,
  /// keeping the visible set in sync.
  fn reevaluate(&mut self, coord: ChunkCoord, viewer_pos: Vec2, sink: &mut dyn TerrainSink) {
    if self.store.update_chunk(coord, viewer_pos, sink) {
      self.visible_last_update.insert(coord);
    } else {
      self.visible_last_update.remove(&coord);
    }
  }

  fn update_visible_chunks(&mut self, viewer_pos: Vec2, sink: &mut dyn TerrainSink) {
    let center = ChunkCoord::from_world(viewer_pos, self.chunk_size);

    let mut visible = HashSet::with_capacity(self.visible_last_update.len());
    for y_offset in -self.chunks_visible..=self.chunks_visible {
      for x_offset in -self.chunks_visible..=self.chunks_visible {
        let coord = ChunkCoord::new(center.x + x_offset, center.y + y_offset);
        self.store.ensure_chunk(coord);
        if self.store.update_chunk(coord, viewer_pos, sink) {
          visible.insert(coord);
        }
      }
    }

    // Chunks that left the window were not updated above and still think
    // they are visible.
    let previous = std::mem::replace(&mut self.visible_last_update, visible);
    for coord in previous {
      if !self.visible_last_update.contains(&coord) {
        self.store.hide_chunk(coord, sink);
      }
    }
  }

  pub fn store(&self) -> &ChunkStore {
    &self.store
  }

  pub fn stats(&self) -> StreamStats {
    self.store.stats()
  }

  pub fn visible_count(&self) -> usize {
    self.visible_last_update.len()
  }

  pub fn is_visible(&self, coord: ChunkCoord) -> bool {
    self.visible_last_update.contains(&coord)
  }
}

#[cfg(test)]
#[path = "streaming_test.rs"]
mod streaming_test;
