//! Shared helpers for store and streaming tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use glam::Vec2;

use crate::noise::HeightSource;
use crate::store::ChunkStore;
use crate::streaming::{ColorMapProvider, TerrainSink};
use crate::tasks::Completion;
use crate::types::{ChunkCoord, ColorMap, HeightField, SurfaceMesh};

/// Everything a sink can observe, in call order.
#[derive(Clone, Debug, PartialEq)]
pub enum SinkEvent {
  Attach { coord: ChunkCoord, vertex_count: usize },
  Visible { coord: ChunkCoord, visible: bool },
  ColorMap { coord: ChunkCoord },
}

/// Sink that records every call for later assertions.
#[derive(Default)]
pub struct RecordingSink {
  pub events: Vec<SinkEvent>,
}

impl RecordingSink {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn attach_count(&self, coord: ChunkCoord) -> usize {
    self
      .events
      .iter()
      .filter(|e| matches!(e, SinkEvent::Attach { coord: c, .. } if *c == coord))
      .count()
  }

  pub fn visible_events(&self, coord: ChunkCoord) -> Vec<bool> {
    self
      .events
      .iter()
      .filter_map(|e| match e {
        SinkEvent::Visible { coord: c, visible } if *c == coord => Some(*visible),
        _ => None,
      })
      .collect()
  }

  pub fn color_map_count(&self, coord: ChunkCoord) -> usize {
    self
      .events
      .iter()
      .filter(|e| matches!(e, SinkEvent::ColorMap { coord: c } if *c == coord))
      .count()
  }
}

impl TerrainSink for RecordingSink {
  fn attach_mesh(&mut self, coord: ChunkCoord, mesh: Arc<SurfaceMesh>) {
    self.events.push(SinkEvent::Attach {
      coord,
      vertex_count: mesh.vertex_count(),
    });
  }

  fn set_visible(&mut self, coord: ChunkCoord, visible: bool) {
    self.events.push(SinkEvent::Visible { coord, visible });
  }

  fn apply_color_map(&mut self, coord: ChunkCoord, _map: ColorMap) {
    self.events.push(SinkEvent::ColorMap { coord });
  }
}

/// Height source that returns flat fields and counts invocations.
pub struct CountingSource {
  pub calls: AtomicUsize,
  pub value: f32,
}

impl CountingSource {
  pub fn new() -> Arc<Self> {
    Arc::new(Self {
      calls: AtomicUsize::new(0),
      value: 0.5,
    })
  }

  pub fn call_count(&self) -> usize {
    self.calls.load(Ordering::Relaxed)
  }
}

impl HeightSource for CountingSource {
  fn generate(&self, size: usize, _world_offset: Vec2) -> HeightField {
    self.calls.fetch_add(1, Ordering::Relaxed);
    HeightField::from_values(size, size, vec![self.value; size * size])
  }
}

/// Provider that paints every field a single color.
pub struct FlatColorProvider;

impl ColorMapProvider for FlatColorProvider {
  fn color_map(&self, field: &HeightField) -> ColorMap {
    ColorMap {
      width: field.width(),
      height: field.height(),
      pixels: vec![[0, 128, 0, 255]; field.width() * field.height()],
    }
  }
}

/// Poll the store until `count` completions arrived or the timeout elapses.
pub fn drain_blocking(store: &mut ChunkStore, count: usize) -> Vec<Completion> {
  let mut out = Vec::new();
  for _ in 0..2000 {
    out.extend(store.drain_completions());
    if out.len() >= count {
      break;
    }
    std::thread::sleep(std::time::Duration::from_millis(1));
  }
  out
}
