//! Core data types for heightfield terrain streaming.

use glam::{Vec2, Vec3};

/// Integer chunk coordinate on the infinite terrain grid.
///
/// Chunks are keyed by coordinate in the store; the coordinate times the
/// chunk size gives the chunk's world-space center.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChunkCoord {
  pub x: i32,
  pub y: i32,
}

impl ChunkCoord {
  pub fn new(x: i32, y: i32) -> Self {
    Self { x, y }
  }

  /// Coordinate of the chunk containing a planar world position
  /// (rounds to the nearest chunk center).
  pub fn from_world(pos: Vec2, chunk_size: f32) -> Self {
    Self {
      x: (pos.x / chunk_size).round() as i32,
      y: (pos.y / chunk_size).round() as i32,
    }
  }

  /// World-space center of this chunk.
  pub fn to_world(&self, chunk_size: f32) -> Vec2 {
    Vec2::new(self.x as f32 * chunk_size, self.y as f32 * chunk_size)
  }
}

/// Planar axis-aligned box used for per-chunk visibility culling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds2 {
  pub min: Vec2,
  pub max: Vec2,
}

impl Bounds2 {
  pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
    let extents = size * 0.5;
    Self {
      min: center - extents,
      max: center + extents,
    }
  }

  /// Squared distance from a point to the nearest edge (zero inside the box).
  #[inline]
  pub fn sqr_distance(&self, point: Vec2) -> f32 {
    let dx = (self.min.x - point.x).max(point.x - self.max.x).max(0.0);
    let dy = (self.min.y - point.y).max(point.y - self.max.y).max(0.0);
    dx * dx + dy * dy
  }

  /// Euclidean distance from a point to the nearest edge (zero inside).
  #[inline]
  pub fn distance(&self, point: Vec2) -> f32 {
    self.sqr_distance(point).sqrt()
  }
}

/// Immutable 2D grid of elevation samples.
///
/// Values are stored row-major. The value range depends on the normalization
/// mode that produced the field: [0, 1] for local normalization, [0, +inf)
/// for global.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightField {
  width: usize,
  height: usize,
  values: Box<[f32]>,
}

impl HeightField {
  /// Wrap a row-major value buffer.
  ///
  /// # Panics
  ///
  /// Panics if `values.len() != width * height`.
  pub fn from_values(width: usize, height: usize, values: Vec<f32>) -> Self {
    assert_eq!(values.len(), width * height, "height field buffer size mismatch");
    Self {
      width,
      height,
      values: values.into_boxed_slice(),
    }
  }

  pub fn width(&self) -> usize {
    self.width
  }

  pub fn height(&self) -> usize {
    self.height
  }

  #[inline]
  pub fn get(&self, x: usize, y: usize) -> f32 {
    self.values[y * self.width + x]
  }

  pub fn values(&self) -> &[f32] {
    &self.values
  }
}

/// Indexed triangle mesh produced from a height field.
///
/// Invariants: `positions.len() == uvs.len()` and every index is
/// `< positions.len()`. Winding is consistent so recalculated normals face
/// upward.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SurfaceMesh {
  /// Vertex positions, x/z centered on the chunk origin.
  pub positions: Vec<Vec3>,

  /// Texture coordinates, index-aligned with `positions`.
  pub uvs: Vec<Vec2>,

  /// Triangle vertex indices (3 per triangle).
  pub indices: Vec<u32>,
}

impl SurfaceMesh {
  pub fn vertex_count(&self) -> usize {
    self.positions.len()
  }

  pub fn triangle_count(&self) -> usize {
    self.indices.len() / 3
  }

  pub fn is_empty(&self) -> bool {
    self.positions.is_empty()
  }
}

/// One entry of the detail policy: decimation level plus the viewer distance
/// up to which it applies. An ascending sequence of these defines the LOD
/// table; the last threshold is the maximum view distance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LodLevel {
  /// Decimation level passed to the mesh builder (0 = full resolution).
  pub lod: u32,

  /// Chunks closer than this use this level (or a finer one).
  pub visible_dist_threshold: f32,
}

impl LodLevel {
  pub fn new(lod: u32, visible_dist_threshold: f32) -> Self {
    Self {
      lod,
      visible_dist_threshold,
    }
  }
}

/// RGBA color map produced by the external color/texture collaborator.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorMap {
  pub width: usize,
  pub height: usize,
  pub pixels: Vec<[u8; 4]>,
}

/// Height remap applied to each sample before the height multiplier.
///
/// Implemented for any `Fn(f32) -> f32`, so callers can pass a closure to
/// flatten water or exaggerate peaks.
pub trait HeightCurve: Send + Sync {
  fn evaluate(&self, h: f32) -> f32;
}

impl<F> HeightCurve for F
where
  F: Fn(f32) -> f32 + Send + Sync,
{
  fn evaluate(&self, h: f32) -> f32 {
    self(h)
  }
}

/// Curve that leaves heights untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityCurve;

impl HeightCurve for IdentityCurve {
  fn evaluate(&self, h: f32) -> f32 {
    h
  }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
