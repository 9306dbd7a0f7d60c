//! Height field tessellation into indexed triangle meshes.
//!
//! A pure function from (field, params, lod) to a [`SurfaceMesh`]. LOD works
//! by decimation: level 0 takes every sample, level `n > 0` takes every
//! `2n`-th sample along both axes, so the vertex grid shrinks while the
//! world-space footprint stays identical.

use std::fmt;
use std::sync::Arc;

use glam::{Vec2, Vec3};

use crate::types::{HeightCurve, HeightField, IdentityCurve, SurfaceMesh};

/// Sampling stride for a decimation level: 1 at level 0, `lod * 2` above.
#[inline]
pub fn decimation_step(lod: u32) -> usize {
  if lod == 0 {
    1
  } else {
    (lod * 2) as usize
  }
}

/// Vertices per line for a field extent at a given stride.
#[inline]
pub fn vertices_per_line(extent: usize, step: usize) -> usize {
  (extent - 1) / step + 1
}

/// Inputs to [`build`] that do not vary per LOD.
#[derive(Clone)]
pub struct MeshParams {
  /// Scales the (curved) height value into world units.
  pub height_multiplier: f32,

  /// Remap applied to each raw height before the multiplier.
  pub curve: Arc<dyn HeightCurve>,
}

impl Default for MeshParams {
  fn default() -> Self {
    Self {
      height_multiplier: 1.0,
      curve: Arc::new(IdentityCurve),
    }
  }
}

impl MeshParams {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_height_multiplier(mut self, height_multiplier: f32) -> Self {
    self.height_multiplier = height_multiplier;
    self
  }

  pub fn with_curve(mut self, curve: Arc<dyn HeightCurve>) -> Self {
    self.curve = curve;
    self
  }
}

impl fmt::Debug for MeshParams {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("MeshParams")
      .field("height_multiplier", &self.height_multiplier)
      .finish_non_exhaustive()
  }
}

/// Tessellate a height field at the given decimation level.
///
/// Vertices are emitted in row-major order, x/z centered on the origin with
/// y driven by the remapped height. Each interior cell contributes two
/// triangles wound so recalculated normals face up. Buffers are sized
/// exactly up front; no reallocation happens during the scan.
#[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "mesh::build"))]
pub fn build(field: &HeightField, params: &MeshParams, lod: u32) -> SurfaceMesh {
  let width = field.width();
  let height = field.height();
  let top_left_x = (width as f32 - 1.0) / -2.0;
  let top_left_z = (height as f32 - 1.0) / 2.0;

  let step = decimation_step(lod);
  let line = vertices_per_line(width, step) as u32;
  let column = vertices_per_line(height, step) as u32;

  let mut mesh = SurfaceMesh {
    positions: Vec::with_capacity((line * column) as usize),
    uvs: Vec::with_capacity((line * column) as usize),
    indices: Vec::with_capacity(((line - 1) * (column - 1) * 6) as usize),
  };

  let mut vertex_index = 0u32;
  for y in (0..height).step_by(step) {
    for x in (0..width).step_by(step) {
      let h = params.curve.evaluate(field.get(x, y)) * params.height_multiplier;
      mesh
        .positions
        .push(Vec3::new(top_left_x + x as f32, h, top_left_z - y as f32));
      mesh
        .uvs
        .push(Vec2::new(x as f32 / width as f32, y as f32 / height as f32));

      if x < width - 1 && y < height - 1 {
        // Two triangles per quad; this winding keeps normals pointing up.
        let i = vertex_index;
        mesh.indices.extend_from_slice(&[i, i + line + 1, i + line]);
        mesh.indices.extend_from_slice(&[i + line + 1, i, i + 1]);
      }

      vertex_index += 1;
    }
  }

  mesh
}

#[cfg(test)]
#[path = "mesh_test.rs"]
mod mesh_test;
