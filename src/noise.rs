//! Fractal noise field generation.
//!
//! Sums octaves of gradient noise into a height field. Generation is
//! deterministic for a fixed seed: the per-octave sample offsets come from a
//! seeded ChaCha stream drawn once before the per-cell loop, and the gradient
//! primitive itself is seeded. That determinism is what lets adjacent chunks
//! tile when sampled with the correct world offset.

use glam::Vec2;
use noise::{NoiseFn, Perlin};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::types::HeightField;

/// Non-positive scales are clamped to this instead of being reported.
pub const MIN_SCALE: f32 = 1e-4;

/// Octave offsets are drawn uniformly from ±this range.
const OCTAVE_OFFSET_RANGE: f32 = 100_000.0;

/// How raw octave sums are mapped into the output range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NormalizeMode {
  /// Remap from the observed min/max of this field to [0, 1]. Fills the full
  /// range but is not comparable across separately generated chunks.
  #[default]
  Local,

  /// Divide `(value + 1)` by the maximum possible amplitude sum and clamp at
  /// zero. Comparable across chunks, does not fill [0, 1] exactly.
  Global,
}

/// Inputs to [`generate`]. Builder methods follow the usual `with_*` pattern.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoiseParams {
  pub seed: u32,
  /// Zoom factor; larger values give smoother terrain. Clamped to
  /// [`MIN_SCALE`] when non-positive.
  pub scale: f32,
  pub octaves: u32,
  /// Per-octave amplitude decay, in (0, 1].
  pub persistence: f32,
  /// Per-octave frequency growth, >= 1.
  pub lacunarity: f32,
  /// World-space sample offset; the chunk store adds each chunk's position
  /// to this so neighboring fields line up.
  pub offset: Vec2,
  pub normalize_mode: NormalizeMode,
}

impl Default for NoiseParams {
  fn default() -> Self {
    Self {
      seed: 0,
      scale: 25.0,
      octaves: 4,
      persistence: 0.5,
      lacunarity: 2.0,
      offset: Vec2::ZERO,
      normalize_mode: NormalizeMode::Local,
    }
  }
}

impl NoiseParams {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_seed(mut self, seed: u32) -> Self {
    self.seed = seed;
    self
  }

  pub fn with_scale(mut self, scale: f32) -> Self {
    self.scale = scale;
    self
  }

  pub fn with_octaves(mut self, octaves: u32) -> Self {
    self.octaves = octaves;
    self
  }

  pub fn with_persistence(mut self, persistence: f32) -> Self {
    self.persistence = persistence;
    self
  }

  pub fn with_lacunarity(mut self, lacunarity: f32) -> Self {
    self.lacunarity = lacunarity;
    self
  }

  pub fn with_offset(mut self, offset: Vec2) -> Self {
    self.offset = offset;
    self
  }

  pub fn with_normalize_mode(mut self, mode: NormalizeMode) -> Self {
    self.normalize_mode = mode;
    self
  }
}

/// Generate a `width` x `height` field of fractal noise.
///
/// Total over its input domain: a non-positive scale is clamped rather than
/// signaled, and there are no other failure conditions.
#[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "noise::generate"))]
pub fn generate(width: usize, height: usize, params: &NoiseParams) -> HeightField {
  let scale = if params.scale <= 0.0 { MIN_SCALE } else { params.scale };

  // Octave offsets and the theoretical amplitude sum are fixed before
  // sampling; the PRNG stream depends only on the seed.
  let mut rng = ChaCha8Rng::seed_from_u64(params.seed as u64);
  let mut octave_offsets = Vec::with_capacity(params.octaves as usize);
  let mut max_possible_height = 0.0f32;
  let mut amplitude = 1.0f32;

  for _ in 0..params.octaves {
    let offset_x = rng.random_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE) + params.offset.x;
    let offset_y = rng.random_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE) - params.offset.y;
    octave_offsets.push(Vec2::new(offset_x, offset_y));

    max_possible_height += amplitude;
    amplitude *= params.persistence;
  }

  let perlin = Perlin::new(params.seed);
  let half_width = width as f32 / 2.0;
  let half_height = height as f32 / 2.0;

  let mut values = Vec::with_capacity(width * height);
  let mut min_observed = f32::MAX;
  let mut max_observed = f32::MIN;

  for y in 0..height {
    for x in 0..width {
      let mut amplitude = 1.0f32;
      let mut frequency = 1.0f32;
      let mut sum = 0.0f32;

      for octave_offset in &octave_offsets {
        let sample_x = (x as f32 - half_width + octave_offset.x) / scale * frequency;
        let sample_y = (y as f32 - half_height + octave_offset.y) / scale * frequency;

        // Gradient noise in roughly [-1, 1] per sample.
        let sample = perlin.get([sample_x as f64, sample_y as f64]) as f32;
        sum += sample * amplitude;

        amplitude *= params.persistence;
        frequency *= params.lacunarity;
      }

      min_observed = min_observed.min(sum);
      max_observed = max_observed.max(sum);
      values.push(sum);
    }
  }

  match params.normalize_mode {
    NormalizeMode::Local => {
      for value in &mut values {
        *value = inverse_lerp(min_observed, max_observed, *value);
      }
    }
    NormalizeMode::Global => {
      for value in &mut values {
        *value = ((*value + 1.0) / max_possible_height).max(0.0);
      }
    }
  }

  HeightField::from_values(width, height, values)
}

/// Position of `value` between `a` and `b`; constant fields map to 0.
fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
  if (b - a).abs() <= f32::EPSILON {
    0.0
  } else {
    (value - a) / (b - a)
  }
}

/// Height data seam between the chunk store and whatever produces fields.
///
/// Implementations must be deterministic for a fixed world offset so a
/// regenerated chunk is identical to the evicted one.
pub trait HeightSource: Send + Sync {
  /// Generate a `size` x `size` field centered on `world_offset`.
  fn generate(&self, size: usize, world_offset: Vec2) -> HeightField;
}

/// [`HeightSource`] backed by [`generate`], offsetting the configured params
/// by each chunk's world position.
#[derive(Clone, Debug)]
pub struct NoiseHeightSource {
  params: NoiseParams,
}

impl NoiseHeightSource {
  pub fn new(params: NoiseParams) -> Self {
    Self { params }
  }
}

impl HeightSource for NoiseHeightSource {
  fn generate(&self, size: usize, world_offset: Vec2) -> HeightField {
    let params = self.params.with_offset(self.params.offset + world_offset);
    generate(size, size, &params)
  }
}

#[cfg(test)]
#[path = "noise_test.rs"]
mod noise_test;
