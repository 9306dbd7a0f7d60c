//! Terrain configuration and setup-time validation.
//!
//! Malformed configuration is a fatal setup error surfaced once from
//! [`TerrainConfig::validate`]; nothing here is re-checked per frame.

use thiserror::Error;

use crate::mesh::{decimation_step, MeshParams};
use crate::noise::NoiseParams;
use crate::types::LodLevel;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("lod_levels must not be empty")]
  EmptyLodLevels,

  #[error("lod_levels thresholds must be positive and strictly ascending (level {index})")]
  NonAscendingThresholds { index: usize },

  #[error("lod {lod} samples every {step} cells, which does not divide chunk_size {chunk_size}")]
  StepMismatch { lod: u32, step: usize, chunk_size: u32 },

  #[error("chunk_size must be positive")]
  ZeroChunkSize,

  #[error("octaves must be at least 1")]
  ZeroOctaves,

  #[error("persistence must be in (0, 1], got {0}")]
  PersistenceOutOfRange(f32),

  #[error("lacunarity must be at least 1, got {0}")]
  LacunarityOutOfRange(f32),

  #[error("viewer_move_threshold must be non-negative, got {0}")]
  NegativeMoveThreshold(f32),

  #[error("retention_factor must be greater than 1, got {0}")]
  RetentionFactorTooSmall(f32),
}

/// Full configuration surface for the streaming core.
#[derive(Clone, Debug)]
pub struct TerrainConfig {
  /// World units per chunk edge. Each chunk's field has `chunk_size + 1`
  /// samples per side so adjacent chunks share their edge samples.
  pub chunk_size: u32,

  /// Detail policy, ascending by distance threshold. The last threshold is
  /// the maximum view distance.
  pub lod_levels: Vec<LodLevel>,

  /// The visible window is only recomputed once the viewer has moved this
  /// far from the last recompute position.
  pub viewer_move_threshold: f32,

  /// Chunks are retained until their distance exceeds
  /// `max_view_dist() * retention_factor`; must be > 1 so eviction has a
  /// hysteresis band beyond the visible radius.
  pub retention_factor: f32,

  pub noise: NoiseParams,
  pub mesh: MeshParams,
}

impl Default for TerrainConfig {
  fn default() -> Self {
    Self {
      chunk_size: 240,
      lod_levels: vec![
        LodLevel::new(0, 200.0),
        LodLevel::new(1, 400.0),
        LodLevel::new(2, 600.0),
      ],
      viewer_move_threshold: 25.0,
      retention_factor: 1.5,
      noise: NoiseParams::default(),
      mesh: MeshParams::default(),
    }
  }
}

impl TerrainConfig {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_chunk_size(mut self, chunk_size: u32) -> Self {
    self.chunk_size = chunk_size;
    self
  }

  pub fn with_lod_levels(mut self, lod_levels: Vec<LodLevel>) -> Self {
    self.lod_levels = lod_levels;
    self
  }

  pub fn with_viewer_move_threshold(mut self, threshold: f32) -> Self {
    self.viewer_move_threshold = threshold;
    self
  }

  pub fn with_retention_factor(mut self, factor: f32) -> Self {
    self.retention_factor = factor;
    self
  }

  pub fn with_noise(mut self, noise: NoiseParams) -> Self {
    self.noise = noise;
    self
  }

  pub fn with_mesh(mut self, mesh: MeshParams) -> Self {
    self.mesh = mesh;
    self
  }

  /// Samples per field edge: one more than the chunk extent so neighboring
  /// chunks share edge samples and tile without cracks.
  pub fn field_size(&self) -> usize {
    self.chunk_size as usize + 1
  }

  /// Maximum view distance, defined by the coarsest LOD threshold.
  pub fn max_view_dist(&self) -> f32 {
    self.lod_levels.last().map(|l| l.visible_dist_threshold).unwrap_or(0.0)
  }

  /// Half-width of the square chunk window, in chunks.
  pub fn chunks_visible_in_view_dist(&self) -> i32 {
    (self.max_view_dist() / self.chunk_size as f32).round() as i32
  }

  /// Check every setup precondition. Scale is deliberately absent: a
  /// non-positive noise scale is clamped at generation time, not rejected.
  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.chunk_size == 0 {
      return Err(ConfigError::ZeroChunkSize);
    }
    if self.lod_levels.is_empty() {
      return Err(ConfigError::EmptyLodLevels);
    }

    let mut previous = 0.0f32;
    for (index, level) in self.lod_levels.iter().enumerate() {
      if level.visible_dist_threshold <= previous {
        return Err(ConfigError::NonAscendingThresholds { index });
      }
      previous = level.visible_dist_threshold;

      let step = decimation_step(level.lod);
      if self.chunk_size as usize % step != 0 {
        return Err(ConfigError::StepMismatch {
          lod: level.lod,
          step,
          chunk_size: self.chunk_size,
        });
      }
    }

    if self.noise.octaves == 0 {
      return Err(ConfigError::ZeroOctaves);
    }
    if self.noise.persistence <= 0.0 || self.noise.persistence > 1.0 {
      return Err(ConfigError::PersistenceOutOfRange(self.noise.persistence));
    }
    if self.noise.lacunarity < 1.0 {
      return Err(ConfigError::LacunarityOutOfRange(self.noise.lacunarity));
    }
    if self.viewer_move_threshold < 0.0 {
      return Err(ConfigError::NegativeMoveThreshold(self.viewer_move_threshold));
    }
    if self.retention_factor <= 1.0 {
      return Err(ConfigError::RetentionFactorTooSmall(self.retention_factor));
    }

    Ok(())
  }
}

// =============================================================================
// Tests
// =============================================================================
