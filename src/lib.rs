//! terrain_plugin - Framework/engine independent endless terrain streaming
//!
//! This crate generates an unbounded level-of-detail terrain surface from a
//! deterministic fractal noise field and streams chunk geometry around a
//! moving viewpoint. Rendering, input, and engine object lifecycle stay on
//! the other side of the [`TerrainSink`] trait.
//!
//! # Features
//!
//! - **Fractal noise fields**: Seeded multi-octave gradient noise with local
//!   or global normalization
//! - **Decimated tessellation**: One height field, one mesh per LOD level,
//!   consistent winding for upward normals
//! - **Chunk streaming**: Square window enumeration, per-chunk distance
//!   culling, LOD selection, at-most-one in-flight build per chunk and LOD
//! - **Poll-driven async**: Generation and meshing run on rayon; completions
//!   are drained once per tick on the controller thread
//!
//! # Example
//!
//! ```ignore
//! use terrain_plugin::{StreamingController, TerrainConfig};
//!
//! let mut controller = StreamingController::new(TerrainConfig::default())?;
//!
//! // Each frame, with the viewer's planar position:
//! controller.tick(viewer_pos, &mut sink);
//! ```

pub mod types;
pub use types::{
  Bounds2, ChunkCoord, ColorMap, HeightCurve, HeightField, IdentityCurve, LodLevel, SurfaceMesh,
};

// Noise field generation
pub mod noise;
pub use noise::{HeightSource, NoiseHeightSource, NoiseParams, NormalizeMode};

// Height field tessellation
pub mod mesh;
pub use mesh::{build as build_mesh, decimation_step, MeshParams};

// Background job dispatch
pub mod tasks;
pub use tasks::{Completion, JobQueue};

// Chunk ownership and LOD selection
pub mod store;
pub use store::{select_lod, Chunk, ChunkStore, StreamStats};

// Per-tick streaming driver
pub mod streaming;
pub use streaming::{ColorMapProvider, StreamingController, TerrainSink};

// Configuration surface
pub mod config;
pub use config::{ConfigError, TerrainConfig};

// Test utilities shared across module tests
#[cfg(test)]
pub(crate) mod test_utils;
