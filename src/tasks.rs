//! Background job dispatch for height and mesh production.
//!
//! Follows the enqueue -> tick -> drain completions shape: jobs are
//! fire-and-forget closures on rayon's pool, results come back over an
//! unbounded channel, and the streaming controller drains that channel once
//! per tick on its own thread. Chunk state is therefore only ever mutated by
//! the controller thread.
//!
//! There is no cancellation: a job always runs to completion, and a
//! completion whose chunk was evicted in the meantime is dropped by the
//! store.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};
use glam::Vec2;
use web_time::Instant;

use crate::mesh::{self, MeshParams};
use crate::noise::HeightSource;
use crate::types::{ChunkCoord, HeightField, SurfaceMesh};

/// Result of a background job, delivered via [`JobQueue::drain`].
#[derive(Clone, Debug)]
pub enum Completion {
  /// A chunk's height field finished generating.
  Height {
    coord: ChunkCoord,
    field: Arc<HeightField>,
    /// Raw generation time in microseconds.
    gen_time_us: u64,
  },

  /// A mesh for one (chunk, LOD) pair finished building.
  Mesh {
    coord: ChunkCoord,
    lod_index: usize,
    mesh: Arc<SurfaceMesh>,
    /// Raw tessellation time in microseconds.
    build_time_us: u64,
  },
}

/// Dispatches generation work onto rayon and collects typed completions.
pub struct JobQueue {
  tx: Sender<Completion>,
  rx: Receiver<Completion>,
  in_flight: Arc<AtomicUsize>,
}

impl Default for JobQueue {
  fn default() -> Self {
    Self::new()
  }
}

impl JobQueue {
  pub fn new() -> Self {
    let (tx, rx) = unbounded();
    Self {
      tx,
      rx,
      in_flight: Arc::new(AtomicUsize::new(0)),
    }
  }

  /// Queue height-field generation for a chunk (non-blocking).
  pub fn spawn_height(&self, coord: ChunkCoord, source: Arc<dyn HeightSource>, size: usize, world_offset: Vec2) {
    let tx = self.tx.clone();
    let in_flight = Arc::clone(&self.in_flight);
    in_flight.fetch_add(1, Ordering::Relaxed);

    rayon::spawn(move || {
      let start = Instant::now();
      let field = source.generate(size, world_offset);
      let gen_time_us = start.elapsed().as_micros() as u64;

      let _ = tx.send(Completion::Height {
        coord,
        field: Arc::new(field),
        gen_time_us,
      });
      in_flight.fetch_sub(1, Ordering::Relaxed);
    });
  }

  /// Queue a mesh build for one (chunk, LOD) pair (non-blocking).
  ///
  /// `lod` is the decimation level from the LOD table entry at `lod_index`.
  pub fn spawn_mesh(
    &self,
    coord: ChunkCoord,
    lod_index: usize,
    lod: u32,
    field: Arc<HeightField>,
    params: MeshParams,
  ) {
    let tx = self.tx.clone();
    let in_flight = Arc::clone(&self.in_flight);
    in_flight.fetch_add(1, Ordering::Relaxed);

    rayon::spawn(move || {
      let start = Instant::now();
      let mesh = mesh::build(&field, &params, lod);
      let build_time_us = start.elapsed().as_micros() as u64;

      let _ = tx.send(Completion::Mesh {
        coord,
        lod_index,
        mesh: Arc::new(mesh),
        build_time_us,
      });
      in_flight.fetch_sub(1, Ordering::Relaxed);
    });
  }

  /// Take all completions that have arrived so far (non-blocking).
  pub fn drain(&self) -> Vec<Completion> {
    self.rx.try_iter().collect()
  }

  /// Number of jobs spawned but not yet finished.
  pub fn in_flight_count(&self) -> usize {
    self.in_flight.load(Ordering::Relaxed)
  }

  /// True when no work is running and nothing is waiting to be drained.
  pub fn is_idle(&self) -> bool {
    self.in_flight_count() == 0 && self.rx.is_empty()
  }
}

// =============================================================================
// Tests
// =============================================================================
