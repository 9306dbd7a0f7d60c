//! Benchmarks for height field tessellation across decimation levels.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use terrain_plugin::mesh::{self, MeshParams};
use terrain_plugin::noise::{self, NoiseParams};
use terrain_plugin::HeightField;

const FIELD_SIZE: usize = 241;

fn bench_field() -> HeightField {
  noise::generate(FIELD_SIZE, FIELD_SIZE, &NoiseParams::new().with_seed(1337))
}

/// Triangle throughput per decimation level.
fn bench_lod_levels(c: &mut Criterion) {
  let field = bench_field();
  let params = MeshParams::new().with_height_multiplier(30.0);

  let mut group = c.benchmark_group("mesh_241_lod");

  for lod in [0u32, 1, 2, 4, 6] {
    let step = mesh::decimation_step(lod);
    let line = (FIELD_SIZE - 1) / step + 1;
    let triangles = (line - 1) * (line - 1) * 2;
    group.throughput(Throughput::Elements(triangles as u64));

    group.bench_with_input(BenchmarkId::from_parameter(lod), &lod, |b, &lod| {
      b.iter(|| {
        let mesh = mesh::build(black_box(&field), &params, lod);
        black_box(mesh.triangle_count())
      })
    });
  }

  group.finish();
}

/// Cost of a non-trivial height response curve on the full-detail path.
fn bench_height_curve(c: &mut Criterion) {
  let field = bench_field();

  let identity = MeshParams::new().with_height_multiplier(30.0);
  let curved = MeshParams::new()
    .with_height_multiplier(30.0)
    .with_curve(std::sync::Arc::new(|h: f32| h * h * (3.0 - 2.0 * h)));

  let mut group = c.benchmark_group("mesh_241_curve");

  group.bench_function("identity", |b| {
    b.iter(|| black_box(mesh::build(black_box(&field), &identity, 0).vertex_count()))
  });
  group.bench_function("smoothstep", |b| {
    b.iter(|| black_box(mesh::build(black_box(&field), &curved, 0).vertex_count()))
  });

  group.finish();
}

criterion_group!(benches, bench_lod_levels, bench_height_curve);
criterion_main!(benches);
