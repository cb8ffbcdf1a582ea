// -------------------------------------------------------------------------
// SPH Binning -- Grid Binner Benchmark
// Flat 2D, projected 3D->2D and full 3D deposition of random particles
// at several grid resolutions, with and without the edge-skip shortcut.
// -------------------------------------------------------------------------

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sphbin_core::binning::{bin_2d, bin_3d, bin_3d_projected_2d};
use sphbin_types::config::BinningConfig;
use sphbin_types::state::{positions_from_flat, GridParticles, GridSpec, Periodicity};
use std::hint::black_box;

const BOX: f64 = 10.0;

struct Cloud<const D: usize> {
    pos: Vec<[f64; D]>,
    hsml: Vec<f64>,
    dv: Vec<f64>,
    qty: Vec<f64>,
}

impl<const D: usize> Cloud<D> {
    /// Uniform random particles in the box, smoothing lengths spanning
    /// unresolved to several cells. Positions come as one flat buffer, the
    /// way snapshot readers hand them over.
    fn random(n: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let flat: Vec<f64> = (0..n * D).map(|_| rng.gen_range(0.0..BOX)).collect();
        let pos = positions_from_flat::<D>(&flat).expect("flat buffer holds whole points");
        let hsml = (0..n).map(|_| rng.gen_range(0.02..0.8)).collect();
        let dv = (0..n).map(|_| rng.gen_range(1e-3..1e-2)).collect();
        let qty = (0..n).map(|_| rng.gen_range(0.1..10.0)).collect();
        Cloud { pos, hsml, dv, qty }
    }

    fn particles(&self) -> GridParticles<'_, D> {
        GridParticles::new(&self.pos, &self.hsml, &self.dv, &self.qty)
            .expect("bench arrays share one length")
    }
}

fn bench_2d(c: &mut Criterion) {
    let cloud = Cloud::<2>::random(20_000, 42);
    let particles = cloud.particles();
    let mut group = c.benchmark_group("bin_2d");
    group.sample_size(10);

    let periodic = Periodicity::from_scalar(BOX);
    for &n in &[64usize, 256] {
        let spec = GridSpec::<2>::from_flat(&[0.0, BOX, 0.0, BOX], &[n, n]).expect("valid grid");
        let config = BinningConfig::with_kernel("cubic");

        group.bench_with_input(
            BenchmarkId::new("flat", format!("{n}x{n}")),
            &spec,
            |b, spec| {
                b.iter(|| {
                    let grid = bin_2d(&particles, spec, &config, periodic)
                        .expect("binning should not error");
                    black_box(grid.sum())
                })
            },
        );

        group.bench_with_input(
            BenchmarkId::new("projected", format!("{n}x{n}")),
            &spec,
            |b, spec| {
                b.iter(|| {
                    let grid =
                        bin_3d_projected_2d(&particles, spec, &config, periodic)
                            .expect("binning should not error");
                    black_box(grid.sum())
                })
            },
        );

        let mut skip = config.clone();
        skip.edge_skip_hsml_factor = Some(3.0);
        group.bench_with_input(
            BenchmarkId::new("flat_edge_skip", format!("{n}x{n}")),
            &spec,
            |b, spec| {
                b.iter(|| {
                    let grid = bin_2d(&particles, spec, &skip, Periodicity::None)
                        .expect("binning should not error");
                    black_box(grid.sum())
                })
            },
        );
    }

    group.finish();
}

fn bench_3d(c: &mut Criterion) {
    let cloud = Cloud::<3>::random(5_000, 7);
    let particles = cloud.particles();
    let mut group = c.benchmark_group("bin_3d");
    group.sample_size(10);

    for kernel in ["cubic", "Wendland C4"] {
        let spec = GridSpec::new([[0.0, BOX]; 3], [48, 48, 48]).expect("valid grid");
        let config = BinningConfig::with_kernel(kernel);
        group.bench_with_input(BenchmarkId::new(kernel, "48^3"), &spec, |b, spec| {
            b.iter(|| {
                let grid = bin_3d(&particles, spec, &config, Periodicity::None)
                    .expect("binning should not error");
                black_box(grid.sum())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_2d, bench_3d);
criterion_main!(benches);
