// -------------------------------------------------------------------------
// SPH Binning -- Spectrum Binner Benchmark
// Optical depth along one sightline through a random particle slab,
// for increasing particle counts and velocity resolutions.
// -------------------------------------------------------------------------

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sphbin_core::spectrum::{bin_spectrum, doppler_b0_amu};
use sphbin_types::config::BinningConfig;
use sphbin_types::state::{Periodicity, SpectrumParticles, SpectrumSpec};
use std::hint::black_box;

struct Sightline {
    pos: Vec<[f64; 2]>,
    vel: Vec<f64>,
    hsml: Vec<f64>,
    n: Vec<f64>,
    temp: Vec<f64>,
}

/// Particles scattered around the sightline at the origin, most of them
/// within their smoothing length of it.
fn random_sightline(count: usize, seed: u64) -> Sightline {
    let mut rng = StdRng::seed_from_u64(seed);
    Sightline {
        pos: (0..count)
            .map(|_| [rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)])
            .collect(),
        vel: (0..count).map(|_| rng.gen_range(-200.0..1200.0)).collect(),
        hsml: (0..count).map(|_| rng.gen_range(0.5..1.5)).collect(),
        n: (0..count).map(|_| rng.gen_range(1e12..1e14)).collect(),
        temp: (0..count).map(|_| 10f64.powf(rng.gen_range(3.5..6.0))).collect(),
    }
}

fn bench_spectrum(c: &mut Criterion) {
    let b_0 = doppler_b0_amu(1.00794).expect("hydrogen mass is valid");
    let config = BinningConfig::default();
    let mut group = c.benchmark_group("bin_spectrum");
    group.sample_size(20);

    for &count in &[10_000usize, 100_000] {
        let line = random_sightline(count, 11);
        let particles = SpectrumParticles::new(&line.pos, &line.vel, &line.hsml, &line.n, &line.temp)
            .expect("bench arrays share one length");

        for &n_bins in &[256usize, 2048] {
            let spec = SpectrumSpec::new([0.0, 1000.0], n_bins, b_0, 4.48e-18, Periodicity::None)
                .expect("valid spectrum");
            group.bench_with_input(
                BenchmarkId::new(format!("{count}_particles"), n_bins),
                &spec,
                |b, spec| {
                    b.iter(|| {
                        let taus = bin_spectrum(&particles, [0.0, 0.0], spec, &config)
                            .expect("binning should not error");
                        black_box(taus.sum())
                    })
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_spectrum);
criterion_main!(benches);
