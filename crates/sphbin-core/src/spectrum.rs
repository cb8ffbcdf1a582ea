// ─────────────────────────────────────────────────────────────────────
// SPH Binning — Absorption Spectra
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Optical depth along a sightline from SPH particles.
//!
//! Each particle intersected by the line of sight contributes the column
//! density `n * W_proj(d/h, h)`, spread in velocity by a Gaussian thermal
//! profile `1/(b*sqrt(pi)) * exp(-(v/b)^2)` truncated at 5 widths. Every bin
//! receives the exact integral of the profile over its width, from the
//! antiderivative `erf(v/b)/2`. Velocity bin `i` is centered on
//! `lo + i*dv`. When the truncated profile's bin range, clamped to the
//! spectrum, is a single bin, the whole column goes into that bin.

use crate::runner::run_in_pool;
use ndarray::Array1;
use rayon::prelude::*;
use sphbin_math::atomic::{into_values, zeroed_buffer, AtomicF64};
use sphbin_math::kernels::Kernel;
use sphbin_math::periodic::dist_periodic;
use sphbin_types::config::BinningConfig;
use sphbin_types::constants::{ATOMIC_MASS_UNIT, K_BOLTZMANN, PROFILE_TRUNCATION_WIDTHS};
use sphbin_types::error::{BinningError, BinningResult};
use sphbin_types::state::{SpectrumParticles, SpectrumSpec};
use statrs::function::erf::erf;

/// Thermal width scale `b_0 = sqrt(2 k_B / m)` in km/s per sqrt(K), so that
/// `b = b_0 * sqrt(T)`.
pub fn doppler_b0(particle_mass_kg: f64) -> BinningResult<f64> {
    if !particle_mass_kg.is_finite() || particle_mass_kg <= 0.0 {
        return Err(BinningError::ConfigError(format!(
            "particle mass must be finite and > 0, got {particle_mass_kg}"
        )));
    }
    Ok((2.0 * K_BOLTZMANN / particle_mass_kg).sqrt() * 1e-3)
}

/// [`doppler_b0`] for an ion of the given mass in atomic mass units.
pub fn doppler_b0_amu(mass_amu: f64) -> BinningResult<f64> {
    doppler_b0(mass_amu * ATOMIC_MASS_UNIT)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum LineContribution {
    /// Spread over several bins with column density `N`.
    Profile(f64),
    /// Narrower than a bin, added whole.
    SingleBin(f64),
    /// Sightline misses the kernel support.
    NoOverlap,
    /// Profile entirely outside the velocity range.
    OutOfRange,
}

#[derive(Debug, Clone, Copy, Default)]
struct LineTally {
    profile: usize,
    single_bin: usize,
    no_overlap: usize,
    out_of_range: usize,
    column: f64,
}

impl LineTally {
    fn record(mut self, c: LineContribution) -> Self {
        match c {
            LineContribution::Profile(n) => {
                self.profile += 1;
                self.column += n;
            }
            LineContribution::SingleBin(n) => {
                self.single_bin += 1;
                self.column += n;
            }
            LineContribution::NoOverlap => self.no_overlap += 1,
            LineContribution::OutOfRange => self.out_of_range += 1,
        }
        self
    }

    fn merge(self, o: Self) -> Self {
        LineTally {
            profile: self.profile + o.profile,
            single_bin: self.single_bin + o.single_bin,
            no_overlap: self.no_overlap + o.no_overlap,
            out_of_range: self.out_of_range + o.out_of_range,
            column: self.column + o.column,
        }
    }
}

struct SpectrumBinner<'a> {
    spec: &'a SpectrumSpec,
    kernel: &'a Kernel,
    los: [f64; 2],
    taus: &'a [AtomicF64],
}

impl SpectrumBinner<'_> {
    fn deposit(&self, pos: &[f64; 2], v: f64, h: f64, n: f64, temp: f64) -> LineContribution {
        let spec = self.spec;
        let d = dist_periodic(&self.los, pos, spec.periodicity);
        if d.is_nan() || d >= h {
            return LineContribution::NoOverlap;
        }
        let column = n * self.kernel.proj_value(d / h, h);

        let b = spec.b_0 * temp.sqrt();
        if !b.is_finite() || !v.is_finite() {
            return LineContribution::OutOfRange;
        }
        let reach = PROFILE_TRUNCATION_WIDTHS * b;
        let [v_lo, v_hi] = spec.vel_extent;
        if v + reach < v_lo || v - reach > v_hi {
            return LineContribution::OutOfRange;
        }

        // bin i is centered on v_lo + i*dv
        let vi = (v - v_lo) / spec.dv;
        let max_bin = (spec.n_bins - 1) as f64;
        let i_min = ((v - reach - v_lo) / spec.dv).floor().clamp(0.0, max_bin) as usize;
        let i_max = ((v + reach - v_lo) / spec.dv).ceil().clamp(0.0, max_bin) as usize;

        if i_min == i_max {
            self.taus[i_min].add(column);
            return LineContribution::SingleBin(column);
        }
        // zero-width line between bin centers
        if b == 0.0 {
            let i = vi.round().clamp(0.0, max_bin) as usize;
            self.taus[i].add(column);
            return LineContribution::SingleBin(column);
        }

        for i in i_min..=i_max {
            let v0 = (i as f64 - vi - 0.5) * spec.dv;
            let v1 = v0 + spec.dv;
            let fraction = 0.5 * (erf(v1 / b) - erf(v0 / b));
            self.taus[i].add(fraction * column);
        }
        LineContribution::Profile(column)
    }
}

/// Optical depth per velocity bin along the sightline through `los_pos`.
///
/// `particles.pos` are the two particle coordinates perpendicular to the
/// line of sight and `los_pos` the sightline's position in that plane.
/// The result has `spec.n_bins` entries and is scaled by `xsec / dv`.
pub fn bin_spectrum(
    particles: &SpectrumParticles<'_>,
    los_pos: [f64; 2],
    spec: &SpectrumSpec,
    config: &BinningConfig,
) -> BinningResult<Array1<f64>> {
    config.validate()?;
    let kernel = Kernel::new(&config.kernel, 3)?.with_projection(config.projection_resolution)?;

    log::debug!(
        "binning {} particles into {} velocity bins over [{}, {}] with '{}' kernel",
        particles.len(),
        spec.n_bins,
        spec.vel_extent[0],
        spec.vel_extent[1],
        kernel.kind().name()
    );

    let taus = zeroed_buffer(spec.n_bins);
    let binner = SpectrumBinner {
        spec,
        kernel: &kernel,
        los: los_pos,
        taus: &taus,
    };

    let tally = run_in_pool(config, || {
        (0..particles.len())
            .into_par_iter()
            .with_min_len(config.chunk_size)
            .map(|j| {
                binner.deposit(
                    &particles.pos[j],
                    particles.vel[j],
                    particles.hsml[j],
                    particles.n[j],
                    particles.temp[j],
                )
            })
            .fold(LineTally::default, LineTally::record)
            .reduce(LineTally::default, LineTally::merge)
    })?;

    log::debug!(
        "spectrum binning done: {} profiles, {} single-bin, {} missed, {} out of range, total column {:e}",
        tally.profile,
        tally.single_bin,
        tally.no_overlap,
        tally.out_of_range,
        tally.column
    );

    let scale = spec.xsec / spec.dv;
    let mut out = Array1::from(into_values(taus));
    out.mapv_inplace(|t| t * scale);
    Ok(out)
}
