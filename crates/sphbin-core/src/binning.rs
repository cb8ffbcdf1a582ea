// ─────────────────────────────────────────────────────────────────────
// SPH Binning — Grid Binner
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! SPH particle deposition onto regular 2D/3D grids.
//!
//! Each particle spreads `qty * dV` over the cells its kernel support
//! overlaps. Kernel weights are sampled at cell centers and renormalized by
//! their in-grid sum, so a particle whose support is clipped by the grid
//! boundary still deposits its full amount into the cells it does reach.
//! Particles whose in-grid weight is negligible fall back to depositing
//! into the single cell that contains them.
//!
//! The grid is row-major over the caller's axis order (last axis fastest).
//! Workers accumulate through [`AtomicF64`], so the result does not depend
//! on the order particles are processed in.

use crate::runner::run_in_pool;
use ndarray::{ArrayD, IxDyn};
use rayon::prelude::*;
use sphbin_math::atomic::{into_values, zeroed_buffer, AtomicF64};
use sphbin_math::kernels::Kernel;
use sphbin_math::nested::IndexBox;
use sphbin_math::periodic::dist_periodic;
use sphbin_types::config::BinningConfig;
use sphbin_types::constants::NEGLIGIBLE_KERNEL_INTEGRAL;
use sphbin_types::error::{BinningError, BinningResult};
use sphbin_types::state::{GridParticles, GridSpec, Periodicity};

/// True if any axis index lies outside `[0, npx[k])`.
#[inline]
pub fn out_of_grid<const D: usize>(i: &[isize; D], npx: &[usize; D]) -> bool {
    (0..D).any(|k| i[k] < 0 || i[k] as usize >= npx[k])
}

/// True if a clamped cell range touches the grid boundary on any axis.
#[inline]
pub fn extents_out_of_grid<const D: usize>(
    i_min: &[usize; D],
    i_max: &[usize; D],
    npx: &[usize; D],
) -> bool {
    (0..D).any(|k| i_min[k] == 0 || i_max[k] == npx[k])
}

/// Row-major flat offset of a cell, last axis fastest.
#[inline]
pub fn linear_index<const D: usize>(i: &[usize; D], npx: &[usize; D]) -> usize {
    let mut flat = 0usize;
    for k in 0..D {
        flat = flat * npx[k] + i[k];
    }
    flat
}

/// Cells overlapped by `pos ± h`, clamped to the grid.
pub fn cell_range<const D: usize>(pos: &[f64; D], h: f64, spec: &GridSpec<D>) -> IndexBox<D> {
    let mut lo = [0usize; D];
    let mut hi = [0usize; D];
    for k in 0..D {
        let x = pos[k] - spec.extent[k][0];
        // float -> usize casts saturate: negatives and NaN become 0
        lo[k] = (((x - h) / spec.res[k]).max(0.0) as usize).min(spec.npx[k]);
        hi[k] = (((x + h) / spec.res[k] + 1.0) as usize).min(spec.npx[k]);
    }
    IndexBox::new(lo, hi)
}

/// Signed index of the cell containing `pos`; may lie outside the grid.
/// Non-finite coordinates map to `-1`, which is always out of grid.
pub fn containing_cell<const D: usize>(pos: &[f64; D], spec: &GridSpec<D>) -> [isize; D] {
    let mut i = [0isize; D];
    for k in 0..D {
        let x = ((pos[k] - spec.extent[k][0]) / spec.res[k]).floor();
        i[k] = if x.is_finite() { x as isize } else { -1 };
    }
    i
}

#[inline]
fn cell_center<const D: usize>(i: &[usize; D], spec: &GridSpec<D>) -> [f64; D] {
    let mut r = [0.0; D];
    for k in 0..D {
        r[k] = spec.cell_center(k, i[k]);
    }
    r
}

/// How a single particle ended up on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deposit {
    /// Spread over its kernel support.
    Spread,
    /// Unresolved kernel; dropped into the containing cell.
    NearestCell,
    /// Unresolved kernel and containing cell outside the grid.
    Discarded,
}

/// Per-call deposit counts, used for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DepositTally {
    pub spread: usize,
    pub nearest_cell: usize,
    pub discarded: usize,
}

impl DepositTally {
    fn record(mut self, deposit: Deposit) -> Self {
        match deposit {
            Deposit::Spread => self.spread += 1,
            Deposit::NearestCell => self.nearest_cell += 1,
            Deposit::Discarded => self.discarded += 1,
        }
        self
    }

    fn merge(self, other: Self) -> Self {
        DepositTally {
            spread: self.spread + other.spread,
            nearest_cell: self.nearest_cell + other.nearest_cell,
            discarded: self.discarded + other.discarded,
        }
    }
}

/// Read-only state shared by all workers of one binning call.
struct GridBinner<'a, const D: usize> {
    spec: &'a GridSpec<D>,
    kernel: &'a Kernel,
    projected: bool,
    periodicity: Periodicity,
    edge_skip_hsml_factor: Option<f64>,
    grid: &'a [AtomicF64],
}

impl<const D: usize> GridBinner<'_, D> {
    #[inline]
    fn weight(&self, cell: &[usize; D], pos: &[f64; D], h: f64) -> f64 {
        let r = cell_center(cell, self.spec);
        let q = dist_periodic(&r, pos, self.periodicity) / h;
        if self.projected {
            self.kernel.proj_value(q, h)
        } else {
            self.kernel.value(q, h)
        }
    }

    fn deposit(&self, pos: &[f64; D], h: f64, dv: f64, qty: f64) -> Deposit {
        let spec = self.spec;
        let cells = cell_range(pos, h, spec);

        let skip_quadrature = match self.edge_skip_hsml_factor {
            Some(factor) => {
                h > factor * spec.res_min && extents_out_of_grid(&cells.lo, &cells.hi, &spec.npx)
            }
            None => false,
        };
        let w_int = if skip_quadrature {
            1.0
        } else {
            cells
                .iter()
                .map(|cell| spec.dv_px * self.weight(&cell, pos, h))
                .sum::<f64>()
        };

        // NaN integrals (invalid h) take this branch too.
        if w_int.is_nan() || w_int < NEGLIGIBLE_KERNEL_INTEGRAL {
            let i = containing_cell(pos, spec);
            if out_of_grid(&i, &spec.npx) {
                return Deposit::Discarded;
            }
            let cell = i.map(|v| v as usize);
            self.grid[linear_index(&cell, &spec.npx)].add(dv / spec.dv_px * qty);
            return Deposit::NearestCell;
        }

        let scale = dv / w_int * qty;
        for cell in cells {
            let w = self.weight(&cell, pos, h);
            if w != 0.0 {
                self.grid[linear_index(&cell, &spec.npx)].add(scale * w);
            }
        }
        Deposit::Spread
    }
}

/// Bin SPH particles onto a `D`-dimensional grid.
///
/// With `projected`, the `D+1` dimensional kernel is integrated along the
/// dropped axis, i.e. 3D particles are projected onto a 2D map and the
/// result is a column quantity. Otherwise the `D` dimensional kernel is
/// used directly.
///
/// Returns an array of shape `spec.npx` with
/// `sum(grid) = sum_j qty[j] * dV[j] / dV_px` for particles whose kernel
/// resolves on the grid.
pub fn bin_grid<const D: usize>(
    particles: &GridParticles<'_, D>,
    spec: &GridSpec<D>,
    config: &BinningConfig,
    projected: bool,
    periodicity: Periodicity,
) -> BinningResult<ArrayD<f64>> {
    config.validate()?;
    let kernel_dim = if projected { D + 1 } else { D };
    let mut kernel = Kernel::new(&config.kernel, kernel_dim)?;
    if projected {
        kernel.generate_projection(config.projection_resolution)?;
    }

    log::debug!(
        "binning {} particles onto {:?} grid with {}D '{}' kernel{}",
        particles.len(),
        spec.npx,
        kernel_dim,
        kernel.kind().name(),
        if kernel.has_projection() { " (projected)" } else { "" }
    );

    let grid = zeroed_buffer(spec.n_cells());
    let binner = GridBinner {
        spec,
        kernel: &kernel,
        projected,
        periodicity,
        edge_skip_hsml_factor: config.edge_skip_hsml_factor,
        grid: &grid,
    };

    let tally = run_in_pool(config, || {
        (0..particles.len())
            .into_par_iter()
            .with_min_len(config.chunk_size)
            .map(|j| {
                binner.deposit(
                    &particles.pos[j],
                    particles.hsml[j],
                    particles.dv[j],
                    particles.qty[j],
                )
            })
            .fold(DepositTally::default, DepositTally::record)
            .reduce(DepositTally::default, DepositTally::merge)
    })?;

    log::debug!(
        "grid binning done: {} spread, {} nearest-cell, {} discarded",
        tally.spread,
        tally.nearest_cell,
        tally.discarded
    );

    ArrayD::from_shape_vec(IxDyn(&spec.npx), into_values(grid))
        .map_err(|e| BinningError::ConfigError(format!("grid shape: {e}")))
}

/// 3D particles onto a 3D grid.
pub fn bin_3d(
    particles: &GridParticles<'_, 3>,
    spec: &GridSpec<3>,
    config: &BinningConfig,
    periodicity: Periodicity,
) -> BinningResult<ArrayD<f64>> {
    bin_grid(particles, spec, config, false, periodicity)
}

/// 2D particles onto a 2D grid.
pub fn bin_2d(
    particles: &GridParticles<'_, 2>,
    spec: &GridSpec<2>,
    config: &BinningConfig,
    periodicity: Periodicity,
) -> BinningResult<ArrayD<f64>> {
    bin_grid(particles, spec, config, false, periodicity)
}

/// 3D particles, given by their two in-plane coordinates, projected onto
/// a 2D map.
pub fn bin_3d_projected_2d(
    particles: &GridParticles<'_, 2>,
    spec: &GridSpec<2>,
    config: &BinningConfig,
    periodicity: Periodicity,
) -> BinningResult<ArrayD<f64>> {
    bin_grid(particles, spec, config, true, periodicity)
}
