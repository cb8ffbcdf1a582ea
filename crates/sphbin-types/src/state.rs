// ─────────────────────────────────────────────────────────────────────
// SPH Binning — State
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::error::{BinningError, BinningResult};
use ndarray::Array1;

/// Boundary condition of the distance metric.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Periodicity {
    #[default]
    None,
    /// Cubic box of the given side length, wrapped on every axis.
    Cubic(f64),
}

impl Periodicity {
    /// Scalar convention used by callers: a finite positive value is the box
    /// side, anything else (zero, negative, NaN, inf) means open boundaries.
    pub fn from_scalar(periodic: f64) -> Self {
        if periodic.is_finite() && periodic > 0.0 {
            Periodicity::Cubic(periodic)
        } else {
            Periodicity::None
        }
    }
}

/// Regular Cartesian grid in `D` dimensions.
/// Cell `i` on axis `k` spans `[lo + i*res[k], lo + (i+1)*res[k]]`.
#[derive(Debug, Clone, PartialEq)]
pub struct GridSpec<const D: usize> {
    pub extent: [[f64; 2]; D], // [lo, hi] per axis
    pub npx: [usize; D],       // cells per axis
    pub res: [f64; D],         // cell size per axis
    pub res_min: f64,
    pub dv_px: f64, // cell volume (area in 2D)
}

impl<const D: usize> GridSpec<D> {
    pub fn new(extent: [[f64; 2]; D], npx: [usize; D]) -> BinningResult<Self> {
        if D == 0 {
            return Err(BinningError::ConfigError(
                "grid needs at least one axis".to_string(),
            ));
        }
        let mut res = [0.0; D];
        for k in 0..D {
            if npx[k] == 0 {
                return Err(BinningError::ConfigError(format!(
                    "grid axis {k} needs at least one cell, got npx=0"
                )));
            }
            let [lo, hi] = extent[k];
            res[k] = (hi - lo) / npx[k] as f64;
            if !res[k].is_finite() || res[k] <= 0.0 {
                return Err(BinningError::ConfigError(format!(
                    "grid axis {k} has invalid extent [{lo}, {hi}] (resolution {})",
                    res[k]
                )));
            }
        }
        let res_min = res.iter().copied().fold(f64::INFINITY, f64::min);
        let dv_px = res.iter().product();
        Ok(GridSpec {
            extent,
            npx,
            res,
            res_min,
            dv_px,
        })
    }

    /// Build from the flat `[lo_0, hi_0, lo_1, hi_1, ...]` extent layout.
    pub fn from_flat(extent: &[f64], npx: &[usize]) -> BinningResult<Self> {
        if extent.len() != 2 * D {
            return Err(BinningError::ShapeMismatch {
                field: "extent",
                expected: 2 * D,
                got: extent.len(),
            });
        }
        if npx.len() != D {
            return Err(BinningError::ShapeMismatch {
                field: "grid_shape",
                expected: D,
                got: npx.len(),
            });
        }
        let mut ext = [[0.0; 2]; D];
        let mut n = [0usize; D];
        for k in 0..D {
            ext[k] = [extent[2 * k], extent[2 * k + 1]];
            n[k] = npx[k];
        }
        Self::new(ext, n)
    }

    pub fn n_cells(&self) -> usize {
        self.npx.iter().product()
    }

    /// Coordinate of the center of cell `i` along `axis`.
    #[inline]
    pub fn cell_center(&self, axis: usize, i: usize) -> f64 {
        self.extent[axis][0] + (i as f64 + 0.5) * self.res[axis]
    }

    pub fn cell_centers(&self, axis: usize) -> Array1<f64> {
        Array1::from_shape_fn(self.npx[axis], |i| self.cell_center(axis, i))
    }
}

/// Velocity binning of a single sightline.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumSpec {
    pub vel_extent: [f64; 2],
    pub n_bins: usize,
    /// Broadening width per sqrt(temperature): `b = b_0 * sqrt(T)`.
    pub b_0: f64,
    /// Cross section the column densities are scaled by.
    pub xsec: f64,
    pub periodicity: Periodicity,
    pub dv: f64,
}

impl SpectrumSpec {
    pub fn new(
        vel_extent: [f64; 2],
        n_bins: usize,
        b_0: f64,
        xsec: f64,
        periodicity: Periodicity,
    ) -> BinningResult<Self> {
        if n_bins == 0 {
            return Err(BinningError::ConfigError(
                "spectrum needs at least one velocity bin".to_string(),
            ));
        }
        let dv = (vel_extent[1] - vel_extent[0]) / n_bins as f64;
        if !dv.is_finite() || dv <= 0.0 {
            return Err(BinningError::ConfigError(format!(
                "invalid velocity extent [{}, {}]",
                vel_extent[0], vel_extent[1]
            )));
        }
        if !b_0.is_finite() || b_0 < 0.0 {
            return Err(BinningError::ConfigError(format!(
                "b_0 must be finite and >= 0, got {b_0}"
            )));
        }
        if !xsec.is_finite() {
            return Err(BinningError::ConfigError(
                "cross section must be finite".to_string(),
            ));
        }
        Ok(SpectrumSpec {
            vel_extent,
            n_bins,
            b_0,
            xsec,
            periodicity,
            dv,
        })
    }

    /// Velocity bin `i` is centered on `lo + i*dv` and spans one `dv`.
    #[inline]
    pub fn bin_center(&self, i: usize) -> f64 {
        self.vel_extent[0] + i as f64 * self.dv
    }

    pub fn bin_centers(&self) -> Array1<f64> {
        Array1::from_shape_fn(self.n_bins, |i| self.bin_center(i))
    }
}

fn check_len(field: &'static str, expected: usize, got: usize) -> BinningResult<()> {
    if expected != got {
        return Err(BinningError::ShapeMismatch {
            field,
            expected,
            got,
        });
    }
    Ok(())
}

/// Particles for grid deposition, borrowed from the caller.
#[derive(Debug, Clone, Copy)]
pub struct GridParticles<'a, const D: usize> {
    pub pos: &'a [[f64; D]],
    pub hsml: &'a [f64],
    pub dv: &'a [f64],
    pub qty: &'a [f64],
}

impl<'a, const D: usize> GridParticles<'a, D> {
    pub fn new(
        pos: &'a [[f64; D]],
        hsml: &'a [f64],
        dv: &'a [f64],
        qty: &'a [f64],
    ) -> BinningResult<Self> {
        let n = pos.len();
        check_len("hsml", n, hsml.len())?;
        check_len("dV", n, dv.len())?;
        check_len("qty", n, qty.len())?;
        Ok(GridParticles { pos, hsml, dv, qty })
    }

    pub fn len(&self) -> usize {
        self.pos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pos.is_empty()
    }
}

/// Particles near a sightline. Positions are the two coordinates
/// perpendicular to the line of sight.
#[derive(Debug, Clone, Copy)]
pub struct SpectrumParticles<'a> {
    pub pos: &'a [[f64; 2]],
    pub vel: &'a [f64],
    pub hsml: &'a [f64],
    pub n: &'a [f64],
    pub temp: &'a [f64],
}

impl<'a> SpectrumParticles<'a> {
    pub fn new(
        pos: &'a [[f64; 2]],
        vel: &'a [f64],
        hsml: &'a [f64],
        n: &'a [f64],
        temp: &'a [f64],
    ) -> BinningResult<Self> {
        let len = pos.len();
        check_len("vel", len, vel.len())?;
        check_len("hsml", len, hsml.len())?;
        check_len("n", len, n.len())?;
        check_len("temp", len, temp.len())?;
        Ok(SpectrumParticles {
            pos,
            vel,
            hsml,
            n,
            temp,
        })
    }

    pub fn len(&self) -> usize {
        self.pos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pos.is_empty()
    }
}

/// Regroup a flat `[x0, y0, z0, x1, ...]` position buffer into points.
pub fn positions_from_flat<const D: usize>(flat: &[f64]) -> BinningResult<Vec<[f64; D]>> {
    if D == 0 || flat.len() % D != 0 {
        return Err(BinningError::ShapeMismatch {
            field: "pos",
            expected: D * (flat.len() / D.max(1)),
            got: flat.len(),
        });
    }
    Ok(flat
        .chunks_exact(D)
        .map(|c| {
            let mut p = [0.0; D];
            p.copy_from_slice(c);
            p
        })
        .collect())
}
