// ─────────────────────────────────────────────────────────────────────
// SPH Binning — Kernels
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Compact-support SPH kernels and their line-of-sight projections.
//!
//! All kernels are written in terms of the support radius `h`, i.e.
//! `W(r, h) = sigma_d / h^d * w(r / h)` with `w(q) = 0` for `q >= 1`.
//! The normalizations `sigma_d` make `W` integrate to one over R^d.

use sphbin_types::error::{BinningError, BinningResult};
use std::f64::consts::PI;

/// Simpson intervals per projection sample (must be even).
const PROJECTION_QUADRATURE_STEPS: usize = 400;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KernelKind {
    /// M4 cubic spline.
    Cubic,
    /// M5 quartic spline.
    Quartic,
    /// M6 quintic spline.
    Quintic,
    WendlandC2,
    WendlandC4,
    WendlandC6,
}

impl KernelKind {
    pub const ALL: [KernelKind; 6] = [
        KernelKind::Cubic,
        KernelKind::Quartic,
        KernelKind::Quintic,
        KernelKind::WendlandC2,
        KernelKind::WendlandC4,
        KernelKind::WendlandC6,
    ];

    /// Resolve a kernel name. Case, spaces, `_` and `-` are ignored, so
    /// "Wendland C4", "wendland_c4" and "WENDLAND-C4" are the same kernel.
    pub fn from_name(name: &str) -> BinningResult<Self> {
        let key: String = name
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "cubic" | "m4" => Ok(KernelKind::Cubic),
            "quartic" | "m5" => Ok(KernelKind::Quartic),
            "quintic" | "m6" => Ok(KernelKind::Quintic),
            "wendlandc2" => Ok(KernelKind::WendlandC2),
            "wendlandc4" => Ok(KernelKind::WendlandC4),
            "wendlandc6" => Ok(KernelKind::WendlandC6),
            _ => Err(BinningError::UnknownKernel(name.to_string())),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            KernelKind::Cubic => "cubic",
            KernelKind::Quartic => "quartic",
            KernelKind::Quintic => "quintic",
            KernelKind::WendlandC2 => "Wendland C2",
            KernelKind::WendlandC4 => "Wendland C4",
            KernelKind::WendlandC6 => "Wendland C6",
        }
    }

    /// Unnormalized shape `w(q)` on `0 <= q < 1`.
    #[inline]
    fn shape(self, q: f64) -> f64 {
        match self {
            KernelKind::Cubic => {
                if q < 0.5 {
                    1.0 - 6.0 * q * q + 6.0 * q * q * q
                } else {
                    2.0 * (1.0 - q).powi(3)
                }
            }
            KernelKind::Quartic => {
                let mut w = (1.0 - q).powi(4);
                if q < 0.6 {
                    w -= 5.0 * (0.6 - q).powi(4);
                }
                if q < 0.2 {
                    w += 10.0 * (0.2 - q).powi(4);
                }
                w
            }
            KernelKind::Quintic => {
                let mut w = (1.0 - q).powi(5);
                if q < 2.0 / 3.0 {
                    w -= 6.0 * (2.0 / 3.0 - q).powi(5);
                }
                if q < 1.0 / 3.0 {
                    w += 15.0 * (1.0 / 3.0 - q).powi(5);
                }
                w
            }
            KernelKind::WendlandC2 => (1.0 - q).powi(4) * (1.0 + 4.0 * q),
            KernelKind::WendlandC4 => {
                (1.0 - q).powi(6) * (1.0 + 6.0 * q + 35.0 / 3.0 * q * q)
            }
            KernelKind::WendlandC6 => {
                (1.0 - q).powi(8) * (1.0 + q * (8.0 + q * (25.0 + 32.0 * q)))
            }
        }
    }

    /// `sigma_d` for d = 2, 3.
    fn norm(self, dim: usize) -> Option<f64> {
        let sigma = match (self, dim) {
            (KernelKind::Cubic, 2) => 40.0 / (7.0 * PI),
            (KernelKind::Cubic, 3) => 8.0 / PI,
            // M5 with support 2.5h rescaled to unit support.
            (KernelKind::Quartic, 2) => 2.5f64.powi(6) * 96.0 / (1199.0 * PI),
            (KernelKind::Quartic, 3) => 2.5f64.powi(7) / (20.0 * PI),
            // M6 with support 3h rescaled to unit support.
            (KernelKind::Quintic, 2) => 3.0f64.powi(7) * 7.0 / (478.0 * PI),
            (KernelKind::Quintic, 3) => 3.0f64.powi(8) / (120.0 * PI),
            (KernelKind::WendlandC2, 2) => 7.0 / PI,
            (KernelKind::WendlandC2, 3) => 21.0 / (2.0 * PI),
            (KernelKind::WendlandC4, 2) => 9.0 / PI,
            (KernelKind::WendlandC4, 3) => 495.0 / (32.0 * PI),
            (KernelKind::WendlandC6, 2) => 78.0 / (7.0 * PI),
            (KernelKind::WendlandC6, 3) => 1365.0 / (64.0 * PI),
            _ => return None,
        };
        Some(sigma)
    }
}

/// A normalized kernel of fixed dimension, optionally carrying a lookup
/// table of its projection along one axis.
///
/// Immutable after construction; build the projection before handing the
/// kernel to worker threads and share it by reference.
#[derive(Debug, Clone)]
pub struct Kernel {
    kind: KernelKind,
    dim: usize,
    norm: f64,
    projection: Option<Vec<f64>>,
}

impl Kernel {
    pub fn new(name: &str, dim: usize) -> BinningResult<Self> {
        Self::from_kind(KernelKind::from_name(name)?, dim)
    }

    pub fn from_kind(kind: KernelKind, dim: usize) -> BinningResult<Self> {
        let norm = kind.norm(dim).ok_or_else(|| {
            BinningError::ConfigError(format!(
                "kernel '{}' is only available in 2 and 3 dimensions, requested {dim}",
                kind.name()
            ))
        })?;
        Ok(Kernel {
            kind,
            dim,
            norm,
            projection: None,
        })
    }

    /// Tabulate the projection on `resolution` equidistant points in
    /// `q = [0, 1]`. The table is in units of `h^-(dim-1)` with `h = 1`.
    pub fn generate_projection(&mut self, resolution: usize) -> BinningResult<()> {
        if resolution < 2 {
            return Err(BinningError::ConfigError(format!(
                "projection table needs at least 2 samples, got {resolution}"
            )));
        }
        let last = (resolution - 1) as f64;
        let table: Vec<f64> = (0..resolution)
            .map(|i| self.project_unit(i as f64 / last))
            .collect();
        log::debug!(
            "tabulated {}D '{}' kernel projection with {resolution} samples",
            self.dim,
            self.kind.name()
        );
        self.projection = Some(table);
        Ok(())
    }

    /// Builder form of [`Kernel::generate_projection`].
    pub fn with_projection(mut self, resolution: usize) -> BinningResult<Self> {
        self.generate_projection(resolution)?;
        Ok(self)
    }

    pub fn kind(&self) -> KernelKind {
        self.kind
    }

    pub fn has_projection(&self) -> bool {
        self.projection.is_some()
    }

    /// `W(q*h, h)` for normalized distance `q = r/h`.
    #[inline]
    pub fn value(&self, q: f64, h: f64) -> f64 {
        if !(0.0..1.0).contains(&q) {
            return 0.0;
        }
        self.norm * self.kind.shape(q) / h.powi(self.dim as i32)
    }

    /// Kernel integrated along one axis, evaluated at projected distance
    /// `q = R/h`. Interpolates the table when one was generated and
    /// integrates directly otherwise.
    #[inline]
    pub fn proj_value(&self, q: f64, h: f64) -> f64 {
        if !(0.0..1.0).contains(&q) {
            return 0.0;
        }
        let unit = match &self.projection {
            Some(table) => {
                let x = q * (table.len() - 1) as f64;
                let i = (x as usize).min(table.len() - 2);
                let t = x - i as f64;
                (1.0 - t) * table[i] + t * table[i + 1]
            }
            None => self.project_unit(q),
        };
        unit / h.powi(self.dim as i32 - 1)
    }

    /// `2 * int_0^sqrt(1-q^2) W(sqrt(q^2+z^2), 1) dz` by composite Simpson.
    fn project_unit(&self, q: f64) -> f64 {
        if q >= 1.0 {
            return 0.0;
        }
        let z_max = (1.0 - q * q).sqrt();
        let n = PROJECTION_QUADRATURE_STEPS;
        let dz = z_max / n as f64;
        let f = |z: f64| self.value((q * q + z * z).sqrt(), 1.0);
        let mut sum = f(0.0) + f(z_max);
        for i in 1..n {
            let w = if i % 2 == 1 { 4.0 } else { 2.0 };
            sum += w * f(i as f64 * dz);
        }
        2.0 * sum * dz / 3.0
    }
}
