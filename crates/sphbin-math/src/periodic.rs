// ─────────────────────────────────────────────────────────────────────
// SPH Binning — Periodic Distance
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Euclidean distance with optional minimum-image wrapping in a cubic box.

use sphbin_types::state::Periodicity;

/// Shortest separation along one axis of a periodic box of side `box_size`.
#[inline]
pub fn wrap_delta(delta: f64, box_size: f64) -> f64 {
    let d = delta.rem_euclid(box_size);
    d.min(box_size - d)
}

/// Distance between `a` and `b`, wrapped per axis when `periodicity` is a box.
#[inline]
pub fn dist_periodic<const D: usize>(a: &[f64; D], b: &[f64; D], periodicity: Periodicity) -> f64 {
    let mut d2 = 0.0;
    match periodicity {
        Periodicity::None => {
            for k in 0..D {
                let dx = a[k] - b[k];
                d2 += dx * dx;
            }
        }
        Periodicity::Cubic(l) => {
            for k in 0..D {
                let dx = wrap_delta(a[k] - b[k], l);
                d2 += dx * dx;
            }
        }
    }
    d2.sqrt()
}
