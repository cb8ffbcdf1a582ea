// ─────────────────────────────────────────────────────────────────────
// SPH Binning — Atomic Float
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Lock-free `f64` accumulator for concurrent deposition.

use std::sync::atomic::{AtomicU64, Ordering};

/// `f64` stored as its bit pattern; additions go through a CAS loop.
#[derive(Debug, Default)]
pub struct AtomicF64 {
    bits: AtomicU64,
}

impl AtomicF64 {
    #[inline]
    pub fn new(value: f64) -> Self {
        Self {
            bits: AtomicU64::new(value.to_bits()),
        }
    }

    #[inline]
    pub fn load(&self, ordering: Ordering) -> f64 {
        f64::from_bits(self.bits.load(ordering))
    }

    /// Atomically add `delta`, returning the previous value.
    #[inline]
    pub fn fetch_add(&self, delta: f64, ordering: Ordering) -> f64 {
        let mut old_bits = self.bits.load(Ordering::Relaxed);
        loop {
            let new = f64::from_bits(old_bits) + delta;
            match self.bits.compare_exchange_weak(
                old_bits,
                new.to_bits(),
                ordering,
                Ordering::Relaxed,
            ) {
                Ok(_) => return f64::from_bits(old_bits),
                Err(current) => old_bits = current,
            }
        }
    }

    /// Relaxed add; the result is read only after all workers joined.
    #[inline]
    pub fn add(&self, delta: f64) {
        self.fetch_add(delta, Ordering::Relaxed);
    }

    pub fn into_inner(self) -> f64 {
        f64::from_bits(self.bits.into_inner())
    }
}

/// Zero-initialized shared accumulation buffer.
pub fn zeroed_buffer(n: usize) -> Vec<AtomicF64> {
    (0..n).map(|_| AtomicF64::new(0.0)).collect()
}

/// Unwrap an accumulation buffer once no other thread holds it.
pub fn into_values(buffer: Vec<AtomicF64>) -> Vec<f64> {
    buffer.into_iter().map(AtomicF64::into_inner).collect()
}
