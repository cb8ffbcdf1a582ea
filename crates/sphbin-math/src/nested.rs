// ─────────────────────────────────────────────────────────────────────
// SPH Binning — Nested Index Loops
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! D-dimensional index box iteration.
//!
//! Replaces D hand-written nested `for` loops. The last axis varies fastest,
//! matching the row-major layout of the grids the indices address.

/// Half-open index box `[lo[k], hi[k])` on every axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexBox<const D: usize> {
    pub lo: [usize; D],
    pub hi: [usize; D],
}

impl<const D: usize> IndexBox<D> {
    pub fn new(lo: [usize; D], hi: [usize; D]) -> Self {
        IndexBox { lo, hi }
    }

    pub fn is_empty(&self) -> bool {
        D == 0 || (0..D).any(|k| self.lo[k] >= self.hi[k])
    }

    /// Number of indices in the box.
    pub fn len(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        (0..D).map(|k| self.hi[k] - self.lo[k]).product()
    }

    pub fn iter(&self) -> IndexIter<D> {
        IndexIter {
            bounds: *self,
            next: if self.is_empty() { None } else { Some(self.lo) },
        }
    }
}

impl<const D: usize> IntoIterator for IndexBox<D> {
    type Item = [usize; D];
    type IntoIter = IndexIter<D>;

    fn into_iter(self) -> IndexIter<D> {
        self.iter()
    }
}

/// Odometer over an [`IndexBox`].
#[derive(Debug, Clone)]
pub struct IndexIter<const D: usize> {
    bounds: IndexBox<D>,
    next: Option<[usize; D]>,
}

impl<const D: usize> Iterator for IndexIter<D> {
    type Item = [usize; D];

    fn next(&mut self) -> Option<[usize; D]> {
        let current = self.next?;
        let mut idx = current;
        let mut axis = D;
        self.next = loop {
            if axis == 0 {
                break None;
            }
            axis -= 1;
            idx[axis] += 1;
            if idx[axis] < self.bounds.hi[axis] {
                break Some(idx);
            }
            idx[axis] = self.bounds.lo[axis];
        };
        Some(current)
    }
}
