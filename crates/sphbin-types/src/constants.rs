// ─────────────────────────────────────────────────────────────────────
// SPH Binning — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
/// In-grid kernel integral below which a particle falls back to
/// nearest-grid-point deposition.
pub const NEGLIGIBLE_KERNEL_INTEGRAL: f64 = 1e-4;

/// Thermal profiles are truncated at this many widths `b` on either side.
pub const PROFILE_TRUNCATION_WIDTHS: f64 = 5.0;

/// Samples in the line-of-sight projection table of a kernel.
pub const DEFAULT_PROJECTION_RESOLUTION: usize = 1024;

/// Minimum particles handed to one rayon task.
pub const DEFAULT_CHUNK_SIZE: usize = 10;

/// Boltzmann constant (J/K)
pub const K_BOLTZMANN: f64 = 1.380649e-23;

/// Atomic mass unit (kg)
pub const ATOMIC_MASS_UNIT: f64 = 1.66053906660e-27;

/// Proton mass (kg)
pub const M_PROTON: f64 = 1.67262192369e-27;
