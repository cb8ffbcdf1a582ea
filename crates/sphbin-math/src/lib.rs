//! Numerical primitives for SPH binning.

pub mod atomic;
pub mod kernels;
pub mod nested;
pub mod periodic;
