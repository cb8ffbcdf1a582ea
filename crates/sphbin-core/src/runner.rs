// ─────────────────────────────────────────────────────────────────────
// SPH Binning — Thread Pool Runner
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Runs a parallel binning pass on the pool the configuration asks for.

use sphbin_types::config::BinningConfig;
use sphbin_types::error::BinningResult;

/// Execute `op` inside a dedicated rayon pool of `config.num_threads`
/// workers, or on the global pool when no thread count is set.
pub fn run_in_pool<R, F>(config: &BinningConfig, op: F) -> BinningResult<R>
where
    R: Send,
    F: FnOnce() -> R + Send,
{
    match config.num_threads {
        Some(n) => {
            let pool = rayon::ThreadPoolBuilder::new().num_threads(n).build()?;
            log::trace!("running binning pass on dedicated pool of {n} threads");
            Ok(pool.install(op))
        }
        None => Ok(op()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedicated_pool_size() {
        let mut config = BinningConfig::default();
        config.num_threads = Some(3);
        let n = run_in_pool(&config, rayon::current_num_threads).unwrap();
        assert_eq!(n, 3);
    }

    #[test]
    fn test_global_pool_passthrough() {
        let config = BinningConfig::default();
        let v = run_in_pool(&config, || 41 + 1).unwrap();
        assert_eq!(v, 42);
    }
}
