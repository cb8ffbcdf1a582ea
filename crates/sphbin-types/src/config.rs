// ─────────────────────────────────────────────────────────────────────
// SPH Binning — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::constants::{DEFAULT_CHUNK_SIZE, DEFAULT_PROJECTION_RESOLUTION};
use crate::error::{BinningError, BinningResult};
use serde::{Deserialize, Serialize};

/// Per-call binning configuration.
/// Every field except `kernel` may be omitted from the JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinningConfig {
    /// Kernel name, e.g. "cubic" or "Wendland C4".
    #[serde(default = "default_kernel")]
    pub kernel: String,
    /// Smoothing lengths above this multiple of the finest cell size skip
    /// the in-grid quadrature when their support touches the grid boundary
    /// (`W_int = 1`). `None` disables the shortcut.
    #[serde(
        rename = "H_lim_out_of_grid",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub edge_skip_hsml_factor: Option<f64>,
    /// Sample count of the projected-kernel lookup table.
    #[serde(default = "default_projection_resolution")]
    pub projection_resolution: usize,
    /// Minimum number of particles per rayon task.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Dedicated pool size. `None` runs on the global rayon pool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_threads: Option<usize>,
}

fn default_kernel() -> String {
    "cubic".to_string()
}
fn default_projection_resolution() -> usize {
    DEFAULT_PROJECTION_RESOLUTION
}
fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

impl Default for BinningConfig {
    fn default() -> Self {
        BinningConfig {
            kernel: default_kernel(),
            edge_skip_hsml_factor: None,
            projection_resolution: default_projection_resolution(),
            chunk_size: default_chunk_size(),
            num_threads: None,
        }
    }
}

impl BinningConfig {
    /// Config with the given kernel and every other field at its default.
    pub fn with_kernel(kernel: &str) -> Self {
        BinningConfig {
            kernel: kernel.to_string(),
            ..Self::default()
        }
    }

    /// Load from a JSON file and validate.
    pub fn from_file(path: &str) -> BinningResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> BinningResult<()> {
        if self.kernel.trim().is_empty() {
            return Err(BinningError::ConfigError(
                "kernel name must not be empty".to_string(),
            ));
        }
        if let Some(factor) = self.edge_skip_hsml_factor {
            if !factor.is_finite() || factor < 0.0 {
                return Err(BinningError::ConfigError(format!(
                    "H_lim_out_of_grid must be finite and >= 0, got {factor}"
                )));
            }
        }
        if self.projection_resolution < 2 {
            return Err(BinningError::ConfigError(format!(
                "projection_resolution must be >= 2, got {}",
                self.projection_resolution
            )));
        }
        if self.chunk_size == 0 {
            return Err(BinningError::ConfigError(
                "chunk_size must be >= 1".to_string(),
            ));
        }
        if self.num_threads == Some(0) {
            return Err(BinningError::ConfigError(
                "num_threads must be >= 1 when set".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    /// CARGO_MANIFEST_DIR points to crates/sphbin-types/, the configs live
    /// two levels up at the workspace root.
    fn project_root() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("..").join("..")
    }

    fn config_path(relative: &str) -> String {
        project_root().join(relative).to_string_lossy().to_string()
    }

    #[test]
    fn test_load_default_config() {
        let cfg = BinningConfig::from_file(&config_path("configs/default_binning.json")).unwrap();
        assert_eq!(cfg.kernel, "Wendland C4");
        assert_eq!(cfg.projection_resolution, 1024);
        assert_eq!(cfg.chunk_size, 10);
        assert!(cfg.edge_skip_hsml_factor.is_none());
        assert!(cfg.num_threads.is_none());
    }

    #[test]
    fn test_load_edge_skip_config() {
        let cfg =
            BinningConfig::from_file(&config_path("configs/edge_skip_binning.json")).unwrap();
        assert_eq!(cfg.kernel, "cubic");
        assert!((cfg.edge_skip_hsml_factor.unwrap() - 3.0).abs() < 1e-12);
        assert_eq!(cfg.projection_resolution, 2048);
        assert_eq!(cfg.chunk_size, 32);
        assert_eq!(cfg.num_threads, Some(4));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = BinningConfig::from_file(&config_path("configs/does_not_exist.json"))
            .unwrap_err();
        assert!(matches!(err, BinningError::Io(_)));
    }

    #[test]
    fn test_minimal_json_fills_defaults() {
        let cfg: BinningConfig = serde_json::from_str(r#"{"kernel": "quintic"}"#).unwrap();
        assert_eq!(cfg.kernel, "quintic");
        assert_eq!(cfg.projection_resolution, DEFAULT_PROJECTION_RESOLUTION);
        assert_eq!(cfg.chunk_size, DEFAULT_CHUNK_SIZE);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut cfg = BinningConfig::default();
        cfg.chunk_size = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = BinningConfig::default();
        cfg.projection_resolution = 1;
        assert!(cfg.validate().is_err());

        let mut cfg = BinningConfig::default();
        cfg.edge_skip_hsml_factor = Some(f64::NAN);
        assert!(cfg.validate().is_err());

        let mut cfg = BinningConfig::default();
        cfg.num_threads = Some(0);
        assert!(cfg.validate().is_err());

        let cfg = BinningConfig::with_kernel("  ");
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_roundtrip_serialization() {
        let cfg =
            BinningConfig::from_file(&config_path("configs/edge_skip_binning.json")).unwrap();
        let json = serde_json::to_string_pretty(&cfg).unwrap();
        assert!(json.contains("H_lim_out_of_grid"));
        let cfg2: BinningConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg, cfg2);
    }
}
