//! Engine configuration
//!
//! Thresholds that the assessment lets the user tune. Loaded from JSON; any
//! field left out falls back to the standard methodology value.

use crate::error::EvaError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Maximum value on the ecological value scale
pub const MAX_EV_SCALE: f64 = 5.0;

/// Features present in at most this fraction of subzones are locally rare
pub const LOCALLY_RARE_THRESHOLD: f64 = 0.05;

/// Percentile used for the AQ9 concentration threshold
pub const CONCENTRATION_PERCENTILE: u8 = 95;

/// Upload size limit in megabytes
pub const MAX_FILE_SIZE_MB: u64 = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaConfig {
    /// Fraction of subzones (0-1) at or below which a present feature is LRF
    pub lrf_threshold: f64,
    /// Percentile (1-100) defining the AQ9 top-mass threshold
    pub concentration_percentile: u8,
    pub max_file_size_mb: u64,
}

impl Default for EvaConfig {
    fn default() -> Self {
        Self {
            lrf_threshold: LOCALLY_RARE_THRESHOLD,
            concentration_percentile: CONCENTRATION_PERCENTILE,
            max_file_size_mb: MAX_FILE_SIZE_MB,
        }
    }
}

impl EvaConfig {
    /// Load configuration from a JSON file and validate it
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: EvaConfig = serde_json::from_str(&contents)
            .with_context(|| "Failed to parse config JSON")?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EvaError> {
        if !(self.lrf_threshold > 0.0 && self.lrf_threshold < 1.0) {
            return Err(EvaError::Config(format!(
                "lrf_threshold must be between 0 and 1 (exclusive), got {}",
                self.lrf_threshold
            )));
        }
        if !(1..=100).contains(&self.concentration_percentile) {
            return Err(EvaError::Config(format!(
                "concentration_percentile must be between 1 and 100, got {}",
                self.concentration_percentile
            )));
        }
        if self.max_file_size_mb == 0 {
            return Err(EvaError::Config("max_file_size_mb must be positive".to_string()));
        }
        Ok(())
    }
}
