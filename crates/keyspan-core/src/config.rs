//! Module: config
//! Responsibility: scan-planning and execution tunables.
//! Does not own: schema declarations.
//! Boundary: loaded once by the embedding layer and passed by reference.

use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("invalid scan config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid scan config: '{field}' must be at least {min}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: usize,
        value: usize,
    },
}

///
/// ScanConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    /// Cap on enumerated slot combinations before the compiler collapses a
    /// plan into one spanning range.
    pub max_scan_ranges: usize,

    /// Attach a skip-scan key filter for constrained columns the range
    /// bounds cannot express.
    pub skip_scan: bool,

    /// Worker threads used by the parallel scan executor.
    pub scan_workers: usize,
}

impl ScanConfig {
    pub const DEFAULT_MAX_SCAN_RANGES: usize = 10_000;
    pub const DEFAULT_SCAN_WORKERS: usize = 4;

    /// Parse and validate a TOML document. Missing keys take defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;

        Ok(config)
    }

    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.max_scan_ranges < 1 {
            return Err(ConfigError::OutOfRange {
                field: "max_scan_ranges",
                min: 1,
                value: self.max_scan_ranges,
            });
        }
        if self.scan_workers < 1 {
            return Err(ConfigError::OutOfRange {
                field: "scan_workers",
                min: 1,
                value: self.scan_workers,
            });
        }

        Ok(())
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_scan_ranges: Self::DEFAULT_MAX_SCAN_RANGES,
            skip_scan: true,
            scan_workers: Self::DEFAULT_SCAN_WORKERS,
        }
    }
}

///
/// TESTS
///
