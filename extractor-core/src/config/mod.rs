//! Configuration loader and validator.
//!
//! Responsibilities:
//! - Read environment variables to populate [`ExtractorConfig`]
//! - Apply defaults when values are missing
//! - Validate constraints (e.g., max_file_bytes must be > 0)

pub mod model;

use crate::config::model::ExtractorConfig;
use crate::errors::{ExtractError, Result};

/// Load [`ExtractorConfig`] from ENV variables, falling back to defaults.
/// This is the main entry for the pipeline to obtain its configuration.
pub fn load_from_env_or_default() -> Result<ExtractorConfig> {
    let mut cfg = ExtractorConfig::default();

    if let Ok(v) = std::env::var("EXTRACTOR_MAX_FILE_BYTES") {
        if let Ok(n) = v.parse::<usize>() {
            cfg.limits.max_file_bytes = n;
        }
    }

    cfg.validate()?;
    Ok(cfg)
}

impl ExtractorConfig {
    /// Validate config sanity (no degenerate or absurd values).
    pub fn validate(&self) -> Result<()> {
        if self.limits.max_file_bytes == 0 {
            return Err(ExtractError::InvalidState(
                "max_file_bytes must be greater than 0",
            ));
        }
        Ok(())
    }
}
