use std::path::PathBuf;

use anyhow::Context;
use vianeo_core::scoring::ThresholdLevel;

/// Binary settings loaded from environment variables.
///
/// | Env Var            | Default                 |
/// |--------------------|-------------------------|
/// | `VIANEO_CONFIG`    | unset (built-in tables) |
/// | `VIANEO_THRESHOLD` | `viable`                |
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Path to an engine configuration override.
    pub config_path: Option<PathBuf>,
    /// Threshold used by `scores` when `--threshold` is not given.
    pub threshold: ThresholdLevel,
}

impl RunConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let config_path = std::env::var("VIANEO_CONFIG")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let threshold = std::env::var("VIANEO_THRESHOLD")
            .unwrap_or_else(|_| "viable".into());
        let threshold = ThresholdLevel::from_str_value(threshold.trim())
            .map_err(anyhow::Error::msg)
            .context("VIANEO_THRESHOLD must be 'viable' or 'investment'")?;

        Ok(Self {
            config_path,
            threshold,
        })
    }
}
