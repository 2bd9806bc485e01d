//! Analysis configuration file
//!
//! A TOML file with optional `[break_detector]` and `[cause_analyzer]`
//! tables. Any field left out keeps its documented default, so a file only
//! needs to mention what it changes.
//!
//! ```toml
//! [break_detector]
//! baseline_window_days = 21
//! min_z_score = 2.0
//!
//! [cause_analyzer]
//! max_temporal_distance_days = 5
//! ```

use crate::break_detection::BreakDetectorConfig;
use crate::cause_attribution::CauseAnalyzerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors for configuration loading
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid [{section}] configuration: {message}")]
    Invalid {
        section: &'static str,
        message: String,
    },
}

/// Complete configuration for one analysis run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub break_detector: BreakDetectorConfig,
    pub cause_analyzer: CauseAnalyzerConfig,
}

impl AnalysisConfig {
    /// Parse TOML overrides on top of the defaults, then validate
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: AnalysisConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Validate both sections
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.break_detector
            .validate()
            .map_err(|message| ConfigError::Invalid {
                section: "break_detector",
                message,
            })?;
        self.cause_analyzer
            .validate()
            .map_err(|message| ConfigError::Invalid {
                section: "cause_analyzer",
                message,
            })?;
        Ok(())
    }
}
