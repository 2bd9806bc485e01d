// Configuration for cause attribution
//
// Weights combine the four per-change factors into one confidence value.
// Like the detector config, a partial TOML table overrides only the fields
// it names.

use serde::{Deserialize, Serialize};

/// Configuration for ranking candidate causes of a break
///
/// # Example
/// ```
/// use funnelscope::cause_attribution::CauseAnalyzerConfig;
///
/// let config = CauseAnalyzerConfig::default();
/// assert_eq!(config.max_temporal_distance_days, 7);
/// assert_eq!(config.temporal_weight, 0.40);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CauseAnalyzerConfig {
    /// Oldest change still considered, in days before the detection date
    ///
    /// Changes dated after the detection date are never considered.
    pub max_temporal_distance_days: u32,

    /// Weight of temporal proximity (`exp(-0.5 * gap_days)`)
    pub temporal_weight: f64,

    /// Weight of the category/transition relevance table
    pub category_weight: f64,

    /// Weight of the change's declared severity
    pub severity_weight: f64,

    /// Weight of the affected-stage overlap bonus
    pub stage_match_weight: f64,

    /// Candidates scoring below this confidence are dropped
    pub min_confidence_threshold: f64,
}

impl Default for CauseAnalyzerConfig {
    fn default() -> Self {
        Self {
            max_temporal_distance_days: 7,
            temporal_weight: 0.40,
            category_weight: 0.30,
            severity_weight: 0.20,
            stage_match_weight: 0.10,
            min_confidence_threshold: 0.1,
        }
    }
}

impl CauseAnalyzerConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        for (name, weight) in [
            ("temporal_weight", self.temporal_weight),
            ("category_weight", self.category_weight),
            ("severity_weight", self.severity_weight),
            ("stage_match_weight", self.stage_match_weight),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(format!("{} must be non-negative, got {}", name, weight));
            }
        }

        if !(0.0..=1.0).contains(&self.min_confidence_threshold) {
            return Err(format!(
                "min_confidence_threshold must be in [0, 1], got {}",
                self.min_confidence_threshold
            ));
        }

        Ok(())
    }
}
