// Configuration for conversion-rate break detection
//
// Every field has a documented default; a partial TOML table only overrides
// the fields it names.

use serde::{Deserialize, Serialize};

/// Configuration for sliding-window break detection
///
/// # Example
/// ```
/// use funnelscope::break_detection::BreakDetectorConfig;
///
/// let config = BreakDetectorConfig::default();
/// assert_eq!(config.baseline_window_days, 14);
/// assert_eq!(config.current_window_days, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakDetectorConfig {
    /// Length of the trailing baseline window, in days
    ///
    /// The baseline window sits immediately before the current window and
    /// never overlaps it.
    pub baseline_window_days: u32,

    /// Length of the most-recent window compared against the baseline, in days
    ///
    /// A drop must persist across this window's mean to be flagged, so a
    /// single bad day is diluted by its neighbours.
    pub current_window_days: u32,

    /// Minimum relative drop `(baseline - current) / baseline` to flag
    ///
    /// Default: 0.15 (15% fewer conversions than usual)
    pub min_relative_drop: f64,

    /// Minimum |z-score| of the drop against baseline variance to flag
    ///
    /// Default: 1.5
    pub min_z_score: f64,

    /// Minimum number of days with data inside the baseline window
    ///
    /// Candidate dates with a thinner baseline are skipped entirely.
    ///
    /// Default: 7
    pub min_baseline_data_points: usize,
}

impl Default for BreakDetectorConfig {
    fn default() -> Self {
        Self {
            baseline_window_days: 14,
            current_window_days: 3,
            min_relative_drop: 0.15,
            min_z_score: 1.5,
            min_baseline_data_points: 7,
        }
    }
}

impl BreakDetectorConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.baseline_window_days == 0 {
            return Err("baseline_window_days must be >= 1, got 0".to_string());
        }

        if self.current_window_days == 0 {
            return Err("current_window_days must be >= 1, got 0".to_string());
        }

        if !(0.0..=1.0).contains(&self.min_relative_drop) {
            return Err(format!(
                "min_relative_drop must be in [0, 1], got {}",
                self.min_relative_drop
            ));
        }

        if !self.min_z_score.is_finite() || self.min_z_score < 0.0 {
            return Err(format!(
                "min_z_score must be non-negative, got {}",
                self.min_z_score
            ));
        }

        if self.min_baseline_data_points == 0 {
            return Err("min_baseline_data_points must be >= 1, got 0".to_string());
        }

        Ok(())
    }

    /// Days back from a candidate date covered by both windows together
    pub(crate) fn lookback_days(&self) -> i64 {
        i64::from(self.baseline_window_days) + i64::from(self.current_window_days)
    }
}
