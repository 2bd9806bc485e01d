// Severity classification for detected breaks
//
// Thresholds are strict: a relative drop of exactly 0.40 is SIGNIFICANT,
// not CRITICAL, and the same holds at 0.20 and for the z-score bounds.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Relative drop above which a break is critical
pub const CRITICAL_RELATIVE_DROP: f64 = 0.40;
/// |z-score| above which a break is critical
pub const CRITICAL_Z_SCORE: f64 = 3.0;
/// Relative drop above which a break is significant
pub const SIGNIFICANT_RELATIVE_DROP: f64 = 0.20;
/// |z-score| above which a break is significant
pub const SIGNIFICANT_Z_SCORE: f64 = 2.0;

/// How bad a conversion drop is
///
/// Ordered from mildest to worst, so `>=` comparisons filter by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakSeverity {
    Warning,
    Significant,
    Critical,
}

impl BreakSeverity {
    pub fn as_str(self) -> &'static str {
        match self {
            BreakSeverity::Warning => "warning",
            BreakSeverity::Significant => "significant",
            BreakSeverity::Critical => "critical",
        }
    }
}

impl fmt::Display for BreakSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a flagged drop
///
/// Either criterion alone is enough to escalate: a large relative drop on a
/// noisy series, or a modest drop on a very stable one.
pub fn classify_severity(relative_drop: f64, z_score: f64) -> BreakSeverity {
    let z = z_score.abs();
    if relative_drop > CRITICAL_RELATIVE_DROP || z > CRITICAL_Z_SCORE {
        BreakSeverity::Critical
    } else if relative_drop > SIGNIFICANT_RELATIVE_DROP || z > SIGNIFICANT_Z_SCORE {
        BreakSeverity::Significant
    } else {
        BreakSeverity::Warning
    }
}
