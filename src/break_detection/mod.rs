// Conversion-rate break detection
//
// Flags statistically significant, sustained drops in stage-to-stage
// conversion rates, independently per funnel and adjacent stage pair.
//
// Pipeline:
// - Build a chronological (date, rate) series per funnel and transition
// - For each candidate date, compare the current window mean against the
//   trailing, non-overlapping baseline window (relative drop + z-score)
// - Classify severity with strict thresholds
// - Collapse flags on consecutive days into one break per cluster

mod config;
mod detector;
mod severity;
mod statistics;

pub use config::BreakDetectorConfig;
pub use detector::{deduplicate_breaks, detect_breaks, Break};
pub use severity::{classify_severity, BreakSeverity};
pub use statistics::{compare_windows, mean, sample_std_dev, WindowComparison, MIN_EFFECTIVE_STD_DEV};
