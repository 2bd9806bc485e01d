// Sliding-window break detection over daily conversion-rate series
//
// For each funnel and adjacent stage pair, every day with data is treated as
// a candidate detection date. The mean rate of the current window ending on
// that day is compared against the non-overlapping baseline window before
// it. Raw flags on consecutive days are then collapsed so a sustained drop
// reports once.

use crate::break_detection::config::BreakDetectorConfig;
use crate::break_detection::severity::{classify_severity, BreakSeverity};
use crate::break_detection::statistics::compare_windows;
use crate::funnel_analyzer::ConversionRates;
use crate::model::Stage;
use crate::time_utils::{days_between, within_window};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maximum gap in days between flagged dates of the same cluster
const CLUSTER_MAX_GAP_DAYS: i64 = 1;

/// A statistically significant, sustained drop in one conversion rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Break {
    pub funnel_id: String,
    pub from_stage: Stage,
    pub to_stage: Stage,
    pub detected_date: NaiveDate,
    /// Mean rate over the baseline window
    pub baseline_rate: f64,
    /// Mean rate over the current window
    pub current_rate: f64,
    pub absolute_drop: f64,
    pub relative_drop: f64,
    pub z_score: f64,
    pub severity: BreakSeverity,
}

impl Break {
    /// `"from->to"` transition label
    pub fn transition_label(&self) -> String {
        format!("{}->{}", self.from_stage, self.to_stage)
    }
}

/// Key of one independent rate series
type SeriesKey<'a> = (&'a str, Stage, Stage);

/// Detect conversion-rate breaks
///
/// Pure and deterministic: the same rates and configuration always yield the
/// same breaks, sorted by detection date (then funnel id, then stage order).
///
/// # Example
/// ```
/// use funnelscope::break_detection::{detect_breaks, BreakDetectorConfig};
///
/// let breaks = detect_breaks(&[], &BreakDetectorConfig::default());
/// assert!(breaks.is_empty());
/// ```
pub fn detect_breaks(rates: &[ConversionRates], config: &BreakDetectorConfig) -> Vec<Break> {
    let series = build_series(rates);

    let mut raw = Vec::new();
    for ((funnel_id, from, to), points) in &series {
        scan_series(funnel_id, *from, *to, points, config, &mut raw);
    }

    let raw_flags = raw.len();
    let breaks = deduplicate_breaks(raw);
    tracing::info!(
        series = series.len(),
        raw_flags,
        breaks = breaks.len(),
        "break detection complete"
    );
    breaks
}

/// Split rates into chronological (date, rate) series per funnel and stage pair
fn build_series(rates: &[ConversionRates]) -> BTreeMap<SeriesKey<'_>, Vec<(NaiveDate, f64)>> {
    let mut series: BTreeMap<SeriesKey<'_>, Vec<(NaiveDate, f64)>> = BTreeMap::new();

    for day in rates {
        for transition in &day.transitions {
            series
                .entry((
                    day.funnel_id.as_str(),
                    transition.from_stage,
                    transition.to_stage,
                ))
                .or_default()
                .push((day.date, transition.rate));
        }
    }

    for points in series.values_mut() {
        points.sort_by_key(|(date, _)| *date);
    }

    series
}

/// Evaluate every candidate date of one series, pushing raw flags in date order
fn scan_series(
    funnel_id: &str,
    from: Stage,
    to: Stage,
    points: &[(NaiveDate, f64)],
    config: &BreakDetectorConfig,
    flags: &mut Vec<Break>,
) {
    let current_days = i64::from(config.current_window_days);
    let lookback = config.lookback_days();

    for &(candidate, _) in points {
        // Points are sorted: everything at or before the candidate date
        let end = points.partition_point(|(date, _)| *date <= candidate);

        let mut baseline = Vec::new();
        let mut current = Vec::new();
        for &(date, rate) in points[..end].iter().rev() {
            let gap = days_between(candidate, date);
            if gap >= lookback {
                break;
            }
            if within_window(gap, 0, current_days) {
                current.push(rate);
            } else if within_window(gap, current_days, lookback) {
                baseline.push(rate);
            }
        }

        if baseline.len() < config.min_baseline_data_points || current.is_empty() {
            continue;
        }

        let Some(comparison) = compare_windows(&baseline, &current) else {
            tracing::debug!(
                funnel_id,
                transition = %format!("{}->{}", from, to),
                date = %candidate,
                "skipping candidate with zero baseline mean"
            );
            continue;
        };

        if comparison.relative_drop >= config.min_relative_drop
            && comparison.z_score.abs() >= config.min_z_score
        {
            let severity = classify_severity(comparison.relative_drop, comparison.z_score);
            tracing::debug!(
                funnel_id,
                transition = %format!("{}->{}", from, to),
                date = %candidate,
                relative_drop = comparison.relative_drop,
                z_score = comparison.z_score,
                %severity,
                "flagged candidate"
            );
            flags.push(Break {
                funnel_id: funnel_id.to_string(),
                from_stage: from,
                to_stage: to,
                detected_date: candidate,
                baseline_rate: comparison.baseline_mean,
                current_rate: comparison.current_mean,
                absolute_drop: comparison.absolute_drop,
                relative_drop: comparison.relative_drop,
                z_score: comparison.z_score,
                severity,
            });
        }
    }
}

/// Collapse raw flags on consecutive days into one break per cluster
///
/// Flags are grouped by (funnel, from, to). Within a group, a flag at most
/// one day after the previous flag joins its cluster. Each cluster is
/// represented by its member with the largest |z-score| (first one wins a
/// tie). Only flagged dates are considered: two flags separated by an
/// unflagged day form separate clusters even if the day had no data.
pub fn deduplicate_breaks(raw: Vec<Break>) -> Vec<Break> {
    let mut groups: BTreeMap<(String, Stage, Stage), Vec<Break>> = BTreeMap::new();
    for flag in raw {
        groups
            .entry((flag.funnel_id.clone(), flag.from_stage, flag.to_stage))
            .or_default()
            .push(flag);
    }

    let mut result = Vec::new();
    for (_, mut flags) in groups {
        flags.sort_by_key(|b| b.detected_date);

        let mut representative: Option<Break> = None;
        let mut last_date: Option<NaiveDate> = None;

        for flag in flags {
            let continues_cluster = last_date
                .is_some_and(|prev| days_between(flag.detected_date, prev) <= CLUSTER_MAX_GAP_DAYS);
            last_date = Some(flag.detected_date);

            match representative.take() {
                Some(best) if continues_cluster => {
                    representative = Some(if flag.z_score.abs() > best.z_score.abs() {
                        flag
                    } else {
                        best
                    });
                }
                Some(best) => {
                    result.push(best);
                    representative = Some(flag);
                }
                None => representative = Some(flag),
            }
        }

        if let Some(best) = representative {
            result.push(best);
        }
    }

    result.sort_by(|a, b| {
        a.detected_date
            .cmp(&b.detected_date)
            .then_with(|| a.funnel_id.cmp(&b.funnel_id))
            .then_with(|| a.from_stage.cmp(&b.from_stage))
    });
    result
}
