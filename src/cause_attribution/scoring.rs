// Per-change scoring against one break
//
// Four factors, each in [0, 1] (the stage bonus is 0 or 0.2), are combined
// with the configured weights into a clamped confidence. No rounding happens
// here; percentages are rounded only when rendered.

use crate::break_detection::Break;
use crate::cause_attribution::config::CauseAnalyzerConfig;
use crate::cause_attribution::relevance::category_relevance;
use crate::model::{Change, Stage};
use crate::time_utils::days_between;
use serde::{Deserialize, Serialize};

/// Decay rate of temporal proximity per day
const TEMPORAL_DECAY_PER_DAY: f64 = 0.5;

/// Bonus when the change names one of the break's stages
pub const STAGE_MATCH_BONUS: f64 = 0.2;

/// Individual factor scores behind a candidate's confidence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub temporal: f64,
    pub category: f64,
    pub severity: f64,
    pub stage_match_bonus: f64,
}

impl ScoreBreakdown {
    /// Weighted sum clamped to [0, 1]
    pub fn confidence(&self, config: &CauseAnalyzerConfig) -> f64 {
        let raw = self.temporal * config.temporal_weight
            + self.category * config.category_weight
            + self.severity * config.severity_weight
            + self.stage_match_bonus * config.stage_match_weight;
        raw.clamp(0.0, 1.0)
    }
}

/// `exp(-0.5 * gap_days)`: 1.0 on the same day, ~0.61 one day before
pub fn temporal_score(gap_days: i64) -> f64 {
    (-TEMPORAL_DECAY_PER_DAY * gap_days as f64).exp()
}

/// Severity 1..=5 mapped linearly onto 0.0..=1.0, out-of-range values clamped
pub fn severity_score(severity: u8) -> f64 {
    (f64::from(severity.clamp(1, 5)) - 1.0) / 4.0
}

/// `STAGE_MATCH_BONUS` if the change lists `from` or `to` among its affected stages
pub fn stage_match_bonus(change: &Change, from: Stage, to: Stage) -> f64 {
    if change.touches_transition(from, to) {
        STAGE_MATCH_BONUS
    } else {
        0.0
    }
}

/// Days from the change to the break's detection date, if the change is a
/// candidate at all
///
/// A change qualifies when it targets the break's funnel (directly or via the
/// wildcard) and falls on or up to `max_temporal_distance_days` before the
/// detection date.
pub fn eligible_gap(brk: &Break, change: &Change, config: &CauseAnalyzerConfig) -> Option<i64> {
    if !change.applies_to(&brk.funnel_id) {
        return None;
    }
    let gap = days_between(brk.detected_date, change.date);
    (0..=i64::from(config.max_temporal_distance_days))
        .contains(&gap)
        .then_some(gap)
}

/// Score an eligible change against a break
pub fn score_change(brk: &Break, change: &Change, gap_days: i64) -> ScoreBreakdown {
    ScoreBreakdown {
        temporal: temporal_score(gap_days),
        category: category_relevance(change.category, brk.from_stage, brk.to_stage),
        severity: severity_score(change.severity),
        stage_match_bonus: stage_match_bonus(change, brk.from_stage, brk.to_stage),
    }
}
