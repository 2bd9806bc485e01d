// Diagnosis assembly: rank candidate causes for a break, classify how well
// the break is explained, and write the narrative summary.

use crate::break_detection::Break;
use crate::cause_attribution::config::CauseAnalyzerConfig;
use crate::cause_attribution::scoring::{eligible_gap, score_change, ScoreBreakdown};
use crate::clock::Clock;
use crate::model::Change;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Top-candidate confidence at or above which a break counts as identified
pub const IDENTIFIED_CONFIDENCE: f64 = 0.6;

/// A change scored as a plausible explanation for a break
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CauseCandidate {
    #[serde(flatten)]
    pub change: Change,
    pub confidence: f64,
    pub score_breakdown: ScoreBreakdown,
}

/// How well a break is explained by its candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosisStatus {
    /// Top candidate reaches `IDENTIFIED_CONFIDENCE`
    Identified,
    /// Candidates exist but none is convincing
    Uncertain,
    /// No candidate survived filtering
    Unknown,
}

impl DiagnosisStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosisStatus::Identified => "identified",
            DiagnosisStatus::Uncertain => "uncertain",
            DiagnosisStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for DiagnosisStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full output for one break
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnosis {
    pub generated_at: DateTime<Utc>,
    #[serde(rename = "break")]
    pub detected_break: Break,
    /// Sorted by confidence, highest first
    pub causes: Vec<CauseCandidate>,
    pub diagnosis_status: DiagnosisStatus,
    pub summary: String,
}

impl Diagnosis {
    pub fn top_cause(&self) -> Option<&CauseCandidate> {
        self.causes.first()
    }
}

/// Score and rank every eligible change for one break
///
/// Ineligible changes (other funnel, dated after the break, or older than
/// `max_temporal_distance_days`) are never scored. Candidates under
/// `min_confidence_threshold` are dropped; the rest are sorted by confidence,
/// descending, keeping input order on ties.
pub fn rank_causes(
    brk: &Break,
    changes: &[Change],
    config: &CauseAnalyzerConfig,
) -> Vec<CauseCandidate> {
    let mut candidates: Vec<CauseCandidate> = changes
        .iter()
        .filter_map(|change| {
            let gap = eligible_gap(brk, change, config)?;
            let score_breakdown = score_change(brk, change, gap);
            let confidence = score_breakdown.confidence(config);
            tracing::debug!(
                funnel_id = %brk.funnel_id,
                change = %change.description,
                gap_days = gap,
                confidence,
                "scored candidate"
            );
            Some(CauseCandidate {
                change: change.clone(),
                confidence,
                score_breakdown,
            })
        })
        .filter(|candidate| candidate.confidence >= config.min_confidence_threshold)
        .collect();

    // sort_by is stable: equal confidences keep input order
    candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    candidates
}

/// Status from the ranked candidates
pub fn classify_status(causes: &[CauseCandidate]) -> DiagnosisStatus {
    match causes.first() {
        None => DiagnosisStatus::Unknown,
        Some(top) if top.confidence >= IDENTIFIED_CONFIDENCE => DiagnosisStatus::Identified,
        Some(_) => DiagnosisStatus::Uncertain,
    }
}

/// One-paragraph narrative for a diagnosis
pub fn build_summary(brk: &Break, causes: &[CauseCandidate], status: DiagnosisStatus) -> String {
    let headline = format!(
        "{} drop of {:.1}% in {} conversion for funnel '{}' detected on {}.",
        brk.severity.as_str().to_uppercase(),
        brk.relative_drop * 100.0,
        brk.transition_label(),
        brk.funnel_id,
        brk.detected_date
    );

    match (status, causes.first()) {
        (DiagnosisStatus::Unknown, _) | (_, None) => {
            format!("{} No candidate causes found.", headline)
        }
        (DiagnosisStatus::Identified, Some(top)) => format!(
            "{} Most likely cause: {} change \"{}\" on {} ({:.0}% confidence).",
            headline,
            top.change.category,
            top.change.description,
            top.change.date,
            top.confidence * 100.0
        ),
        (DiagnosisStatus::Uncertain, Some(top)) => format!(
            "{} Possible cause: {} change \"{}\" on {} ({:.0}% confidence); manual investigation recommended.",
            headline,
            top.change.category,
            top.change.description,
            top.change.date,
            top.confidence * 100.0
        ),
    }
}

/// Diagnose one break against the recorded changes
///
/// # Example
/// ```
/// use funnelscope::break_detection::{Break, BreakSeverity};
/// use funnelscope::cause_attribution::{analyze_causes, CauseAnalyzerConfig, DiagnosisStatus};
/// use funnelscope::clock::SystemClock;
/// use funnelscope::model::Stage;
/// use chrono::NaiveDate;
///
/// let brk = Break {
///     funnel_id: "checkout".to_string(),
///     from_stage: Stage::Click,
///     to_stage: Stage::Landing,
///     detected_date: NaiveDate::from_ymd_opt(2024, 3, 21).unwrap(),
///     baseline_rate: 0.75,
///     current_rate: 0.33,
///     absolute_drop: 0.42,
///     relative_drop: 0.56,
///     z_score: 41.7,
///     severity: BreakSeverity::Critical,
/// };
///
/// let diagnosis = analyze_causes(&brk, &[], &CauseAnalyzerConfig::default(), &SystemClock);
/// assert_eq!(diagnosis.diagnosis_status, DiagnosisStatus::Unknown);
/// assert!(diagnosis.causes.is_empty());
/// ```
pub fn analyze_causes(
    brk: &Break,
    changes: &[Change],
    config: &CauseAnalyzerConfig,
    clock: &dyn Clock,
) -> Diagnosis {
    let causes = rank_causes(brk, changes, config);
    let diagnosis_status = classify_status(&causes);
    let summary = build_summary(brk, &causes, diagnosis_status);

    Diagnosis {
        generated_at: clock.now(),
        detected_break: brk.clone(),
        causes,
        diagnosis_status,
        summary,
    }
}

/// Diagnose every break, in break order
pub fn diagnose_breaks(
    breaks: &[Break],
    changes: &[Change],
    config: &CauseAnalyzerConfig,
    clock: &dyn Clock,
) -> Vec<Diagnosis> {
    let diagnoses: Vec<Diagnosis> = breaks
        .iter()
        .map(|brk| analyze_causes(brk, changes, config, clock))
        .collect();

    let identified = diagnoses
        .iter()
        .filter(|d| d.diagnosis_status == DiagnosisStatus::Identified)
        .count();
    tracing::info!(
        breaks = breaks.len(),
        changes = changes.len(),
        identified,
        "cause attribution complete"
    );

    diagnoses
}
