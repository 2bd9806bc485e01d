// Cause attribution for detected breaks
//
// For each break, every recorded change that targets the same funnel (or all
// funnels) and lands within the lookback window is scored on:
// - temporal proximity to the detection date (exponential decay)
// - category relevance for the broken transition (fixed lookup table)
// - declared severity of the change
// - overlap between the change's affected stages and the broken transition
//
// The weighted, clamped sum is the candidate's confidence. Candidates are
// ranked, the diagnosis is classified, and a narrative summary is written.

mod config;
mod diagnosis;
mod relevance;
mod scoring;

pub use config::CauseAnalyzerConfig;
pub use diagnosis::{
    analyze_causes, build_summary, classify_status, diagnose_breaks, rank_causes,
    CauseCandidate, Diagnosis, DiagnosisStatus, IDENTIFIED_CONFIDENCE,
};
pub use relevance::{category_relevance, DEFAULT_RELEVANCE, TABLE_TRANSITIONS};
pub use scoring::{
    eligible_gap, score_change, severity_score, stage_match_bonus, temporal_score,
    ScoreBreakdown, STAGE_MATCH_BONUS,
};
