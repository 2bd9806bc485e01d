//! End-to-end diagnosis run
//!
//! Loader output → funnel analyzer → break detector → cause analyzer, plus
//! the run metadata (input counts, dropped rows, timing) that travels with
//! the diagnoses to the renderers.

use crate::break_detection::{detect_breaks, BreakSeverity};
use crate::cause_attribution::{diagnose_breaks, Diagnosis};
use crate::clock::Clock;
use crate::config::AnalysisConfig;
use crate::funnel_analyzer::{build_snapshots, calculate_conversion_rates};
use crate::ingest::{load_changes, load_events, LoadError, LoadResult};
use crate::model::{Change, Event};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;

/// Facts about one run, reported alongside the diagnoses
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunMetadata {
    /// Valid events loaded (before any funnel filter)
    pub events_loaded: usize,
    /// Valid changes that entered analysis
    pub changes_loaded: usize,
    /// Breaks in the report (after any severity filter)
    pub breaks_detected: usize,
    /// Input rows dropped during loading
    pub load_errors: Vec<LoadError>,
    pub execution_time_ms: u64,
}

/// Diagnoses plus run metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisReport {
    pub diagnoses: Vec<Diagnosis>,
    pub metadata: RunMetadata,
}

/// Report-level filters applied around the core analysis
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOptions {
    /// Only analyze events of this funnel
    pub funnel: Option<String>,
    /// Hide diagnoses whose break is milder than this
    pub min_severity: Option<BreakSeverity>,
}

/// Run the analytical core: snapshots, rates, breaks, diagnoses
///
/// Deterministic for a given clock.
pub fn diagnose(
    events: &[Event],
    changes: &[Change],
    config: &AnalysisConfig,
    clock: &dyn Clock,
) -> Vec<Diagnosis> {
    let snapshots = build_snapshots(events);
    let rates = calculate_conversion_rates(&snapshots);
    tracing::info!(
        events = events.len(),
        snapshots = snapshots.len(),
        "built funnel snapshots"
    );

    let breaks = detect_breaks(&rates, &config.break_detector);
    diagnose_breaks(&breaks, changes, &config.cause_analyzer, clock)
}

/// Diagnose already-loaded inputs and assemble the report
pub fn run_diagnosis(
    events: LoadResult<Event>,
    changes: LoadResult<Change>,
    config: &AnalysisConfig,
    options: &RunOptions,
    clock: &dyn Clock,
) -> DiagnosisReport {
    let started = Instant::now();

    let LoadResult {
        records: events,
        errors: mut load_errors,
    } = events;
    load_errors.extend(changes.errors);
    load_errors.sort_by(|a, b| a.source.cmp(&b.source).then(a.line.cmp(&b.line)));
    let events_loaded = events.len();

    let events: Vec<Event> = match &options.funnel {
        Some(funnel) => events
            .into_iter()
            .filter(|event| &event.funnel_id == funnel)
            .collect(),
        None => events,
    };

    let mut diagnoses = diagnose(&events, &changes.records, config, clock);
    if let Some(min_severity) = options.min_severity {
        diagnoses.retain(|d| d.detected_break.severity >= min_severity);
    }

    let metadata = RunMetadata {
        events_loaded,
        changes_loaded: changes.records.len(),
        breaks_detected: diagnoses.len(),
        load_errors,
        execution_time_ms: started.elapsed().as_millis() as u64,
    };

    DiagnosisReport {
        diagnoses,
        metadata,
    }
}

/// Load inputs from disk and diagnose them
///
/// Missing or unreadable files are fatal; invalid rows are not.
pub fn run_from_files(
    events_path: &Path,
    changes_path: Option<&Path>,
    config: &AnalysisConfig,
    options: &RunOptions,
    clock: &dyn Clock,
) -> Result<DiagnosisReport> {
    let started = Instant::now();

    let events = load_events(events_path)
        .with_context(|| format!("Failed to load events from {}", events_path.display()))?;
    let changes = match changes_path {
        Some(path) => load_changes(path)
            .with_context(|| format!("Failed to load changes from {}", path.display()))?,
        None => LoadResult::default(),
    };

    let mut report = run_diagnosis(events, changes, config, options, clock);
    report.metadata.execution_time_ms = started.elapsed().as_millis() as u64;
    Ok(report)
}
