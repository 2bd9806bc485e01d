//! Human-readable diagnosis report (`--format text`)

use crate::cause_attribution::{Diagnosis, DiagnosisStatus};
use crate::pipeline::DiagnosisReport;
use std::fmt::Write;

const RULE: &str = "─────────────────────────────────────────";

fn status_marker(status: DiagnosisStatus) -> &'static str {
    match status {
        DiagnosisStatus::Identified => "✅",
        DiagnosisStatus::Uncertain => "⚠️ ",
        DiagnosisStatus::Unknown => "❓",
    }
}

fn write_diagnosis<W: Write>(out: &mut W, index: usize, diagnosis: &Diagnosis) -> std::fmt::Result {
    let brk = &diagnosis.detected_break;

    writeln!(
        out,
        "{} [{}] {} {} ({})",
        status_marker(diagnosis.diagnosis_status),
        index,
        brk.funnel_id,
        brk.transition_label(),
        brk.severity.as_str().to_uppercase()
    )?;
    writeln!(out, "{}", RULE)?;
    writeln!(out, "{}", diagnosis.summary)?;
    writeln!(out)?;
    writeln!(out, "  Detected:      {}", brk.detected_date)?;
    writeln!(
        out,
        "  Conversion:    {:.2}% -> {:.2}% (drop {:.1}%)",
        brk.baseline_rate * 100.0,
        brk.current_rate * 100.0,
        brk.relative_drop * 100.0
    )?;
    writeln!(out, "  Z-score:       {:.2}", brk.z_score)?;
    writeln!(out, "  Status:        {}", diagnosis.diagnosis_status)?;

    if diagnosis.causes.is_empty() {
        writeln!(out, "\n  No candidate causes.")?;
    } else {
        writeln!(out, "\n  Candidate causes:")?;
        for (rank, cause) in diagnosis.causes.iter().enumerate() {
            writeln!(
                out,
                "  {}. {:.0}% {} \"{}\" ({}, severity {})",
                rank + 1,
                cause.confidence * 100.0,
                cause.change.category,
                cause.change.description,
                cause.change.date,
                cause.change.severity
            )?;
            let score = &cause.score_breakdown;
            writeln!(
                out,
                "     temporal={:.2} category={:.2} severity={:.2} stage_match={:.2}",
                score.temporal, score.category, score.severity, score.stage_match_bonus
            )?;
        }
    }

    writeln!(out)
}

fn write_report<W: Write>(out: &mut W, report: &DiagnosisReport) -> std::fmt::Result {
    let metadata = &report.metadata;

    writeln!(out, "📊 Funnel Diagnosis Report")?;
    writeln!(out, "{}", RULE)?;
    writeln!(out, "Events loaded:   {}", metadata.events_loaded)?;
    writeln!(out, "Changes loaded:  {}", metadata.changes_loaded)?;
    writeln!(out, "Breaks detected: {}", metadata.breaks_detected)?;
    writeln!(out, "Execution time:  {}ms", metadata.execution_time_ms)?;
    writeln!(out)?;

    if report.diagnoses.is_empty() {
        writeln!(out, "✅ NO CONVERSION BREAKS DETECTED")?;
        writeln!(out)?;
    }

    for (index, diagnosis) in report.diagnoses.iter().enumerate() {
        write_diagnosis(out, index + 1, diagnosis)?;
    }

    if !metadata.load_errors.is_empty() {
        writeln!(
            out,
            "🔇 Skipped input rows ({}):",
            metadata.load_errors.len()
        )?;
        for error in &metadata.load_errors {
            writeln!(out, "  - {}:{}: {}", error.source, error.line, error.message)?;
        }
    }

    Ok(())
}

/// Render a report as plain text
pub fn render(report: &DiagnosisReport) -> anyhow::Result<String> {
    let mut out = String::new();
    write_report(&mut out, report)?;
    Ok(out)
}
