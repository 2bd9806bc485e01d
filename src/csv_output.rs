//! CSV output format for diagnosis reports
//!
//! One row per (diagnosis, cause) with the break columns repeated, for
//! spreadsheet filtering. A diagnosis without causes still gets one row with
//! the cause columns left empty, so every break shows up. Quoting is left to
//! the `csv` writer.

use crate::cause_attribution::{CauseCandidate, Diagnosis};
use crate::pipeline::DiagnosisReport;

const HEADER: &[&str] = &[
    "funnel_id",
    "from_stage",
    "to_stage",
    "detected_date",
    "severity",
    "baseline_rate",
    "current_rate",
    "relative_drop",
    "z_score",
    "diagnosis_status",
    "cause_rank",
    "cause_date",
    "cause_category",
    "cause_description",
    "cause_severity",
    "confidence",
];

/// CSV output formatter
#[derive(Debug, Default)]
pub struct CsvOutput<'a> {
    diagnoses: Vec<&'a Diagnosis>,
}

impl<'a> CsvOutput<'a> {
    pub fn new() -> Self {
        Self {
            diagnoses: Vec::new(),
        }
    }

    /// Add a diagnosis to the output
    pub fn add_diagnosis(&mut self, diagnosis: &'a Diagnosis) {
        self.diagnoses.push(diagnosis);
    }

    fn break_fields(diagnosis: &Diagnosis) -> Vec<String> {
        let brk = &diagnosis.detected_break;
        vec![
            brk.funnel_id.clone(),
            brk.from_stage.to_string(),
            brk.to_stage.to_string(),
            brk.detected_date.to_string(),
            brk.severity.to_string(),
            format!("{:.4}", brk.baseline_rate),
            format!("{:.4}", brk.current_rate),
            format!("{:.4}", brk.relative_drop),
            format!("{:.2}", brk.z_score),
            diagnosis.diagnosis_status.to_string(),
        ]
    }

    fn cause_fields(rank: usize, cause: &CauseCandidate) -> Vec<String> {
        vec![
            rank.to_string(),
            cause.change.date.to_string(),
            cause.change.category.to_string(),
            cause.change.description.clone(),
            cause.change.severity.to_string(),
            format!("{:.4}", cause.confidence),
        ]
    }

    /// Records for one diagnosis: one per cause, or one with empty cause columns
    fn format_diagnosis(diagnosis: &Diagnosis) -> Vec<Vec<String>> {
        let break_fields = Self::break_fields(diagnosis);

        if diagnosis.causes.is_empty() {
            let mut fields = break_fields;
            fields.resize(HEADER.len(), String::new());
            return vec![fields];
        }

        diagnosis
            .causes
            .iter()
            .enumerate()
            .map(|(index, cause)| {
                let mut fields = break_fields.clone();
                fields.extend(Self::cause_fields(index + 1, cause));
                fields
            })
            .collect()
    }

    /// Generate CSV output as string
    pub fn to_csv(&self) -> anyhow::Result<String> {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        writer.write_record(HEADER)?;
        for diagnosis in &self.diagnoses {
            for record in Self::format_diagnosis(diagnosis) {
                writer.write_record(&record)?;
            }
        }

        let bytes = writer.into_inner().map_err(|e| e.into_error())?;
        Ok(String::from_utf8(bytes)?)
    }
}

/// Render a report as a CSV table
pub fn render(report: &DiagnosisReport) -> anyhow::Result<String> {
    let mut output = CsvOutput::new();
    for diagnosis in &report.diagnoses {
        output.add_diagnosis(diagnosis);
    }
    output.to_csv()
}
