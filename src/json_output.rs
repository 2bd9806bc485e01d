//! JSON output format for diagnosis reports
//!
//! `--format json`: the report as one pretty-printed document with
//! camelCase keys, `{ "diagnoses": [...], "metadata": {...} }`.

use crate::cause_attribution::Diagnosis;
use crate::pipeline::{DiagnosisReport, RunMetadata};
use serde::Serialize;

/// Root JSON output structure
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput<'a> {
    /// One entry per reported break, in break order
    pub diagnoses: &'a [Diagnosis],
    /// Input counts, dropped rows and timing
    pub metadata: &'a RunMetadata,
}

impl<'a> JsonOutput<'a> {
    /// Borrow a report for serialization
    pub fn new(report: &'a DiagnosisReport) -> Self {
        Self {
            diagnoses: &report.diagnoses,
            metadata: &report.metadata,
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Render a report as a JSON document
pub fn render(report: &DiagnosisReport) -> anyhow::Result<String> {
    JsonOutput::new(report).to_json()
}
