//! Loading events and changes from CSV or JSON files
//!
//! Row-level problems never abort a load: every invalid row is dropped and
//! reported as a [`LoadError`] tagged with its source and line, and the valid
//! rows carry on into analysis. Only an unreadable file (or a JSON document
//! that is not an array at all) is a hard error.
//!
//! # CSV layout
//!
//! ```text
//! date,funnel_id,stage,count,source
//! 2024-03-01,checkout,click,1200,google
//!
//! date,funnel_id,category,description,severity,affected_stages
//! 2024-03-18,checkout,site,New landing page,4,landing|lead
//! ```
//!
//! A `.json` file holds an array of records with the camelCase field names
//! used in reports (`funnelId`, `affectedStages`, ...).

use crate::model::{Change, ChangeCategory, Event, Stage};
use crate::time_utils::parse_iso_date;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Separator between stage names in the `affected_stages` CSV column
pub const AFFECTED_STAGES_SEPARATOR: char = '|';

/// Fatal ingestion errors
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV header in {origin}: {source}")]
    CsvHeader {
        origin: String,
        #[source]
        source: csv::Error,
    },

    #[error("{origin} is not a JSON array of records: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A dropped input row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadError {
    /// File (or other origin label) the row came from
    pub source: String,
    /// 1-based line for CSV, 1-based record number for JSON
    pub line: u64,
    pub message: String,
}

/// Valid records plus the rows that were dropped
#[derive(Debug, Clone, PartialEq)]
pub struct LoadResult<T> {
    pub records: Vec<T>,
    pub errors: Vec<LoadError>,
}

impl<T> Default for LoadResult<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            errors: Vec::new(),
        }
    }
}

impl<T> LoadResult<T> {
    fn reject(&mut self, origin: &str, line: u64, message: String) {
        tracing::warn!(source = origin, line, %message, "dropping invalid row");
        self.errors.push(LoadError {
            source: origin.to_string(),
            line,
            message,
        });
    }
}

/// On-disk format, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Json,
}

impl InputFormat {
    /// `.json` (any case) is JSON; everything else is CSV
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => InputFormat::Json,
            _ => InputFormat::Csv,
        }
    }
}

#[derive(Debug, Deserialize)]
struct EventRow {
    date: String,
    funnel_id: String,
    stage: String,
    count: String,
    #[serde(default)]
    source: Option<String>,
}

/// JSON event record; dates stay strings so both formats share one parser
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventRecord {
    date: String,
    funnel_id: String,
    stage: String,
    count: u64,
    #[serde(default)]
    source: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChangeRecord {
    date: String,
    funnel_id: String,
    category: String,
    description: String,
    severity: u8,
    #[serde(default)]
    affected_stages: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ChangeRow {
    date: String,
    funnel_id: String,
    category: String,
    description: String,
    severity: String,
    #[serde(default)]
    affected_stages: Option<String>,
}

/// Load events from a CSV or JSON file
pub fn load_events(path: &Path) -> Result<LoadResult<Event>, IngestError> {
    let origin = path.display().to_string();
    match InputFormat::from_path(path) {
        InputFormat::Csv => parse_events_csv(open(path)?, &origin),
        InputFormat::Json => parse_events_json(&read_to_string(path)?, &origin),
    }
}

/// Load changes from a CSV or JSON file
pub fn load_changes(path: &Path) -> Result<LoadResult<Change>, IngestError> {
    let origin = path.display().to_string();
    match InputFormat::from_path(path) {
        InputFormat::Csv => parse_changes_csv(open(path)?, &origin),
        InputFormat::Json => parse_changes_json(&read_to_string(path)?, &origin),
    }
}

fn open(path: &Path) -> Result<File, IngestError> {
    File::open(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_to_string(path: &Path) -> Result<String, IngestError> {
    std::fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse events CSV with a `date,funnel_id,stage,count[,source]` header
pub fn parse_events_csv<R: Read>(reader: R, origin: &str) -> Result<LoadResult<Event>, IngestError> {
    parse_csv(reader, origin, |row: EventRow| {
        let count = row.count.trim().parse::<u64>().map_err(|_| {
            format!("invalid count '{}' (expected a non-negative integer)", row.count)
        })?;
        build_event(&row.date, &row.funnel_id, &row.stage, count, row.source)
    })
}

/// Parse changes CSV with a
/// `date,funnel_id,category,description,severity[,affected_stages]` header
pub fn parse_changes_csv<R: Read>(
    reader: R,
    origin: &str,
) -> Result<LoadResult<Change>, IngestError> {
    parse_csv(reader, origin, |row: ChangeRow| {
        let severity = row.severity.trim().parse::<u8>().map_err(|_| {
            format!("invalid severity '{}' (expected an integer 1-5)", row.severity)
        })?;
        let affected_stages = row
            .affected_stages
            .as_deref()
            .map(|raw| raw.split(AFFECTED_STAGES_SEPARATOR).collect())
            .unwrap_or_default();
        build_change(
            &row.date,
            &row.funnel_id,
            &row.category,
            &row.description,
            severity,
            affected_stages,
        )
    })
}

/// Parse a JSON array of events
pub fn parse_events_json(content: &str, origin: &str) -> Result<LoadResult<Event>, IngestError> {
    parse_json(content, origin, |record: EventRecord| {
        build_event(
            &record.date,
            &record.funnel_id,
            &record.stage,
            record.count,
            record.source,
        )
    })
}

/// Parse a JSON array of changes
pub fn parse_changes_json(content: &str, origin: &str) -> Result<LoadResult<Change>, IngestError> {
    parse_json(content, origin, |record: ChangeRecord| {
        build_change(
            &record.date,
            &record.funnel_id,
            &record.category,
            &record.description,
            record.severity,
            record.affected_stages.iter().map(String::as_str).collect(),
        )
    })
}

/// Validate one event; shared by the CSV and JSON paths
fn build_event(
    date: &str,
    funnel_id: &str,
    stage: &str,
    count: u64,
    source: Option<String>,
) -> Result<Event, String> {
    let date = parse_iso_date(date)?;
    let funnel_id = non_empty_funnel(funnel_id)?;
    let stage = stage.trim().parse::<Stage>().map_err(|e| e.to_string())?;
    let source = source
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    Ok(Event {
        date,
        funnel_id,
        stage,
        count,
        source,
    })
}

/// Validate one change; shared by the CSV and JSON paths
fn build_change(
    date: &str,
    funnel_id: &str,
    category: &str,
    description: &str,
    severity: u8,
    affected_stages: Vec<&str>,
) -> Result<Change, String> {
    let date = parse_iso_date(date)?;
    let funnel_id = non_empty_funnel(funnel_id)?;
    let category = category
        .trim()
        .parse::<ChangeCategory>()
        .map_err(|e| e.to_string())?;
    check_severity(severity)?;

    Ok(Change {
        date,
        funnel_id,
        category,
        description: description.trim().to_string(),
        severity,
        affected_stages: clean_affected_stages(affected_stages),
    })
}

fn parse_csv<R, Row, T, F>(reader: R, origin: &str, convert: F) -> Result<LoadResult<T>, IngestError>
where
    R: Read,
    Row: serde::de::DeserializeOwned,
    F: Fn(Row) -> Result<T, String>,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|source| IngestError::CsvHeader {
            origin: origin.to_string(),
            source,
        })?
        .clone();

    let mut result = LoadResult::default();
    for (index, record) in csv_reader.records().enumerate() {
        // Header is line 1; multi-line quoted fields shift the fallback
        let fallback_line = index as u64 + 2;
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(fallback_line);
                result.reject(origin, line, e.to_string());
                continue;
            }
        };
        let line = record.position().map(|p| p.line()).unwrap_or(fallback_line);

        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        let parsed = record
            .deserialize::<Row>(Some(&headers))
            .map_err(|e| e.to_string())
            .and_then(&convert);
        match parsed {
            Ok(value) => result.records.push(value),
            Err(message) => result.reject(origin, line, message),
        }
    }

    tracing::info!(
        source = origin,
        loaded = result.records.len(),
        rejected = result.errors.len(),
        "parsed CSV input"
    );
    Ok(result)
}

fn parse_json<Row, T, F>(content: &str, origin: &str, convert: F) -> Result<LoadResult<T>, IngestError>
where
    Row: serde::de::DeserializeOwned,
    F: Fn(Row) -> Result<T, String>,
{
    let values: Vec<serde_json::Value> =
        serde_json::from_str(content).map_err(|source| IngestError::Json {
            origin: origin.to_string(),
            source,
        })?;

    let mut result = LoadResult::default();
    for (index, value) in values.into_iter().enumerate() {
        let record_number = index as u64 + 1;
        let parsed = serde_json::from_value::<Row>(value)
            .map_err(|e| e.to_string())
            .and_then(&convert);
        match parsed {
            Ok(value) => result.records.push(value),
            Err(message) => result.reject(origin, record_number, message),
        }
    }

    tracing::info!(
        source = origin,
        loaded = result.records.len(),
        rejected = result.errors.len(),
        "parsed JSON input"
    );
    Ok(result)
}

fn non_empty_funnel(raw: &str) -> Result<String, String> {
    let funnel_id = raw.trim();
    if funnel_id.is_empty() {
        return Err("funnel_id must not be empty".to_string());
    }
    Ok(funnel_id.to_string())
}

fn check_severity(severity: u8) -> Result<(), String> {
    if (1..=5).contains(&severity) {
        Ok(())
    } else {
        Err(format!("severity {} out of range 1-5", severity))
    }
}

fn clean_affected_stages(names: Vec<&str>) -> Vec<String> {
    names
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    const EVENTS_CSV: &str = "\
date,funnel_id,stage,count,source
2024-03-01,checkout,impression,10000,google
2024-03-01,checkout,click,1200,
2024-03-01,checkout,landing,900
";

    #[test]
    fn test_parse_events_csv_valid_rows() {
        let result = parse_events_csv(EVENTS_CSV.as_bytes(), "events.csv").unwrap();

        assert!(result.errors.is_empty(), "{:?}", result.errors);
        assert_eq!(result.records.len(), 3);
        assert_eq!(result.records[0].source.as_deref(), Some("google"));
        assert_eq!(result.records[1].source, None);
        assert_eq!(result.records[2].stage, Stage::Landing);
        assert_eq!(result.records[2].count, 900);
    }

    #[test]
    fn test_parse_events_csv_reports_bad_rows_with_lines() {
        let input = "\
date,funnel_id,stage,count,source
2024-03-01,checkout,click,1200,
2024-13-01,checkout,click,1200,
2024-03-02,checkout,Click,1200,
2024-03-02,checkout,click,-4,
2024-03-02,checkout,click,12.5,
2024-03-02,,click,12,
2024-03-03,checkout,lead,7,
";
        let result = parse_events_csv(input.as_bytes(), "events.csv").unwrap();

        assert_eq!(result.records.len(), 2);
        let lines: Vec<u64> = result.errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![3, 4, 5, 6, 7]);
        assert!(result.errors[0].message.contains("invalid date"));
        assert!(result.errors[1].message.contains("unknown stage 'Click'"));
        assert!(result.errors[2].message.contains("invalid count '-4'"));
        assert!(result.errors[4].message.contains("funnel_id"));
        assert!(result.errors.iter().all(|e| e.source == "events.csv"));
    }

    #[test]
    fn test_parse_events_csv_skips_blank_rows() {
        let input = "date,funnel_id,stage,count\n2024-03-01,checkout,click,5\n,,,\n";
        let result = parse_events_csv(input.as_bytes(), "events.csv").unwrap();

        assert_eq!(result.records.len(), 1);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_parse_changes_csv() {
        let input = "\
date,funnel_id,category,description,severity,affected_stages
2024-03-18,checkout,site,\"New landing page, v2\",4,landing | lead
2024-03-19,*,external,Bank holiday,2,
2024-03-19,checkout,seo,Unknown category,2,
2024-03-19,checkout,ad,Too severe,6,
";
        let result = parse_changes_csv(input.as_bytes(), "changes.csv").unwrap();

        assert_eq!(result.records.len(), 2);
        let site = &result.records[0];
        assert_eq!(site.category, ChangeCategory::Site);
        assert_eq!(site.description, "New landing page, v2");
        assert_eq!(site.affected_stages, vec!["landing", "lead"]);
        assert_eq!(result.records[1].funnel_id, "*");
        assert!(result.records[1].affected_stages.is_empty());

        assert_eq!(result.errors.len(), 2);
        assert_eq!(result.errors[0].line, 4);
        assert!(result.errors[0].message.contains("unknown category 'seo'"));
        assert!(result.errors[1].message.contains("out of range"));
    }

    #[test]
    fn test_parse_events_json() {
        let input = r#"[
            {"date": "2024-03-01", "funnelId": "checkout", "stage": "click", "count": 1200},
            {"date": "2024-03-01", "funnelId": "checkout", "stage": "unknown", "count": 1},
            {"date": "2024-03-01", "funnelId": "checkout", "stage": "lead", "count": -1},
            {"date": "2024-03-01", "funnelId": "", "stage": "lead", "count": 1}
        ]"#;
        let result = parse_events_json(input, "events.json").unwrap();

        assert_eq!(result.records.len(), 1);
        let numbers: Vec<u64> = result.errors.iter().map(|e| e.line).collect();
        assert_eq!(numbers, vec![2, 3, 4]);
    }

    #[test]
    fn test_parse_changes_json() {
        let input = r#"[
            {"date": "2024-03-18", "funnelId": "checkout", "category": "pricing",
             "description": "Raised prices", "severity": 5, "affectedStages": ["purchase"]},
            {"date": "2024-03-18", "funnelId": "checkout", "category": "pricing",
             "description": "Zero severity", "severity": 0}
        ]"#;
        let result = parse_changes_json(input, "changes.json").unwrap();

        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].affected_stages, vec!["purchase"]);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].line, 2);
    }

    #[test]
    fn test_json_and_csv_reject_the_same_dates() {
        let json = r#"[
            {"date": "2024-3-1", "funnelId": "checkout", "stage": "click", "count": 5},
            {"date": "2024-03-01T00:00:00", "funnelId": "checkout", "stage": "click", "count": 5}
        ]"#;
        let csv = "date,funnel_id,stage,count\n2024-3-1,checkout,click,5\n";

        let from_json = parse_events_json(json, "events.json").unwrap();
        let from_csv = parse_events_csv(csv.as_bytes(), "events.csv").unwrap();

        assert!(from_json.records.is_empty());
        assert_eq!(from_json.errors.len(), 2);
        assert!(from_json.errors[0].message.contains("invalid date '2024-3-1'"));
        assert!(from_csv.records.is_empty());
        assert_eq!(from_csv.errors.len(), 1);
    }

    #[test]
    fn test_json_normalizes_like_csv() {
        let events = r#"[
            {"date": "2024-03-01", "funnelId": " checkout ", "stage": "click", "count": 5, "source": ""}
        ]"#;
        let changes = r#"[
            {"date": "2024-3-18", "funnelId": "checkout", "category": "site",
             "description": "Bad date", "severity": 3},
            {"date": "2024-03-18", "funnelId": "checkout", "category": "site",
             "description": " Redesign ", "severity": 3, "affectedStages": [" landing ", ""]}
        ]"#;

        let events = parse_events_json(events, "events.json").unwrap();
        assert_eq!(events.records[0].source, None);
        assert_eq!(events.records[0].funnel_id, "checkout");

        let changes = parse_changes_json(changes, "changes.json").unwrap();
        assert_eq!(changes.errors.len(), 1);
        assert_eq!(changes.errors[0].line, 1);
        assert_eq!(changes.records[0].description, "Redesign");
        assert_eq!(changes.records[0].affected_stages, vec!["landing"]);
    }

    #[test]
    fn test_parse_json_not_an_array_is_fatal() {
        let err = parse_events_json("{\"date\": 1}", "events.json").unwrap_err();
        assert!(matches!(err, IngestError::Json { .. }));
    }

    #[test]
    fn test_load_events_missing_file_is_fatal() {
        let err = load_events(Path::new("/nonexistent/events.csv")).unwrap_err();
        assert!(matches!(err, IngestError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/events.csv"));
    }

    #[test]
    fn test_load_dispatches_on_extension() {
        let dir = TempDir::new().unwrap();
        let csv_path = dir.path().join("events.csv");
        std::fs::write(&csv_path, EVENTS_CSV).unwrap();
        let json_path = dir.path().join("events.JSON");
        let mut file = File::create(&json_path).unwrap();
        writeln!(
            file,
            r#"[{{"date": "2024-03-01", "funnelId": "checkout", "stage": "click", "count": 3}}]"#
        )
        .unwrap();

        assert_eq!(load_events(&csv_path).unwrap().records.len(), 3);
        assert_eq!(load_events(&json_path).unwrap().records.len(), 1);
    }

    #[test]
    fn test_input_format_from_path() {
        assert_eq!(InputFormat::from_path(Path::new("a.json")), InputFormat::Json);
        assert_eq!(InputFormat::from_path(Path::new("a.csv")), InputFormat::Csv);
        assert_eq!(InputFormat::from_path(Path::new("a")), InputFormat::Csv);
    }
}
