// Integration test utilities
//
// Builders for funnel event and change-log fixtures, as CSV text and as
// files in a temporary directory.

#![allow(dead_code)]

use chrono::{Days, NaiveDate};
use std::fmt::Write;
use std::path::PathBuf;
use tempfile::TempDir;

pub const EVENTS_HEADER: &str = "date,funnel_id,stage,count,source";
pub const CHANGES_HEADER: &str = "date,funnel_id,category,description,severity,affected_stages";

/// First day of every generated series
pub fn day(offset: u64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .checked_add_days(Days::new(offset))
        .unwrap()
}

/// Daily impression/click/landing rows for one funnel, one day per landing count
pub fn events_csv_rows(funnel: &str, landings: &[u64]) -> String {
    let mut rows = String::new();
    for (offset, landing) in landings.iter().enumerate() {
        let date = day(offset as u64);
        writeln!(rows, "{},{},impression,10000,google", date, funnel).unwrap();
        writeln!(rows, "{},{},click,1200,google", date, funnel).unwrap();
        writeln!(rows, "{},{},landing,{},", date, funnel, landing).unwrap();
    }
    rows
}

/// 18 healthy days at 900 landings, then 5 broken days at 400
pub fn broken_landings() -> Vec<u64> {
    let mut landings = vec![900; 18];
    landings.extend([400; 5]);
    landings
}

/// 23 healthy days
pub fn steady_landings() -> Vec<u64> {
    (0..23).map(|i| 890 + (i % 3) * 10).collect()
}

/// Noisy baseline (780/900/1020) followed by a moderate drop to 660
///
/// Against a baseline standard deviation near 0.08 the drop stays below the
/// critical z-score, so the break is significant.
pub fn moderate_drop_landings() -> Vec<u64> {
    let mut landings: Vec<u64> = (0..18).map(|i| [780, 900, 1020][i % 3]).collect();
    landings.extend([660; 5]);
    landings
}

/// Events CSV with a critical break on `checkout` and a significant one on `signup`
pub fn mixed_severity_events_csv() -> String {
    format!(
        "{}\n{}{}",
        EVENTS_HEADER,
        events_csv_rows("checkout", &broken_landings()),
        events_csv_rows("signup", &moderate_drop_landings())
    )
}

/// Events CSV with the broken checkout funnel
pub fn broken_events_csv() -> String {
    format!(
        "{}\n{}",
        EVENTS_HEADER,
        events_csv_rows("checkout", &broken_landings())
    )
}

/// Change log with a same-day landing page redesign
pub fn site_change_csv() -> String {
    format!(
        "{}\n{},checkout,site,New landing page template,4,landing\n{},checkout,ad,Rotated ad creatives,2,\n",
        CHANGES_HEADER,
        day(20),
        day(17)
    )
}

/// Temporary directory holding fixture files
pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    /// Write a file into the fixture directory and return its path
    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }
}
