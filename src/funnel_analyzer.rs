//! Daily funnel snapshots and stage-to-stage conversion rates
//!
//! Raw events are aggregated into one snapshot per (funnel, day). Each
//! snapshot then yields the four sequential conversion rates that break
//! detection works on.

use crate::model::{Event, Stage};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Total count per stage for one funnel on one day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunnelSnapshot {
    pub funnel_id: String,
    pub date: NaiveDate,
    /// Indexed by `Stage::index`; 0 for stages with no events
    pub counts: [u64; Stage::COUNT],
}

impl FunnelSnapshot {
    pub fn count(&self, stage: Stage) -> u64 {
        self.counts[stage.index()]
    }
}

/// Conversion from one stage to the next
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageConversion {
    pub from_stage: Stage,
    pub to_stage: Stage,
    /// `to_count / from_count`, or 0 when `from_count` is 0
    pub rate: f64,
    pub from_count: u64,
    pub to_count: u64,
}

/// All adjacent-stage conversions of one snapshot, in pipeline order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionRates {
    pub funnel_id: String,
    pub date: NaiveDate,
    pub transitions: Vec<StageConversion>,
}

impl ConversionRates {
    /// Rate for a given transition, if present
    pub fn rate(&self, from: Stage, to: Stage) -> Option<f64> {
        self.transitions
            .iter()
            .find(|t| t.from_stage == from && t.to_stage == to)
            .map(|t| t.rate)
    }
}

/// Aggregate events into one snapshot per (funnel, date)
///
/// Events sharing a (funnel, date, stage) key are summed, so several sources
/// reporting the same stage-day all count. Output is sorted by funnel id,
/// then date.
pub fn build_snapshots(events: &[Event]) -> Vec<FunnelSnapshot> {
    let mut grouped: BTreeMap<(&str, NaiveDate), [u64; Stage::COUNT]> = BTreeMap::new();

    for event in events {
        let counts = grouped
            .entry((event.funnel_id.as_str(), event.date))
            .or_insert([0; Stage::COUNT]);
        counts[event.stage.index()] = counts[event.stage.index()].saturating_add(event.count);
    }

    grouped
        .into_iter()
        .map(|((funnel_id, date), counts)| FunnelSnapshot {
            funnel_id: funnel_id.to_string(),
            date,
            counts,
        })
        .collect()
}

/// Compute the sequential conversion rates for every snapshot
///
/// One `ConversionRates` per input snapshot, in input order.
pub fn calculate_conversion_rates(snapshots: &[FunnelSnapshot]) -> Vec<ConversionRates> {
    snapshots
        .iter()
        .map(|snapshot| ConversionRates {
            funnel_id: snapshot.funnel_id.clone(),
            date: snapshot.date,
            transitions: Stage::transitions()
                .map(|(from, to)| {
                    let from_count = snapshot.count(from);
                    let to_count = snapshot.count(to);
                    StageConversion {
                        from_stage: from,
                        to_stage: to,
                        rate: conversion_rate(from_count, to_count),
                        from_count,
                        to_count,
                    }
                })
                .collect(),
        })
        .collect()
}

/// Divide-by-zero guard: an empty upstream stage reports a rate of 0
fn conversion_rate(from_count: u64, to_count: u64) -> f64 {
    if from_count == 0 {
        0.0
    } else {
        to_count as f64 / from_count as f64
    }
}
