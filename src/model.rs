//! Funnel domain model: stages, change categories, and the input facts
//!
//! Events and changes are immutable run inputs. Everything derived from them
//! (snapshots, rates, breaks, diagnoses) lives in the analyzer modules and is
//! recomputed on every run.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Funnel id on a change that applies to every funnel
pub const WILDCARD_FUNNEL: &str = "*";

/// Error for a token that is not one of the enumerated lowercase names
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind} '{token}' (expected one of: {expected})")]
pub struct UnknownToken {
    pub kind: &'static str,
    pub token: String,
    pub expected: &'static str,
}

/// One step of the user journey
///
/// Variant order is pipeline order, so the derived `Ord` sorts stages the
/// way the funnel flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Impression,
    Click,
    Landing,
    Lead,
    Purchase,
}

impl Stage {
    /// Number of stages in the pipeline
    pub const COUNT: usize = 5;

    /// Stages in pipeline order. Adding a stage means touching this list,
    /// `index` and `as_str`.
    pub const PIPELINE: [Stage; Stage::COUNT] = [
        Stage::Impression,
        Stage::Click,
        Stage::Landing,
        Stage::Lead,
        Stage::Purchase,
    ];

    /// Position of the stage in `PIPELINE`
    pub fn index(self) -> usize {
        match self {
            Stage::Impression => 0,
            Stage::Click => 1,
            Stage::Landing => 2,
            Stage::Lead => 3,
            Stage::Purchase => 4,
        }
    }

    /// Lowercase wire token
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Impression => "impression",
            Stage::Click => "click",
            Stage::Landing => "landing",
            Stage::Lead => "lead",
            Stage::Purchase => "purchase",
        }
    }

    /// Adjacent (from, to) pairs in pipeline order
    pub fn transitions() -> impl Iterator<Item = (Stage, Stage)> {
        (1..Self::COUNT).map(|i| (Self::PIPELINE[i - 1], Self::PIPELINE[i]))
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = UnknownToken;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::PIPELINE
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| UnknownToken {
                kind: "stage",
                token: s.to_string(),
                expected: "impression, click, landing, lead, purchase",
            })
    }
}

/// Kind of externally recorded change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeCategory {
    Ad,
    Site,
    External,
    Tracking,
    Pricing,
    Audience,
}

impl ChangeCategory {
    pub const ALL: [ChangeCategory; 6] = [
        ChangeCategory::Ad,
        ChangeCategory::Site,
        ChangeCategory::External,
        ChangeCategory::Tracking,
        ChangeCategory::Pricing,
        ChangeCategory::Audience,
    ];

    /// Lowercase wire token
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeCategory::Ad => "ad",
            ChangeCategory::Site => "site",
            ChangeCategory::External => "external",
            ChangeCategory::Tracking => "tracking",
            ChangeCategory::Pricing => "pricing",
            ChangeCategory::Audience => "audience",
        }
    }
}

impl fmt::Display for ChangeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeCategory {
    type Err = UnknownToken;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChangeCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| UnknownToken {
                kind: "category",
                token: s.to_string(),
                expected: "ad, site, external, tracking, pricing, audience",
            })
    }
}

/// Count of users observed at one stage of one funnel on one day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub date: NaiveDate,
    pub funnel_id: String,
    pub stage: Stage,
    pub count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Externally recorded change that may explain a conversion drop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Change {
    pub date: NaiveDate,
    /// Target funnel, or `"*"` for all funnels
    pub funnel_id: String,
    pub category: ChangeCategory,
    pub description: String,
    /// 1 (cosmetic) to 5 (major)
    pub severity: u8,
    /// Stage names touched by the change; names are kept verbatim and
    /// unknown ones simply never match
    #[serde(default)]
    pub affected_stages: Vec<String>,
}

impl Change {
    /// True when the change targets `funnel_id` directly or through the wildcard
    pub fn applies_to(&self, funnel_id: &str) -> bool {
        self.funnel_id == funnel_id || self.funnel_id == WILDCARD_FUNNEL
    }

    /// True when any affected stage names `from` or `to`
    pub fn touches_transition(&self, from: Stage, to: Stage) -> bool {
        self.affected_stages
            .iter()
            .any(|name| name == from.as_str() || name == to.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_index_matches_pipeline_position() {
        for (position, stage) in Stage::PIPELINE.iter().enumerate() {
            assert_eq!(stage.index(), position);
        }
    }

    #[test]
    fn test_stage_transitions_in_order() {
        let transitions: Vec<_> = Stage::transitions().collect();
        assert_eq!(
            transitions,
            vec![
                (Stage::Impression, Stage::Click),
                (Stage::Click, Stage::Landing),
                (Stage::Landing, Stage::Lead),
                (Stage::Lead, Stage::Purchase),
            ]
        );
    }

    #[test]
    fn test_stage_tokens_round_trip() {
        for stage in Stage::PIPELINE {
            assert_eq!(stage.as_str().parse::<Stage>().unwrap(), stage);
            assert_eq!(
                serde_json::to_string(&stage).unwrap(),
                format!("\"{}\"", stage.as_str())
            );
        }
    }

    #[test]
    fn test_stage_rejects_uppercase() {
        let err = "Click".parse::<Stage>().unwrap_err();
        assert_eq!(err.kind, "stage");
        assert!(err.to_string().contains("Click"));
    }

    #[test]
    fn test_category_tokens() {
        let tokens: Vec<_> = ChangeCategory::ALL.iter().map(|c| c.as_str()).collect();
        assert_eq!(
            tokens,
            vec!["ad", "site", "external", "tracking", "pricing", "audience"]
        );
        assert_eq!(
            serde_json::to_string(&ChangeCategory::Pricing).unwrap(),
            "\"pricing\""
        );
        assert!("SITE".parse::<ChangeCategory>().is_err());
    }

    #[test]
    fn test_change_applies_to_wildcard() {
        let change = Change {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            funnel_id: WILDCARD_FUNNEL.to_string(),
            category: ChangeCategory::External,
            description: "holiday".to_string(),
            severity: 2,
            affected_stages: vec![],
        };
        assert!(change.applies_to("checkout"));
        assert!(change.applies_to("signup"));
    }

    #[test]
    fn test_change_touches_transition() {
        let change = Change {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            funnel_id: "checkout".to_string(),
            category: ChangeCategory::Site,
            description: "new landing page".to_string(),
            severity: 4,
            affected_stages: vec!["landing".to_string()],
        };
        assert!(change.touches_transition(Stage::Click, Stage::Landing));
        assert!(change.touches_transition(Stage::Landing, Stage::Lead));
        assert!(!change.touches_transition(Stage::Impression, Stage::Click));
    }

    #[test]
    fn test_event_json_field_names() {
        let event = Event {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            funnel_id: "checkout".to_string(),
            stage: Stage::Lead,
            count: 12,
            source: None,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["funnelId"], "checkout");
        assert_eq!(json["date"], "2024-03-01");
        assert_eq!(json["stage"], "lead");
        assert!(json.get("source").is_none());
    }
}
