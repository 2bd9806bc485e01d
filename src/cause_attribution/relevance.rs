// Category relevance of a change for a given funnel transition
//
// A fixed 6 x 4 table: how plausible it is that a change of each category
// moves the conversion rate of each adjacent stage pair. Ad changes hit the
// top of the funnel, pricing hits the purchase step, site changes hit
// everything after the click.

use crate::model::{ChangeCategory, Stage};

/// Relevance used for a transition that is not in the table
pub const DEFAULT_RELEVANCE: f64 = 0.3;

/// Columns of the table, in pipeline order
pub const TABLE_TRANSITIONS: [(Stage, Stage); 4] = [
    (Stage::Impression, Stage::Click),
    (Stage::Click, Stage::Landing),
    (Stage::Landing, Stage::Lead),
    (Stage::Lead, Stage::Purchase),
];

/// Rows follow `ChangeCategory::ALL`, columns follow `TABLE_TRANSITIONS`
const RELEVANCE_TABLE: [[f64; 4]; 6] = [
    // impression->click, click->landing, landing->lead, lead->purchase
    [0.95, 0.40, 0.20, 0.10], // ad
    [0.10, 0.90, 0.85, 0.70], // site
    [0.60, 0.50, 0.50, 0.50], // external
    [0.70, 0.80, 0.80, 0.80], // tracking
    [0.10, 0.20, 0.60, 0.95], // pricing
    [0.85, 0.50, 0.60, 0.50], // audience
];

fn row(category: ChangeCategory) -> usize {
    match category {
        ChangeCategory::Ad => 0,
        ChangeCategory::Site => 1,
        ChangeCategory::External => 2,
        ChangeCategory::Tracking => 3,
        ChangeCategory::Pricing => 4,
        ChangeCategory::Audience => 5,
    }
}

/// Relevance in [0, 1] of `category` for the `from -> to` transition
pub fn category_relevance(category: ChangeCategory, from: Stage, to: Stage) -> f64 {
    TABLE_TRANSITIONS
        .iter()
        .position(|&(f, t)| f == from && t == to)
        .map(|column| RELEVANCE_TABLE[row(category)][column])
        .unwrap_or(DEFAULT_RELEVANCE)
}
