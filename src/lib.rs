//! Funnelscope - conversion funnel regression diagnosis
//!
//! Aggregates daily funnel stage events into per-day conversion rates,
//! flags statistically significant sustained drops in stage-to-stage
//! conversion, and ranks recorded external changes (ad, site, pricing,
//! tracking, audience, external) as candidate causes for each drop.

pub mod break_detection;
pub mod cause_attribution;
pub mod cli;
pub mod clock;
pub mod config;
pub mod csv_output;
pub mod funnel_analyzer;
pub mod ingest;
pub mod json_output;
pub mod model;
pub mod pipeline;
pub mod text_output;
pub mod time_utils;
