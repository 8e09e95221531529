//! Derived scoring result rows.
//!
//! A new run for the same (key, date) overwrites via upsert; rows are never
//! amended in place by the pipeline.

use serde::{Deserialize, Serialize};

/// Cross-sectional money-flow score for one stock on one trading day.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StockScoreRecord {
    pub trade_date: String,
    pub ts_code: String,
    /// Trading days aggregated into this score
    pub window_days: i32,
    pub rank: i32,
    /// Peer group the normalizations ran within
    pub cap_bucket: String,
    /// Extra-large net flow over float cap, percent
    pub elg_ratio: f64,
    pub elg_score: f64,
    pub lg_ratio: f64,
    pub lg_score: f64,
    pub md_ratio: f64,
    pub md_score: f64,
    pub sm_ratio: f64,
    pub sm_score: f64,
    pub turnover_mean: f64,
    pub turnover_score: f64,
    pub volume_ratio_mean: f64,
    pub volume_ratio_score: f64,
    /// Percentile of recent traded value vs. own 365-day history
    pub amount_percentile: f64,
    /// Percentile of recent net flow vs. own 365-day history
    pub net_flow_percentile: f64,
    pub composite: f64,
}

/// Percentile ranking of one industry's net flow on one trading day.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct IndustryScoreRecord {
    pub trade_date: String,
    pub industry_code: String,
    pub industry: String,
    pub rank: i32,
    /// Net amount in 100-million CNY
    pub net_amount: f64,
    /// Percentile of the current day vs. own 365-day history
    pub net_amount_percentile: f64,
    /// Percentile of the value k days before the anchor vs. all history
    pub d1_percentile: f64,
    pub d2_percentile: f64,
    pub d3_percentile: f64,
    pub d4_percentile: f64,
    pub d5_percentile: f64,
}
