//! Industry-level capital-flow data model.

use aflow_core::TradeDated;
use serde::{Deserialize, Serialize};

/// One industry's aggregate capital flow for one trading day.
///
/// Net amounts are in 100-million CNY as published upstream.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct IndustryFlowRecord {
    pub trade_date: String,
    /// Industry classification code; published upstream under `ts_code`
    #[serde(alias = "ts_code")]
    pub industry_code: String,
    pub industry: String,
    pub company_num: Option<i32>,
    pub pct_change: Option<f64>,
    pub net_buy_amount: Option<f64>,
    pub net_sell_amount: Option<f64>,
    pub net_amount: Option<f64>,
}

impl TradeDated for IndustryFlowRecord {
    fn trade_date(&self) -> &str {
        &self.trade_date
    }
}
