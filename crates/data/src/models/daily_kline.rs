//! Daily OHLCV bar for one stock.

use aflow_core::TradeDated;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DailyKlineRecord {
    pub ts_code: String,
    pub trade_date: String,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub pre_close: Option<f64>,
    pub change: Option<f64>,
    pub pct_chg: Option<f64>,
    /// Volume in lots
    pub vol: Option<f64>,
    /// Traded value in thousand CNY
    pub amount: Option<f64>,
}

impl TradeDated for DailyKlineRecord {
    fn trade_date(&self) -> &str {
        &self.trade_date
    }
}
