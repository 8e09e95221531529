//! Per-stock capital-flow data model.
//!
//! Buy/sell amounts are split by order-size tier (extra-large, large,
//! medium, small), all in 10-thousand CNY as published upstream.

use aflow_core::TradeDated;
use serde::{Deserialize, Serialize};

/// One stock's capital flow for one trading day.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MoneyflowRecord {
    /// Instrument code, e.g. "000001.SZ"
    pub ts_code: String,
    /// Trading date in YYYYMMDD form
    pub trade_date: String,
    pub buy_sm_amount: Option<f64>,
    pub sell_sm_amount: Option<f64>,
    pub buy_md_amount: Option<f64>,
    pub sell_md_amount: Option<f64>,
    pub buy_lg_amount: Option<f64>,
    pub sell_lg_amount: Option<f64>,
    pub buy_elg_amount: Option<f64>,
    pub sell_elg_amount: Option<f64>,
    /// Net inflow across all tiers
    pub net_mf_amount: Option<f64>,
}

impl MoneyflowRecord {
    /// Net extra-large order inflow (buy minus sell).
    #[must_use]
    pub fn net_elg(&self) -> f64 {
        self.buy_elg_amount.unwrap_or(0.0) - self.sell_elg_amount.unwrap_or(0.0)
    }

    /// Net large order inflow.
    #[must_use]
    pub fn net_lg(&self) -> f64 {
        self.buy_lg_amount.unwrap_or(0.0) - self.sell_lg_amount.unwrap_or(0.0)
    }

    /// Net medium order inflow.
    #[must_use]
    pub fn net_md(&self) -> f64 {
        self.buy_md_amount.unwrap_or(0.0) - self.sell_md_amount.unwrap_or(0.0)
    }

    /// Net small order inflow.
    #[must_use]
    pub fn net_sm(&self) -> f64 {
        self.buy_sm_amount.unwrap_or(0.0) - self.sell_sm_amount.unwrap_or(0.0)
    }
}

impl TradeDated for MoneyflowRecord {
    fn trade_date(&self) -> &str {
        &self.trade_date
    }
}
