//! Watch-list entries for the trend monitor.
//!
//! Rows come from an offline SuperTrend parameter sweep over the stored
//! 30-minute bars; the monitor only reads them.

use serde::{Deserialize, Serialize};

/// Best per-instrument SuperTrend parameters with backtest quality metrics.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct WatchItemRecord {
    pub ts_code: String,
    /// SuperTrend ATR length
    pub period: i32,
    /// SuperTrend band multiplier
    pub multiplier: f64,
    pub sharpe: Option<f64>,
    pub sortino: Option<f64>,
    pub win_rate: Option<f64>,
    pub profit_factor: Option<f64>,
}
