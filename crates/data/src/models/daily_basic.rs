//! Daily fundamental metrics and market-cap bucketing.

use aflow_core::TradeDated;
use serde::{Deserialize, Serialize};

/// Float-market-cap bucket breakpoints in 100-million CNY.
const CAP_BREAKPOINTS: [(f64, &str); 6] = [
    (20.0, "0-20"),
    (50.0, "20-50"),
    (100.0, "50-100"),
    (500.0, "100-500"),
    (1000.0, "500-1000"),
    (10000.0, "1000-10000"),
];

/// Buckets a float market cap (in 10-thousand CNY, as published) into its
/// peer-group label. Labels are in 100-million CNY.
///
/// Recomputed on every run from the latest fundamentals; never persisted
/// apart from the row it was derived from.
#[must_use]
pub fn cap_bucket(circ_mv: f64) -> &'static str {
    let yi = circ_mv / 10_000.0;
    for (limit, label) in CAP_BREAKPOINTS {
        if yi <= limit {
            return label;
        }
    }
    ">10000"
}

/// One stock's daily fundamental snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DailyBasicRecord {
    pub ts_code: String,
    pub trade_date: String,
    pub close: Option<f64>,
    pub turnover_rate: Option<f64>,
    pub turnover_rate_f: Option<f64>,
    pub volume_ratio: Option<f64>,
    pub pe: Option<f64>,
    pub pe_ttm: Option<f64>,
    pub pb: Option<f64>,
    pub ps: Option<f64>,
    pub ps_ttm: Option<f64>,
    pub dv_ratio: Option<f64>,
    pub dv_ttm: Option<f64>,
    pub total_share: Option<f64>,
    pub float_share: Option<f64>,
    pub free_share: Option<f64>,
    pub total_mv: Option<f64>,
    /// Float market cap in 10-thousand CNY
    pub circ_mv: Option<f64>,
    /// Peer-group label derived from circ_mv at ingest time
    pub circ_mv_range: Option<String>,
}

impl TradeDated for DailyBasicRecord {
    fn trade_date(&self) -> &str {
        &self.trade_date
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buckets_follow_breakpoints() {
        // circ_mv is in 10-thousand CNY: 15亿 = 150_000万
        assert_eq!(cap_bucket(150_000.0), "0-20");
        assert_eq!(cap_bucket(200_000.0), "0-20");
        assert_eq!(cap_bucket(200_001.0), "20-50");
        assert_eq!(cap_bucket(800_000.0), "50-100");
        assert_eq!(cap_bucket(4_000_000.0), "100-500");
        assert_eq!(cap_bucket(9_000_000.0), "500-1000");
        assert_eq!(cap_bucket(50_000_000.0), "1000-10000");
        assert_eq!(cap_bucket(200_000_000.0), ">10000");
    }
}
