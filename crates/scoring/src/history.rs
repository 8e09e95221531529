//! Store-backed history access for percentile ranking.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use std::collections::HashMap;

/// Read-only access to per-instrument trailing history in the persisted
/// store. Implemented over the database in production and by in-memory fakes
/// in tests.
#[async_trait]
pub trait FlowHistoryStore: Send + Sync {
    /// Traded-value history as (ts_code, amount) pairs over
    /// `start < trade_date <= end`, for one chunk of instruments.
    async fn amount_history(
        &self,
        codes: &[String],
        start: &str,
        end: &str,
    ) -> Result<Vec<(String, f64)>>;

    /// Net-flow history as (ts_code, net_mf_amount) pairs over the same
    /// range, for one chunk of instruments.
    async fn net_flow_history(
        &self,
        codes: &[String],
        start: &str,
        end: &str,
    ) -> Result<Vec<(String, f64)>>;
}

/// Groups (code, value) pairs into per-code series, preserving order.
#[must_use]
pub fn group_by_code(rows: Vec<(String, f64)>) -> HashMap<String, Vec<f64>> {
    let mut grouped: HashMap<String, Vec<f64>> = HashMap::new();
    for (code, value) in rows {
        grouped.entry(code).or_default().push(value);
    }
    grouped
}

/// Returns the YYYYMMDD date `days` calendar days before `anchor`.
///
/// # Errors
/// Returns an error if `anchor` is not a valid YYYYMMDD date.
pub fn lookback_start(anchor: &str, days: i64) -> Result<String> {
    let date = NaiveDate::parse_from_str(anchor, "%Y%m%d")?;
    Ok((date - Duration::days(days)).format("%Y%m%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookback_crosses_year_boundaries() {
        assert_eq!(lookback_start("20250102", 30).unwrap(), "20241203");
        assert_eq!(lookback_start("20240301", 365).unwrap(), "20230302");
        assert!(lookback_start("2025-01-02", 30).is_err());
    }
}
