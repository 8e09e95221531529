//! Trailing trading-day window.

use aflow_core::{PipelineError, TradingCalendar};
use aflow_scoring::lookback_start;

/// Calendar days looked back from the anchor when asking the oracle.
const CALENDAR_LOOKBACK_DAYS: i64 = 30;

/// Returns up to `n` trading dates ending at `anchor`, newest first.
///
/// Queries the calendar oracle over a 30-calendar-day lookback; if fewer than
/// `n` open days exist there, the short window is returned and callers must
/// tolerate it.
///
/// # Errors
/// Returns [`PipelineError::CalendarUnavailable`] if the oracle fails or the
/// anchor is not a valid YYYYMMDD date. Never retried here.
pub async fn latest_trade_dates(
    calendar: &dyn TradingCalendar,
    anchor: &str,
    n: usize,
) -> Result<Vec<String>, PipelineError> {
    let start = lookback_start(anchor, CALENDAR_LOOKBACK_DAYS)
        .map_err(|e| PipelineError::CalendarUnavailable(e.to_string()))?;

    let mut days = calendar
        .trading_days(&start, anchor)
        .await
        .map_err(|e| PipelineError::CalendarUnavailable(e.to_string()))?;

    days.sort_by(|a, b| b.cmp(a));
    days.dedup();
    days.truncate(n);
    Ok(days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;

    struct FakeCalendar {
        days: Vec<&'static str>,
        fail: bool,
    }

    #[async_trait]
    impl TradingCalendar for FakeCalendar {
        async fn is_open(&self, date: &str) -> Result<bool> {
            Ok(self.days.contains(&date))
        }

        async fn trading_days(&self, _start: &str, _end: &str) -> Result<Vec<String>> {
            if self.fail {
                return Err(anyhow!("oracle offline"));
            }
            Ok(self.days.iter().map(ToString::to_string).collect())
        }
    }

    #[tokio::test]
    async fn newest_n_days_descending() {
        let calendar = FakeCalendar {
            days: vec!["20250528", "20250530", "20250529", "20250603", "20250602"],
            fail: false,
        };

        let window = latest_trade_dates(&calendar, "20250603", 3).await.unwrap();
        assert_eq!(window, vec!["20250603", "20250602", "20250530"]);
    }

    #[tokio::test]
    async fn short_calendars_yield_short_windows() {
        let calendar = FakeCalendar {
            days: vec!["20250602", "20250603"],
            fail: false,
        };

        let window = latest_trade_dates(&calendar, "20250603", 5).await.unwrap();
        assert_eq!(window.len(), 2);
    }

    #[tokio::test]
    async fn oracle_failure_maps_to_calendar_unavailable() {
        let calendar = FakeCalendar {
            days: vec![],
            fail: true,
        };

        let err = latest_trade_dates(&calendar, "20250603", 3)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::CalendarUnavailable(_)));
    }
}
