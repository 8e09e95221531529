//! Whole-window polling against an eventually-consistent upstream.
//!
//! The upstream publishes the anchor day's rows asynchronously some time
//! after market close. Each attempt re-fetches the entire window; an attempt
//! succeeds only once the anchor day produced rows. Transport errors are not
//! what this loop is for — they propagate immediately.

use anyhow::Result;
use std::future::Future;
use std::time::Duration;
use tracing::{error, info, warn};

use aflow_core::{Clock, TradeDated};

/// Bounded sleep-and-retry fetcher over a trading-date window.
pub struct RetryingFetcher<'a> {
    max_retries: u32,
    wait: Duration,
    clock: &'a dyn Clock,
}

impl<'a> RetryingFetcher<'a> {
    /// Creates a fetcher with the given retry budget.
    #[must_use]
    pub fn new(max_retries: u32, wait_seconds: u64, clock: &'a dyn Clock) -> Self {
        Self {
            max_retries,
            wait: Duration::from_secs(wait_seconds),
            clock,
        }
    }

    /// Polls `fetch` across the window until the anchor day has data.
    ///
    /// Empty per-day results are logged and skipped; only the whole-window
    /// attempt retries. On success the concatenated frame is sorted ascending
    /// by trade date. Returns `Ok(None)` once the retry budget is exhausted
    /// without anchor-day data — absence, not a fault.
    ///
    /// # Errors
    /// Propagates any per-day fetch error unchanged.
    pub async fn fetch_window<T, F, Fut>(
        &self,
        data_type: &str,
        anchor: &str,
        window: &[String],
        fetch: F,
    ) -> Result<Option<Vec<T>>>
    where
        T: TradeDated,
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<Vec<T>>>,
    {
        info!("fetching {data_type} for trading days {window:?}");

        for attempt in 1..=self.max_retries {
            let mut frames: Vec<Vec<T>> = Vec::new();
            let mut has_anchor = false;

            for date in window {
                let rows = fetch(date.clone()).await?;
                if rows.is_empty() {
                    warn!("{data_type} returned no rows for {date}");
                    continue;
                }
                if date.as_str() == anchor {
                    has_anchor = true;
                }
                frames.push(rows);
            }

            if has_anchor {
                let mut all: Vec<T> = frames.into_iter().flatten().collect();
                all.sort_by(|a, b| a.trade_date().cmp(b.trade_date()));
                return Ok(Some(all));
            }

            warn!(
                "{data_type} not yet published for {anchor}; attempt {attempt}/{}, waiting {}s",
                self.max_retries,
                self.wait.as_secs()
            );
            self.clock.sleep(self.wait).await;
        }

        error!(
            "no {data_type} for {anchor} after {} attempts",
            self.max_retries
        );
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    struct CountingClock {
        sleeps: AtomicU32,
    }

    #[async_trait]
    impl Clock for CountingClock {
        async fn sleep(&self, _duration: Duration) {
            self.sleeps.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Row {
        trade_date: String,
        value: i32,
    }

    impl TradeDated for Row {
        fn trade_date(&self) -> &str {
            &self.trade_date
        }
    }

    fn row(date: &str, value: i32) -> Row {
        Row {
            trade_date: date.to_string(),
            value,
        }
    }

    #[tokio::test]
    async fn succeeds_once_anchor_day_publishes() {
        let clock = CountingClock {
            sleeps: AtomicU32::new(0),
        };
        let fetcher = RetryingFetcher::new(5, 600, &clock);
        let window = vec![
            "20250603".to_string(),
            "20250602".to_string(),
            "20250530".to_string(),
        ];
        let attempts = Arc::new(AtomicU32::new(0));

        let counter = attempts.clone();
        let result = fetcher
            .fetch_window("moneyflow", "20250603", &window, move |date| {
                let counter = counter.clone();
                async move {
                    if date == "20250602" || date == "20250530" {
                        return Ok(vec![row(&date, 1)]);
                    }
                    // Anchor day publishes on the third whole-window attempt.
                    let attempt = counter.fetch_add(1, Ordering::SeqCst) + 1;
                    if attempt >= 3 {
                        Ok(vec![row(&date, 2)])
                    } else {
                        Ok(Vec::new())
                    }
                }
            })
            .await
            .unwrap();

        let rows = result.expect("anchor day published within budget");
        // Two sleeps separate the three attempts.
        assert_eq!(clock.sleeps.load(Ordering::SeqCst), 2);
        // Concatenated frame is ascending by date with one row per fetched day.
        let dates: Vec<&str> = rows.iter().map(|r| r.trade_date()).collect();
        assert_eq!(dates, vec!["20250530", "20250602", "20250603"]);
        assert_eq!(rows.last().unwrap().value, 2);
    }

    #[tokio::test]
    async fn exhausts_after_max_retries_with_a_sleep_per_attempt() {
        let clock = CountingClock {
            sleeps: AtomicU32::new(0),
        };
        let fetcher = RetryingFetcher::new(4, 600, &clock);
        let window = vec!["20250603".to_string(), "20250602".to_string()];

        let result = fetcher
            .fetch_window("moneyflow", "20250603", &window, |date| async move {
                if date == "20250602" {
                    Ok(vec![row(&date, 1)])
                } else {
                    Ok(Vec::new())
                }
            })
            .await
            .unwrap();

        assert!(result.is_none());
        assert_eq!(clock.sleeps.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn transport_errors_propagate_instead_of_retrying() {
        let clock = CountingClock {
            sleeps: AtomicU32::new(0),
        };
        let fetcher = RetryingFetcher::new(5, 600, &clock);
        let window = vec!["20250603".to_string()];

        let result: Result<Option<Vec<Row>>> = fetcher
            .fetch_window("moneyflow", "20250603", &window, |_date| async move {
                Err(anyhow::anyhow!("connection reset"))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(clock.sleeps.load(Ordering::SeqCst), 0);
    }
}
