//! Polling trend monitor.
//!
//! Each tick re-pulls fresh bars for the watch list, recomputes the study per
//! instrument across a fixed-size worker pool, and pushes a notification for
//! every new flip. The ledger's conditional insert makes re-polling the same
//! signal a no-op, so a flip notifies at most once no matter how many ticks
//! observe it.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Local};
use futures_util::stream::{self, StreamExt};
use rust_decimal::prelude::ToPrimitive;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

use aflow_core::{NotificationChannel, WatcherConfig};
use aflow_data::{IntradayBarRecord, NotificationRepository, WatchItemRecord, WatchlistRepository};
use aflow_provider::TushareClient;

use crate::indicator::{ha_supertrend, OhlcBar};
use crate::signal::{detect_flip, TrendSignal};

/// Calendar days of bars pulled when refreshing an instrument.
const BAR_FETCH_DAYS: i64 = 30;

/// Source of fresh intraday bars for the monitor.
#[async_trait]
pub trait IntradayQuoteSource: Send + Sync {
    /// Returns up to `lookback` most recent bars, ascending by time.
    async fn latest_bars(
        &self,
        ts_code: &str,
        freq: &str,
        lookback: usize,
    ) -> Result<Vec<IntradayBarRecord>>;
}

#[async_trait]
impl IntradayQuoteSource for TushareClient {
    async fn latest_bars(
        &self,
        ts_code: &str,
        freq: &str,
        lookback: usize,
    ) -> Result<Vec<IntradayBarRecord>> {
        let end = Local::now().naive_local();
        let start = end - ChronoDuration::days(BAR_FETCH_DAYS);
        let mut bars = self
            .intraday_kline(
                ts_code,
                freq,
                &start.format("%Y-%m-%d %H:%M:%S").to_string(),
                &end.format("%Y-%m-%d %H:%M:%S").to_string(),
            )
            .await?;
        bars.sort_by_key(|b| b.trade_time);
        if bars.len() > lookback {
            bars.drain(..bars.len() - lookback);
        }
        Ok(bars)
    }
}

/// Watches the tuned instrument basket for trend flips.
pub struct TrendMonitor {
    quotes: Arc<dyn IntradayQuoteSource>,
    watchlist: WatchlistRepository,
    ledger: NotificationRepository,
    notifier: Arc<dyn NotificationChannel>,
    config: WatcherConfig,
}

impl TrendMonitor {
    /// Creates a monitor over the given collaborators.
    #[must_use]
    pub fn new(
        quotes: Arc<dyn IntradayQuoteSource>,
        watchlist: WatchlistRepository,
        ledger: NotificationRepository,
        notifier: Arc<dyn NotificationChannel>,
        config: WatcherConfig,
    ) -> Self {
        Self {
            quotes,
            watchlist,
            ledger,
            notifier,
            config,
        }
    }

    /// Polls forever. A failed tick is logged; the loop keeps going.
    pub async fn run(&self) {
        info!(
            "Trend monitor polling every {}s across {} workers",
            self.config.poll_interval_secs, self.config.workers
        );
        loop {
            if let Err(e) = self.tick().await {
                error!("Monitor tick failed: {e:#}");
            }
            tokio::time::sleep(Duration::from_secs(self.config.poll_interval_secs)).await;
        }
    }

    /// Runs one polling tick over the whole watch list.
    ///
    /// # Errors
    /// Returns an error if the watch list cannot be read. Per-instrument
    /// failures are logged and skipped.
    pub async fn tick(&self) -> Result<()> {
        let watch = self.watchlist.top_by_sortino(self.config.top_n).await?;
        debug!("tick over {} instruments", watch.len());

        let emitted: usize = stream::iter(watch)
            .map(|item| async move {
                match self.process(&item).await {
                    Ok(Some(_)) => 1usize,
                    Ok(None) => 0,
                    Err(e) => {
                        error!("{} failed: {e:#}", item.ts_code);
                        0
                    }
                }
            })
            .buffer_unordered(self.config.workers.max(1))
            .fold(0, |acc, n| async move { acc + n })
            .await;

        if emitted > 0 {
            info!("emitted {emitted} signals this tick");
        }
        Ok(())
    }

    /// Recomputes one instrument's study and notifies on a fresh flip.
    async fn process(&self, item: &WatchItemRecord) -> Result<Option<TrendSignal>> {
        let bars = self
            .quotes
            .latest_bars(&item.ts_code, &self.config.bar_freq, self.config.lookback_bars)
            .await?;

        let ohlc: Vec<OhlcBar> = bars
            .iter()
            .map(|b| OhlcBar {
                open: b.open.to_f64().unwrap_or_default(),
                high: b.high.to_f64().unwrap_or_default(),
                low: b.low.to_f64().unwrap_or_default(),
                close: b.close.to_f64().unwrap_or_default(),
            })
            .collect();

        let Some(study) = ha_supertrend(&ohlc, item.period.max(1) as usize, item.multiplier)
        else {
            debug!("{}: not enough bars for the study", item.ts_code);
            return Ok(None);
        };
        let Some(signal) = detect_flip(&study.direction) else {
            return Ok(None);
        };

        let Some(last_bar) = bars.last() else {
            return Ok(None);
        };

        // Claim the (time, instrument) pair before notifying; losing the
        // claim means another tick or worker already handled this flip.
        if !self
            .ledger
            .record_if_new(last_bar.trade_time, &item.ts_code)
            .await?
        {
            return Ok(None);
        }

        let subject = format!("{} - {} signal", item.ts_code, signal.as_str());
        let content = format!(
            "signal: {}\ncode: {}\ntime: {}\nprice: {}\nsortino: {:.2}\nwin rate: {:.2}\nprofit factor: {:.2}",
            signal.as_str(),
            item.ts_code,
            last_bar.trade_time,
            last_bar.close,
            item.sortino.unwrap_or_default(),
            item.win_rate.unwrap_or_default(),
            item.profit_factor.unwrap_or_default(),
        );
        if let Err(e) = self.notifier.send(&subject, &content).await {
            error!("notification failed for {}: {e:#}", item.ts_code);
        }
        info!("{} {} at {}", item.ts_code, signal.as_str(), last_bar.trade_time);
        Ok(Some(signal))
    }
}
