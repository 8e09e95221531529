//! Incremental 30-minute bar backfill.
//!
//! Resumes from the newest stored bar and walks the universe one instrument
//! at a time; a failed instrument is logged and skipped so the rest of the
//! universe still lands. The bar store feeds the offline SuperTrend parameter
//! sweep behind the watch list.

use anyhow::Result;
use chrono::Local;
use std::sync::Arc;
use tracing::{info, warn};

use aflow_data::{IntradayBarRecord, IntradayBarRepository};
use aflow_provider::TushareClient;

/// Start-of-history bound used when the bar table is empty.
const EPOCH_START: &str = "1990-01-01 00:00:00";

pub struct KlineBackfill {
    provider: Arc<TushareClient>,
    repo: IntradayBarRepository,
    freq: String,
}

impl KlineBackfill {
    /// Creates a backfill job for the given bar frequency.
    #[must_use]
    pub fn new(provider: Arc<TushareClient>, repo: IntradayBarRepository, freq: String) -> Self {
        Self {
            provider,
            repo,
            freq,
        }
    }

    /// Downloads new bars for every instrument in `universe` and upserts them.
    ///
    /// The window restarts at the newest stored bar time; overlap is absorbed
    /// by the first-write-wins upsert.
    ///
    /// # Returns
    /// The number of newly inserted bars.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read or written. Per-instrument
    /// download failures are logged, not fatal.
    pub async fn run(&self, universe: &[String]) -> Result<u64> {
        let start = match self.repo.latest_bar_time().await? {
            Some(latest) => latest.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => EPOCH_START.to_string(),
        };
        let end = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        info!(
            "backfilling {} bars for {} instruments from {start}",
            self.freq,
            universe.len()
        );

        let mut all_bars: Vec<IntradayBarRecord> = Vec::new();
        for ts_code in universe {
            match self
                .provider
                .intraday_kline(ts_code, &self.freq, &start, &end)
                .await
            {
                Ok(bars) if bars.is_empty() => {
                    info!("{ts_code} has no new bars");
                }
                Ok(mut bars) => {
                    all_bars.append(&mut bars);
                }
                Err(e) => {
                    warn!("failed to download {ts_code}: {e:#}");
                }
            }
        }

        let inserted = self.repo.upsert_batch(&all_bars).await?;
        info!(
            "downloaded {} bars, {} newly inserted",
            all_bars.len(),
            inserted
        );
        Ok(inserted)
    }
}
