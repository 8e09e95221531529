//! Watch-list repository for the trend monitor.

use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::models::WatchItemRecord;

/// Read-only access to the SuperTrend parameter sweep results.
#[derive(Debug, Clone)]
pub struct WatchlistRepository {
    pool: PgPool,
}

impl WatchlistRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns the top `n` instruments by sortino ratio, with their tuned
    /// SuperTrend parameters.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn top_by_sortino(&self, n: i64) -> Result<Vec<WatchItemRecord>> {
        let rows = sqlx::query_as::<_, WatchItemRecord>(
            r"
            SELECT ts_code, period, multiplier, sharpe, sortino, win_rate,
                   profit_factor
            FROM supertrend_metrics
            ORDER BY sortino DESC
            LIMIT $1
            ",
        )
        .bind(n)
        .fetch_all(&self.pool)
        .await
        .context("Failed to query watch list")?;

        Ok(rows)
    }
}
