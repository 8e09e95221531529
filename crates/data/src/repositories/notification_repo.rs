//! Notification ledger.
//!
//! Guarantees at-most-one notification per (signal time, instrument): the
//! existence check and the write are a single conditional insert, so
//! concurrent workers re-polling the same signal cannot both claim it.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use sqlx::PgPool;

/// Write-once ledger of sent signal notifications.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Records a (signal time, instrument) pair if it is not already present.
    ///
    /// # Returns
    /// `true` if this call inserted the row — the caller owns the
    /// notification. `false` if the pair was already recorded.
    ///
    /// # Errors
    /// Returns an error if the database insert fails.
    pub async fn record_if_new(&self, trade_time: NaiveDateTime, ts_code: &str) -> Result<bool> {
        let result = sqlx::query(
            r"
            INSERT INTO signal_notifications (trade_time, ts_code)
            VALUES ($1, $2)
            ON CONFLICT (trade_time, ts_code) DO NOTHING
            ",
        )
        .bind(trade_time)
        .bind(ts_code)
        .execute(&self.pool)
        .await
        .context("Failed to record notification")?;

        Ok(result.rows_affected() == 1)
    }
}
