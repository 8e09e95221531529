//! Intraday 30-minute bar repository.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use sqlx::PgPool;

use crate::models::IntradayBarRecord;

/// Repository for unadjusted 30-minute bars.
#[derive(Debug, Clone)]
pub struct IntradayBarRepository {
    pool: PgPool,
}

impl IntradayBarRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Upserts a batch of bars with ON CONFLICT DO NOTHING.
    ///
    /// # Returns
    /// The number of rows actually inserted (excluding duplicates).
    ///
    /// # Errors
    /// Returns an error if the database transaction fails.
    pub async fn upsert_batch(&self, records: &[IntradayBarRecord]) -> Result<u64> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;
        let mut inserted = 0u64;

        for chunk in records.chunks(100) {
            for record in chunk {
                let result = sqlx::query(
                    r"
                    INSERT INTO a_stock_30m_kline
                    (trade_time, ts_code, open, high, low, close, volume, amount,
                     adjust_flag)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                    ON CONFLICT (trade_time, ts_code) DO NOTHING
                    ",
                )
                .bind(record.trade_time)
                .bind(&record.ts_code)
                .bind(record.open)
                .bind(record.high)
                .bind(record.low)
                .bind(record.close)
                .bind(record.volume)
                .bind(record.amount)
                .bind(record.adjust_flag)
                .execute(&mut *tx)
                .await
                .context("Failed to insert intraday bar")?;

                inserted += result.rows_affected();
            }
        }

        tx.commit().await.context("Failed to commit transaction")?;
        Ok(inserted)
    }

    /// Returns the newest stored bar time, if any.
    ///
    /// Backfill resumes from this point instead of re-downloading history.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn latest_bar_time(&self) -> Result<Option<NaiveDateTime>> {
        let row = sqlx::query_scalar::<_, Option<NaiveDateTime>>(
            "SELECT MAX(trade_time) FROM a_stock_30m_kline",
        )
        .fetch_one(&self.pool)
        .await
        .context("Failed to query latest bar time")?;

        Ok(row)
    }
}
