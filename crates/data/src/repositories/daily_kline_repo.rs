//! Daily OHLCV repository.

use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::models::DailyKlineRecord;

/// Repository for daily bars.
#[derive(Debug, Clone)]
pub struct DailyKlineRepository {
    pool: PgPool,
}

impl DailyKlineRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Upserts a batch of daily bars with ON CONFLICT DO NOTHING.
    ///
    /// # Returns
    /// The number of rows actually inserted (excluding duplicates).
    ///
    /// # Errors
    /// Returns an error if the database transaction fails.
    pub async fn upsert_batch(&self, records: &[DailyKlineRecord]) -> Result<u64> {
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
                    INSERT INTO a_stock_daily_k
                    (ts_code, trade_date, open, high, low, close, pre_close,
                     change, pct_chg, vol, amount)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                    ON CONFLICT (ts_code, trade_date) DO NOTHING
                    ",
                )
                .bind(&record.ts_code)
                .bind(&record.trade_date)
                .bind(record.open)
                .bind(record.high)
                .bind(record.low)
                .bind(record.close)
                .bind(record.pre_close)
                .bind(record.change)
                .bind(record.pct_chg)
                .bind(record.vol)
                .bind(record.amount)
                .execute(&mut *tx)
                .await
                .context("Failed to insert daily-kline record")?;

                inserted += result.rows_affected();
            }
        }

        tx.commit().await.context("Failed to commit transaction")?;
        Ok(inserted)
    }

    /// Queries traded-value history for a chunk of instruments.
    ///
    /// Returns (ts_code, amount) pairs over `start < trade_date <= end`.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn amount_history(
        &self,
        codes: &[String],
        start: &str,
        end: &str,
    ) -> Result<Vec<(String, f64)>> {
        let rows = sqlx::query_as::<_, (String, f64)>(
            r"
            SELECT ts_code, amount
            FROM a_stock_daily_k
            WHERE ts_code = ANY($1)
              AND trade_date > $2 AND trade_date <= $3
              AND amount IS NOT NULL
            ORDER BY ts_code, trade_date
            ",
        )
        .bind(codes)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .context("Failed to query traded-value history")?;

        Ok(rows)
    }
}
