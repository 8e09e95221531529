//! Per-stock capital-flow repository.
//!
//! Raw frames are first-write-wins: a re-run for the same day never rewrites
//! rows that already landed.

use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::models::MoneyflowRecord;

/// Repository for per-stock capital-flow rows.
#[derive(Debug, Clone)]
pub struct MoneyflowRepository {
    pool: PgPool,
}

impl MoneyflowRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Upserts a batch of capital-flow rows.
    ///
    /// Uses ON CONFLICT DO NOTHING on (ts_code, trade_date); the whole batch
    /// lands in one transaction or not at all.
    ///
    /// # Returns
    /// The number of rows actually inserted (excluding duplicates).
    ///
    /// # Errors
    /// Returns an error if the database transaction fails.
    pub async fn upsert_batch(&self, records: &[MoneyflowRecord]) -> Result<u64> {
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
                    INSERT INTO a_stock_moneyflow
                    (ts_code, trade_date, buy_sm_amount, sell_sm_amount, buy_md_amount,
                     sell_md_amount, buy_lg_amount, sell_lg_amount, buy_elg_amount,
                     sell_elg_amount, net_mf_amount)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                    ON CONFLICT (ts_code, trade_date) DO NOTHING
                    ",
                )
                .bind(&record.ts_code)
                .bind(&record.trade_date)
                .bind(record.buy_sm_amount)
                .bind(record.sell_sm_amount)
                .bind(record.buy_md_amount)
                .bind(record.sell_md_amount)
                .bind(record.buy_lg_amount)
                .bind(record.sell_lg_amount)
                .bind(record.buy_elg_amount)
                .bind(record.sell_elg_amount)
                .bind(record.net_mf_amount)
                .execute(&mut *tx)
                .await
                .context("Failed to insert moneyflow record")?;

                inserted += result.rows_affected();
            }
        }

        tx.commit().await.context("Failed to commit transaction")?;
        Ok(inserted)
    }

    /// Queries net-flow history for a chunk of instruments within a date range.
    ///
    /// Returns (ts_code, net_mf_amount) pairs; callers group by code. The
    /// range is half-open on the left: `start < trade_date <= end`.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn net_flow_history(
        &self,
        codes: &[String],
        start: &str,
        end: &str,
    ) -> Result<Vec<(String, f64)>> {
        let rows = sqlx::query_as::<_, (String, f64)>(
            r"
            SELECT ts_code, net_mf_amount
            FROM a_stock_moneyflow
            WHERE ts_code = ANY($1)
              AND trade_date > $2 AND trade_date <= $3
              AND net_mf_amount IS NOT NULL
            ORDER BY ts_code, trade_date
            ",
        )
        .bind(codes)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .context("Failed to query net-flow history")?;

        Ok(rows)
    }
}
