//! Daily fundamentals repository.

use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::models::DailyBasicRecord;

/// Repository for daily fundamental snapshots.
#[derive(Debug, Clone)]
pub struct DailyBasicRepository {
    pool: PgPool,
}

impl DailyBasicRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Upserts a batch of fundamental rows with ON CONFLICT DO NOTHING.
    ///
    /// # Returns
    /// The number of rows actually inserted (excluding duplicates).
    ///
    /// # Errors
    /// Returns an error if the database transaction fails.
    pub async fn upsert_batch(&self, records: &[DailyBasicRecord]) -> Result<u64> {
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
                    INSERT INTO a_stock_daily_basic
                    (ts_code, trade_date, close, turnover_rate, turnover_rate_f,
                     volume_ratio, pe, pe_ttm, pb, ps, ps_ttm, dv_ratio, dv_ttm,
                     total_share, float_share, free_share, total_mv, circ_mv,
                     circ_mv_range)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                            $14, $15, $16, $17, $18, $19)
                    ON CONFLICT (ts_code, trade_date) DO NOTHING
                    ",
                )
                .bind(&record.ts_code)
                .bind(&record.trade_date)
                .bind(record.close)
                .bind(record.turnover_rate)
                .bind(record.turnover_rate_f)
                .bind(record.volume_ratio)
                .bind(record.pe)
                .bind(record.pe_ttm)
                .bind(record.pb)
                .bind(record.ps)
                .bind(record.ps_ttm)
                .bind(record.dv_ratio)
                .bind(record.dv_ttm)
                .bind(record.total_share)
                .bind(record.float_share)
                .bind(record.free_share)
                .bind(record.total_mv)
                .bind(record.circ_mv)
                .bind(&record.circ_mv_range)
                .execute(&mut *tx)
                .await
                .context("Failed to insert daily-basic record")?;

                inserted += result.rows_affected();
            }
        }

        tx.commit().await.context("Failed to commit transaction")?;
        Ok(inserted)
    }
}
