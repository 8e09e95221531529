//! Scoring-result repository.
//!
//! Score tables are last-write-wins: re-running a day replaces the derived
//! columns for existing keys instead of keeping the stale run.

use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::models::{IndustryScoreRecord, StockScoreRecord};

/// Repository for stock and industry score rows.
#[derive(Debug, Clone)]
pub struct ScoreRepository {
    pool: PgPool,
}

impl ScoreRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Upserts stock scores, updating all derived columns on conflict.
    ///
    /// # Errors
    /// Returns an error if the database transaction fails.
    pub async fn upsert_stock_scores(&self, records: &[StockScoreRecord]) -> Result<u64> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;
        let mut written = 0u64;

        for chunk in records.chunks(100) {
            for record in chunk {
                let result = sqlx::query(
                    r"
                    INSERT INTO a_stock_moneyflow_score
                    (trade_date, ts_code, window_days, rank, cap_bucket,
                     elg_ratio, elg_score, lg_ratio, lg_score, md_ratio, md_score,
                     sm_ratio, sm_score, turnover_mean, turnover_score,
                     volume_ratio_mean, volume_ratio_score, amount_percentile,
                     net_flow_percentile, composite)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                            $14, $15, $16, $17, $18, $19, $20)
                    ON CONFLICT (ts_code, trade_date) DO UPDATE
                    SET window_days = EXCLUDED.window_days,
                        rank = EXCLUDED.rank,
                        cap_bucket = EXCLUDED.cap_bucket,
                        elg_ratio = EXCLUDED.elg_ratio,
                        elg_score = EXCLUDED.elg_score,
                        lg_ratio = EXCLUDED.lg_ratio,
                        lg_score = EXCLUDED.lg_score,
                        md_ratio = EXCLUDED.md_ratio,
                        md_score = EXCLUDED.md_score,
                        sm_ratio = EXCLUDED.sm_ratio,
                        sm_score = EXCLUDED.sm_score,
                        turnover_mean = EXCLUDED.turnover_mean,
                        turnover_score = EXCLUDED.turnover_score,
                        volume_ratio_mean = EXCLUDED.volume_ratio_mean,
                        volume_ratio_score = EXCLUDED.volume_ratio_score,
                        amount_percentile = EXCLUDED.amount_percentile,
                        net_flow_percentile = EXCLUDED.net_flow_percentile,
                        composite = EXCLUDED.composite
                    ",
                )
                .bind(&record.trade_date)
                .bind(&record.ts_code)
                .bind(record.window_days)
                .bind(record.rank)
                .bind(&record.cap_bucket)
                .bind(record.elg_ratio)
                .bind(record.elg_score)
                .bind(record.lg_ratio)
                .bind(record.lg_score)
                .bind(record.md_ratio)
                .bind(record.md_score)
                .bind(record.sm_ratio)
                .bind(record.sm_score)
                .bind(record.turnover_mean)
                .bind(record.turnover_score)
                .bind(record.volume_ratio_mean)
                .bind(record.volume_ratio_score)
                .bind(record.amount_percentile)
                .bind(record.net_flow_percentile)
                .bind(record.composite)
                .execute(&mut *tx)
                .await
                .context("Failed to upsert stock score")?;

                written += result.rows_affected();
            }
        }

        tx.commit().await.context("Failed to commit transaction")?;
        Ok(written)
    }

    /// Upserts industry scores, updating all derived columns on conflict.
    ///
    /// # Errors
    /// Returns an error if the database transaction fails.
    pub async fn upsert_industry_scores(&self, records: &[IndustryScoreRecord]) -> Result<u64> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;
        let mut written = 0u64;

        for record in records {
            let result = sqlx::query(
                r"
                INSERT INTO a_stock_moneyflow_industry_score
                (trade_date, industry_code, industry, rank, net_amount,
                 net_amount_percentile, d1_percentile, d2_percentile,
                 d3_percentile, d4_percentile, d5_percentile)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                ON CONFLICT (industry_code, trade_date) DO UPDATE
                SET industry = EXCLUDED.industry,
                    rank = EXCLUDED.rank,
                    net_amount = EXCLUDED.net_amount,
                    net_amount_percentile = EXCLUDED.net_amount_percentile,
                    d1_percentile = EXCLUDED.d1_percentile,
                    d2_percentile = EXCLUDED.d2_percentile,
                    d3_percentile = EXCLUDED.d3_percentile,
                    d4_percentile = EXCLUDED.d4_percentile,
                    d5_percentile = EXCLUDED.d5_percentile
                ",
            )
            .bind(&record.trade_date)
            .bind(&record.industry_code)
            .bind(&record.industry)
            .bind(record.rank)
            .bind(record.net_amount)
            .bind(record.net_amount_percentile)
            .bind(record.d1_percentile)
            .bind(record.d2_percentile)
            .bind(record.d3_percentile)
            .bind(record.d4_percentile)
            .bind(record.d5_percentile)
            .execute(&mut *tx)
            .await
            .context("Failed to upsert industry score")?;

            written += result.rows_affected();
        }

        tx.commit().await.context("Failed to commit transaction")?;
        Ok(written)
    }
}
