//! Industry capital-flow repository.

use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::models::IndustryFlowRecord;

/// Repository for industry-level capital-flow rows.
#[derive(Debug, Clone)]
pub struct IndustryFlowRepository {
    pool: PgPool,
}

impl IndustryFlowRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Upserts a batch of industry flow rows with ON CONFLICT DO NOTHING.
    ///
    /// # Returns
    /// The number of rows actually inserted (excluding duplicates).
    ///
    /// # Errors
    /// Returns an error if the database transaction fails.
    pub async fn upsert_batch(&self, records: &[IndustryFlowRecord]) -> Result<u64> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;
        let mut inserted = 0u64;

        for record in records {
            let result = sqlx::query(
                r"
                INSERT INTO a_stock_moneyflow_industry
                (trade_date, industry_code, industry, company_num, pct_change,
                 net_buy_amount, net_sell_amount, net_amount)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                ON CONFLICT (trade_date, industry_code) DO NOTHING
                ",
            )
            .bind(&record.trade_date)
            .bind(&record.industry_code)
            .bind(&record.industry)
            .bind(record.company_num)
            .bind(record.pct_change)
            .bind(record.net_buy_amount)
            .bind(record.net_sell_amount)
            .bind(record.net_amount)
            .execute(&mut *tx)
            .await
            .context("Failed to insert industry flow record")?;

            inserted += result.rows_affected();
        }

        tx.commit().await.context("Failed to commit transaction")?;
        Ok(inserted)
    }

    /// Queries all industry flow rows within `start < trade_date <= end`.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn history(&self, start: &str, end: &str) -> Result<Vec<IndustryFlowRecord>> {
        let rows = sqlx::query_as::<_, IndustryFlowRecord>(
            r"
            SELECT trade_date, industry_code, industry, company_num, pct_change,
                   net_buy_amount, net_sell_amount, net_amount
            FROM a_stock_moneyflow_industry
            WHERE trade_date > $1 AND trade_date <= $2
            ORDER BY industry_code, trade_date
            ",
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .context("Failed to query industry flow history")?;

        Ok(rows)
    }
}
