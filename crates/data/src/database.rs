use anyhow::{Context, Result};
use sqlx::{postgres::PgPoolOptions, PgPool};

pub struct DatabaseClient {
    pool: PgPool,
}

impl DatabaseClient {
    /// Creates a new database client connected to the specified `PostgreSQL` database.
    ///
    /// # Errors
    /// Returns an error if the database connection cannot be established.
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self { pool })
    }

    /// Returns a clone of the underlying connection pool.
    #[must_use]
    pub fn pool(&self) -> PgPool {
        self.pool.clone()
    }

    /// Creates every table the pipeline writes or reads, if absent.
    ///
    /// Safe to run on every start; all statements are idempotent.
    ///
    /// # Errors
    /// Returns an error if any DDL statement fails.
    pub async fn init_schema(&self) -> Result<()> {
        let statements = [
            r"
            CREATE TABLE IF NOT EXISTS a_stock_moneyflow (
                ts_code VARCHAR(16) NOT NULL,
                trade_date VARCHAR(8) NOT NULL,
                buy_sm_amount DOUBLE PRECISION,
                sell_sm_amount DOUBLE PRECISION,
                buy_md_amount DOUBLE PRECISION,
                sell_md_amount DOUBLE PRECISION,
                buy_lg_amount DOUBLE PRECISION,
                sell_lg_amount DOUBLE PRECISION,
                buy_elg_amount DOUBLE PRECISION,
                sell_elg_amount DOUBLE PRECISION,
                net_mf_amount DOUBLE PRECISION,
                PRIMARY KEY (ts_code, trade_date)
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS a_stock_moneyflow_industry (
                trade_date VARCHAR(8) NOT NULL,
                industry_code VARCHAR(16) NOT NULL,
                industry VARCHAR(64) NOT NULL,
                company_num INTEGER,
                pct_change DOUBLE PRECISION,
                net_buy_amount DOUBLE PRECISION,
                net_sell_amount DOUBLE PRECISION,
                net_amount DOUBLE PRECISION,
                PRIMARY KEY (trade_date, industry_code)
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS a_stock_daily_basic (
                ts_code VARCHAR(16) NOT NULL,
                trade_date VARCHAR(8) NOT NULL,
                close DOUBLE PRECISION,
                turnover_rate DOUBLE PRECISION,
                turnover_rate_f DOUBLE PRECISION,
                volume_ratio DOUBLE PRECISION,
                pe DOUBLE PRECISION,
                pe_ttm DOUBLE PRECISION,
                pb DOUBLE PRECISION,
                ps DOUBLE PRECISION,
                ps_ttm DOUBLE PRECISION,
                dv_ratio DOUBLE PRECISION,
                dv_ttm DOUBLE PRECISION,
                total_share DOUBLE PRECISION,
                float_share DOUBLE PRECISION,
                free_share DOUBLE PRECISION,
                total_mv DOUBLE PRECISION,
                circ_mv DOUBLE PRECISION,
                circ_mv_range VARCHAR(16),
                PRIMARY KEY (ts_code, trade_date)
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS a_stock_daily_k (
                ts_code VARCHAR(16) NOT NULL,
                trade_date VARCHAR(8) NOT NULL,
                open DOUBLE PRECISION,
                high DOUBLE PRECISION,
                low DOUBLE PRECISION,
                close DOUBLE PRECISION,
                pre_close DOUBLE PRECISION,
                change DOUBLE PRECISION,
                pct_chg DOUBLE PRECISION,
                vol DOUBLE PRECISION,
                amount DOUBLE PRECISION,
                PRIMARY KEY (ts_code, trade_date)
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS a_stock_moneyflow_score (
                trade_date VARCHAR(8) NOT NULL,
                ts_code VARCHAR(16) NOT NULL,
                window_days INTEGER NOT NULL,
                rank INTEGER NOT NULL,
                cap_bucket VARCHAR(16) NOT NULL,
                elg_ratio DOUBLE PRECISION NOT NULL,
                elg_score DOUBLE PRECISION NOT NULL,
                lg_ratio DOUBLE PRECISION NOT NULL,
                lg_score DOUBLE PRECISION NOT NULL,
                md_ratio DOUBLE PRECISION NOT NULL,
                md_score DOUBLE PRECISION NOT NULL,
                sm_ratio DOUBLE PRECISION NOT NULL,
                sm_score DOUBLE PRECISION NOT NULL,
                turnover_mean DOUBLE PRECISION NOT NULL,
                turnover_score DOUBLE PRECISION NOT NULL,
                volume_ratio_mean DOUBLE PRECISION NOT NULL,
                volume_ratio_score DOUBLE PRECISION NOT NULL,
                amount_percentile DOUBLE PRECISION NOT NULL,
                net_flow_percentile DOUBLE PRECISION NOT NULL,
                composite DOUBLE PRECISION NOT NULL,
                PRIMARY KEY (ts_code, trade_date)
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS a_stock_moneyflow_industry_score (
                trade_date VARCHAR(8) NOT NULL,
                industry_code VARCHAR(16) NOT NULL,
                industry VARCHAR(64) NOT NULL,
                rank INTEGER NOT NULL,
                net_amount DOUBLE PRECISION NOT NULL,
                net_amount_percentile DOUBLE PRECISION NOT NULL,
                d1_percentile DOUBLE PRECISION NOT NULL,
                d2_percentile DOUBLE PRECISION NOT NULL,
                d3_percentile DOUBLE PRECISION NOT NULL,
                d4_percentile DOUBLE PRECISION NOT NULL,
                d5_percentile DOUBLE PRECISION NOT NULL,
                PRIMARY KEY (industry_code, trade_date)
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS a_stock_30m_kline (
                trade_time TIMESTAMP NOT NULL,
                ts_code VARCHAR(16) NOT NULL,
                open NUMERIC(18, 4),
                high NUMERIC(18, 4),
                low NUMERIC(18, 4),
                close NUMERIC(18, 4),
                volume NUMERIC(18, 4),
                amount NUMERIC(18, 4),
                adjust_flag INTEGER,
                PRIMARY KEY (trade_time, ts_code)
            )
            ",
            r"
            CREATE INDEX IF NOT EXISTS idx_30m_kline_ts_code
            ON a_stock_30m_kline(ts_code)
            ",
            r"
            CREATE TABLE IF NOT EXISTS supertrend_metrics (
                ts_code VARCHAR(16) NOT NULL,
                period INTEGER NOT NULL,
                multiplier DOUBLE PRECISION NOT NULL,
                sharpe DOUBLE PRECISION,
                sortino DOUBLE PRECISION,
                win_rate DOUBLE PRECISION,
                profit_factor DOUBLE PRECISION,
                PRIMARY KEY (ts_code, period, multiplier)
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS signal_notifications (
                trade_time TIMESTAMP NOT NULL,
                ts_code VARCHAR(16) NOT NULL,
                PRIMARY KEY (trade_time, ts_code)
            )
            ",
        ];

        for ddl in statements {
            sqlx::query(ddl)
                .execute(&self.pool)
                .await
                .context("Failed to run schema DDL")?;
        }
        Ok(())
    }
}
