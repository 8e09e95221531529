//! Typed wrappers over the pro API endpoints the pipeline consumes.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use aflow_core::TradingCalendar;
use aflow_data::{
    cap_bucket, DailyBasicRecord, DailyKlineRecord, IndustryFlowRecord, IntradayBarRecord,
    MoneyflowRecord,
};

use crate::client::TushareClient;

const MONEYFLOW_FIELDS: &str = "ts_code,trade_date,buy_sm_amount,sell_sm_amount,\
buy_md_amount,sell_md_amount,buy_lg_amount,sell_lg_amount,buy_elg_amount,\
sell_elg_amount,net_mf_amount";

const INDUSTRY_FIELDS: &str = "ts_code,trade_date,industry,company_num,pct_change,\
net_buy_amount,net_sell_amount,net_amount";

const DAILY_BASIC_FIELDS: &str = "ts_code,trade_date,close,turnover_rate,\
turnover_rate_f,volume_ratio,pe,pe_ttm,pb,ps,ps_ttm,dv_ratio,dv_ttm,total_share,\
float_share,free_share,total_mv,circ_mv";

const DAILY_FIELDS: &str =
    "ts_code,trade_date,open,high,low,close,pre_close,change,pct_chg,vol,amount";

#[derive(Debug, Deserialize)]
struct CalendarRow {
    cal_date: String,
    is_open: i32,
}

#[derive(Debug, Deserialize)]
struct IntradayRow {
    ts_code: String,
    trade_time: String,
    open: Option<Decimal>,
    high: Option<Decimal>,
    low: Option<Decimal>,
    close: Option<Decimal>,
    vol: Option<Decimal>,
    amount: Option<Decimal>,
}

impl TushareClient {
    /// Fetches per-stock capital flow for one trading day.
    ///
    /// # Errors
    /// Returns an error on transport or decoding failure.
    pub async fn moneyflow(&self, trade_date: &str) -> Result<Vec<MoneyflowRecord>> {
        self.call("moneyflow", json!({ "trade_date": trade_date }), MONEYFLOW_FIELDS)
            .await?
            .decode()
    }

    /// Fetches industry-level capital flow for one trading day.
    ///
    /// The upstream keys industries under `ts_code`; the record decodes that
    /// into `industry_code`.
    ///
    /// # Errors
    /// Returns an error on transport or decoding failure.
    pub async fn industry_moneyflow(&self, trade_date: &str) -> Result<Vec<IndustryFlowRecord>> {
        self.call(
            "moneyflow_ind_ths",
            json!({ "trade_date": trade_date }),
            INDUSTRY_FIELDS,
        )
        .await?
        .decode()
    }

    /// Fetches daily fundamentals for one trading day and assigns each row
    /// its market-cap bucket.
    ///
    /// # Errors
    /// Returns an error on transport or decoding failure.
    pub async fn daily_basic(&self, trade_date: &str) -> Result<Vec<DailyBasicRecord>> {
        let mut rows: Vec<DailyBasicRecord> = self
            .call(
                "daily_basic",
                json!({ "trade_date": trade_date }),
                DAILY_BASIC_FIELDS,
            )
            .await?
            .decode()?;

        for row in &mut rows {
            row.circ_mv_range = row.circ_mv.map(|mv| cap_bucket(mv).to_string());
        }
        Ok(rows)
    }

    /// Fetches daily bars for one trading day.
    ///
    /// # Errors
    /// Returns an error on transport or decoding failure.
    pub async fn daily_kline(&self, trade_date: &str) -> Result<Vec<DailyKlineRecord>> {
        self.call("daily", json!({ "trade_date": trade_date }), DAILY_FIELDS)
            .await?
            .decode()
    }

    /// Fetches unadjusted intraday bars for one instrument.
    ///
    /// Rows missing any OHLC value are dropped; bar times are exchange-local.
    ///
    /// # Errors
    /// Returns an error on transport, decoding, or timestamp parse failure.
    pub async fn intraday_kline(
        &self,
        ts_code: &str,
        freq: &str,
        start_date: &str,
        end_date: &str,
    ) -> Result<Vec<IntradayBarRecord>> {
        let rows: Vec<IntradayRow> = self
            .call(
                "stk_mins",
                json!({
                    "ts_code": ts_code,
                    "freq": freq,
                    "start_date": start_date,
                    "end_date": end_date,
                }),
                "ts_code,trade_time,open,high,low,close,vol,amount",
            )
            .await?
            .decode()?;

        let mut bars = Vec::with_capacity(rows.len());
        for row in rows {
            let (Some(open), Some(high), Some(low), Some(close)) =
                (row.open, row.high, row.low, row.close)
            else {
                continue;
            };
            let trade_time =
                NaiveDateTime::parse_from_str(&row.trade_time, "%Y-%m-%d %H:%M:%S")
                    .with_context(|| format!("Bad bar time: {}", row.trade_time))?;
            bars.push(IntradayBarRecord {
                trade_time,
                ts_code: row.ts_code,
                open,
                high,
                low,
                close,
                volume: row.vol.unwrap_or_default(),
                amount: row.amount.unwrap_or_default(),
                adjust_flag: 3,
            });
        }
        Ok(bars)
    }
}

#[async_trait]
impl TradingCalendar for TushareClient {
    async fn is_open(&self, date: &str) -> Result<bool> {
        let rows: Vec<CalendarRow> = self
            .call(
                "trade_cal",
                json!({ "start_date": date, "end_date": date }),
                "cal_date,is_open",
            )
            .await?
            .decode()?;

        Ok(rows.first().is_some_and(|row| row.is_open == 1))
    }

    async fn trading_days(&self, start: &str, end: &str) -> Result<Vec<String>> {
        let rows: Vec<CalendarRow> = self
            .call(
                "trade_cal",
                json!({ "start_date": start, "end_date": end }),
                "cal_date,is_open",
            )
            .await?
            .decode()?;

        Ok(rows
            .into_iter()
            .filter(|row| row.is_open == 1)
            .map(|row| row.cal_date)
            .collect())
    }
}
