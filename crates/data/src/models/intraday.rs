//! Intraday (30-minute) bar model.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One unadjusted intraday bar. Prices keep exchange precision.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct IntradayBarRecord {
    /// Bar close time, exchange-local
    pub trade_time: NaiveDateTime,
    pub ts_code: String,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
    pub amount: Decimal,
    /// 3 = unadjusted, matching the upstream convention
    pub adjust_flag: i32,
}
