use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Oracle over the exchange trading calendar.
#[async_trait]
pub trait TradingCalendar: Send + Sync {
    /// Returns whether the market is open on `date` (YYYYMMDD).
    async fn is_open(&self, date: &str) -> Result<bool>;

    /// Returns the open trading dates within `[start, end]`, unordered.
    async fn trading_days(&self, start: &str, end: &str) -> Result<Vec<String>>;
}

/// Best-effort outward push channel. Failures are for the caller to log.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    async fn send(&self, subject: &str, content: &str) -> Result<()>;
}

/// Injectable time source so retry loops can be tested without real sleeps.
#[async_trait]
pub trait Clock: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Wall-clock implementation backed by the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// A row carrying a YYYYMMDD trading date, the common key of every daily frame.
pub trait TradeDated {
    fn trade_date(&self) -> &str;
}
