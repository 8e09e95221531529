pub mod backfill;
pub mod daily;
pub mod retry;
pub mod scheduler;
pub mod window;

pub use backfill::KlineBackfill;
pub use daily::DailyPipeline;
pub use retry::RetryingFetcher;
pub use scheduler::{anchor_date, DailyScheduler};
pub use window::latest_trade_dates;
