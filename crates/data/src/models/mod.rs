pub mod daily_basic;
pub mod daily_kline;
pub mod industry_flow;
pub mod intraday;
pub mod moneyflow;
pub mod score;
pub mod watchlist;

pub use daily_basic::{cap_bucket, DailyBasicRecord};
pub use daily_kline::DailyKlineRecord;
pub use industry_flow::IndustryFlowRecord;
pub use intraday::IntradayBarRecord;
pub use moneyflow::MoneyflowRecord;
pub use score::{IndustryScoreRecord, StockScoreRecord};
pub use watchlist::WatchItemRecord;
