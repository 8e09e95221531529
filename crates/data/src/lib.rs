pub mod database;
pub mod models;
pub mod repositories;

pub use database::DatabaseClient;
pub use models::{
    cap_bucket, DailyBasicRecord, DailyKlineRecord, IndustryFlowRecord, IndustryScoreRecord,
    IntradayBarRecord, MoneyflowRecord, StockScoreRecord, WatchItemRecord,
};
pub use repositories::{
    DailyBasicRepository, DailyKlineRepository, IndustryFlowRepository, IntradayBarRepository,
    MoneyflowRepository, NotificationRepository, ScoreRepository, WatchlistRepository,
};
