pub mod daily_basic_repo;
pub mod daily_kline_repo;
pub mod industry_repo;
pub mod intraday_repo;
pub mod moneyflow_repo;
pub mod notification_repo;
pub mod score_repo;
pub mod watchlist_repo;

pub use daily_basic_repo::DailyBasicRepository;
pub use daily_kline_repo::DailyKlineRepository;
pub use industry_repo::IndustryFlowRepository;
pub use intraday_repo::IntradayBarRepository;
pub use moneyflow_repo::MoneyflowRepository;
pub use notification_repo::NotificationRepository;
pub use score_repo::ScoreRepository;
pub use watchlist_repo::WatchlistRepository;
