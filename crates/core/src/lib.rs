pub mod config;
pub mod config_loader;
pub mod error;
pub mod traits;

pub use config::{
    AppConfig, DailyTaskConfig, DatabaseConfig, NotifyConfig, ScoreWeights, TushareConfig,
    WatcherConfig,
};
pub use config_loader::ConfigLoader;
pub use error::PipelineError;
pub use traits::{Clock, NotificationChannel, SystemClock, TradeDated, TradingCalendar};
