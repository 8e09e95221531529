use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub tushare: TushareConfig,
    pub daily: DailyTaskConfig,
    pub watcher: WatcherConfig,
    pub notify: NotifyConfig,
    pub weights: ScoreWeights,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TushareConfig {
    pub api_url: String,
    pub token: String,
    /// Requests per minute allowed by the account tier.
    pub rate_limit_per_minute: u32,
}

/// Settings for the scheduled daily fetch-and-score task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyTaskConfig {
    pub enabled: bool,
    /// Six-field cron expression, e.g. "0 30 16 * * *" for 16:30 daily.
    pub cron_schedule: String,
    /// Trailing trading-day window analysed per run.
    pub window_days: usize,
    /// Whole-window retry attempts while waiting for the anchor day to publish.
    pub max_retries: u32,
    /// Seconds slept between retry attempts.
    pub wait_seconds: u64,
    /// Calendar-day depth of the percentile history.
    pub history_days: i64,
    /// Instruments per history query when computing percentiles.
    pub chunk_size: usize,
}

/// Settings for the intraday trend-flip monitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherConfig {
    pub enabled: bool,
    pub poll_interval_secs: u64,
    /// Watch the top N instruments ranked by sortino ratio.
    pub top_n: i64,
    /// Concurrent indicator recomputations per tick.
    pub workers: usize,
    /// Bar frequency requested from the quote source, e.g. "30min".
    pub bar_freq: String,
    /// Bars fetched per instrument per tick.
    pub lookback_bars: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    pub webhook_url: String,
}

/// Weights applied to the six normalized sub-scores of the composite.
///
/// Tier weights are signed; magnitudes sum to 1. The sources this pipeline
/// replaced carried two mutually inconsistent schemes, so the vector is
/// configuration rather than code.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub extra_large: f64,
    pub large: f64,
    pub medium: f64,
    pub small: f64,
    pub turnover: f64,
    pub volume_ratio: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            extra_large: 0.30,
            large: 0.25,
            medium: 0.15,
            small: 0.10,
            turnover: 0.10,
            volume_ratio: 0.10,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "postgresql://localhost/aflow".to_string(),
                max_connections: 10,
            },
            tushare: TushareConfig {
                api_url: "http://api.tushare.pro".to_string(),
                token: String::new(),
                rate_limit_per_minute: 190,
            },
            daily: DailyTaskConfig {
                enabled: true,
                cron_schedule: "0 30 16 * * *".to_string(),
                window_days: 3,
                max_retries: 100,
                wait_seconds: 600,
                history_days: 365,
                chunk_size: 500,
            },
            watcher: WatcherConfig {
                enabled: false,
                poll_interval_secs: 10,
                top_n: 30,
                workers: 10,
                bar_freq: "30min".to_string(),
                lookback_bars: 120,
            },
            notify: NotifyConfig {
                webhook_url: String::new(),
            },
            weights: ScoreWeights::default(),
        }
    }
}
