pub mod indicator;
pub mod monitor;
pub mod signal;

pub use indicator::{ha_supertrend, heikin_ashi, HaSuperTrend, OhlcBar};
pub use monitor::{IntradayQuoteSource, TrendMonitor};
pub use signal::{detect_flip, TrendSignal};
