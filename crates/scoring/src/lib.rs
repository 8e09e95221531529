pub mod history;
pub mod industry;
pub mod normalize;
pub mod percentile;
pub mod stock;

pub use history::{group_by_code, lookback_start, FlowHistoryStore};
pub use industry::IndustryScorer;
pub use normalize::{dense_ranks_sorted_desc, ewm_mean, group_indices, normalize_grouped, round_to, zscore_to_100};
pub use percentile::{percentile_of_score, NEUTRAL_PERCENTILE};
pub use stock::StockScorer;
