//! Industry money-flow percentile ranking.
//!
//! Ranks each industry's current net flow against its own trailing history,
//! plus five lookback columns showing how extreme each of the preceding days
//! was. Short or missing history never fails a run; it ranks neutral.

use anyhow::{bail, Result};
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

use aflow_data::{IndustryFlowRecord, IndustryScoreRecord};

use crate::normalize::{dense_ranks_sorted_desc, round_to};
use crate::percentile::{percentile_of_score, NEUTRAL_PERCENTILE};

/// Number of pre-anchor days ranked into lookback columns.
const LOOKBACK_DAYS: usize = 5;

/// Scores industries for one anchor day.
pub struct IndustryScorer;

impl IndustryScorer {
    /// Ranks the anchor day's industries.
    ///
    /// `frame` is the fetched window; `history` is the 365-day trailing set
    /// read from the store (it includes the anchor day, which the pipeline
    /// persists before scoring).
    ///
    /// # Errors
    /// Returns an error if the frame is empty or no anchor row carries a net
    /// amount. The caller treats any error as an aborted scoring stage.
    pub fn score(
        frame: &[IndustryFlowRecord],
        history: &[IndustryFlowRecord],
    ) -> Result<Vec<IndustryScoreRecord>> {
        let Some(anchor) = frame.iter().map(|r| r.trade_date.as_str()).max() else {
            bail!("industry flow frame is empty");
        };

        // Per-industry history, chronological, with the anchor day split off.
        let mut full: HashMap<&str, Vec<f64>> = HashMap::new();
        let mut past: HashMap<&str, Vec<(&str, f64)>> = HashMap::new();
        for row in history {
            let Some(net) = row.net_amount else { continue };
            full.entry(row.industry_code.as_str()).or_default().push(net);
            if row.trade_date.as_str() < anchor {
                past.entry(row.industry_code.as_str())
                    .or_default()
                    .push((row.trade_date.as_str(), net));
            }
        }

        let mut scored: Vec<IndustryScoreRecord> = Vec::new();
        let mut skipped = 0usize;
        for row in frame.iter().filter(|r| r.trade_date == anchor) {
            let Some(net) = row.net_amount else {
                skipped += 1;
                continue;
            };

            let current_percentile = full
                .get(row.industry_code.as_str())
                .map_or(NEUTRAL_PERCENTILE, |values| {
                    percentile_of_score(values, net)
                });

            // Values k days before the anchor, most recent first, ranked
            // against every pre-anchor observation for the industry.
            let mut lookback = [NEUTRAL_PERCENTILE; LOOKBACK_DAYS];
            if let Some(past_rows) = past.get(row.industry_code.as_str()) {
                let mut recent_first = past_rows.clone();
                recent_first.sort_by(|a, b| b.0.cmp(a.0));
                let past_values: Vec<f64> = recent_first.iter().map(|(_, v)| *v).collect();
                for (k, slot) in lookback.iter_mut().enumerate() {
                    if let Some(&value) = past_values.get(k) {
                        *slot = percentile_of_score(&past_values, value);
                    }
                }
            }

            scored.push(IndustryScoreRecord {
                trade_date: anchor.to_string(),
                industry_code: row.industry_code.clone(),
                industry: row.industry.clone(),
                rank: 0,
                net_amount: round_to(net, 2),
                net_amount_percentile: round_to(current_percentile, 2),
                d1_percentile: round_to(lookback[0], 2),
                d2_percentile: round_to(lookback[1], 2),
                d3_percentile: round_to(lookback[2], 2),
                d4_percentile: round_to(lookback[3], 2),
                d5_percentile: round_to(lookback[4], 2),
            });
        }
        if scored.is_empty() {
            bail!("no anchor-day industry row carries a net amount");
        }
        if skipped > 0 {
            debug!("skipped {} industries without a net amount", skipped);
        }

        scored.sort_by(|a, b| {
            b.net_amount_percentile
                .partial_cmp(&a.net_amount_percentile)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.industry_code.cmp(&b.industry_code))
        });
        let percentiles: Vec<f64> = scored.iter().map(|r| r.net_amount_percentile).collect();
        for (record, rank) in scored.iter_mut().zip(dense_ranks_sorted_desc(&percentiles)) {
            record.rank = rank;
        }
        Ok(scored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(code: &str, date: &str, net: Option<f64>) -> IndustryFlowRecord {
        IndustryFlowRecord {
            trade_date: date.to_string(),
            industry_code: code.to_string(),
            industry: format!("industry {code}"),
            company_num: Some(40),
            pct_change: None,
            net_buy_amount: None,
            net_sell_amount: None,
            net_amount: net,
        }
    }

    #[test]
    fn current_day_is_ranked_against_own_history() {
        let frame = vec![
            row("881101", "20250603", Some(30.0)),
            row("881102", "20250603", Some(-5.0)),
        ];
        let history = vec![
            row("881101", "20250520", Some(10.0)),
            row("881101", "20250521", Some(20.0)),
            row("881101", "20250522", Some(40.0)),
            row("881101", "20250523", Some(50.0)),
            row("881101", "20250603", Some(30.0)),
            // 881102 has a single historical day: neutral.
            row("881102", "20250603", Some(-5.0)),
        ];

        let scored = IndustryScorer::score(&frame, &history).unwrap();

        assert_eq!(scored.len(), 2);
        // 3 of 5 observations at or below 30.
        assert_eq!(scored[0].industry_code, "881101");
        assert!((scored[0].net_amount_percentile - 60.0).abs() < 1e-9);
        assert_eq!(scored[0].rank, 1);
        assert_eq!(scored[1].net_amount_percentile, NEUTRAL_PERCENTILE);
        assert_eq!(scored[1].rank, 2);
    }

    #[test]
    fn lookback_columns_rank_each_prior_day() {
        let frame = vec![row("881101", "20250606", Some(0.0))];
        let history = vec![
            row("881101", "20250601", Some(10.0)),
            row("881101", "20250602", Some(50.0)),
            row("881101", "20250603", Some(20.0)),
            row("881101", "20250604", Some(40.0)),
            row("881101", "20250605", Some(30.0)),
            row("881101", "20250606", Some(0.0)),
        ];

        let scored = IndustryScorer::score(&frame, &history).unwrap();
        let record = &scored[0];

        // Pre-anchor values, most recent first: 30, 40, 20, 50, 10.
        assert!((record.d1_percentile - 60.0).abs() < 1e-9);
        assert!((record.d2_percentile - 80.0).abs() < 1e-9);
        assert!((record.d3_percentile - 40.0).abs() < 1e-9);
        assert!((record.d4_percentile - 100.0).abs() < 1e-9);
        assert!((record.d5_percentile - 20.0).abs() < 1e-9);
    }

    #[test]
    fn missing_history_defaults_to_neutral_everywhere() {
        let frame = vec![row("881103", "20250606", Some(12.0))];

        let scored = IndustryScorer::score(&frame, &[]).unwrap();
        let record = &scored[0];

        assert_eq!(record.net_amount_percentile, NEUTRAL_PERCENTILE);
        assert_eq!(record.d1_percentile, NEUTRAL_PERCENTILE);
        assert_eq!(record.d5_percentile, NEUTRAL_PERCENTILE);
        assert_eq!(record.rank, 1);
        assert!((record.net_amount - 12.0).abs() < 1e-12);
    }

    #[test]
    fn empty_frame_is_an_error() {
        assert!(IndustryScorer::score(&[], &[]).is_err());
    }
}
