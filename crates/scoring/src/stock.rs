//! Cross-sectional stock money-flow scoring.
//!
//! Joins windowed capital-flow rows to fundamentals, aggregates per
//! instrument, normalizes every sub-metric within its market-cap bucket, and
//! ranks the re-normalized weighted composite. Historical percentile ranks
//! are computed against the persisted store, one chunk of instruments at a
//! time, so the working set stays bounded for the full market.

use anyhow::{bail, Result};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use aflow_core::ScoreWeights;
use aflow_data::{DailyBasicRecord, DailyKlineRecord, MoneyflowRecord, StockScoreRecord};

use crate::history::{group_by_code, lookback_start, FlowHistoryStore};
use crate::normalize::{
    dense_ranks_sorted_desc, ewm_mean, group_indices, normalize_grouped, round_to,
};
use crate::percentile::{percentile_of_score, NEUTRAL_PERCENTILE};

/// Scores the stock universe for one anchor day.
pub struct StockScorer {
    weights: ScoreWeights,
    history_days: i64,
    chunk_size: usize,
}

#[derive(Default)]
struct FlowAccum {
    elg: f64,
    lg: f64,
    md: f64,
    sm: f64,
    /// Float cap and bucket of the latest joined fundamentals row
    circ_mv: Option<f64>,
    bucket: Option<String>,
    turnover: Vec<f64>,
    volume_ratio: Vec<f64>,
    net_flow: Vec<f64>,
}

impl StockScorer {
    /// Creates a scorer with the given composite weights and history depth.
    #[must_use]
    pub fn new(weights: ScoreWeights, history_days: i64, chunk_size: usize) -> Self {
        Self {
            weights,
            history_days,
            chunk_size,
        }
    }

    /// Scores one window of frames.
    ///
    /// Preconditions (established by the fetch stage, not re-validated):
    /// frames cover the trailing window including the anchor day and are
    /// sorted ascending by trade date.
    ///
    /// # Errors
    /// Returns an error if the frames are empty, no instrument carries a
    /// market cap, or a history query fails. The caller treats any error as
    /// an aborted scoring stage.
    pub async fn score(
        &self,
        moneyflow: &[MoneyflowRecord],
        basics: &[DailyBasicRecord],
        klines: &[DailyKlineRecord],
        window_days: usize,
        store: &dyn FlowHistoryStore,
    ) -> Result<Vec<StockScoreRecord>> {
        let Some(anchor) = moneyflow.iter().map(|r| r.trade_date.as_str()).max() else {
            bail!("moneyflow frame is empty");
        };
        let anchor = anchor.to_string();

        let basics_by_key: HashMap<(&str, &str), &DailyBasicRecord> = basics
            .iter()
            .map(|b| ((b.ts_code.as_str(), b.trade_date.as_str()), b))
            .collect();

        // Window traded value per instrument, chronological.
        let mut window_amounts: HashMap<&str, Vec<f64>> = HashMap::new();
        for k in klines {
            if let Some(amount) = k.amount {
                window_amounts.entry(k.ts_code.as_str()).or_default().push(amount);
            }
        }

        // Left-join flows to fundamentals and aggregate per instrument.
        // BTreeMap keeps the cross-section deterministic.
        let mut accums: BTreeMap<String, FlowAccum> = BTreeMap::new();
        for row in moneyflow {
            let acc = accums.entry(row.ts_code.clone()).or_default();
            acc.elg += row.net_elg();
            acc.lg += row.net_lg();
            acc.md += row.net_md();
            acc.sm += row.net_sm();
            if let Some(net) = row.net_mf_amount {
                acc.net_flow.push(net);
            }
            if let Some(basic) = basics_by_key.get(&(row.ts_code.as_str(), row.trade_date.as_str()))
            {
                if basic.circ_mv.is_some() {
                    acc.circ_mv = basic.circ_mv;
                    acc.bucket.clone_from(&basic.circ_mv_range);
                }
                if let Some(turnover) = basic.turnover_rate {
                    acc.turnover.push(turnover);
                }
                if let Some(ratio) = basic.volume_ratio {
                    acc.volume_ratio.push(ratio);
                }
            }
        }

        let mut codes = Vec::new();
        let mut buckets = Vec::new();
        let mut elg_ratio = Vec::new();
        let mut lg_ratio = Vec::new();
        let mut md_ratio = Vec::new();
        let mut sm_ratio = Vec::new();
        let mut turnover_mean = Vec::new();
        let mut volume_ratio_mean = Vec::new();
        let mut net_flow_windows = Vec::new();
        let mut skipped = 0usize;

        for (code, acc) in &accums {
            let (Some(circ_mv), Some(bucket)) = (acc.circ_mv, acc.bucket.as_ref()) else {
                skipped += 1;
                continue;
            };
            if circ_mv <= 0.0 {
                skipped += 1;
                continue;
            }
            codes.push(code.clone());
            buckets.push(bucket.clone());
            elg_ratio.push(round_to(acc.elg / circ_mv * 100.0, 4));
            lg_ratio.push(round_to(acc.lg / circ_mv * 100.0, 4));
            md_ratio.push(round_to(acc.md / circ_mv * 100.0, 4));
            sm_ratio.push(round_to(acc.sm / circ_mv * 100.0, 4));
            turnover_mean.push(ewm_mean(&acc.turnover, window_days).unwrap_or(0.0));
            volume_ratio_mean.push(ewm_mean(&acc.volume_ratio, window_days).unwrap_or(0.0));
            net_flow_windows.push(acc.net_flow.clone());
        }
        if codes.is_empty() {
            bail!("no instrument in the window carries a market cap");
        }
        if skipped > 0 {
            debug!("skipped {} instruments without fundamentals", skipped);
        }

        let groups = group_indices(&buckets);
        let elg_score = normalize_grouped(&elg_ratio, &groups);
        let lg_score = normalize_grouped(&lg_ratio, &groups);
        let md_score = normalize_grouped(&md_ratio, &groups);
        let sm_score = normalize_grouped(&sm_ratio, &groups);
        let turnover_score = normalize_grouped(&turnover_mean, &groups);
        let volume_ratio_score = normalize_grouped(&volume_ratio_mean, &groups);

        let w = self.weights;
        let composite_raw: Vec<f64> = (0..codes.len())
            .map(|i| {
                w.extra_large * elg_score[i]
                    + w.large * lg_score[i]
                    + w.medium * md_score[i]
                    + w.small * sm_score[i]
                    + w.turnover * turnover_score[i]
                    + w.volume_ratio * volume_ratio_score[i]
            })
            .collect();
        let composite = normalize_grouped(&composite_raw, &groups);

        let mut order: Vec<usize> = (0..codes.len()).collect();
        order.sort_by(|&a, &b| {
            composite[b]
                .partial_cmp(&composite[a])
                .unwrap_or(Ordering::Equal)
                .then_with(|| codes[a].cmp(&codes[b]))
        });
        let sorted_composite: Vec<f64> = order.iter().map(|&i| round_to(composite[i], 2)).collect();
        let ranks = dense_ranks_sorted_desc(&sorted_composite);

        let (amount_history, net_flow_history) = self.fetch_histories(&codes, &anchor, store).await?;

        let mut records = Vec::with_capacity(order.len());
        for (pos, &i) in order.iter().enumerate() {
            let code = &codes[i];
            let amount_percentile = percentile_against(
                amount_history.get(code),
                ewm_mean(
                    window_amounts.get(code.as_str()).map_or(&[][..], Vec::as_slice),
                    window_days,
                ),
            );
            let net_flow_percentile = percentile_against(
                net_flow_history.get(code),
                ewm_mean(&net_flow_windows[i], window_days),
            );

            records.push(StockScoreRecord {
                trade_date: anchor.clone(),
                ts_code: code.clone(),
                window_days: window_days as i32,
                rank: ranks[pos],
                cap_bucket: buckets[i].clone(),
                elg_ratio: elg_ratio[i],
                elg_score: round_to(elg_score[i], 2),
                lg_ratio: lg_ratio[i],
                lg_score: round_to(lg_score[i], 2),
                md_ratio: md_ratio[i],
                md_score: round_to(md_score[i], 2),
                sm_ratio: sm_ratio[i],
                sm_score: round_to(sm_score[i], 2),
                turnover_mean: round_to(turnover_mean[i], 2),
                turnover_score: round_to(turnover_score[i], 2),
                volume_ratio_mean: round_to(volume_ratio_mean[i], 2),
                volume_ratio_score: round_to(volume_ratio_score[i], 2),
                amount_percentile: round_to(amount_percentile, 2),
                net_flow_percentile: round_to(net_flow_percentile, 2),
                composite: sorted_composite[pos],
            });
        }
        Ok(records)
    }

    /// Reads both 365-day histories for the scored universe, one chunk of
    /// instruments per query.
    async fn fetch_histories(
        &self,
        codes: &[String],
        anchor: &str,
        store: &dyn FlowHistoryStore,
    ) -> Result<(HashMap<String, Vec<f64>>, HashMap<String, Vec<f64>>)> {
        let start = lookback_start(anchor, self.history_days)?;
        let mut amounts: HashMap<String, Vec<f64>> = HashMap::new();
        let mut net_flows: HashMap<String, Vec<f64>> = HashMap::new();
        for chunk in codes.chunks(self.chunk_size.max(1)) {
            amounts.extend(group_by_code(
                store.amount_history(chunk, &start, anchor).await?,
            ));
            net_flows.extend(group_by_code(
                store.net_flow_history(chunk, &start, anchor).await?,
            ));
        }
        Ok((amounts, net_flows))
    }
}

/// Percentile of the current EW mean against a stored history, neutral when
/// either side is missing or too short.
fn percentile_against(history: Option<&Vec<f64>>, current: Option<f64>) -> f64 {
    match (history, current) {
        (Some(history), Some(current)) => percentile_of_score(history, current),
        _ => NEUTRAL_PERCENTILE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct FakeStore {
        amounts: Vec<(String, f64)>,
        net_flows: Vec<(String, f64)>,
        chunk_sizes: Mutex<Vec<usize>>,
    }

    impl FakeStore {
        fn empty() -> Self {
            Self {
                amounts: Vec::new(),
                net_flows: Vec::new(),
                chunk_sizes: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl FlowHistoryStore for FakeStore {
        async fn amount_history(
            &self,
            codes: &[String],
            _start: &str,
            _end: &str,
        ) -> Result<Vec<(String, f64)>> {
            self.chunk_sizes.lock().unwrap().push(codes.len());
            Ok(self
                .amounts
                .iter()
                .filter(|(c, _)| codes.contains(c))
                .cloned()
                .collect())
        }

        async fn net_flow_history(
            &self,
            codes: &[String],
            _start: &str,
            _end: &str,
        ) -> Result<Vec<(String, f64)>> {
            Ok(self
                .net_flows
                .iter()
                .filter(|(c, _)| codes.contains(c))
                .cloned()
                .collect())
        }
    }

    fn flow(code: &str, date: &str, buy_elg: f64, sell_elg: f64) -> MoneyflowRecord {
        MoneyflowRecord {
            ts_code: code.to_string(),
            trade_date: date.to_string(),
            buy_sm_amount: Some(10.0),
            sell_sm_amount: Some(10.0),
            buy_md_amount: Some(10.0),
            sell_md_amount: Some(10.0),
            buy_lg_amount: Some(10.0),
            sell_lg_amount: Some(10.0),
            buy_elg_amount: Some(buy_elg),
            sell_elg_amount: Some(sell_elg),
            net_mf_amount: Some(buy_elg - sell_elg),
        }
    }

    fn basic(code: &str, date: &str, turnover: f64, volume_ratio: f64) -> DailyBasicRecord {
        DailyBasicRecord {
            ts_code: code.to_string(),
            trade_date: date.to_string(),
            close: Some(10.0),
            turnover_rate: Some(turnover),
            turnover_rate_f: None,
            volume_ratio: Some(volume_ratio),
            pe: None,
            pe_ttm: None,
            pb: None,
            ps: None,
            ps_ttm: None,
            dv_ratio: None,
            dv_ttm: None,
            total_share: None,
            float_share: None,
            free_share: None,
            total_mv: None,
            circ_mv: Some(150_000.0),
            circ_mv_range: Some("0-20".to_string()),
        }
    }

    fn kline(code: &str, date: &str, amount: f64) -> DailyKlineRecord {
        DailyKlineRecord {
            ts_code: code.to_string(),
            trade_date: date.to_string(),
            open: Some(10.0),
            high: Some(11.0),
            low: Some(9.0),
            close: Some(10.5),
            pre_close: Some(10.0),
            change: Some(0.5),
            pct_chg: Some(5.0),
            vol: Some(1000.0),
            amount: Some(amount),
        }
    }

    #[tokio::test]
    async fn stronger_inflow_wins_rank_one_within_bucket() {
        let scorer = StockScorer::new(ScoreWeights::default(), 365, 500);
        let moneyflow = vec![
            flow("000001.SZ", "20250603", 5000.0, 1000.0),
            flow("000002.SZ", "20250603", 1000.0, 5000.0),
        ];
        let basics = vec![
            basic("000001.SZ", "20250603", 8.0, 2.0),
            basic("000002.SZ", "20250603", 1.0, 0.5),
        ];
        let klines = vec![
            kline("000001.SZ", "20250603", 90_000.0),
            kline("000002.SZ", "20250603", 30_000.0),
        ];

        let store = FakeStore::empty();
        let records = scorer
            .score(&moneyflow, &basics, &klines, 3, &store)
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].ts_code, "000001.SZ");
        assert_eq!(records[0].rank, 1);
        assert_eq!(records[1].rank, 2);
        assert!(records[0].composite > records[1].composite);
        // No stored history: percentiles fall back to neutral.
        assert_eq!(records[0].amount_percentile, NEUTRAL_PERCENTILE);
        assert_eq!(records[0].net_flow_percentile, NEUTRAL_PERCENTILE);
        assert_eq!(records[0].trade_date, "20250603");
        assert_eq!(records[0].window_days, 3);
        assert_eq!(records[0].cap_bucket, "0-20");
    }

    #[tokio::test]
    async fn multi_day_flows_sum_and_cap_comes_from_last_day() {
        let scorer = StockScorer::new(ScoreWeights::default(), 365, 500);
        let moneyflow = vec![
            flow("000001.SZ", "20250601", 2000.0, 0.0),
            flow("000002.SZ", "20250601", 2000.0, 0.0),
            flow("000001.SZ", "20250603", 3000.0, 0.0),
            flow("000002.SZ", "20250603", 0.0, 4000.0),
        ];
        let basics = vec![
            basic("000001.SZ", "20250601", 4.0, 1.0),
            basic("000002.SZ", "20250601", 4.0, 1.0),
            basic("000001.SZ", "20250603", 4.0, 1.0),
            basic("000002.SZ", "20250603", 4.0, 1.0),
        ];
        let klines = vec![
            kline("000001.SZ", "20250601", 50_000.0),
            kline("000002.SZ", "20250601", 50_000.0),
            kline("000001.SZ", "20250603", 60_000.0),
            kline("000002.SZ", "20250603", 40_000.0),
        ];

        let store = FakeStore::empty();
        let records = scorer
            .score(&moneyflow, &basics, &klines, 3, &store)
            .await
            .unwrap();

        // 000001 summed +5000 extra-large vs 000002's -2000.
        let top = &records[0];
        assert_eq!(top.ts_code, "000001.SZ");
        assert!((top.elg_ratio - round_to(5000.0 / 150_000.0 * 100.0, 4)).abs() < 1e-9);
        assert_eq!(top.trade_date, "20250603");
    }

    #[tokio::test]
    async fn history_reads_are_chunked_and_feed_percentiles() {
        let scorer = StockScorer::new(ScoreWeights::default(), 365, 1);
        let moneyflow = vec![
            flow("000001.SZ", "20250603", 5000.0, 1000.0),
            flow("000002.SZ", "20250603", 1000.0, 5000.0),
        ];
        let basics = vec![
            basic("000001.SZ", "20250603", 8.0, 2.0),
            basic("000002.SZ", "20250603", 1.0, 0.5),
        ];
        let klines = vec![
            kline("000001.SZ", "20250603", 30.0),
            kline("000002.SZ", "20250603", 30.0),
        ];

        let code = "000001.SZ".to_string();
        let store = FakeStore {
            // History [10,20,30,40,50]; the single-day window EW mean is 30.
            amounts: [10.0, 20.0, 30.0, 40.0, 50.0]
                .iter()
                .map(|&v| (code.clone(), v))
                .collect(),
            net_flows: Vec::new(),
            chunk_sizes: Mutex::new(Vec::new()),
        };

        let records = scorer
            .score(&moneyflow, &basics, &klines, 3, &store)
            .await
            .unwrap();

        // chunk_size = 1 forces one query per instrument.
        assert_eq!(*store.chunk_sizes.lock().unwrap(), vec![1, 1]);
        let top = records.iter().find(|r| r.ts_code == code).unwrap();
        assert!((top.amount_percentile - 60.0).abs() < 1e-9);
        assert_eq!(top.net_flow_percentile, NEUTRAL_PERCENTILE);
    }
}
