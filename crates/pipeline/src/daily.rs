//! The daily fetch-and-score run.
//!
//! One run executes fetch → persist → score → persist sequentially and either
//! completes a stage or aborts the rest of the day. Raw frames land
//! first-write-wins; derived scores land last-write-wins. Because every write
//! is an upsert keyed on its conflict columns, re-running an aborted day is
//! safe.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info};

use aflow_core::{Clock, DailyTaskConfig, PipelineError, ScoreWeights, TradingCalendar};
use aflow_data::{
    DailyBasicRepository, DailyKlineRepository, DatabaseClient, IndustryFlowRepository,
    MoneyflowRepository, ScoreRepository,
};
use aflow_provider::TushareClient;
use aflow_scoring::{lookback_start, FlowHistoryStore, IndustryScorer, StockScorer};

use crate::retry::RetryingFetcher;
use crate::window::latest_trade_dates;

/// Orchestrates one anchor day end to end.
pub struct DailyPipeline {
    db: Arc<DatabaseClient>,
    provider: Arc<TushareClient>,
    clock: Arc<dyn Clock>,
    config: DailyTaskConfig,
    weights: ScoreWeights,
}

/// Percentile history backed by the persisted store.
struct StoreHistory {
    klines: DailyKlineRepository,
    moneyflow: MoneyflowRepository,
}

#[async_trait]
impl FlowHistoryStore for StoreHistory {
    async fn amount_history(
        &self,
        codes: &[String],
        start: &str,
        end: &str,
    ) -> Result<Vec<(String, f64)>> {
        self.klines.amount_history(codes, start, end).await
    }

    async fn net_flow_history(
        &self,
        codes: &[String],
        start: &str,
        end: &str,
    ) -> Result<Vec<(String, f64)>> {
        self.moneyflow.net_flow_history(codes, start, end).await
    }
}

impl DailyPipeline {
    /// Creates a pipeline over shared client handles.
    #[must_use]
    pub fn new(
        db: Arc<DatabaseClient>,
        provider: Arc<TushareClient>,
        clock: Arc<dyn Clock>,
        config: DailyTaskConfig,
        weights: ScoreWeights,
    ) -> Self {
        Self {
            db,
            provider,
            clock,
            config,
            weights,
        }
    }

    /// Runs the whole day for `anchor` (YYYYMMDD).
    ///
    /// Skips silently when the anchor is not a trading day. On failure the
    /// remaining stages are abandoned; stages already committed stay
    /// committed.
    ///
    /// # Errors
    /// Returns the [`PipelineError`] that aborted the run, or the transport
    /// error that broke a fetch.
    pub async fn run(&self, anchor: &str) -> Result<()> {
        match self.provider.is_open(anchor).await {
            Ok(true) => {}
            Ok(false) => {
                info!("{anchor} is not a trading day; skipping");
                return Ok(());
            }
            Err(e) => return Err(PipelineError::CalendarUnavailable(e.to_string()).into()),
        }

        let window =
            latest_trade_dates(self.provider.as_ref(), anchor, self.config.window_days).await?;
        let fetcher = RetryingFetcher::new(
            self.config.max_retries,
            self.config.wait_seconds,
            self.clock.as_ref(),
        );

        // Stage 1: per-stock capital flow.
        let provider = self.provider.clone();
        let moneyflow = fetcher
            .fetch_window("moneyflow", anchor, &window, move |date| {
                let provider = provider.clone();
                async move { provider.moneyflow(&date).await }
            })
            .await?
            .ok_or_else(|| self.exhausted("moneyflow", anchor))?;
        let repo = MoneyflowRepository::new(self.db.pool());
        let inserted = repo
            .upsert_batch(&moneyflow)
            .await
            .map_err(|e| persistence("a_stock_moneyflow", &e))?;
        info!("persisted {inserted} new moneyflow rows");

        // Stage 2: industry capital flow.
        let provider = self.provider.clone();
        let industry_flow = fetcher
            .fetch_window("industry moneyflow", anchor, &window, move |date| {
                let provider = provider.clone();
                async move { provider.industry_moneyflow(&date).await }
            })
            .await?
            .ok_or_else(|| self.exhausted("industry moneyflow", anchor))?;
        let industry_repo = IndustryFlowRepository::new(self.db.pool());
        let inserted = industry_repo
            .upsert_batch(&industry_flow)
            .await
            .map_err(|e| persistence("a_stock_moneyflow_industry", &e))?;
        info!("persisted {inserted} new industry flow rows");

        // Stage 3: daily fundamentals.
        let provider = self.provider.clone();
        let basics = fetcher
            .fetch_window("daily basic", anchor, &window, move |date| {
                let provider = provider.clone();
                async move { provider.daily_basic(&date).await }
            })
            .await?
            .ok_or_else(|| self.exhausted("daily basic", anchor))?;
        let inserted = DailyBasicRepository::new(self.db.pool())
            .upsert_batch(&basics)
            .await
            .map_err(|e| persistence("a_stock_daily_basic", &e))?;
        info!("persisted {inserted} new daily-basic rows");

        // Stage 4: daily bars.
        let provider = self.provider.clone();
        let klines = fetcher
            .fetch_window("daily kline", anchor, &window, move |date| {
                let provider = provider.clone();
                async move { provider.daily_kline(&date).await }
            })
            .await?
            .ok_or_else(|| self.exhausted("daily kline", anchor))?;
        let inserted = DailyKlineRepository::new(self.db.pool())
            .upsert_batch(&klines)
            .await
            .map_err(|e| persistence("a_stock_daily_k", &e))?;
        info!("persisted {inserted} new daily-kline rows");

        let score_repo = ScoreRepository::new(self.db.pool());

        // Stage 5: stock scores.
        info!("scoring {} days of stock money flow", window.len());
        let scorer = StockScorer::new(
            self.weights,
            self.config.history_days,
            self.config.chunk_size,
        );
        let history = StoreHistory {
            klines: DailyKlineRepository::new(self.db.pool()),
            moneyflow: MoneyflowRepository::new(self.db.pool()),
        };
        let stock_scores = scorer
            .score(&moneyflow, &basics, &klines, window.len(), &history)
            .await
            .map_err(|e| {
                error!("stock scoring failed: {e:#}");
                PipelineError::ComputationFailure {
                    stage: "stock score".to_string(),
                    reason: e.to_string(),
                }
            })?;
        let written = score_repo
            .upsert_stock_scores(&stock_scores)
            .await
            .map_err(|e| persistence("a_stock_moneyflow_score", &e))?;
        info!("persisted {written} stock scores");

        // Stage 6: industry scores.
        info!("scoring {} days of industry money flow", window.len());
        let industry_scores = self
            .score_industries(anchor, &industry_flow, &industry_repo)
            .await
            .map_err(|e| {
                error!("industry scoring failed: {e:#}");
                PipelineError::ComputationFailure {
                    stage: "industry score".to_string(),
                    reason: e.to_string(),
                }
            })?;
        let written = score_repo
            .upsert_industry_scores(&industry_scores)
            .await
            .map_err(|e| persistence("a_stock_moneyflow_industry_score", &e))?;
        info!("persisted {written} industry scores");

        Ok(())
    }

    /// Reads the trailing industry history and ranks the anchor day.
    async fn score_industries(
        &self,
        anchor: &str,
        frame: &[aflow_data::IndustryFlowRecord],
        repo: &IndustryFlowRepository,
    ) -> Result<Vec<aflow_data::IndustryScoreRecord>> {
        let start = lookback_start(anchor, self.config.history_days)?;
        let history = repo.history(&start, anchor).await?;
        IndustryScorer::score(frame, &history)
    }

    fn exhausted(&self, data_type: &str, anchor: &str) -> anyhow::Error {
        PipelineError::UpstreamDataExhausted {
            data_type: data_type.to_string(),
            anchor: anchor.to_string(),
            attempts: self.config.max_retries,
        }
        .into()
    }
}

fn persistence(table: &str, cause: &anyhow::Error) -> anyhow::Error {
    PipelineError::PersistenceFailure {
        table: table.to_string(),
        reason: format!("{cause:#}"),
    }
    .into()
}
