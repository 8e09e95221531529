//! Cron wrapper around the daily pipeline.

use anyhow::Result;
use chrono::{Days, Local};
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use aflow_core::DailyTaskConfig;

use crate::daily::DailyPipeline;

pub struct DailyScheduler {
    config: DailyTaskConfig,
    pipeline: Arc<DailyPipeline>,
}

impl DailyScheduler {
    /// Creates a new daily scheduler.
    #[must_use]
    pub fn new(config: DailyTaskConfig, pipeline: Arc<DailyPipeline>) -> Self {
        Self { config, pipeline }
    }

    /// Starts the scheduler and runs according to the cron schedule.
    ///
    /// Each firing targets the previous calendar day, matching the upstream
    /// publication lag. A failed run is logged and the scheduler simply waits
    /// for the next trigger.
    ///
    /// # Errors
    /// Returns an error if the scheduler fails to start or if job scheduling
    /// fails.
    pub async fn start(self) -> Result<()> {
        if !self.config.enabled {
            info!("Daily scheduler is disabled");
            return Ok(());
        }

        info!(
            "Starting daily scheduler with cron: {}",
            self.config.cron_schedule
        );

        let scheduler = JobScheduler::new().await?;
        let pipeline = self.pipeline.clone();

        let job = Job::new_async(self.config.cron_schedule.as_str(), move |_uuid, _lock| {
            let pipeline = pipeline.clone();
            Box::pin(async move {
                let anchor = anchor_date();
                info!("Daily task fired for {anchor}");
                if let Err(e) = pipeline.run(&anchor).await {
                    error!("Daily task failed: {e:#}");
                }
            })
        })?;

        scheduler.add(job).await?;
        scheduler.start().await?;

        info!("Daily scheduler started successfully");

        // Keep scheduler running
        loop {
            tokio::time::sleep(tokio::time::Duration::from_secs(60)).await;
        }
    }

    /// Runs the pipeline once for `anchor`, outside the schedule.
    ///
    /// # Errors
    /// Returns whatever error aborted the run.
    pub async fn run_once(&self, anchor: &str) -> Result<()> {
        self.pipeline.run(anchor).await
    }
}

/// The day a scheduled firing is "for": yesterday, local time.
#[must_use]
pub fn anchor_date() -> String {
    (Local::now().date_naive() - Days::new(1))
        .format("%Y%m%d")
        .to_string()
}
