use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;

use aflow_core::{ConfigLoader, SystemClock};
use aflow_data::{
    DatabaseClient, IntradayBarRepository, NotificationRepository, WatchlistRepository,
};
use aflow_pipeline::{anchor_date, DailyPipeline, DailyScheduler, KlineBackfill};
use aflow_provider::{TushareClient, WecomChannel};
use aflow_watcher::TrendMonitor;

#[derive(Parser)]
#[command(name = "aflow")]
#[command(about = "A-share money-flow ETL and scoring pipeline", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "config/Config.toml", global = true)]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the cron-scheduled daily fetch-and-score pipeline
    Run,
    /// Run the daily pipeline once
    DailyTask {
        /// Anchor date (YYYYMMDD); defaults to yesterday
        #[arg(long)]
        date: Option<String>,
    },
    /// Watch the tuned basket for intraday trend flips
    Watch,
    /// Incrementally download 30-minute bars for a stock universe
    BackfillKline {
        /// CSV file with one instrument code per line
        #[arg(long)]
        universe: String,
    },
    /// Create the database schema and exit
    InitDb,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = ConfigLoader::load_from(&cli.config)?;
    let db = Arc::new(
        DatabaseClient::new(&config.database.url, config.database.max_connections).await?,
    );
    let provider = Arc::new(TushareClient::with_config(
        &config.tushare.api_url,
        config.tushare.token.clone(),
        config.tushare.rate_limit_per_minute,
    ));

    match cli.command {
        Commands::Run => {
            db.init_schema().await?;
            let pipeline = Arc::new(DailyPipeline::new(
                db.clone(),
                provider,
                Arc::new(SystemClock),
                config.daily.clone(),
                config.weights,
            ));
            DailyScheduler::new(config.daily, pipeline).start().await?;
        }
        Commands::DailyTask { date } => {
            db.init_schema().await?;
            let pipeline = DailyPipeline::new(
                db.clone(),
                provider,
                Arc::new(SystemClock),
                config.daily.clone(),
                config.weights,
            );
            let anchor = date.unwrap_or_else(anchor_date);
            pipeline.run(&anchor).await?;
        }
        Commands::Watch => {
            let notifier = Arc::new(WecomChannel::new(config.notify.webhook_url.clone()));
            let monitor = TrendMonitor::new(
                provider,
                WatchlistRepository::new(db.pool()),
                NotificationRepository::new(db.pool()),
                notifier,
                config.watcher,
            );
            monitor.run().await;
        }
        Commands::BackfillKline { universe } => {
            db.init_schema().await?;
            let codes = read_universe(&universe)?;
            let backfill = KlineBackfill::new(
                provider,
                IntradayBarRepository::new(db.pool()),
                config.watcher.bar_freq.clone(),
            );
            backfill.run(&codes).await?;
        }
        Commands::InitDb => {
            db.init_schema().await?;
            info!("Schema ready");
        }
    }

    Ok(())
}

/// Reads an instrument universe from a headerless one-column CSV.
fn read_universe(path: &str) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    let mut codes = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let Some(code) = record.get(0) {
            let code = code.trim();
            if !code.is_empty() {
                codes.push(code.to_string());
            }
        }
    }
    Ok(codes)
}
