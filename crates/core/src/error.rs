//! Error types for the daily pipeline.
//!
//! Distinguishes calendar outages, exhausted upstream polling, scoring
//! failures, and persistence failures so the orchestrator can decide what to
//! abort and what to leave committed.

use thiserror::Error;

/// Errors that can abort a daily run or one of its stages.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The trading calendar could not be queried. Not retried locally.
    #[error("trading calendar unavailable: {0}")]
    CalendarUnavailable(String),

    /// The upstream source never published the anchor day within the retry budget.
    #[error("no {data_type} rows for {anchor} after {attempts} attempts")]
    UpstreamDataExhausted {
        /// Logical data-type label, e.g. "moneyflow".
        data_type: String,
        /// Anchor trading date in YYYYMMDD form.
        anchor: String,
        /// Attempts made before giving up.
        attempts: u32,
    },

    /// A scoring stage failed. Earlier stages' committed upserts stand.
    #[error("{stage} scoring failed: {reason}")]
    ComputationFailure {
        /// Stage label, e.g. "stock score".
        stage: String,
        /// Underlying cause.
        reason: String,
    },

    /// An upsert failed. The remainder of the day's pipeline is abandoned.
    #[error("failed to persist {table}: {reason}")]
    PersistenceFailure {
        /// Target relation.
        table: String,
        /// Underlying cause.
        reason: String,
    },
}
