//! Shared pieces of the two ingestion pipelines.

use covid_ingest_db::{IngestionLog, insert_ingestion_log};
use rusqlite::Transaction;

use crate::error::PipelineError;
use crate::progress::ImportProgress;

/// Counts from one committed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub locations: u64,
    pub dates: u64,
    pub observations: u64,
    /// Steps where a cumulative count went down and the daily delta was
    /// clamped to zero.
    pub regressions: u64,
}

impl std::fmt::Display for RunStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} locations over {} dates, {} observations, {} regressions",
            self.locations, self.dates, self.observations, self.regressions
        )
    }
}

/// A runnable ingestion job.
///
/// Implementations own their storage handle and feed source; `run` may be
/// called repeatedly and each call is one independent batch.
pub trait Pipeline: Send + Sync {
    /// Stable name used in logs and in the ingestion log table.
    fn name(&self) -> &'static str;

    fn run(&self, progress: Option<&dyn ImportProgress>) -> Result<RunStats, PipelineError>;
}

/// Record the run in the ingestion log and commit the batch.
pub(crate) fn commit_run(
    tx: Transaction<'_>,
    pipeline: &str,
    stats: &RunStats,
) -> Result<(), PipelineError> {
    let log_entry = IngestionLog {
        id: 0,
        pipeline: pipeline.to_string(),
        finished_at: chrono::Utc::now().to_rfc3339(),
        locations: stats.locations as i64,
        observations: stats.observations as i64,
        regressions: stats.regressions as i64,
    };
    insert_ingestion_log(&tx, &log_entry)?;
    tx.commit()?;
    Ok(())
}
