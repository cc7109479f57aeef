//! Ingestion pipelines that load the upstream feeds into the time-series
//! database.
//!
//! Each pipeline streams its feed(s) row by row, turns the cumulative counts
//! into daily deltas, and upserts every observation inside one transaction.
//! A run either commits completely, together with its `ingestion_log` row, or
//! leaves the database untouched.

pub mod confirmed_deaths;
pub mod error;
pub mod pipeline;
pub mod progress;
pub mod recoveries;

pub use confirmed_deaths::ConfirmedAndDeathsPipeline;
pub use error::{FailureKind, PipelineError};
pub use pipeline::{Pipeline, RunStats};
pub use progress::{ImportProgress, LogProgress, SilentProgress};
pub use recoveries::RecoveriesPipeline;
