//! Ingest the recoveries feed.

use std::sync::Arc;

use covid_ingest_core::DeltaTracker;
use covid_ingest_db::{RecoveriesRecord, Store, upsert_recoveries};
use covid_ingest_source::{CsvSource, Dataset, WideCsvReader};

use crate::error::PipelineError;
use crate::pipeline::{Pipeline, RunStats, commit_run};
use crate::progress::ImportProgress;

pub struct RecoveriesPipeline {
    store: Store,
    source: Arc<dyn CsvSource>,
}

impl RecoveriesPipeline {
    pub const NAME: &'static str = "recoveries";

    pub fn new(store: Store, source: Arc<dyn CsvSource>) -> Self {
        Self { store, source }
    }

    /// Run one batch. Nothing is committed unless the whole feed was read
    /// and written.
    pub fn run(&self, progress: Option<&dyn ImportProgress>) -> Result<RunStats, PipelineError> {
        if let Some(p) = progress {
            p.on_phase(&format!(
                "Ingesting recoveries from {}",
                self.source.describe(Dataset::Recoveries)
            ));
        }

        let mut rows = WideCsvReader::new(self.source.open(Dataset::Recoveries)?)?;
        let dates = rows.header().dates.clone();

        let mut stats = RunStats {
            dates: dates.len() as u64,
            ..RunStats::default()
        };
        let mut deltas = DeltaTracker::new();

        let conn = self.store.lock()?;
        let tx = conn.unchecked_transaction()?;

        while let Some(row) = rows.next_row()? {
            deltas.reset();

            for (date, &cumulative) in dates.iter().zip(&row.counts) {
                let before = deltas.regressions();
                let record = RecoveriesRecord {
                    location: &row.location,
                    date: *date,
                    recoveries: deltas.advance(cumulative),
                };
                if deltas.regressions() > before {
                    log::debug!(
                        "Recoveries decreased for {} on {date}; daily delta clamped to 0",
                        row.location.label()
                    );
                }

                upsert_recoveries(&tx, &record)?;
                stats.observations += 1;
            }

            stats.locations += 1;
            if let Some(p) = progress {
                p.on_location(stats.locations, &row.location.label());
            }
        }

        stats.regressions = deltas.regressions();
        commit_run(tx, Self::NAME, &stats)?;

        log::info!("{}: committed {stats}", Self::NAME);
        if let Some(p) = progress {
            p.on_complete(&format!("Recoveries: {stats}"));
        }
        Ok(stats)
    }
}

impl Pipeline for RecoveriesPipeline {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn run(&self, progress: Option<&dyn ImportProgress>) -> Result<RunStats, PipelineError> {
        RecoveriesPipeline::run(self, progress)
    }
}
