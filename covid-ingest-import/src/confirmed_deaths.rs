//! Ingest the paired confirmed-cases and deaths feeds.
//!
//! Both feeds are read in lockstep through a [`PairedRowReader`]; row *i* of
//! one must describe the same location as row *i* of the other. Every
//! (location, date) becomes one row carrying both counts and their deltas.

use std::sync::Arc;

use covid_ingest_core::DeltaTracker;
use covid_ingest_db::{ConfirmedDeathsRecord, Store, upsert_confirmed_and_deaths};
use covid_ingest_source::{CsvSource, Dataset, PairedRowReader, WideCsvReader};

use crate::error::PipelineError;
use crate::pipeline::{Pipeline, RunStats, commit_run};
use crate::progress::ImportProgress;

pub struct ConfirmedAndDeathsPipeline {
    store: Store,
    source: Arc<dyn CsvSource>,
}

impl ConfirmedAndDeathsPipeline {
    pub const NAME: &'static str = "confirmed-deaths";

    pub fn new(store: Store, source: Arc<dyn CsvSource>) -> Self {
        Self { store, source }
    }

    /// Run one batch. Nothing is committed unless every row of both feeds
    /// was read and written.
    pub fn run(&self, progress: Option<&dyn ImportProgress>) -> Result<RunStats, PipelineError> {
        if let Some(p) = progress {
            p.on_phase(&format!(
                "Ingesting confirmed cases and deaths from {} and {}",
                self.source.describe(Dataset::Confirmed),
                self.source.describe(Dataset::Deaths)
            ));
        }

        let confirmed = WideCsvReader::new(self.source.open(Dataset::Confirmed)?)?;
        let deaths = WideCsvReader::new(self.source.open(Dataset::Deaths)?)?;
        let mut rows = PairedRowReader::new(
            Dataset::Confirmed.name(),
            confirmed,
            Dataset::Deaths.name(),
            deaths,
        )?;
        let dates = rows.header().dates.clone();

        let mut stats = RunStats {
            dates: dates.len() as u64,
            ..RunStats::default()
        };
        let mut confirmed_deltas = DeltaTracker::new();
        let mut death_deltas = DeltaTracker::new();

        let conn = self.store.lock()?;
        let tx = conn.unchecked_transaction()?;

        while let Some((confirmed_row, deaths_row)) = rows.next_pair()? {
            confirmed_deltas.reset();
            death_deltas.reset();
            let location = &confirmed_row.location;

            let counts = confirmed_row.counts.iter().zip(&deaths_row.counts);
            for (date, (&confirmed, &deaths)) in dates.iter().zip(counts) {
                let before = confirmed_deltas.regressions() + death_deltas.regressions();
                let record = ConfirmedDeathsRecord {
                    location,
                    date: *date,
                    confirmed: confirmed_deltas.advance(confirmed),
                    deaths: death_deltas.advance(deaths),
                };
                if confirmed_deltas.regressions() + death_deltas.regressions() > before {
                    log::debug!(
                        "Cumulative count decreased for {} on {date}; daily delta clamped to 0",
                        location.label()
                    );
                }

                upsert_confirmed_and_deaths(&tx, &record)?;
                stats.observations += 1;
            }

            stats.locations += 1;
            if let Some(p) = progress {
                p.on_location(stats.locations, &location.label());
            }
        }

        stats.regressions = confirmed_deltas.regressions() + death_deltas.regressions();
        commit_run(tx, Self::NAME, &stats)?;

        log::info!("{}: committed {stats}", Self::NAME);
        if let Some(p) = progress {
            p.on_complete(&format!("Confirmed cases and deaths: {stats}"));
        }
        Ok(stats)
    }
}

impl Pipeline for ConfirmedAndDeathsPipeline {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn run(&self, progress: Option<&dyn ImportProgress>) -> Result<RunStats, PipelineError> {
        ConfirmedAndDeathsPipeline::run(self, progress)
    }
}
