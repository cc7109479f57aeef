use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::CliError;
use crate::cli_types::PipelineChoice;
use crate::scheduler::Scheduler;
use crate::settings::Settings;
use crate::spinner::{SpinnerPool, SpinnerProgress};

use super::{build_runtime, feed_source, open_store, pipelines};

/// Run the selected pipelines once, concurrently.
///
/// Fails if any run failed; the other runs still commit.
pub(crate) fn run_refresh(
    settings: &Settings,
    only: Option<PipelineChoice>,
    csv_dir: Option<PathBuf>,
    quiet: bool,
) -> Result<(), CliError> {
    let store = open_store(settings)?;
    let source = feed_source(settings, csv_dir)?;
    let pipelines = pipelines(&store, &source, only);
    let expected = pipelines.len();

    let pool = Arc::new(Mutex::new(SpinnerPool::new(expected, quiet)));
    let mut scheduler = Scheduler::new(settings.interval);
    for (key, pipeline) in pipelines.into_iter().enumerate() {
        let progress = SpinnerProgress::new(pool.clone(), key, pipeline.name());
        scheduler.add(pipeline, Arc::new(progress));
    }

    let rt = build_runtime()?;
    let outcomes = rt.block_on(scheduler.run_once());
    if let Ok(mut pool) = pool.lock() {
        pool.clear_all();
    }

    let finished = outcomes.len();
    let mut failures = outcomes.into_iter().filter_map(|o| o.result.err());
    match failures.next() {
        Some(e) => Err(e.into()),
        None if finished < expected => Err(CliError::other(format!(
            "{} of {} pipeline runs aborted",
            expected - finished,
            expected
        ))),
        None => {
            log::info!("Database: {}", settings.database.display());
            Ok(())
        }
    }
}
