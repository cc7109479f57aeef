use std::path::PathBuf;
use std::sync::Arc;

use covid_ingest_import::LogProgress;

use crate::CliError;
use crate::scheduler::{self, Scheduler};
use crate::settings::Settings;

use super::{build_runtime, feed_source, open_store, pipelines};

/// Run both pipelines now and then every `settings.interval` until Ctrl-C.
pub(crate) fn run_schedule(settings: &Settings, csv_dir: Option<PathBuf>) -> Result<(), CliError> {
    let store = open_store(settings)?;
    let source = feed_source(settings, csv_dir)?;

    let mut scheduler = Scheduler::new(settings.interval);
    for pipeline in pipelines(&store, &source, None) {
        scheduler.add(pipeline, Arc::new(LogProgress));
    }

    let rt = build_runtime()?;
    rt.block_on(scheduler.run_until(scheduler::ctrl_c()));
    Ok(())
}
