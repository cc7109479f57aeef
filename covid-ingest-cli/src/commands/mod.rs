pub(crate) mod config;
pub(crate) mod query;
pub(crate) mod refresh;
pub(crate) mod schedule;

use std::path::PathBuf;
use std::sync::Arc;

use covid_ingest_db::Store;
use covid_ingest_import::{ConfirmedAndDeathsPipeline, Pipeline, RecoveriesPipeline};
use covid_ingest_source::{CsvSource, DirSource, HttpSource};

use crate::CliError;
use crate::cli_types::PipelineChoice;
use crate::settings::Settings;

/// Open (creating if needed) the database the pipelines write to.
pub(crate) fn open_store(settings: &Settings) -> Result<Store, CliError> {
    Store::open(&settings.database).map_err(|e| {
        CliError::database(format!(
            "Failed to open database at {}: {}",
            settings.database.display(),
            e
        ))
    })
}

/// Feed source: a local directory when given, otherwise HTTP.
///
/// The HTTP client is blocking, so this must run outside the tokio runtime.
pub(crate) fn feed_source(
    settings: &Settings,
    csv_dir: Option<PathBuf>,
) -> Result<Arc<dyn CsvSource>, CliError> {
    match csv_dir {
        Some(dir) => {
            if !dir.is_dir() {
                return Err(CliError::config(format!(
                    "CSV directory not found: {}",
                    dir.display()
                )));
            }
            log::info!("Reading feeds from {}", dir.display());
            Ok(Arc::new(DirSource::new(dir)))
        }
        None => {
            log::debug!("Downloading feeds from {}", settings.base_url);
            Ok(Arc::new(HttpSource::new(&settings.base_url, settings.timeout)?))
        }
    }
}

/// The pipelines selected by `only`, all sharing one store and source.
pub(crate) fn pipelines(
    store: &Store,
    source: &Arc<dyn CsvSource>,
    only: Option<PipelineChoice>,
) -> Vec<Arc<dyn Pipeline>> {
    let mut pipelines: Vec<Arc<dyn Pipeline>> = Vec::new();
    if only.is_none_or(|o| o == PipelineChoice::ConfirmedDeaths) {
        pipelines.push(Arc::new(ConfirmedAndDeathsPipeline::new(
            store.clone(),
            source.clone(),
        )));
    }
    if only.is_none_or(|o| o == PipelineChoice::Recoveries) {
        pipelines.push(Arc::new(RecoveriesPipeline::new(
            store.clone(),
            source.clone(),
        )));
    }
    pipelines
}

pub(crate) fn build_runtime() -> Result<tokio::runtime::Runtime, CliError> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::runtime(format!("Failed to create tokio runtime: {}", e)))
}
