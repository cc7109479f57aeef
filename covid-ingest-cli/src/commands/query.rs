//! Read-only commands. Each prints its result as JSON on stdout.

use std::io::Write;

use covid_ingest_core::StatusKind;
use rusqlite::Connection;
use serde::Serialize;

use crate::CliError;
use crate::settings::Settings;

/// Open the database for reading, or `None` if nothing has been ingested yet.
fn open_existing(settings: &Settings) -> Result<Option<Connection>, CliError> {
    if !settings.database.exists() {
        log::warn!("No database found at {}", settings.database.display());
        log::info!("Run 'covid-ingest refresh' to create one.");
        return Ok(None);
    }
    covid_ingest_db::open_database(&settings.database)
        .map(Some)
        .map_err(|e| CliError::database(format!("Failed to open database: {}", e)))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

pub(crate) fn run_countries(settings: &Settings) -> Result<(), CliError> {
    let Some(conn) = open_existing(settings)? else {
        return Ok(());
    };
    let countries = covid_ingest_db::list_countries(&conn)
        .map_err(|e| CliError::database(format!("Failed to list countries: {}", e)))?;
    print_json(&countries)
}

pub(crate) fn run_global(settings: &Settings) -> Result<(), CliError> {
    let Some(conn) = open_existing(settings)? else {
        return Ok(());
    };
    let stats = covid_ingest_db::global_stats(&conn)
        .map_err(|e| CliError::database(format!("Failed to query global stats: {}", e)))?;
    print_json(&stats)
}

pub(crate) fn run_summary(settings: &Settings) -> Result<(), CliError> {
    let Some(conn) = open_existing(settings)? else {
        return Ok(());
    };
    let summary = covid_ingest_db::summary(&conn)
        .map_err(|e| CliError::database(format!("Failed to query summary: {}", e)))?;
    print_json(&summary)
}

pub(crate) fn run_timeseries(
    settings: &Settings,
    slug: &str,
    status: StatusKind,
    total: bool,
) -> Result<(), CliError> {
    let Some(conn) = open_existing(settings)? else {
        return Ok(());
    };
    let points = if total {
        covid_ingest_db::aggregated_time_series(&conn, slug, status)
    } else {
        covid_ingest_db::time_series(&conn, slug, status)
    }
    .map_err(|e| CliError::database(format!("Failed to query time series: {}", e)))?;

    if points.is_empty() {
        log::warn!("No {status} data for '{slug}'. Run 'covid-ingest countries' to list slugs.");
    }
    print_json(&points)
}

pub(crate) fn run_log(settings: &Settings, limit: usize) -> Result<(), CliError> {
    let Some(conn) = open_existing(settings)? else {
        return Ok(());
    };
    let logs = covid_ingest_db::list_ingestion_logs(&conn, limit)
        .map_err(|e| CliError::database(format!("Failed to read ingestion log: {}", e)))?;
    print_json(&logs)
}
