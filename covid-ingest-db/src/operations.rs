//! Write operations: time-series upserts and the ingestion log.
//!
//! The upserts take a plain `&Connection` so callers decide the transaction
//! scope; the pipelines pass a `rusqlite::Transaction`, which derefs to one.

use chrono::NaiveDate;
use covid_ingest_core::{DailyCount, Location};
use rusqlite::{Connection, params};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OperationError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Database lock poisoned by a panicked writer")]
    LockPoisoned,
    #[error("Location '{0}' has no coordinates")]
    MissingCoordinates(String),
}

/// One date of the paired confirmed/deaths feeds for one location.
#[derive(Debug, Clone, Copy)]
pub struct ConfirmedDeathsRecord<'a> {
    pub location: &'a Location,
    pub date: NaiveDate,
    pub confirmed: DailyCount,
    pub deaths: DailyCount,
}

/// One date of the recoveries feed for one location.
#[derive(Debug, Clone, Copy)]
pub struct RecoveriesRecord<'a> {
    pub location: &'a Location,
    pub date: NaiveDate,
    pub recoveries: DailyCount,
}

fn coordinates(location: &Location) -> Result<(f64, f64), OperationError> {
    match (location.latitude, location.longitude) {
        (Some(lat), Some(long)) => Ok((lat, long)),
        _ => Err(OperationError::MissingCoordinates(location.label())),
    }
}

// ── Time-series Upserts ─────────────────────────────────────────────────────

/// Insert or update one confirmed/deaths observation.
///
/// On a (province, country_slug, date) conflict only the four counts are
/// replaced; location metadata keeps its first-seen values.
pub fn upsert_confirmed_and_deaths(
    conn: &Connection,
    record: &ConfirmedDeathsRecord<'_>,
) -> Result<(), OperationError> {
    let (latitude, longitude) = coordinates(record.location)?;
    let mut stmt = conn.prepare_cached(
        "INSERT INTO confirmed_and_deaths_time_series
             (province, country, country_slug, latitude, longitude,
              confirmed_cases, new_confirmed, deaths, new_deaths, date_recorded)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
         ON CONFLICT(province, country_slug, date_recorded) DO UPDATE SET
             confirmed_cases = excluded.confirmed_cases,
             new_confirmed = excluded.new_confirmed,
             deaths = excluded.deaths,
             new_deaths = excluded.new_deaths",
    )?;
    stmt.execute(params![
        record.location.province,
        record.location.country.name,
        record.location.country.slug,
        latitude,
        longitude,
        record.confirmed.cumulative,
        record.confirmed.new,
        record.deaths.cumulative,
        record.deaths.new,
        record.date,
    ])?;
    Ok(())
}

/// Insert or update one recoveries observation.
pub fn upsert_recoveries(
    conn: &Connection,
    record: &RecoveriesRecord<'_>,
) -> Result<(), OperationError> {
    let (latitude, longitude) = coordinates(record.location)?;
    let mut stmt = conn.prepare_cached(
        "INSERT INTO recoveries_time_series
             (province, country, country_slug, latitude, longitude,
              recoveries, new_recoveries, date_recorded)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(province, country_slug, date_recorded) DO UPDATE SET
             recoveries = excluded.recoveries,
             new_recoveries = excluded.new_recoveries",
    )?;
    stmt.execute(params![
        record.location.province,
        record.location.country.name,
        record.location.country.slug,
        latitude,
        longitude,
        record.recoveries.cumulative,
        record.recoveries.new,
        record.date,
    ])?;
    Ok(())
}

// ── Ingestion Log ───────────────────────────────────────────────────────────

/// A committed pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionLog {
    pub id: i64,
    pub pipeline: String,
    /// RFC 3339 timestamp.
    pub finished_at: String,
    pub locations: i64,
    pub observations: i64,
    pub regressions: i64,
}

/// Record a pipeline run. Returns the new row id.
pub fn insert_ingestion_log(conn: &Connection, log: &IngestionLog) -> Result<i64, OperationError> {
    conn.execute(
        "INSERT INTO ingestion_log (pipeline, finished_at, locations, observations, regressions)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            log.pipeline,
            log.finished_at,
            log.locations,
            log.observations,
            log.regressions,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Most recent runs first.
pub fn list_ingestion_logs(
    conn: &Connection,
    limit: usize,
) -> Result<Vec<IngestionLog>, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT id, pipeline, finished_at, locations, observations, regressions
         FROM ingestion_log ORDER BY id DESC LIMIT ?1",
    )?;
    let rows = stmt.query_map(params![limit as i64], |row| {
        Ok(IngestionLog {
            id: row.get(0)?,
            pipeline: row.get(1)?,
            finished_at: row.get(2)?,
            locations: row.get(3)?,
            observations: row.get(4)?,
            regressions: row.get(5)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}
