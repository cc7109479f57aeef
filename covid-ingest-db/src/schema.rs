//! SQLite schema creation and version check.

use rusqlite::Connection;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Migration error: expected version {expected}, found {found}")]
    VersionMismatch { expected: i32, found: i32 },
}

/// Current schema version.
pub const CURRENT_VERSION: i32 = 1;

/// Create all tables and indexes if they don't exist.
///
/// This is idempotent: safe to call on an existing database.
pub fn create_schema(conn: &Connection) -> Result<(), SchemaError> {
    conn.execute_batch(VERSION_TABLE_SQL)?;
    conn.execute_batch(TIME_SERIES_SQL)?;
    conn.execute_batch(INGESTION_LOG_SQL)?;
    set_schema_version(conn, CURRENT_VERSION)?;
    Ok(())
}

/// Open or create a time-series database at the given path.
pub fn open_database(path: &std::path::Path) -> Result<Connection, SchemaError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let conn = Connection::open(path)?;
    // Readers keep seeing the last committed batch while a pipeline writes.
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;

    let version = get_schema_version(&conn)?;
    if version == 0 {
        create_schema(&conn)?;
    } else if version > CURRENT_VERSION {
        return Err(SchemaError::VersionMismatch {
            expected: CURRENT_VERSION,
            found: version,
        });
    }

    log::debug!("Opened database {} (schema v{})", path.display(), CURRENT_VERSION);
    Ok(conn)
}

/// Open an in-memory database with the full schema. Useful for testing.
pub fn open_memory() -> Result<Connection, SchemaError> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    create_schema(&conn)?;
    Ok(conn)
}

/// Get the current schema version, or 0 if no schema exists.
pub fn get_schema_version(conn: &Connection) -> Result<i32, SchemaError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
        [],
        |row| row.get(0),
    )?;

    if !exists {
        return Ok(0);
    }

    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// Record a schema version.
fn set_schema_version(conn: &Connection, version: i32) -> Result<(), SchemaError> {
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// The two time-series tables.
///
/// Both are keyed on (province, country_slug, date_recorded) so re-ingesting
/// a date overwrites the earlier values.
const TIME_SERIES_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS confirmed_and_deaths_time_series (
    province TEXT NOT NULL,
    country TEXT NOT NULL,
    country_slug TEXT NOT NULL,
    latitude REAL NOT NULL,
    longitude REAL NOT NULL,
    confirmed_cases INTEGER NOT NULL,
    new_confirmed INTEGER NOT NULL,
    deaths INTEGER NOT NULL,
    new_deaths INTEGER NOT NULL,
    date_recorded TEXT NOT NULL,
    PRIMARY KEY (province, country_slug, date_recorded)
);
CREATE INDEX IF NOT EXISTS idx_cd_slug_date ON confirmed_and_deaths_time_series(country_slug, date_recorded);
CREATE INDEX IF NOT EXISTS idx_cd_date ON confirmed_and_deaths_time_series(date_recorded);

CREATE TABLE IF NOT EXISTS recoveries_time_series (
    province TEXT NOT NULL,
    country TEXT NOT NULL,
    country_slug TEXT NOT NULL,
    latitude REAL NOT NULL,
    longitude REAL NOT NULL,
    recoveries INTEGER NOT NULL,
    new_recoveries INTEGER NOT NULL,
    date_recorded TEXT NOT NULL,
    PRIMARY KEY (province, country_slug, date_recorded)
);
CREATE INDEX IF NOT EXISTS idx_r_slug_date ON recoveries_time_series(country_slug, date_recorded);
CREATE INDEX IF NOT EXISTS idx_r_date ON recoveries_time_series(date_recorded);
"#;

/// One row per committed pipeline run.
const INGESTION_LOG_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS ingestion_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    pipeline TEXT NOT NULL,
    finished_at TEXT NOT NULL,
    locations INTEGER NOT NULL DEFAULT 0,
    observations INTEGER NOT NULL DEFAULT 0,
    regressions INTEGER NOT NULL DEFAULT 0
);
"#;

const VERSION_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;
