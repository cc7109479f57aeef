//! SQLite persistence for the COVID-19 time series.
//!
//! Provides schema creation, the upsert operations used by the ingestion
//! pipelines, the ingestion log, and the read queries, backed by SQLite
//! (via rusqlite with bundled feature).

pub mod operations;
pub mod queries;
pub mod schema;
pub mod store;

pub use operations::{
    ConfirmedDeathsRecord, IngestionLog, OperationError, RecoveriesRecord, insert_ingestion_log,
    list_ingestion_logs, upsert_confirmed_and_deaths, upsert_recoveries,
};
pub use queries::{
    aggregated_time_series, global_stats, latest_date, list_countries, row_counts, summary,
    time_series,
};
pub use schema::{SchemaError, open_database, open_memory};
pub use store::Store;
