//! Read queries over the committed time series.
//!
//! Every aggregate is taken at the most recent `date_recorded` of the table it
//! reads, so a run that is still in flight (uncommitted) never shows up.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use covid_ingest_core::{
    Country, CovidStats, Location, LocationStats, StatusKind, Summary, TimeSeriesPoint,
};
use rusqlite::{Connection, params};

use crate::operations::OperationError;

const CONFIRMED_AND_DEATHS: &str = "confirmed_and_deaths_time_series";
const RECOVERIES: &str = "recoveries_time_series";

/// Latest date stored for a status, or `None` if nothing has been ingested.
pub fn latest_date(
    conn: &Connection,
    status: StatusKind,
) -> Result<Option<NaiveDate>, OperationError> {
    let sql = format!("SELECT MAX(date_recorded) FROM {}", status.table());
    let date: Option<NaiveDate> = conn.query_row(&sql, [], |row| row.get(0))?;
    Ok(date)
}

/// Every country seen in either table, ordered by slug.
pub fn list_countries(conn: &Connection) -> Result<Vec<Country>, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT MIN(country), country_slug FROM (
             SELECT country, country_slug FROM confirmed_and_deaths_time_series
             UNION
             SELECT country, country_slug FROM recoveries_time_series
         )
         GROUP BY country_slug
         ORDER BY country_slug",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(Country {
            name: row.get(0)?,
            slug: row.get(1)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// World totals at the latest date of each table.
pub fn global_stats(conn: &Connection) -> Result<CovidStats, OperationError> {
    let mut stats = CovidStats::default();

    let cd_sql = format!(
        "SELECT COALESCE(SUM(confirmed_cases), 0), COALESCE(SUM(new_confirmed), 0),
                COALESCE(SUM(deaths), 0), COALESCE(SUM(new_deaths), 0)
         FROM {CONFIRMED_AND_DEATHS}
         WHERE date_recorded = (SELECT MAX(date_recorded) FROM {CONFIRMED_AND_DEATHS})"
    );
    conn.query_row(&cd_sql, [], |row| {
        stats.confirmed = row.get(0)?;
        stats.new_confirmed = row.get(1)?;
        stats.deaths = row.get(2)?;
        stats.new_deaths = row.get(3)?;
        Ok(())
    })?;

    let r_sql = format!(
        "SELECT COALESCE(SUM(recoveries), 0), COALESCE(SUM(new_recoveries), 0)
         FROM {RECOVERIES}
         WHERE date_recorded = (SELECT MAX(date_recorded) FROM {RECOVERIES})"
    );
    conn.query_row(&r_sql, [], |row| {
        stats.recoveries = row.get(0)?;
        stats.new_recoveries = row.get(1)?;
        Ok(())
    })?;

    Ok(stats)
}

/// Per-country totals at the latest date plus their world sum.
///
/// Countries are driven by the confirmed/deaths table; a country missing from
/// the recoveries feed reports zero recoveries.
pub fn summary(conn: &Connection) -> Result<Summary, OperationError> {
    let sql = format!(
        "SELECT cd.country, cd.country_slug,
                cd.confirmed, cd.new_confirmed, cd.deaths, cd.new_deaths,
                COALESCE(r.recoveries, 0), COALESCE(r.new_recoveries, 0)
         FROM (
             SELECT MIN(country) AS country, country_slug,
                    SUM(confirmed_cases) AS confirmed, SUM(new_confirmed) AS new_confirmed,
                    SUM(deaths) AS deaths, SUM(new_deaths) AS new_deaths
             FROM {CONFIRMED_AND_DEATHS}
             WHERE date_recorded = (SELECT MAX(date_recorded) FROM {CONFIRMED_AND_DEATHS})
             GROUP BY country_slug
         ) cd
         LEFT JOIN (
             SELECT country_slug,
                    SUM(recoveries) AS recoveries, SUM(new_recoveries) AS new_recoveries
             FROM {RECOVERIES}
             WHERE date_recorded = (SELECT MAX(date_recorded) FROM {RECOVERIES})
             GROUP BY country_slug
         ) r ON r.country_slug = cd.country_slug
         ORDER BY cd.country_slug"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], |row| {
        Ok(LocationStats {
            location: Location {
                country: Country {
                    name: row.get(0)?,
                    slug: row.get(1)?,
                },
                province: String::new(),
                latitude: None,
                longitude: None,
            },
            stats: CovidStats {
                confirmed: row.get(2)?,
                new_confirmed: row.get(3)?,
                deaths: row.get(4)?,
                new_deaths: row.get(5)?,
                recoveries: row.get(6)?,
                new_recoveries: row.get(7)?,
            },
        })
    })?;
    let countries = rows.collect::<Result<Vec<_>, _>>()?;

    let mut stats = CovidStats::default();
    for country in &countries {
        stats += country.stats;
    }

    Ok(Summary { stats, countries })
}

/// Every province/date row of one status for a country, oldest first.
pub fn time_series(
    conn: &Connection,
    slug: &str,
    status: StatusKind,
) -> Result<Vec<TimeSeriesPoint>, OperationError> {
    let (amount_col, new_col) = status.columns();
    let sql = format!(
        "SELECT province, country, country_slug, latitude, longitude,
                {amount_col}, {new_col}, date_recorded
         FROM {}
         WHERE country_slug = ?1
         ORDER BY date_recorded, province",
        status.table()
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![slug], |row| {
        Ok(TimeSeriesPoint {
            location: Location {
                province: row.get(0)?,
                country: Country {
                    name: row.get(1)?,
                    slug: row.get(2)?,
                },
                latitude: row.get(3)?,
                longitude: row.get(4)?,
            },
            status,
            amount: row.get(5)?,
            new: row.get(6)?,
            date: row.get(7)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Per-date totals of one status for a country, summed across provinces.
pub fn aggregated_time_series(
    conn: &Connection,
    slug: &str,
    status: StatusKind,
) -> Result<Vec<TimeSeriesPoint>, OperationError> {
    let (amount_col, new_col) = status.columns();
    let sql = format!(
        "SELECT MIN(country), SUM({amount_col}), SUM({new_col}), date_recorded
         FROM {}
         WHERE country_slug = ?1
         GROUP BY date_recorded
         ORDER BY date_recorded",
        status.table()
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![slug], |row| {
        let name: String = row.get(0)?;
        Ok(TimeSeriesPoint {
            location: Location {
                country: Country {
                    name,
                    slug: slug.to_string(),
                },
                province: String::new(),
                latitude: None,
                longitude: None,
            },
            status,
            amount: row.get(1)?,
            new: row.get(2)?,
            date: row.get(3)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Number of stored rows per table, keyed by table name.
pub fn row_counts(conn: &Connection) -> Result<BTreeMap<&'static str, i64>, OperationError> {
    let mut counts = BTreeMap::new();
    for table in [CONFIRMED_AND_DEATHS, RECOVERIES] {
        let count: i64 =
            conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
        counts.insert(table, count);
    }
    Ok(counts)
}
