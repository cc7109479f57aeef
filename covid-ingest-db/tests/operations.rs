use chrono::NaiveDate;
use covid_ingest_core::{DailyCount, Location};
use covid_ingest_db::*;

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, day).unwrap()
}

fn count(cumulative: i64, new: i64) -> DailyCount {
    DailyCount { cumulative, new }
}

fn testland() -> Location {
    Location::new("", "Testland", 10.0, 20.0)
}

fn confirmed_row(conn: &rusqlite::Connection, day: u32) -> (i64, i64, i64, i64) {
    conn.query_row(
        "SELECT confirmed_cases, new_confirmed, deaths, new_deaths
         FROM confirmed_and_deaths_time_series
         WHERE country_slug = 'testland' AND date_recorded = ?1",
        [date(day)],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
    )
    .unwrap()
}

#[test]
fn upsert_confirmed_and_deaths_inserts_row() {
    let conn = open_memory().unwrap();
    let location = testland();
    upsert_confirmed_and_deaths(
        &conn,
        &ConfirmedDeathsRecord {
            location: &location,
            date: date(22),
            confirmed: count(5, 5),
            deaths: count(1, 1),
        },
    )
    .unwrap();

    assert_eq!(confirmed_row(&conn, 22), (5, 5, 1, 1));

    let (country, lat): (String, f64) = conn
        .query_row(
            "SELECT country, latitude FROM confirmed_and_deaths_time_series",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(country, "Testland");
    assert_eq!(lat, 10.0);
}

#[test]
fn upsert_overwrites_counts_on_same_key() {
    let conn = open_memory().unwrap();
    let location = testland();
    let mut record = ConfirmedDeathsRecord {
        location: &location,
        date: date(22),
        confirmed: count(5, 5),
        deaths: count(0, 0),
    };
    upsert_confirmed_and_deaths(&conn, &record).unwrap();

    record.confirmed = count(7, 7);
    record.deaths = count(2, 2);
    upsert_confirmed_and_deaths(&conn, &record).unwrap();

    let rows: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM confirmed_and_deaths_time_series",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(rows, 1);
    assert_eq!(confirmed_row(&conn, 22), (7, 7, 2, 2));
}

#[test]
fn upsert_recoveries_overwrites_counts_on_same_key() {
    let conn = open_memory().unwrap();
    let location = testland();
    let mut record = RecoveriesRecord {
        location: &location,
        date: date(22),
        recoveries: count(3, 3),
    };
    upsert_recoveries(&conn, &record).unwrap();

    record.recoveries = count(8, 5);
    upsert_recoveries(&conn, &record).unwrap();

    let rows: Vec<(i64, i64)> = conn
        .prepare("SELECT recoveries, new_recoveries FROM recoveries_time_series")
        .unwrap()
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(rows, [(8, 5)]);
}

#[test]
fn upsert_keeps_first_seen_coordinates() {
    let conn = open_memory().unwrap();
    let first = testland();
    let moved = Location::new("", "Testland", 50.0, 60.0);

    for location in [&first, &moved] {
        upsert_recoveries(
            &conn,
            &RecoveriesRecord {
                location,
                date: date(22),
                recoveries: count(3, 3),
            },
        )
        .unwrap();
    }

    let lat: f64 = conn
        .query_row("SELECT latitude FROM recoveries_time_series", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(lat, 10.0);
}

#[test]
fn provinces_are_distinct_keys() {
    let conn = open_memory().unwrap();
    let north = Location::new("North", "Testland", 1.0, 1.0);
    let south = Location::new("South", "Testland", 2.0, 2.0);

    for location in [&north, &south] {
        upsert_recoveries(
            &conn,
            &RecoveriesRecord {
                location,
                date: date(22),
                recoveries: count(1, 1),
            },
        )
        .unwrap();
    }

    let counts = row_counts(&conn).unwrap();
    assert_eq!(counts["recoveries_time_series"], 2);
    assert_eq!(counts["confirmed_and_deaths_time_series"], 0);
}

#[test]
fn location_without_coordinates_is_rejected() {
    let conn = open_memory().unwrap();
    let mut location = testland();
    location.latitude = None;

    let err = upsert_recoveries(
        &conn,
        &RecoveriesRecord {
            location: &location,
            date: date(22),
            recoveries: count(1, 1),
        },
    )
    .unwrap_err();
    assert!(matches!(err, OperationError::MissingCoordinates(_)));
}

#[test]
fn ingestion_log_lists_newest_first() {
    let conn = open_memory().unwrap();
    for (pipeline, observations) in [("confirmed-deaths", 10), ("recoveries", 4)] {
        insert_ingestion_log(
            &conn,
            &IngestionLog {
                id: 0,
                pipeline: pipeline.to_string(),
                finished_at: "2020-03-01T00:00:00+00:00".to_string(),
                locations: 2,
                observations,
                regressions: 0,
            },
        )
        .unwrap();
    }

    let logs = list_ingestion_logs(&conn, 10).unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].pipeline, "recoveries");
    assert_eq!(logs[0].observations, 4);
    assert_eq!(logs[1].pipeline, "confirmed-deaths");

    assert_eq!(list_ingestion_logs(&conn, 1).unwrap().len(), 1);
}
