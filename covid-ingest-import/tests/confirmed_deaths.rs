mod common;

use std::cell::RefCell;

use chrono::NaiveDate;
use covid_ingest_core::StatusKind;
use covid_ingest_db::*;
use covid_ingest_import::*;
use covid_ingest_source::{AlignmentError, Dataset, SourceError};

use common::{count_rows, feed, source, store};

const TABLE: &str = "confirmed_and_deaths_time_series";

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, day).unwrap()
}

fn testland_feeds() -> Vec<(Dataset, String)> {
    vec![
        (Dataset::Confirmed, feed(&[r#""",Testland,10.0,20.0,5,8,8"#])),
        (Dataset::Deaths, feed(&[r#""",Testland,10.0,20.0,0,1,1"#])),
    ]
}

#[test]
fn single_location_end_to_end() {
    let store = store();
    let pipeline = ConfirmedAndDeathsPipeline::new(store.clone(), source(&testland_feeds()));

    let stats = pipeline.run(None).unwrap();
    assert_eq!(
        stats,
        RunStats {
            locations: 1,
            dates: 3,
            observations: 3,
            regressions: 0,
        }
    );

    let conn = store.lock().unwrap();
    let confirmed = time_series(&conn, "testland", StatusKind::Confirmed).unwrap();
    let pairs: Vec<(NaiveDate, i64, i64)> =
        confirmed.iter().map(|p| (p.date, p.amount, p.new)).collect();
    assert_eq!(
        pairs,
        [(date(22), 5, 5), (date(23), 8, 3), (date(24), 8, 0)]
    );

    let deaths = time_series(&conn, "testland", StatusKind::Deaths).unwrap();
    let pairs: Vec<(i64, i64)> = deaths.iter().map(|p| (p.amount, p.new)).collect();
    assert_eq!(pairs, [(0, 0), (1, 1), (1, 0)]);

    assert_eq!(confirmed[0].location.province, "");
    assert_eq!(confirmed[0].location.latitude, Some(10.0));
}

#[test]
fn deltas_restart_for_every_location() {
    let store = store();
    let feeds = vec![
        (
            Dataset::Confirmed,
            feed(&["North,Testland,1.0,1.0,100,150,150", "South,Testland,2.0,2.0,3,4,9"]),
        ),
        (
            Dataset::Deaths,
            feed(&["North,Testland,1.0,1.0,0,0,0", "South,Testland,2.0,2.0,0,0,1"]),
        ),
    ];
    ConfirmedAndDeathsPipeline::new(store.clone(), source(&feeds))
        .run(None)
        .unwrap();

    let conn = store.lock().unwrap();
    let south: Vec<i64> = time_series(&conn, "testland", StatusKind::Confirmed)
        .unwrap()
        .into_iter()
        .filter(|p| p.location.province == "South")
        .map(|p| p.new)
        .collect();
    // The first South value is not diffed against North's last value.
    assert_eq!(south, [3, 1, 5]);
}

#[test]
fn rerun_is_idempotent() {
    let store = store();
    let pipeline = ConfirmedAndDeathsPipeline::new(store.clone(), source(&testland_feeds()));

    pipeline.run(None).unwrap();
    let first = {
        let conn = store.lock().unwrap();
        time_series(&conn, "testland", StatusKind::Confirmed).unwrap()
    };

    pipeline.run(None).unwrap();
    let second = {
        let conn = store.lock().unwrap();
        time_series(&conn, "testland", StatusKind::Confirmed).unwrap()
    };

    assert_eq!(count_rows(&store, TABLE), 3);
    assert_eq!(first, second);

    let conn = store.lock().unwrap();
    assert_eq!(list_ingestion_logs(&conn, 10).unwrap().len(), 2);
}

#[test]
fn regression_is_recorded_with_clamped_delta() {
    let store = store();
    let feeds = vec![
        (Dataset::Confirmed, feed(&["\"\",Testland,1.0,1.0,10,7,9"])),
        (Dataset::Deaths, feed(&["\"\",Testland,1.0,1.0,0,0,0"])),
    ];
    let stats = ConfirmedAndDeathsPipeline::new(store.clone(), source(&feeds))
        .run(None)
        .unwrap();
    assert_eq!(stats.regressions, 1);

    let conn = store.lock().unwrap();
    let points = time_series(&conn, "testland", StatusKind::Confirmed).unwrap();
    let pairs: Vec<(i64, i64)> = points.iter().map(|p| (p.amount, p.new)).collect();
    // Cumulative stays as published; the daily value never goes negative.
    assert_eq!(pairs, [(10, 10), (7, 0), (9, 2)]);
}

#[test]
fn committed_run_writes_ingestion_log() {
    let store = store();
    ConfirmedAndDeathsPipeline::new(store.clone(), source(&testland_feeds()))
        .run(None)
        .unwrap();

    let conn = store.lock().unwrap();
    let logs = list_ingestion_logs(&conn, 10).unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].pipeline, ConfirmedAndDeathsPipeline::NAME);
    assert_eq!(logs[0].locations, 1);
    assert_eq!(logs[0].observations, 3);
}

#[test]
fn misaligned_row_counts_commit_nothing() {
    let store = store();
    let feeds = vec![
        (
            Dataset::Confirmed,
            feed(&["North,Testland,1.0,1.0,1,2,3", "South,Testland,2.0,2.0,1,2,3"]),
        ),
        (Dataset::Deaths, feed(&["North,Testland,1.0,1.0,0,0,0"])),
    ];
    let err = ConfirmedAndDeathsPipeline::new(store.clone(), source(&feeds))
        .run(None)
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Source(SourceError::Alignment(AlignmentError::RowCountMismatch { .. }))
    ));
    assert_eq!(err.kind(), FailureKind::Alignment);
    assert_eq!(count_rows(&store, TABLE), 0);
    assert_eq!(count_rows(&store, "ingestion_log"), 0);
}

#[test]
fn mismatched_locations_commit_nothing() {
    let store = store();
    let feeds = vec![
        (Dataset::Confirmed, feed(&["North,Testland,1.0,1.0,1,2,3"])),
        (Dataset::Deaths, feed(&["South,Testland,1.0,1.0,0,0,0"])),
    ];
    let err = ConfirmedAndDeathsPipeline::new(store.clone(), source(&feeds))
        .run(None)
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Source(SourceError::Alignment(AlignmentError::LocationMismatch { .. }))
    ));
    assert_eq!(count_rows(&store, TABLE), 0);
}

#[test]
fn differing_header_dates_are_rejected() {
    // Upstream publishes both feeds with the same date columns; a run over
    // feeds that disagree is refused before anything is written.
    let store = store();
    let deaths = "Province/State,Country/Region,Lat,Long,1/22/20,1/23/20,1/25/20\n\
                  \"\",Testland,10.0,20.0,0,1,1\n";
    let feeds = vec![
        (Dataset::Confirmed, feed(&[r#""",Testland,10.0,20.0,5,8,8"#])),
        (Dataset::Deaths, deaths.to_string()),
    ];
    let err = ConfirmedAndDeathsPipeline::new(store.clone(), source(&feeds))
        .run(None)
        .unwrap_err();

    match err {
        PipelineError::Source(SourceError::Alignment(AlignmentError::HeaderMismatch {
            column,
            ..
        })) => assert_eq!(column, 6),
        other => panic!("expected HeaderMismatch, got {other:?}"),
    }
    assert_eq!(count_rows(&store, TABLE), 0);
}

#[test]
fn missing_feed_is_a_transport_failure() {
    let store = store();
    let feeds = vec![(Dataset::Confirmed, feed(&[r#""",Testland,10.0,20.0,5,8,8"#]))];
    let err = ConfirmedAndDeathsPipeline::new(store.clone(), source(&feeds))
        .run(None)
        .unwrap_err();

    assert!(err.is_transport());
    assert_eq!(count_rows(&store, TABLE), 0);
}

#[test]
fn bad_count_aborts_the_run() {
    let store = store();
    let feeds = vec![
        (
            Dataset::Confirmed,
            feed(&["North,Testland,1.0,1.0,1,2,3", "South,Testland,2.0,2.0,1,abc,3"]),
        ),
        (
            Dataset::Deaths,
            feed(&["North,Testland,1.0,1.0,0,0,0", "South,Testland,2.0,2.0,0,0,0"]),
        ),
    ];
    let err = ConfirmedAndDeathsPipeline::new(store.clone(), source(&feeds))
        .run(None)
        .unwrap_err();

    assert_eq!(err.kind(), FailureKind::Field);
    // North was already upserted inside the transaction and must be gone.
    assert_eq!(count_rows(&store, TABLE), 0);
}

#[test]
fn storage_failure_rolls_back_the_batch() {
    let store = store();
    {
        let conn = store.lock().unwrap();
        conn.execute_batch(
            "CREATE TRIGGER fail_on_last_date
             BEFORE INSERT ON confirmed_and_deaths_time_series
             WHEN NEW.date_recorded = '2020-01-24'
             BEGIN SELECT RAISE(ABORT, 'simulated storage failure'); END;",
        )
        .unwrap();
    }

    let err = ConfirmedAndDeathsPipeline::new(store.clone(), source(&testland_feeds()))
        .run(None)
        .unwrap_err();

    assert_eq!(err.kind(), FailureKind::Storage);
    assert_eq!(count_rows(&store, TABLE), 0);
    assert_eq!(count_rows(&store, "ingestion_log"), 0);
}

#[test]
fn failed_run_keeps_previous_batch() {
    let store = store();
    ConfirmedAndDeathsPipeline::new(store.clone(), source(&testland_feeds()))
        .run(None)
        .unwrap();

    let broken = vec![
        (Dataset::Confirmed, feed(&[r#""",Testland,10.0,20.0,50,80,80"#])),
        (Dataset::Deaths, feed(&[])),
    ];
    ConfirmedAndDeathsPipeline::new(store.clone(), source(&broken))
        .run(None)
        .unwrap_err();

    let conn = store.lock().unwrap();
    let latest = aggregated_time_series(&conn, "testland", StatusKind::Confirmed).unwrap();
    assert_eq!(latest.last().map(|p| p.amount), Some(8));
}

struct RecordingProgress {
    locations: RefCell<Vec<(u64, String)>>,
    completed: RefCell<bool>,
}

impl ImportProgress for RecordingProgress {
    fn on_location(&self, current: u64, label: &str) {
        self.locations.borrow_mut().push((current, label.to_string()));
    }

    fn on_phase(&self, _message: &str) {}

    fn on_complete(&self, _message: &str) {
        *self.completed.borrow_mut() = true;
    }
}

#[test]
fn progress_reports_each_location() {
    let store = store();
    let feeds = vec![
        (
            Dataset::Confirmed,
            feed(&["North,Testland,1.0,1.0,1,2,3", "\"\",Otherland,2.0,2.0,1,2,3"]),
        ),
        (
            Dataset::Deaths,
            feed(&["North,Testland,1.0,1.0,0,0,0", "\"\",Otherland,2.0,2.0,0,0,0"]),
        ),
    ];
    let progress = RecordingProgress {
        locations: RefCell::new(Vec::new()),
        completed: RefCell::new(false),
    };
    ConfirmedAndDeathsPipeline::new(store, source(&feeds))
        .run(Some(&progress))
        .unwrap();

    assert_eq!(
        *progress.locations.borrow(),
        [
            (1, "North, Testland".to_string()),
            (2, "Otherland".to_string())
        ]
    );
    assert!(*progress.completed.borrow());
}
