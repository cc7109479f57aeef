use std::sync::Arc;

use covid_ingest_db::Store;
use covid_ingest_source::{CsvSource, Dataset, StaticSource};

pub const HEADER: &str = "Province/State,Country/Region,Lat,Long,1/22/20,1/23/20,1/24/20";

/// Build a feed body from data rows under the standard three-date header.
pub fn feed(rows: &[&str]) -> String {
    let mut body = String::from(HEADER);
    for row in rows {
        body.push('\n');
        body.push_str(row);
    }
    body.push('\n');
    body
}

pub fn source(feeds: &[(Dataset, String)]) -> Arc<dyn CsvSource> {
    let mut source = StaticSource::new();
    for (dataset, body) in feeds {
        source = source.with(*dataset, body.as_bytes());
    }
    Arc::new(source)
}

pub fn store() -> Store {
    Store::open_memory().unwrap()
}

pub fn count_rows(store: &Store, table: &str) -> i64 {
    let conn = store.lock().unwrap();
    conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
        row.get(0)
    })
    .unwrap()
}
