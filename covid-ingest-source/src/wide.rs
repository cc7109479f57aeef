//! Wide-format time-series CSV parser.
//!
//! Layout of every feed:
//!
//! ```text
//! Province/State,Country/Region,Lat,Long,1/22/20,1/23/20,...
//! ,Afghanistan,33.93911,67.709953,0,0,...
//! ```
//!
//! Columns 0-3 are location metadata in that fixed order. Every later column
//! is named by a date label and holds the cumulative count as of that date.
//! Rows are read lazily from the underlying reader; any malformed field stops
//! iteration with an error.

use std::io::Read;

use chrono::NaiveDate;
use covid_ingest_core::Location;
use csv::StringRecord;

use crate::error::SourceError;

/// `strftime` pattern of the date labels (`1/22/20`).
pub const DATE_FORMAT: &str = "%m/%d/%y";

/// Number of leading location columns before the first date column.
pub(crate) const LOCATION_COLUMNS: usize = 4;

/// Parsed header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WideHeader {
    /// Raw header labels, location columns included.
    pub columns: Vec<String>,
    /// Parsed date of each count column, in column order.
    pub dates: Vec<NaiveDate>,
}

impl WideHeader {
    fn parse(record: &StringRecord) -> Result<Self, SourceError> {
        if record.len() < LOCATION_COLUMNS {
            return Err(SourceError::header(format!(
                "expected at least {LOCATION_COLUMNS} columns, found {}",
                record.len()
            )));
        }

        let line = record.position().map_or(1, |p| p.line());
        let dates = record
            .iter()
            .skip(LOCATION_COLUMNS)
            .map(|label| {
                NaiveDate::parse_from_str(label, DATE_FORMAT)
                    .map_err(|e| SourceError::field(line, "header", label, e))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            columns: record.iter().map(str::to_string).collect(),
            dates,
        })
    }

    /// Label of the column at `index`, for error messages.
    fn column_name(&self, index: usize) -> &str {
        self.columns.get(index).map_or("", String::as_str)
    }
}

/// One location's cumulative counts across the header's dates.
#[derive(Debug, Clone, PartialEq)]
pub struct WideRow {
    /// 1-based line number in the source file.
    pub line: u64,
    pub location: Location,
    /// Same length and order as [`WideHeader::dates`].
    pub counts: Vec<i64>,
}

/// Streaming reader over a wide-format feed.
///
/// The header is consumed on construction. Rows are yielded through
/// [`next_row`](Self::next_row) or the `Iterator` impl; the reader cannot be
/// rewound.
pub struct WideCsvReader<R: Read> {
    reader: csv::Reader<R>,
    header: WideHeader,
    record: StringRecord,
}

impl<R: Read> WideCsvReader<R> {
    pub fn new(source: R) -> Result<Self, SourceError> {
        // Headers are read by hand so that the header row gets the same
        // width check as data rows.
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(source);

        let mut record = StringRecord::new();
        if !reader.read_record(&mut record)? {
            return Err(SourceError::header("feed is empty"));
        }
        let header = WideHeader::parse(&record)?;

        Ok(Self {
            reader,
            header,
            record,
        })
    }

    pub fn header(&self) -> &WideHeader {
        &self.header
    }

    /// Read and parse the next data row. Returns `Ok(None)` at end of input.
    pub fn next_row(&mut self) -> Result<Option<WideRow>, SourceError> {
        if !self.reader.read_record(&mut self.record)? {
            return Ok(None);
        }
        self.parse_record().map(Some)
    }

    fn parse_record(&self) -> Result<WideRow, SourceError> {
        let record = &self.record;
        let line = record.position().map_or(0, |p| p.line());

        let latitude = self.parse_coordinate(line, 2)?;
        let longitude = self.parse_coordinate(line, 3)?;
        let location = Location::new(&record[0], &record[1], latitude, longitude);

        let counts = record
            .iter()
            .enumerate()
            .skip(LOCATION_COLUMNS)
            .map(|(i, value)| self.parse_count(line, i, value))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(WideRow {
            line,
            location,
            counts,
        })
    }

    fn parse_coordinate(&self, line: u64, index: usize) -> Result<f64, SourceError> {
        let value = &self.record[index];
        value
            .parse::<f64>()
            .map_err(|e| SourceError::field(line, self.header.column_name(index), value, e))
    }

    fn parse_count(&self, line: u64, index: usize, value: &str) -> Result<i64, SourceError> {
        let column = self.header.column_name(index);
        let count = value
            .parse::<i64>()
            .map_err(|e| SourceError::field(line, column, value, e))?;
        if count < 0 {
            return Err(SourceError::field(
                line,
                column,
                value,
                "count must not be negative",
            ));
        }
        Ok(count)
    }
}

impl<R: Read> Iterator for WideCsvReader<R> {
    type Item = Result<WideRow, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_row().transpose()
    }
}

#[cfg(test)]
#[path = "tests/wide_tests.rs"]
mod tests;
