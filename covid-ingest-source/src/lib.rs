//! Reading the JHU CSSE wide-format time-series CSVs.
//!
//! Each feed has one row per location and one column per date. This crate
//! fetches the feeds, parses them into typed rows, and joins the paired
//! confirmed/deaths feeds row by row.

pub mod error;
pub mod fetch;
pub mod paired;
pub mod wide;

pub use error::{AlignmentError, ErrorKind, SourceError};
pub use fetch::{CsvSource, DEFAULT_BASE_URL, Dataset, DirSource, HttpSource, StaticSource};
pub use paired::PairedRowReader;
pub use wide::{DATE_FORMAT, WideCsvReader, WideHeader, WideRow};
