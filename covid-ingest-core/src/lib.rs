//! Shared data model for the COVID-19 time-series ingester.
//!
//! Holds the location and status types used across crates, the country
//! slug normalizer, and the cumulative-to-daily delta transform.

pub mod delta;
pub mod slug;
pub mod status;
pub mod types;

pub use delta::{DailyCount, DeltaTracker, daily_deltas};
pub use slug::country_slug;
pub use status::{StatusKind, StatusParseError};
pub use types::{Country, CovidStats, Location, LocationStats, Summary, TimeSeriesPoint};
