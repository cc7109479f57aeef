//! Cumulative-to-daily delta transform.
//!
//! Source feeds publish running totals per date. Storage keeps both the
//! running total and the day-over-day increase. Each location starts from a
//! baseline of zero at the first date of the batch; nothing is looked up
//! from previously stored data.

use serde::{Deserialize, Serialize};

/// A cumulative count paired with its derived daily increase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    pub cumulative: i64,
    /// Never negative: a drop in the cumulative series yields 0.
    pub new: i64,
}

/// Running state for one location's series.
///
/// Create one tracker per location (or call [`reset`](Self::reset) between
/// locations) and feed it the cumulative values in date order.
#[derive(Debug, Default)]
pub struct DeltaTracker {
    previous: i64,
    regressions: u64,
}

impl DeltaTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair the next cumulative value with its increase over the previous one.
    ///
    /// A value lower than its predecessor is recorded as given, with `new`
    /// clamped to 0. The difference saturates at the `i64` bounds.
    pub fn advance(&mut self, cumulative: i64) -> DailyCount {
        let diff = cumulative.saturating_sub(self.previous);
        if diff < 0 {
            self.regressions += 1;
        }
        self.previous = cumulative;
        DailyCount {
            cumulative,
            new: diff.max(0),
        }
    }

    /// Forget the previous value so the next series starts from zero.
    ///
    /// The regression counter is kept.
    pub fn reset(&mut self) {
        self.previous = 0;
    }

    /// Number of clamped (decreasing) steps seen so far.
    pub fn regressions(&self) -> u64 {
        self.regressions
    }
}

/// Transform a whole cumulative series at once.
pub fn daily_deltas(cumulative: &[i64]) -> Vec<DailyCount> {
    let mut tracker = DeltaTracker::new();
    cumulative.iter().map(|&c| tracker.advance(c)).collect()
}

#[cfg(test)]
#[path = "tests/delta_tests.rs"]
mod tests;
