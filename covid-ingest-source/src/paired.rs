//! Positional join of two wide-format feeds.
//!
//! The confirmed and deaths feeds list the same locations in the same order,
//! so they are joined by row index rather than by key. The reader checks
//! that assumption as it goes: both headers must carry the same dates, each
//! row pair must name the same location, and both feeds must end together.

use std::io::Read;

use crate::error::{AlignmentError, SourceError};
use crate::wide::{LOCATION_COLUMNS, WideCsvReader, WideHeader, WideRow};

pub struct PairedRowReader<A: Read, B: Read> {
    left: WideCsvReader<A>,
    right: WideCsvReader<B>,
    left_name: &'static str,
    right_name: &'static str,
    rows: u64,
}

impl<A: Read, B: Read> PairedRowReader<A, B> {
    /// Pair two feeds, naming them for error messages.
    ///
    /// Fails with [`AlignmentError::HeaderMismatch`] when the date columns
    /// differ.
    pub fn new(
        left_name: &'static str,
        left: WideCsvReader<A>,
        right_name: &'static str,
        right: WideCsvReader<B>,
    ) -> Result<Self, SourceError> {
        let left_dates = &left.header().dates;
        let right_dates = &right.header().dates;
        if left_dates != right_dates {
            let column = left_dates
                .iter()
                .zip(right_dates)
                .position(|(l, r)| l != r)
                .unwrap_or_else(|| left_dates.len().min(right_dates.len()));
            return Err(AlignmentError::HeaderMismatch {
                left: left_name,
                right: right_name,
                left_dates: left_dates.len(),
                right_dates: right_dates.len(),
                column: column + LOCATION_COLUMNS,
            }
            .into());
        }

        Ok(Self {
            left,
            right,
            left_name,
            right_name,
            rows: 0,
        })
    }

    /// Header shared by both feeds.
    pub fn header(&self) -> &WideHeader {
        self.left.header()
    }

    /// Number of row pairs read so far.
    pub fn rows_read(&self) -> u64 {
        self.rows
    }

    /// Read the next row from each feed.
    ///
    /// Returns `Ok(None)` only when both feeds end on the same row.
    pub fn next_pair(&mut self) -> Result<Option<(WideRow, WideRow)>, SourceError> {
        let left = self.left.next_row()?;
        let right = self.right.next_row()?;

        match (left, right) {
            (None, None) => Ok(None),
            (Some(_), None) => Err(AlignmentError::RowCountMismatch {
                exhausted: self.right_name,
                other: self.left_name,
                rows: self.rows,
            }
            .into()),
            (None, Some(_)) => Err(AlignmentError::RowCountMismatch {
                exhausted: self.left_name,
                other: self.right_name,
                rows: self.rows,
            }
            .into()),
            (Some(l), Some(r)) => {
                self.rows += 1;
                if l.location.province != r.location.province
                    || l.location.country.name != r.location.country.name
                {
                    return Err(AlignmentError::LocationMismatch {
                        row: self.rows,
                        left: self.left_name,
                        right: self.right_name,
                        left_location: l.location.label(),
                        right_location: r.location.label(),
                    }
                    .into());
                }
                Ok(Some((l, r)))
            }
        }
    }
}

impl<A: Read, B: Read> Iterator for PairedRowReader<A, B> {
    type Item = Result<(WideRow, WideRow), SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_pair().transpose()
    }
}

#[cfg(test)]
#[path = "tests/paired_tests.rs"]
mod tests;
