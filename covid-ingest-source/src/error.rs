/// Errors raised while fetching or parsing a feed.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Download failed: {0}")]
    Transport(String),

    #[error("Malformed CSV: {0}")]
    Parse(#[from] csv::Error),

    #[error("Malformed header: {0}")]
    Header(String),

    #[error("Invalid value {value:?} in column '{column}' on line {line}: {reason}")]
    Field {
        line: u64,
        column: String,
        value: String,
        reason: String,
    },

    #[error(transparent)]
    Alignment(#[from] AlignmentError),
}

/// Ways the paired confirmed/deaths feeds can disagree.
#[derive(Debug, thiserror::Error)]
pub enum AlignmentError {
    #[error(
        "date columns differ between {left} ({left_dates} dates) and {right} ({right_dates} dates), first difference at column {column}"
    )]
    HeaderMismatch {
        left: &'static str,
        right: &'static str,
        left_dates: usize,
        right_dates: usize,
        column: usize,
    },

    #[error("{exhausted} ran out of rows after {rows} while {other} still had data")]
    RowCountMismatch {
        exhausted: &'static str,
        other: &'static str,
        rows: u64,
    },

    #[error("row {row} is '{left_location}' in {left} but '{right_location}' in {right}")]
    LocationMismatch {
        row: u64,
        left: &'static str,
        right: &'static str,
        left_location: String,
        right_location: String,
    },
}

/// Coarse classification used when reporting failed runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Parse,
    Field,
    Alignment,
}

impl SourceError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn header(msg: impl Into<String>) -> Self {
        Self::Header(msg.into())
    }

    pub fn field(
        line: u64,
        column: impl Into<String>,
        value: impl Into<String>,
        reason: impl std::fmt::Display,
    ) -> Self {
        Self::Field {
            line,
            column: column.into(),
            value: value.into(),
            reason: reason.to_string(),
        }
    }

    /// Classify the error. Read failures on the response body count as
    /// transport errors even though they surface through the CSV reader.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_) | Self::Transport(_) => ErrorKind::Transport,
            Self::Parse(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => ErrorKind::Transport,
            Self::Parse(_) | Self::Header(_) => ErrorKind::Parse,
            Self::Field { .. } => ErrorKind::Field,
            Self::Alignment(_) => ErrorKind::Alignment,
        }
    }
}
