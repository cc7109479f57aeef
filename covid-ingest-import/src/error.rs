use covid_ingest_db::OperationError;
use covid_ingest_source::{ErrorKind, SourceError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
    #[error("Database error: {0}")]
    Storage(#[from] OperationError),
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Coarse classification of a failed run, for logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Transport,
    Parse,
    Field,
    Alignment,
    Storage,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::Parse => "parse",
            Self::Field => "field",
            Self::Alignment => "alignment",
            Self::Storage => "storage",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PipelineError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Source(e) => match e.kind() {
                ErrorKind::Transport => FailureKind::Transport,
                ErrorKind::Parse => FailureKind::Parse,
                ErrorKind::Field => FailureKind::Field,
                ErrorKind::Alignment => FailureKind::Alignment,
            },
            Self::Storage(_) | Self::Sqlite(_) => FailureKind::Storage,
        }
    }

    /// True when the feed could not be fetched or read to the end.
    pub fn is_transport(&self) -> bool {
        self.kind() == FailureKind::Transport
    }
}
