use serde::{Deserialize, Serialize};

/// The three case counts published by the upstream feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Confirmed,
    Deaths,
    Recoveries,
}

const ALL_STATUSES: &[StatusKind] = &[
    StatusKind::Confirmed,
    StatusKind::Deaths,
    StatusKind::Recoveries,
];

impl StatusKind {
    /// Lowercase name used on the command line and in output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Deaths => "deaths",
            Self::Recoveries => "recoveries",
        }
    }

    /// Table that stores this status.
    ///
    /// Confirmed cases and deaths share a table because they are ingested
    /// together from the paired feeds.
    pub fn table(&self) -> &'static str {
        match self {
            Self::Confirmed | Self::Deaths => "confirmed_and_deaths_time_series",
            Self::Recoveries => "recoveries_time_series",
        }
    }

    /// Columns holding the cumulative and daily-new counts for this status.
    pub fn columns(&self) -> (&'static str, &'static str) {
        match self {
            Self::Confirmed => ("confirmed_cases", "new_confirmed"),
            Self::Deaths => ("deaths", "new_deaths"),
            Self::Recoveries => ("recoveries", "new_recoveries"),
        }
    }

    pub fn all() -> &'static [StatusKind] {
        ALL_STATUSES
    }
}

impl std::fmt::Display for StatusKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not one of the known statuses.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid status '{0}', expected one of: confirmed, deaths, recoveries")]
pub struct StatusParseError(pub String);

impl std::str::FromStr for StatusKind {
    type Err = StatusParseError;

    /// Case-insensitive. `recovered` is accepted as an alias for `recoveries`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "confirmed" => Ok(Self::Confirmed),
            "deaths" => Ok(Self::Deaths),
            "recoveries" | "recovered" => Ok(Self::Recoveries),
            _ => Err(StatusParseError(s.to_string())),
        }
    }
}
