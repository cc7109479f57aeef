//! Where the feeds come from.
//!
//! [`HttpSource`] streams them from the JHU CSSE GitHub repository,
//! [`DirSource`] reads previously downloaded copies from a directory, and
//! [`StaticSource`] serves in-memory bytes.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::SourceError;

/// Base URL of the JHU CSSE global time-series files.
pub const DEFAULT_BASE_URL: &str = "https://raw.githubusercontent.com/CSSEGISandData/COVID-19/master/csse_covid_19_data/csse_covid_19_time_series/";

/// The three published feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    Confirmed,
    Deaths,
    Recoveries,
}

impl Dataset {
    /// File name under the base URL (or source directory).
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Confirmed => "time_series_covid19_confirmed_global.csv",
            Self::Deaths => "time_series_covid19_deaths_global.csv",
            Self::Recoveries => "time_series_covid19_recovered_global.csv",
        }
    }

    /// Short name used in log and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Deaths => "deaths",
            Self::Recoveries => "recoveries",
        }
    }
}

impl std::fmt::Display for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Something that can hand out a readable byte stream per feed.
pub trait CsvSource: Send + Sync {
    /// Open the feed for reading. The stream is consumed once.
    fn open(&self, dataset: Dataset) -> Result<Box<dyn Read + Send>, SourceError>;

    /// Human-readable location of the feed, for logs.
    fn describe(&self, dataset: Dataset) -> String;
}

// ── HTTP ────────────────────────────────────────────────────────────────────

/// Streams feeds over HTTP with a blocking client.
///
/// Must be created and dropped outside an async runtime context.
pub struct HttpSource {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::transport(format!("Failed to build HTTP client: {e}")))?;

        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(Self { client, base_url })
    }

    pub fn url(&self, dataset: Dataset) -> String {
        format!("{}{}", self.base_url, dataset.file_name())
    }
}

impl CsvSource for HttpSource {
    fn open(&self, dataset: Dataset) -> Result<Box<dyn Read + Send>, SourceError> {
        let url = self.url(dataset);
        let response = self.client.get(&url).send().map_err(|e| {
            SourceError::transport(format!("Failed to download {dataset} feed: {e}"))
        })?;

        if !response.status().is_success() {
            return Err(SourceError::transport(format!(
                "HTTP {} for {dataset} feed ({url})",
                response.status()
            )));
        }

        log::debug!("Streaming {dataset} feed from {url}");
        Ok(Box::new(response))
    }

    fn describe(&self, dataset: Dataset) -> String {
        self.url(dataset)
    }
}

// ── Local directory ─────────────────────────────────────────────────────────

/// Reads feeds from files named after [`Dataset::file_name`] in a directory.
pub struct DirSource {
    dir: PathBuf,
}

impl DirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, dataset: Dataset) -> PathBuf {
        self.dir.join(dataset.file_name())
    }
}

impl CsvSource for DirSource {
    fn open(&self, dataset: Dataset) -> Result<Box<dyn Read + Send>, SourceError> {
        let path = self.path(dataset);
        let file = File::open(&path).map_err(|e| {
            SourceError::transport(format!(
                "Failed to open {dataset} feed at {}: {e}",
                path.display()
            ))
        })?;
        Ok(Box::new(file))
    }

    fn describe(&self, dataset: Dataset) -> String {
        self.path(dataset).display().to_string()
    }
}

// ── In memory ───────────────────────────────────────────────────────────────

/// Serves fixed bytes per feed. A feed with no bytes registered fails to
/// open like a missing download would.
#[derive(Debug, Default, Clone)]
pub struct StaticSource {
    feeds: HashMap<Dataset, Vec<u8>>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, dataset: Dataset, body: impl Into<Vec<u8>>) -> Self {
        self.feeds.insert(dataset, body.into());
        self
    }
}

impl CsvSource for StaticSource {
    fn open(&self, dataset: Dataset) -> Result<Box<dyn Read + Send>, SourceError> {
        let body = self
            .feeds
            .get(&dataset)
            .ok_or_else(|| SourceError::transport(format!("No {dataset} feed registered")))?;
        Ok(Box::new(Cursor::new(body.clone())))
    }

    fn describe(&self, dataset: Dataset) -> String {
        format!("memory:{dataset}")
    }
}

#[cfg(test)]
#[path = "tests/fetch_tests.rs"]
mod tests;
