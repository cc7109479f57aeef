//! Resolved runtime settings.
//!
//! Each value is resolved by priority:
//!
//! 1. CLI flag
//! 2. Environment variable
//! 3. `settings.toml`
//! 4. Built-in default

use std::path::{Path, PathBuf};
use std::time::Duration;

use covid_ingest_source::DEFAULT_BASE_URL;
use serde::{Deserialize, Serialize};

use crate::CliError;

pub(crate) const ENV_DB: &str = "COVID_INGEST_DB";
pub(crate) const ENV_BASE_URL: &str = "COVID_INGEST_BASE_URL";
pub(crate) const ENV_INTERVAL_HOURS: &str = "COVID_INGEST_INTERVAL_HOURS";

const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_INTERVAL_HOURS: u64 = 12;

/// Canonical path to the settings file: `~/.config/covid-ingest/settings.toml`.
pub(crate) fn settings_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("covid-ingest").join("settings.toml")
}

/// Default database location: `<data dir>/covid-ingest/covid.db`.
pub(crate) fn default_database_path() -> PathBuf {
    let data = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    data.join("covid-ingest").join("covid.db")
}

/// Where a setting's value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SettingSource {
    Cli,
    EnvVar(&'static str),
    SettingsFile,
    Default,
}

impl std::fmt::Display for SettingSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "command line"),
            Self::EnvVar(var) => write!(f, "env ${}", var),
            Self::SettingsFile => write!(f, "settings file"),
            Self::Default => write!(f, "default"),
        }
    }
}

/// Provenance of each setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SettingSources {
    pub database: SettingSource,
    pub base_url: SettingSource,
    pub timeout: SettingSource,
    pub interval: SettingSource,
}

/// TOML settings file format.
#[derive(Debug, Default, Deserialize, Serialize)]
pub(crate) struct SettingsFile {
    storage: Option<StorageSection>,
    source: Option<SourceSection>,
    schedule: Option<ScheduleSection>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct StorageSection {
    database: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct SourceSection {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct ScheduleSection {
    interval_hours: Option<u64>,
}

impl SettingsFile {
    /// Read the settings file. A missing file is the same as an empty one;
    /// a file that exists but does not parse is an error.
    pub(crate) fn read(path: &Path) -> Result<Self, CliError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        toml::from_str(&content)
            .map_err(|e| CliError::config(format!("Invalid settings file {}: {}", path.display(), e)))
    }
}

/// Values given on the command line.
#[derive(Debug, Default, Clone)]
pub(crate) struct Overrides {
    pub database: Option<PathBuf>,
    pub interval_hours: Option<u64>,
}

#[derive(Debug, Clone)]
pub(crate) struct Settings {
    pub database: PathBuf,
    pub base_url: String,
    pub timeout: Duration,
    pub interval: Duration,
    pub sources: SettingSources,
}

impl Settings {
    /// Load settings from the file at `path`, the process environment and
    /// the CLI overrides.
    pub(crate) fn load(path: &Path, overrides: Overrides) -> Result<Self, CliError> {
        let file = SettingsFile::read(path)?;
        Self::resolve(file, |var| std::env::var(var).ok(), overrides)
    }

    /// Resolve every setting from its candidate sources.
    ///
    /// `env` looks up an environment variable by name.
    pub(crate) fn resolve(
        file: SettingsFile,
        env: impl Fn(&str) -> Option<String>,
        overrides: Overrides,
    ) -> Result<Self, CliError> {
        let storage = file.storage.unwrap_or_default();
        let source = file.source.unwrap_or_default();
        let schedule = file.schedule.unwrap_or_default();

        let (database, database_source) = if let Some(db) = overrides.database {
            (db, SettingSource::Cli)
        } else if let Some(db) = env(ENV_DB).filter(|v| !v.is_empty()) {
            (PathBuf::from(db), SettingSource::EnvVar(ENV_DB))
        } else if let Some(db) = storage.database {
            (db, SettingSource::SettingsFile)
        } else {
            (default_database_path(), SettingSource::Default)
        };

        let (base_url, base_url_source) =
            if let Some(url) = env(ENV_BASE_URL).filter(|v| !v.is_empty()) {
                (url, SettingSource::EnvVar(ENV_BASE_URL))
            } else if let Some(url) = source.base_url {
                (url, SettingSource::SettingsFile)
            } else {
                (DEFAULT_BASE_URL.to_string(), SettingSource::Default)
            };

        let (timeout_secs, timeout_source) = match source.timeout_secs {
            Some(secs) => (secs, SettingSource::SettingsFile),
            None => (DEFAULT_TIMEOUT_SECS, SettingSource::Default),
        };

        let (interval_hours, interval_source) = if let Some(hours) = overrides.interval_hours {
            (hours, SettingSource::Cli)
        } else if let Some(raw) = env(ENV_INTERVAL_HOURS).filter(|v| !v.is_empty()) {
            let hours = raw.trim().parse::<u64>().map_err(|e| {
                CliError::config(format!("{ENV_INTERVAL_HOURS}={raw:?} is not a number: {e}"))
            })?;
            (hours, SettingSource::EnvVar(ENV_INTERVAL_HOURS))
        } else if let Some(hours) = schedule.interval_hours {
            (hours, SettingSource::SettingsFile)
        } else {
            (DEFAULT_INTERVAL_HOURS, SettingSource::Default)
        };

        if interval_hours == 0 {
            return Err(CliError::config(format!(
                "Schedule interval must be at least 1 hour ({interval_source})"
            )));
        }
        if timeout_secs == 0 {
            return Err(CliError::config("source.timeout_secs must be at least 1"));
        }

        Ok(Self {
            database,
            base_url,
            timeout: Duration::from_secs(timeout_secs),
            interval: Duration::from_secs(interval_hours * 3600),
            sources: SettingSources {
                database: database_source,
                base_url: base_url_source,
                timeout: timeout_source,
                interval: interval_source,
            },
        })
    }
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
