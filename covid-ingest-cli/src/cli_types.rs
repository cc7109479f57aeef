//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use covid_ingest_core::StatusKind;

#[derive(Parser)]
#[command(name = "covid-ingest")]
#[command(about = "Ingest and query the JHU CSSE COVID-19 time series", long_about = None)]
pub(crate) struct Cli {
    /// SQLite database file (overrides COVID_INGEST_DB and settings.toml)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Settings file (default: <config dir>/covid-ingest/settings.toml)
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// Only show warnings and errors
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Which pipeline `refresh` should run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum PipelineChoice {
    ConfirmedDeaths,
    Recoveries,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Download the feeds and ingest them once
    Refresh {
        /// Run a single pipeline instead of both
        #[arg(long, value_enum)]
        only: Option<PipelineChoice>,

        /// Read the CSV files from this directory instead of downloading them
        #[arg(long)]
        csv_dir: Option<PathBuf>,
    },

    /// Ingest on a fixed interval until interrupted (Ctrl-C)
    Schedule {
        /// Hours between runs (overrides COVID_INGEST_INTERVAL_HOURS and settings.toml)
        #[arg(long)]
        interval_hours: Option<u64>,

        /// Read the CSV files from this directory instead of downloading them
        #[arg(long)]
        csv_dir: Option<PathBuf>,
    },

    /// List every country in the database
    Countries,

    /// World totals at the latest recorded date
    Global,

    /// Per-country totals at the latest recorded date
    Summary,

    /// Time series of one status for a country
    Timeseries {
        /// Country slug (e.g., united-kingdom)
        slug: String,

        /// confirmed, deaths or recoveries
        status: StatusKind,

        /// Sum provinces into one value per date
        #[arg(long)]
        total: bool,
    },

    /// Show recent ingestion runs
    Log {
        /// Number of runs to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Inspect the resolved settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Show resolved settings and where each value came from
    Show,

    /// Print the settings file path
    Path,
}
