//! covid-ingest CLI
//!
//! Loads the JHU CSSE COVID-19 time-series feeds into SQLite, on demand or on
//! a schedule, and queries the stored data.

mod cli_types;
mod commands;
mod error;
mod scheduler;
mod settings;
mod spinner;

use clap::Parser;

use cli_types::{Cli, Commands, ConfigAction};
pub(crate) use error::CliError;
use settings::{Overrides, Settings};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    if let Err(e) = run(cli) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

/// Log to stderr. `RUST_LOG` takes precedence over `--quiet`/`--verbose`.
fn init_logging(quiet: bool, verbose: bool) {
    let default_filter = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter));
    if !verbose {
        builder.format_timestamp(None).format_target(false);
    }
    builder.init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    let settings_path = cli.settings.unwrap_or_else(settings::settings_path);

    if let Commands::Config {
        action: ConfigAction::Path,
    } = cli.command
    {
        commands::config::run_config_path(&settings_path);
        return Ok(());
    }

    let interval_hours = match &cli.command {
        Commands::Schedule { interval_hours, .. } => *interval_hours,
        _ => None,
    };
    let settings = Settings::load(
        &settings_path,
        Overrides {
            database: cli.db,
            interval_hours,
        },
    )?;
    log::debug!(
        "Database {} ({})",
        settings.database.display(),
        settings.sources.database
    );

    match cli.command {
        Commands::Refresh { only, csv_dir } => {
            commands::refresh::run_refresh(&settings, only, csv_dir, cli.quiet)
        }
        Commands::Schedule { csv_dir, .. } => commands::schedule::run_schedule(&settings, csv_dir),
        Commands::Countries => commands::query::run_countries(&settings),
        Commands::Global => commands::query::run_global(&settings),
        Commands::Summary => commands::query::run_summary(&settings),
        Commands::Timeseries {
            slug,
            status,
            total,
        } => commands::query::run_timeseries(&settings, &slug, status, total),
        Commands::Log { limit } => commands::query::run_log(&settings, limit),
        Commands::Config { action } => {
            match action {
                ConfigAction::Show => commands::config::run_config_show(&settings, &settings_path),
                ConfigAction::Path => commands::config::run_config_path(&settings_path),
            }
            Ok(())
        }
    }
}
