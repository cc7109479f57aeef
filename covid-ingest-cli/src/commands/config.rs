use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::settings::{SettingSource, Settings};

fn source_label(source: SettingSource) -> String {
    format!("({})", source)
}

/// Show resolved settings and where each value came from.
pub(crate) fn run_config_show(settings: &Settings, path: &Path) {
    println!(
        "{}",
        "covid-ingest settings".if_supports_color(Stdout, |t| t.bold()),
    );
    println!();

    if path.exists() {
        println!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(exists)".if_supports_color(Stdout, |t| t.green()),
        );
    } else {
        println!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(not found)".if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    println!();

    let interval_hours = settings.interval.as_secs() / 3600;
    let rows: [(&str, String, SettingSource); 4] = [
        (
            "database",
            settings.database.display().to_string(),
            settings.sources.database,
        ),
        (
            "base_url",
            settings.base_url.clone(),
            settings.sources.base_url,
        ),
        (
            "timeout",
            format!("{}s", settings.timeout.as_secs()),
            settings.sources.timeout,
        ),
        (
            "interval",
            format!("{}h", interval_hours),
            settings.sources.interval,
        ),
    ];
    for (name, value, source) in rows {
        println!(
            "  {:<10} {} {}",
            name,
            value,
            source_label(source).if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
}

/// Print the settings file path.
pub(crate) fn run_config_path(path: &Path) {
    println!("{}", path.display());
}
