use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use switchboard_config::{Bundle, Config, OverridableConfig};
use switchboard_server::{ColdStart, RunMode};

use crate::cliapp::make_app;
use crate::setup;

/// Runs the command line application.
pub fn execute(cold_start: ColdStart) -> Result<()> {
    let matches = make_app().get_matches();
    let config = load_config(&matches)?;

    switchboard_log::init(config.logging());

    match matches.subcommand() {
        Some(("config", matches)) => manage_config(&config, matches),
        Some(("bundle", matches)) => manage_bundle(&config, matches),
        Some(("run", matches)) => run(config, parse_mode(matches), cold_start),
        // A Lambda bootstrap starts the binary without arguments.
        _ => run(config, RunMode::detect(), cold_start),
    }
}

/// Loads the config folder and applies command line and environment overrides.
fn load_config(matches: &ArgMatches) -> Result<Config> {
    // Always present through its default value.
    let path = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or(crate::cliapp::DEFAULT_CONFIG_DIR);

    let mut config = Config::from_path(Path::new(path))
        .with_context(|| format!("failed to load config from {path}"))?;
    config.apply_override(extract_config_args(matches))?;

    Ok(config)
}

/// Extract config arguments from a parsed command line arguments object.
pub fn extract_config_args(matches: &ArgMatches) -> OverridableConfig {
    let value = |id: &str| matches.get_one::<String>(id).cloned();

    OverridableConfig {
        host: value("host"),
        port: value("port"),
        log_level: value("log_level"),
        log_format: value("log_format"),
        bundle_path: value("bundle_path"),
    }
}

fn parse_mode(matches: &ArgMatches) -> RunMode {
    match matches.get_one::<String>("mode").map(String::as_str) {
        Some("lambda") => RunMode::Lambda,
        Some("http") => RunMode::Http,
        _ => RunMode::detect(),
    }
}

#[allow(clippy::print_stdout)]
fn manage_config(config: &Config, matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("show", matches)) => {
            match matches.get_one::<String>("format").map(String::as_str) {
                Some("debug") => println!("{config:#?}"),
                _ => print!("{}", config.to_yaml_string()?),
            }
            Ok(())
        }
        _ => unreachable!(),
    }
}

#[allow(clippy::print_stdout)]
fn manage_bundle(config: &Config, matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("check", matches)) => {
            let quiet = matches.get_flag("quiet");
            let (_, report) = Bundle::load(config.bundle_path(), config.bundle_files());

            for outcome in &report.outcomes {
                match &outcome.result {
                    Ok(size) if !quiet => println!("  ok     {} ({size} bytes)", outcome.name),
                    Ok(_) => (),
                    Err(error) => println!(
                        "  failed {}: {}",
                        outcome.name,
                        switchboard_log::LogError(error)
                    ),
                }
            }

            let loaded = report.loaded();
            println!(
                "{loaded} of {} configurations loaded in {:?}",
                report.outcomes.len(),
                report.elapsed
            );

            if loaded == 0 {
                bail!("no configuration could be loaded from {}", config.bundle_path().display());
            }

            Ok(())
        }
        _ => unreachable!(),
    }
}

fn run(config: Config, mode: RunMode, cold_start: ColdStart) -> Result<()> {
    setup::dump_spawn_infos(&config, mode);
    switchboard_server::run(config, mode, cold_start)?;
    Ok(())
}
