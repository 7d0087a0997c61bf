//! This module implements the definition of the command line app.

use clap::builder::PossibleValuesParser;
use clap::{Arg, ArgAction, Command};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const ABOUT: &str = "Serves a bundle of configuration documents from AWS Lambda.";

/// The config folder used when neither `--config` nor `SWITCHBOARD_CONFIG` is given.
pub const DEFAULT_CONFIG_DIR: &str = ".switchboard";

pub fn make_app() -> Command {
    Command::new("switchboard")
        .disable_help_subcommand(true)
        .max_term_width(79)
        .version(VERSION)
        .about(ABOUT)
        .arg(
            Arg::new("config")
                .value_name("CONFIG")
                .long("config")
                .short('c')
                .global(true)
                .env("SWITCHBOARD_CONFIG")
                .default_value(DEFAULT_CONFIG_DIR)
                .help("The path to the config folder."),
        )
        .arg(
            Arg::new("host")
                .value_name("HOST")
                .long("host")
                .global(true)
                .env("SWITCHBOARD_HOST")
                .help("The interface the local HTTP server binds to."),
        )
        .arg(
            Arg::new("port")
                .value_name("PORT")
                .long("port")
                .short('p')
                .global(true)
                .env("SWITCHBOARD_PORT")
                .help("The port the local HTTP server binds to."),
        )
        .arg(
            Arg::new("log_level")
                .value_name("LEVEL")
                .long("log-level")
                .global(true)
                .env("SWITCHBOARD_LOG_LEVEL")
                .value_parser(PossibleValuesParser::new([
                    "off", "error", "warn", "info", "debug", "trace",
                ]))
                .help("The log level of Switchboard."),
        )
        .arg(
            Arg::new("log_format")
                .value_name("FORMAT")
                .long("log-format")
                .global(true)
                .env("SWITCHBOARD_LOG_FORMAT")
                .value_parser(PossibleValuesParser::new([
                    "auto",
                    "pretty",
                    "simplified",
                    "json",
                ]))
                .help("The format of log output."),
        )
        .arg(
            Arg::new("bundle_path")
                .value_name("PATH")
                .long("bundle-path")
                .global(true)
                .env("SWITCHBOARD_BUNDLE_PATH")
                .help("The directory holding the configuration documents."),
        )
        .subcommand(
            Command::new("run")
                .about("Run the function")
                .after_help(
                    "This serves requests in the foreground until the host stops.  Inside \
                     the Lambda execution environment, requests are received from the Lambda \
                     runtime API.  Otherwise, a local HTTP server binds to the configured \
                     interface and port.  This is also what happens when no subcommand is \
                     given.",
                )
                .arg(
                    Arg::new("mode")
                        .long("mode")
                        .short('m')
                        .value_name("MODE")
                        .value_parser(PossibleValuesParser::new(["auto", "lambda", "http"]))
                        .default_value("auto")
                        .help("How to host the function."),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Manage the service config")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommand(
                    Command::new("show")
                        .about("Show the entire config out for debugging purposes")
                        .after_help(
                            "This dumps out the entire config including the values \
                             which are not in the config file but filled in from \
                             defaults or overrides.  The default output format is YAML but \
                             a debug format can also be specified.",
                        )
                        .arg(
                            Arg::new("format")
                                .short('f')
                                .long("format")
                                .value_parser(PossibleValuesParser::new(["debug", "yaml"]))
                                .default_value("yaml")
                                .help("The output format"),
                        ),
                ),
        )
        .subcommand(
            Command::new("bundle")
                .about("Inspect the configuration bundle")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommand(
                    Command::new("check")
                        .about("Load all configuration documents and report the outcome")
                        .after_help(
                            "This loads the configuration bundle like a cold start would \
                             and prints one line per document.  The command fails if no \
                             document could be loaded.",
                        )
                        .arg(
                            Arg::new("quiet")
                                .long("quiet")
                                .short('q')
                                .action(ArgAction::SetTrue)
                                .help("Only report failures"),
                        ),
                ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_definition() {
        make_app().debug_assert();
    }

    #[test]
    fn test_no_subcommand_parses() {
        let matches = make_app().try_get_matches_from(["switchboard"]).unwrap();
        assert!(matches.subcommand().is_none());
    }

    #[test]
    fn test_global_args_after_subcommand() {
        let matches = make_app()
            .try_get_matches_from(["switchboard", "run", "--mode", "http", "--port", "8080"])
            .unwrap();

        let (name, run) = matches.subcommand().unwrap();
        assert_eq!(name, "run");
        assert_eq!(run.get_one::<String>("mode").map(String::as_str), Some("http"));
        assert_eq!(run.get_one::<String>("port").map(String::as_str), Some("8080"));
    }

    #[test]
    fn test_rejects_unknown_mode() {
        let result = make_app().try_get_matches_from(["switchboard", "run", "--mode", "ftp"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_config_requires_subcommand() {
        let result = make_app().try_get_matches_from(["switchboard", "config"]);
        assert!(result.is_err());
    }
}
