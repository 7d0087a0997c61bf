use std::env;
use std::fmt;
use std::io;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Layer, fmt as subscriber_fmt};

// Import CRATE_NAMES, which lists all crates in the workspace.
include!(concat!(env!("OUT_DIR"), "/constants.gen.rs"));

/// Error returned when parsing a [`LogLevel`] or [`LogFormat`] from a string.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseLogOptionError {
    expected: &'static str,
}

impl fmt::Display for ParseLogOptionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected one of: {}", self.expected)
    }
}

impl std::error::Error for ParseLogOptionError {}

/// Controls the log format.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Auto detect the best format.
    ///
    /// This chooses [`LogFormat::Pretty`] for TTY, otherwise [`LogFormat::Simplified`]. Lambda
    /// never attaches a TTY, so functions log in the simplified format unless configured otherwise.
    Auto,

    /// Pretty printing with colors.
    ///
    /// ```text
    ///  INFO switchboard_server::service: cold start initialized at 2024-04-02T09:41:07.113Z
    /// ```
    Pretty,

    /// Simplified plain text output.
    ///
    /// ```text
    /// 2024-04-02T09:41:07.113902Z  INFO switchboard_server::service: cold start initialized at 2024-04-02T09:41:07.113Z
    /// ```
    Simplified,

    /// Dump out JSON lines.
    ///
    /// ```text
    /// {"timestamp":"2024-04-02T09:41:07.113902Z","level":"INFO","message":"loading configurations","target":"switchboard_config::bundle","filename":"switchboard-config/src/bundle.rs","line_number":171}
    /// ```
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Auto => write!(f, "auto"),
            LogFormat::Pretty => write!(f, "pretty"),
            LogFormat::Simplified => write!(f, "simplified"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for LogFormat {
    type Err = ParseLogOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(LogFormat::Auto),
            "pretty" => Ok(LogFormat::Pretty),
            "simplified" => Ok(LogFormat::Simplified),
            "json" => Ok(LogFormat::Json),
            _ => Err(ParseLogOptionError {
                expected: "auto, pretty, simplified, json",
            }),
        }
    }
}

/// The maximum level of log messages emitted by Switchboard's crates.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Disables logging entirely.
    Off,
    /// Only errors.
    Error,
    /// Errors and warnings.
    Warn,
    /// The default: cold start, configuration loading and request lines.
    Info,
    /// Adds request details such as headers.
    Debug,
    /// Everything, including third-party internals.
    Trace,
}

impl LogLevel {
    /// Returns the `tracing` filter corresponding to this level.
    pub fn level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Off => write!(f, "off"),
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = ParseLogOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" => Ok(LogLevel::Off),
            "error" => Ok(LogLevel::Error),
            "warn" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(ParseLogOptionError {
                expected: "off, error, warn, info, debug, trace",
            }),
        }
    }
}

/// Controls the logging system.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct LogConfig {
    /// The log level for Switchboard.
    pub level: LogLevel,

    /// Controls the log output format.
    ///
    /// Defaults to [`LogFormat::Auto`], which detects the best format based on the TTY.
    pub format: LogFormat,

    /// When set to `true`, backtraces are forced on.
    ///
    /// Otherwise, backtraces can be enabled by setting the `RUST_BACKTRACE` variable to `full`.
    pub enable_backtraces: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Auto,
            enable_backtraces: false,
        }
    }
}

/// Builds the filter used when `RUST_LOG` is not set.
///
/// Third-party crates log at `INFO`, all of Switchboard's crates at the configured level.
fn get_default_filters(level: LogLevel) -> EnvFilter {
    let mut env_filter = EnvFilter::new("INFO,hyper=WARN,lambda_runtime=WARN");

    for name in CRATE_NAMES {
        if let Ok(directive) = format!("{name}={}", level.level_filter()).parse() {
            env_filter = env_filter.add_directive(directive);
        }
    }

    env_filter
}

/// Initialize the logging system.
///
/// This must be called before any threads are spawned, in particular before the async runtime is
/// created. Calling it a second time has no effect.
pub fn init(config: &LogConfig) {
    if config.enable_backtraces {
        // SAFETY: Called at startup on the main thread before the runtime spawns workers.
        unsafe { env::set_var("RUST_BACKTRACE", "full") };
    }

    let subscriber = subscriber_fmt::layer()
        .with_writer(io::stderr)
        .with_target(true);

    let format = match (config.format, console::user_attended()) {
        (LogFormat::Auto, true) | (LogFormat::Pretty, _) => {
            subscriber.compact().without_time().boxed()
        }
        (LogFormat::Auto, false) | (LogFormat::Simplified, _) => {
            subscriber.with_ansi(false).boxed()
        }
        (LogFormat::Json, _) => subscriber
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
    };

    let filter = match env::var(EnvFilter::DEFAULT_ENV) {
        Ok(value) => EnvFilter::new(value),
        Err(_) => get_default_filters(config.level),
    };

    tracing_subscriber::registry()
        .with(format.with_filter(filter))
        .try_init()
        .ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_config_defaults() {
        let config: LogConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.level, LogLevel::Info);
        assert_eq!(config.format, LogFormat::Auto);
        assert!(!config.enable_backtraces);
    }

    #[test]
    fn test_log_config_from_yaml() {
        let yaml = r###"
level: debug
format: json
"###;

        let config: LogConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.level, LogLevel::Debug);
        assert_eq!(config.format, LogFormat::Json);
    }

    #[test]
    fn test_log_level_parse() {
        assert_eq!("warn".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert_eq!("trace".parse::<LogLevel>(), Ok(LogLevel::Trace));
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_log_level_parse_matches_yaml() {
        for name in ["WARN", "warning", "Info"] {
            assert!(name.parse::<LogLevel>().is_err(), "{name}");
            assert!(serde_yaml::from_str::<LogLevel>(name).is_err(), "{name}");
        }

        for level in [LogLevel::Off, LogLevel::Warn, LogLevel::Trace] {
            let name = level.to_string();
            assert_eq!(name.parse::<LogLevel>(), Ok(level));
            assert_eq!(serde_yaml::from_str::<LogLevel>(&name).unwrap(), level);
        }
    }

    #[test]
    fn test_log_format_display_roundtrips_through_parse() {
        for format in [
            LogFormat::Auto,
            LogFormat::Pretty,
            LogFormat::Simplified,
            LogFormat::Json,
        ] {
            assert_eq!(format.to_string().parse::<LogFormat>(), Ok(format));
        }
    }

    #[test]
    fn test_invalid_format_message() {
        let error = "xml".parse::<LogFormat>().unwrap_err();
        assert_eq!(
            error.to_string(),
            "expected one of: auto, pretty, simplified, json"
        );
    }

    #[test]
    fn test_default_filters_cover_workspace_crates() {
        assert!(CRATE_NAMES.contains(&"switchboard_log"));
        let filter = get_default_filters(LogLevel::Debug).to_string();
        assert!(filter.contains("switchboard_log=debug"));
    }
}
