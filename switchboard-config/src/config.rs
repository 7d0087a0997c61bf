use std::env;
use std::error::Error;
use std::fmt;
use std::fs;
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use switchboard_log::{LogConfig, LogFormat, LogLevel};

/// The file name of the service configuration within the config folder.
const CONFIG_FILE_NAME: &str = "config.yml";

/// The documents loaded into the bundle when the configuration does not list any.
pub const DEFAULT_BUNDLE_FILES: &[&str] = &[
    "config.json",
    "config_1.json",
    "config_2.json",
    "config_3.json",
    "config_4.json",
];

/// Defines the source of a config error.
#[derive(Debug, Default)]
enum ConfigErrorSource {
    /// An error occurring independently.
    #[default]
    None,
    /// An error originating from a configuration file.
    File(PathBuf),
    /// An error originating in a field override (an env var, or a CLI parameter).
    FieldOverride(&'static str),
}

/// Indicates config related errors.
#[derive(Debug)]
pub struct ConfigError {
    source: ConfigErrorSource,
    kind: ConfigErrorKind,
    cause: Option<Box<dyn Error + Send + Sync + 'static>>,
}

impl ConfigError {
    #[inline]
    fn new(kind: ConfigErrorKind) -> Self {
        Self {
            source: ConfigErrorSource::None,
            kind,
            cause: None,
        }
    }

    #[inline]
    fn wrap<E>(cause: E, kind: ConfigErrorKind) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self {
            cause: Some(Box::new(cause)),
            ..Self::new(kind)
        }
    }

    #[inline]
    fn for_field<E>(cause: E, field: &'static str) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self::wrap(cause, ConfigErrorKind::InvalidValue).field(field)
    }

    #[inline]
    fn file<P: AsRef<Path>>(mut self, p: P) -> Self {
        self.source = ConfigErrorSource::File(p.as_ref().to_path_buf());
        self
    }

    #[inline]
    fn field(mut self, name: &'static str) -> Self {
        self.source = ConfigErrorSource::FieldOverride(name);
        self
    }

    /// Returns the error kind of the error.
    pub fn kind(&self) -> ConfigErrorKind {
        self.kind
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            ConfigErrorSource::None => self.kind.fmt(f),
            ConfigErrorSource::File(file_name) => {
                write!(f, "{} (file {})", self.kind, file_name.display())
            }
            ConfigErrorSource::FieldOverride(name) => write!(f, "{} (field {})", self.kind, name),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn Error + 'static))
    }
}

/// Indicates config related errors.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, thiserror::Error)]
pub enum ConfigErrorKind {
    /// Failed to open the file.
    #[error("could not open config file")]
    CouldNotOpenFile,
    /// Failed to serialize the configuration.
    #[error("could not write config file")]
    CouldNotWriteFile,
    /// Parsing YAML failed.
    #[error("could not parse yaml config file")]
    BadYaml,
    /// Parsing JSON failed.
    #[error("could not parse json config file")]
    BadJson,
    /// Invalid config value.
    #[error("invalid config value")]
    InvalidValue,
}

/// Structure used to hold information about configuration overrides via
/// CLI parameters or environment variables.
#[derive(Debug, Default)]
pub struct OverridableConfig {
    /// The host the local HTTP server should bind to (network interface).
    pub host: Option<String>,
    /// The port to bind for the local HTTP server.
    pub port: Option<String>,
    /// The log level.
    pub log_level: Option<String>,
    /// The log format.
    pub log_format: Option<String>,
    /// The directory holding the configuration bundle.
    pub bundle_path: Option<String>,
}

/// Settings of the local HTTP server.
///
/// These are ignored when running inside the Lambda runtime.
#[derive(Serialize, Deserialize, Debug)]
#[serde(default)]
pub struct Server {
    /// The host to bind to (network interface).
    pub host: IpAddr,
    /// The port to bind for the HTTP server.
    pub port: u16,
    /// Maximum time in seconds to wait for in-flight requests during a graceful shutdown.
    pub shutdown_timeout: u64,
}

impl Default for Server {
    fn default() -> Self {
        Server {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
            shutdown_timeout: 10,
        }
    }
}

/// Location and contents of the configuration bundle.
#[derive(Serialize, Deserialize, Debug)]
#[serde(default)]
pub struct BundleConfig {
    /// The directory holding the bundle documents.
    ///
    /// Relative paths resolve against the working directory of the process, which is the
    /// function's task root on Lambda.
    pub path: PathBuf,
    /// File names of the documents, in load order.
    pub files: Vec<String>,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("."),
            files: DEFAULT_BUNDLE_FILES.iter().map(|&f| f.to_owned()).collect(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Default)]
struct ConfigValues {
    #[serde(default)]
    server: Server,
    #[serde(default)]
    logging: LogConfig,
    #[serde(default)]
    bundle: BundleConfig,
}

impl ConfigValues {
    /// The full path of the config file within the given folder.
    fn path(base: &Path) -> PathBuf {
        base.join(CONFIG_FILE_NAME)
    }

    /// Loads the config file from the given folder.
    fn load(base: &Path) -> Result<Self, ConfigError> {
        let path = Self::path(base);

        let f = fs::File::open(&path)
            .map_err(|e| ConfigError::wrap(e, ConfigErrorKind::CouldNotOpenFile).file(&path))?;

        serde_yaml::from_reader(io::BufReader::new(f))
            .map_err(|e| ConfigError::wrap(e, ConfigErrorKind::BadYaml).file(&path))
    }
}

/// Config struct.
pub struct Config {
    values: ConfigValues,
    path: PathBuf,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("path", &self.path)
            .field("values", &self.values)
            .finish()
    }
}

impl Config {
    /// Loads a config from a given config folder.
    ///
    /// A folder without a `config.yml` yields the default configuration.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let path = env::current_dir()
            .map(|x| x.join(path.as_ref()))
            .unwrap_or_else(|_| path.as_ref().to_path_buf());

        let values = if Self::config_exists(&path) {
            ConfigValues::load(&path)?
        } else {
            ConfigValues::default()
        };

        Ok(Config { values, path })
    }

    /// Creates a config from a JSON value.
    ///
    /// This is mostly useful for tests.
    pub fn from_json_value(value: serde_json::Value) -> Result<Config, ConfigError> {
        Ok(Config {
            values: serde_json::from_value(value)
                .map_err(|err| ConfigError::wrap(err, ConfigErrorKind::BadJson))?,
            path: PathBuf::new(),
        })
    }

    /// Override configuration with values coming from other sources (e.g. env variables or
    /// command line parameters).
    pub fn apply_override(
        &mut self,
        overrides: OverridableConfig,
    ) -> Result<&mut Self, ConfigError> {
        let server = &mut self.values.server;

        if let Some(host) = overrides.host {
            server.host = host
                .parse::<IpAddr>()
                .map_err(|err| ConfigError::for_field(err, "host"))?;
        }

        if let Some(port) = overrides.port {
            server.port = port
                .as_str()
                .parse()
                .map_err(|err| ConfigError::for_field(err, "port"))?;
        }

        let logging = &mut self.values.logging;

        if let Some(level) = overrides.log_level {
            logging.level = level
                .parse::<LogLevel>()
                .map_err(|err| ConfigError::for_field(err, "log_level"))?;
        }

        if let Some(format) = overrides.log_format {
            logging.format = format
                .parse::<LogFormat>()
                .map_err(|err| ConfigError::for_field(err, "log_format"))?;
        }

        if let Some(bundle_path) = overrides.bundle_path {
            if bundle_path.is_empty() {
                return Err(ConfigError::new(ConfigErrorKind::InvalidValue).field("bundle_path"));
            }
            self.values.bundle.path = PathBuf::from(bundle_path);
        }

        Ok(self)
    }

    /// Checks if the config folder contains a config file.
    pub fn config_exists<P: AsRef<Path>>(path: P) -> bool {
        fs::metadata(ConfigValues::path(path.as_ref())).is_ok()
    }

    /// Returns the path of the config folder.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Dumps out a YAML string of the values.
    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(&self.values)
            .map_err(|e| ConfigError::wrap(e, ConfigErrorKind::CouldNotWriteFile))
    }

    /// Returns the socket address of the local HTTP server.
    pub fn listen_addr(&self) -> SocketAddr {
        (self.values.server.host, self.values.server.port).into()
    }

    /// Returns the maximum time to wait for in-flight requests on shutdown.
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.values.server.shutdown_timeout)
    }

    /// Returns the logging configuration.
    pub fn logging(&self) -> &LogConfig {
        &self.values.logging
    }

    /// Returns the directory holding the configuration bundle.
    pub fn bundle_path(&self) -> &Path {
        &self.values.bundle.path
    }

    /// Returns the file names of the bundle documents, in load order.
    pub fn bundle_files(&self) -> &[String] {
        &self.values.bundle.files
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            values: ConfigValues::default(),
            path: PathBuf::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv6Addr;

    use super::*;

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let values: ConfigValues = serde_yaml::from_str("{}").unwrap();
        assert_eq!(values.server.host, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(values.server.port, 3000);
        assert_eq!(values.server.shutdown_timeout, 10);
        assert_eq!(values.bundle.path, PathBuf::from("."));
        assert_eq!(values.bundle.files, DEFAULT_BUNDLE_FILES);
        assert_eq!(values.logging.level, LogLevel::Info);
    }

    #[test]
    fn test_partial_sections() {
        let yaml = r###"
server:
    port: 8080
bundle:
    files:
        - extra.json
"###;

        let values: ConfigValues = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(values.server.port, 8080);
        assert_eq!(values.server.shutdown_timeout, 10);
        assert_eq!(values.bundle.path, PathBuf::from("."));
        assert_eq!(values.bundle.files, vec!["extra.json".to_owned()]);
    }

    #[test]
    fn test_default_listen_addr() {
        let config = Config::default();
        assert_eq!(config.listen_addr().to_string(), "127.0.0.1:3000");
    }

    #[test]
    fn test_from_path_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::from_path(dir.path()).unwrap();

        assert_eq!(config.path(), dir.path());
        assert_eq!(config.bundle_files().len(), DEFAULT_BUNDLE_FILES.len());
    }

    #[test]
    fn test_from_path_reads_config_yml() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("config.yml"),
            "server:\n  host: 0.0.0.0\n  port: 9000\nlogging:\n  level: debug\n",
        )
        .unwrap();

        let config = Config::from_path(dir.path()).unwrap();
        assert_eq!(config.listen_addr(), "0.0.0.0:9000".parse().unwrap());
        assert_eq!(config.logging().level, LogLevel::Debug);
    }

    #[test]
    fn test_from_path_bad_yaml() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("config.yml"), "server: [").unwrap();

        let error = Config::from_path(dir.path()).unwrap_err();
        assert_eq!(error.kind(), ConfigErrorKind::BadYaml);
        assert!(error.source().is_some());
        assert!(error.to_string().starts_with("could not parse yaml config file (file "));
    }

    #[test]
    fn test_apply_override() {
        let mut config = Config::default();
        config
            .apply_override(OverridableConfig {
                host: Some("::1".to_owned()),
                port: Some("4000".to_owned()),
                log_level: Some("trace".to_owned()),
                log_format: Some("json".to_owned()),
                bundle_path: Some("/var/task/configs".to_owned()),
            })
            .unwrap();

        assert_eq!(
            config.listen_addr(),
            SocketAddr::from((Ipv6Addr::LOCALHOST, 4000))
        );
        assert_eq!(config.logging().level, LogLevel::Trace);
        assert_eq!(config.logging().format, LogFormat::Json);
        assert_eq!(config.bundle_path(), Path::new("/var/task/configs"));
    }

    #[test]
    fn test_apply_override_invalid_port() {
        let mut config = Config::default();
        let error = config
            .apply_override(OverridableConfig {
                port: Some("http".to_owned()),
                ..Default::default()
            })
            .unwrap_err();

        assert_eq!(error.kind(), ConfigErrorKind::InvalidValue);
        assert_eq!(error.to_string(), "invalid config value (field port)");
    }

    #[test]
    fn test_apply_override_empty_bundle_path() {
        let mut config = Config::default();
        let error = config
            .apply_override(OverridableConfig {
                bundle_path: Some(String::new()),
                ..Default::default()
            })
            .unwrap_err();

        assert_eq!(error.to_string(), "invalid config value (field bundle_path)");
    }

    #[test]
    fn test_from_json_value() {
        let config = Config::from_json_value(serde_json::json!({
            "server": {"shutdown_timeout": 0},
            "bundle": {"path": "fixtures"}
        }))
        .unwrap();

        assert_eq!(config.shutdown_timeout(), Duration::ZERO);
        assert_eq!(config.bundle_path(), Path::new("fixtures"));
    }

    #[test]
    fn test_yaml_dump_parses_back() {
        let config = Config::default();
        let yaml = config.to_yaml_string().unwrap();
        let values: ConfigValues = serde_yaml::from_str(&yaml).unwrap();

        similar_asserts::assert_eq!(values.bundle.files, config.bundle_files());
        assert_eq!(values.server.port, 3000);
    }
}
