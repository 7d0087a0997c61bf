use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

use serde::Serialize;
use switchboard_log::LogError;

/// Connection settings of a database.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DatabaseSection {
    /// Hostname of the database server.
    pub host: String,
    /// Port of the database server.
    pub port: i64,
    /// User to authenticate as.
    pub username: String,
    /// Password of the user.
    pub password: String,
    /// Upper bound for pooled connections.
    pub max_connections: i64,
    /// Connection timeout.
    pub timeout: i64,
}

crate::decode_fields!(DatabaseSection {
    host,
    port,
    username,
    password,
    max_connections,
    timeout,
});

/// Feature toggles.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FeaturesSection {
    /// Toggle for feature X.
    pub enable_feature_x: bool,
    /// Toggle for feature Y.
    pub enable_feature_y: bool,
    /// Users enrolled in beta features.
    ///
    /// Serialized as `null` when absent from the source document.
    pub beta_users: Option<Vec<String>>,
}

crate::decode_fields!(FeaturesSection {
    enable_feature_x,
    enable_feature_y,
    beta_users,
});

/// Logging settings of a downstream application.
///
/// These are served as data and do not affect Switchboard's own logging.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LoggingSection {
    /// Log level name.
    pub level: String,
    /// Log format name.
    pub format: String,
    /// Log destination.
    pub output: String,
}

crate::decode_fields!(LoggingSection {
    level,
    format,
    output,
});

/// A downstream service endpoint.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ServiceEndpoint {
    /// Name of the service.
    pub name: String,
    /// Base URL of the service.
    pub url: String,
    /// Number of retries for failed calls.
    pub retries: i64,
}

crate::decode_fields!(ServiceEndpoint { name, url, retries });

/// A configuration document of the bundle.
///
/// Every field is optional in the source file and takes its zero value when absent or `null`.
/// Field names match case-insensitively and unknown fields are ignored, see [`fields`](crate::fields)
/// for the full decoding rules. Serialization always emits every field.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Document {
    /// Database connection settings.
    pub database: DatabaseSection,
    /// Feature toggles.
    pub features: FeaturesSection,
    /// Logging settings.
    pub logging: LoggingSection,
    /// Downstream services, `null` when absent from the source document.
    pub services: Option<Vec<ServiceEndpoint>>,
    /// Opaque payload.
    pub large_data: String,
}

crate::decode_fields!(Document {
    database,
    features,
    logging,
    services,
    large_data,
});

impl Document {
    /// Parses a document from raw JSON bytes.
    ///
    /// The input must be a JSON object or `null`.
    pub fn from_slice(data: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(data)
    }
}

/// Failure to load a single document of the bundle.
#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    /// The file could not be read.
    #[error("could not read config file")]
    Read(#[source] io::Error),
    /// The file is not a valid document.
    #[error("could not parse config file")]
    Parse(#[source] serde_json::Error),
}

/// Outcome of loading one document.
#[derive(Debug)]
pub struct LoadOutcome {
    /// File name of the document, as listed in the configuration.
    pub name: String,
    /// Size of the file in bytes if it was loaded.
    pub result: Result<usize, BundleError>,
}

/// Per-document outcomes of [`Bundle::load`].
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Outcomes in load order.
    pub outcomes: Vec<LoadOutcome>,
    /// Total time spent loading.
    pub elapsed: Duration,
}

impl LoadReport {
    /// Returns the number of documents that were loaded.
    pub fn loaded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }
}

/// The configuration documents loaded at cold start, keyed by file name.
///
/// The bundle is immutable once loaded. Keys are kept sorted so that serialization is stable.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Bundle {
    documents: BTreeMap<String, Document>,
}

impl Bundle {
    /// Loads the listed files from `base` into a bundle.
    ///
    /// Files are processed in order. A file that cannot be read or parsed is logged and skipped;
    /// loading never fails as a whole and may yield an empty bundle. If a name is listed twice,
    /// the later document replaces the earlier one.
    pub fn load<S: AsRef<str>>(base: &Path, files: &[S]) -> (Self, LoadReport) {
        let start = Instant::now();
        switchboard_log::info!("loading configurations");

        let mut documents = BTreeMap::new();
        let mut outcomes = Vec::with_capacity(files.len());

        for name in files {
            let name = name.as_ref();
            let result = load_document(&base.join(name));

            let result = match result {
                Ok((document, size)) => {
                    documents.insert(name.to_owned(), document);
                    switchboard_log::info!(
                        "loaded {name} in {:?} (size {size} bytes)",
                        start.elapsed()
                    );
                    Ok(size)
                }
                Err(error) => {
                    match &error {
                        BundleError::Read(cause) => switchboard_log::warn!(
                            "error reading config file {name}: {}",
                            LogError(cause)
                        ),
                        BundleError::Parse(cause) => switchboard_log::warn!(
                            "error parsing config file {name}: {}",
                            LogError(cause)
                        ),
                    }
                    Err(error)
                }
            };

            outcomes.push(LoadOutcome {
                name: name.to_owned(),
                result,
            });
        }

        let elapsed = start.elapsed();
        switchboard_log::info!("all configurations loaded in {elapsed:?}");

        (Self { documents }, LoadReport { outcomes, elapsed })
    }

    /// Returns `true` if no document was loaded.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Returns the number of loaded documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns the document loaded from the given file name.
    pub fn get(&self, name: &str) -> Option<&Document> {
        self.documents.get(name)
    }

    /// Iterates over file names and documents in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Document)> {
        self.documents.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, Document)> for Bundle {
    fn from_iter<T: IntoIterator<Item = (String, Document)>>(iter: T) -> Self {
        Self {
            documents: iter.into_iter().collect(),
        }
    }
}

fn load_document(path: &Path) -> Result<(Document, usize), BundleError> {
    let data = fs::read(path).map_err(BundleError::Read)?;
    let document = Document::from_slice(&data).map_err(BundleError::Parse)?;
    Ok((document, data.len()))
}
