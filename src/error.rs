use std::io;
use thiserror::Error;

/// Errors raised while configuring, registering or exporting metrics.
#[derive(Debug, Error)]
pub enum Error {
    /// Neither a proxy address nor a direct reporter was configured.
    #[error("invalid wavefront configuration: no proxy address or direct reporter configured")]
    NoDestination,

    /// The direct-ingestion server or token was empty.
    #[error("invalid server or token found in configuration")]
    InvalidDirectCredentials,

    /// The direct-ingestion server was not a valid URI.
    #[error("invalid server URI: {0}")]
    InvalidServerUri(#[from] url::ParseError),

    /// The proxy address was empty or could not be resolved.
    #[error("invalid proxy address found in configuration: {0:?}")]
    InvalidProxyAddress(String),

    /// Connecting to, or writing to, the backend failed.
    #[error("transport error: {0}")]
    Io(#[from] io::Error),

    /// The direct-ingestion backend rejected a batch.
    #[error("{status}: error reporting points to Wavefront")]
    Report { status: u16 },

    /// A metric is already registered under this key.
    #[error("duplicate metric {0}")]
    DuplicateMetric(String),

    /// A metric exists under this key, but of another kind.
    #[error("metric {key} is a {found}, not a {expected}")]
    KindMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    /// Metric definitions handed to the adapter were inconsistent.
    #[error("invalid metric definition: {0}")]
    InvalidMetricDefinition(String),

    /// The export loop is no longer running.
    #[error("exporter is not running")]
    ExporterStopped,
}

pub type Result<T> = std::result::Result<T, Error>;
