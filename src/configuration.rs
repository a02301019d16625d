use crate::{
    data::default_percentiles,
    error::{Error, Result},
    exporter::Exporter,
    helper::normalize_prefix,
    registry::Registry,
    transport::Reporter,
};
use std::{
    collections::BTreeMap,
    fmt,
    net::{SocketAddr, ToSocketAddrs},
    sync::Arc,
    time::Duration,
};
use url::Url;

/// Maximum number of lines sent to a direct reporter in one call, by default.
pub const DEFAULT_BATCH_SIZE: usize = 10_000;

/// Where flushed points are sent.
#[derive(Clone)]
pub enum Destination {
    /// A Wavefront proxy, reached over plain TCP.
    Proxy(SocketAddr),
    /// A direct-ingestion reporter.
    Direct(Arc<dyn Reporter>),
}

/// A configuration builder for [`Exporter`](crate::Exporter).
#[derive(Clone)]
pub struct ReporterConfig {
    pub(crate) proxy: Option<SocketAddr>,
    pub(crate) direct: Option<Arc<dyn Reporter>>,
    pub(crate) flush_interval: Duration,
    pub(crate) duration_unit: Duration,
    pub(crate) prefix: String,
    pub(crate) percentiles: Vec<f64>,
    pub(crate) host_tags: BTreeMap<String, String>,
    pub(crate) batch_size: usize,
}

impl Default for ReporterConfig {
    fn default() -> ReporterConfig {
        ReporterConfig {
            proxy: None,
            direct: None,
            flush_interval: Duration::from_secs(60),
            duration_unit: Duration::from_nanos(1),
            prefix: String::new(),
            percentiles: default_percentiles(),
            host_tags: BTreeMap::new(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl fmt::Debug for ReporterConfig {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ReporterConfig")
            .field("proxy", &self.proxy)
            .field("direct", &self.direct.is_some())
            .field("flush_interval", &self.flush_interval)
            .field("duration_unit", &self.duration_unit)
            .field("prefix", &self.prefix)
            .field("percentiles", &self.percentiles)
            .field("host_tags", &self.host_tags)
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

impl ReporterConfig {
    /// Creates a new `ReporterConfig` with default values.
    pub fn new() -> ReporterConfig { Default::default() }

    /// Sends points to the Wavefront proxy at `addr`.
    ///
    /// A proxy takes precedence over a direct reporter when both are configured.
    pub fn proxy(mut self, addr: SocketAddr) -> Self {
        self.proxy = Some(addr);
        self
    }

    /// Sends points through a direct-ingestion reporter.
    pub fn direct(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.direct = Some(reporter);
        self
    }

    /// Sets the interval between two flushes of the whole registry.
    ///
    /// Defaults to `60s`.
    pub fn flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval = interval;
        self
    }

    /// Sets the unit timer durations are reported in.
    ///
    /// Defaults to `1ns`.  Timers record nanoseconds, and every duration-valued field is divided by
    /// this unit before it is written out, so `Duration::from_millis(1)` reports milliseconds.
    pub fn duration_unit(mut self, unit: Duration) -> Self {
        self.duration_unit = unit;
        self
    }

    /// Sets the prefix prepended to every metric name.
    ///
    /// A `.` separator is appended to a non-empty prefix that does not already end with one.
    pub fn prefix(mut self, prefix: &str) -> Self {
        self.prefix = normalize_prefix(prefix);
        self
    }

    /// Sets the percentiles reported for histograms and timers, as fractions.
    ///
    /// Defaults to `[0.5, 0.75, 0.95, 0.99, 0.999]`.
    pub fn percentiles(mut self, percentiles: &[f64]) -> Self {
        self.percentiles = percentiles.to_vec();
        self
    }

    /// Replaces the tags added to every reported point.
    pub fn host_tags<I, K, V>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.host_tags = tags.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self
    }

    /// Adds a single tag to every reported point.
    pub fn host_tag(mut self, key: &str, value: &str) -> Self {
        self.host_tags.insert(key.to_owned(), value.to_owned());
        self
    }

    /// Sets the maximum number of lines sent to a direct reporter in a single call.
    ///
    /// Defaults to `10000`.  Proxy destinations write metric by metric and ignore this.
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn get_prefix(&self) -> &str { &self.prefix }

    pub fn get_flush_interval(&self) -> Duration { self.flush_interval }

    /// Resolves where points should go, preferring the proxy.
    pub fn destination(&self) -> Result<Destination> {
        if let Some(addr) = self.proxy {
            return Ok(Destination::Proxy(addr));
        }
        if let Some(reporter) = &self.direct {
            return Ok(Destination::Direct(reporter.clone()));
        }
        Err(Error::NoDestination)
    }

    /// Create an `Exporter` for `registry` based on this configuration.
    pub fn build(self, registry: Arc<Registry>) -> Exporter { Exporter::new(self, registry) }
}

/// Checks direct-ingestion credentials before any connection is attempted.
pub fn validate_direct(server: &str, token: &str) -> Result<Url> {
    if server.is_empty() || token.is_empty() {
        return Err(Error::InvalidDirectCredentials);
    }
    Ok(Url::parse(server)?)
}

/// Resolves a proxy address such as `"localhost:2878"`.
pub fn resolve_proxy(address: &str) -> Result<SocketAddr> {
    if address.is_empty() {
        return Err(Error::InvalidProxyAddress(address.to_owned()));
    }

    address
        .to_socket_addrs()
        .ok()
        .and_then(|mut addrs| addrs.next())
        .ok_or_else(|| Error::InvalidProxyAddress(address.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::{resolve_proxy, validate_direct, Destination, ReporterConfig};
    use crate::{
        error::{Error, Result},
        transport::Reporter,
    };
    use std::{sync::Arc, time::Duration};

    struct NullReporter;

    impl Reporter for NullReporter {
        fn report(&self, _format: &str, _payload: &str) -> Result<u16> { Ok(202) }
    }

    #[test]
    fn test_config_defaults() {
        let config = ReporterConfig::new();
        assert_eq!(config.get_flush_interval(), Duration::from_secs(60));
        assert_eq!(config.duration_unit, Duration::from_nanos(1));
        assert_eq!(config.get_prefix(), "");
        assert_eq!(config.percentiles, vec![0.5, 0.75, 0.95, 0.99, 0.999]);
        assert_eq!(config.batch_size, 10_000);
    }

    #[test]
    fn test_config_prefix_gains_separator() {
        assert_eq!(ReporterConfig::new().prefix("test.prefix").get_prefix(), "test.prefix.");
        assert_eq!(ReporterConfig::new().prefix("test.prefix.").get_prefix(), "test.prefix.");
        assert_eq!(ReporterConfig::new().prefix("").get_prefix(), "");
    }

    #[test]
    fn test_config_host_tags() {
        let config = ReporterConfig::new()
            .host_tags(vec![("source", "web-1")])
            .host_tag("env", "prod");
        let keys: Vec<_> = config.host_tags.keys().cloned().collect();
        assert_eq!(keys, vec!["env".to_owned(), "source".to_owned()]);
    }

    #[test]
    fn test_destination_requires_one_target() {
        match ReporterConfig::new().destination() {
            Err(Error::NoDestination) => {},
            _ => panic!("expected a configuration error"),
        }
    }

    #[test]
    fn test_destination_prefers_proxy() {
        let addr = "127.0.0.1:2878".parse().unwrap();
        let config = ReporterConfig::new()
            .direct(Arc::new(NullReporter))
            .proxy(addr);
        match config.destination() {
            Ok(Destination::Proxy(a)) => assert_eq!(a, addr),
            _ => panic!("expected the proxy destination"),
        }

        let direct_only = ReporterConfig::new().direct(Arc::new(NullReporter));
        match direct_only.destination() {
            Ok(Destination::Direct(_)) => {},
            _ => panic!("expected the direct destination"),
        }
    }

    #[test]
    fn test_validate_direct() {
        match validate_direct("", "token") {
            Err(Error::InvalidDirectCredentials) => {},
            _ => panic!("empty server must be rejected"),
        }
        match validate_direct("https://example.wavefront.com", "") {
            Err(Error::InvalidDirectCredentials) => {},
            _ => panic!("empty token must be rejected"),
        }
        match validate_direct("not a uri", "token") {
            Err(Error::InvalidServerUri(_)) => {},
            _ => panic!("malformed server must be rejected"),
        }

        let url = validate_direct("https://example.wavefront.com", "token").unwrap();
        assert_eq!(url.host_str(), Some("example.wavefront.com"));
    }

    #[test]
    fn test_resolve_proxy() {
        assert_eq!(resolve_proxy("127.0.0.1:2878").unwrap().port(), 2878);
        match resolve_proxy("") {
            Err(Error::InvalidProxyAddress(_)) => {},
            _ => panic!("empty address must be rejected"),
        }
        match resolve_proxy("missing-port") {
            Err(Error::InvalidProxyAddress(_)) => {},
            _ => panic!("address without port must be rejected"),
        }
    }
}
