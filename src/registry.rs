use crate::{
    data::{Counter, Gauge, GaugeFloat64, Histogram, Meter, Timer},
    error::{Error, Result},
    key::MetricId,
};
use fnv::FnvBuildHasher;
use hashbrown::HashMap;
use parking_lot::RwLock;
use std::sync::Arc;

/// A registered metric, of one of the supported kinds.
#[derive(Clone)]
pub enum Metric {
    Counter(Arc<Counter>),
    Gauge(Arc<Gauge>),
    GaugeFloat64(Arc<GaugeFloat64>),
    Histogram(Arc<Histogram>),
    Meter(Arc<Meter>),
    Timer(Arc<Timer>),
}

impl Metric {
    /// Human-readable name of the metric kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Metric::Counter(_) => "counter",
            Metric::Gauge(_) => "gauge",
            Metric::GaugeFloat64(_) => "gauge_f64",
            Metric::Histogram(_) => "histogram",
            Metric::Meter(_) => "meter",
            Metric::Timer(_) => "timer",
        }
    }
}

macro_rules! metric_from {
    ($variant:ident, $ty:ty) => {
        impl From<Arc<$ty>> for Metric {
            fn from(m: Arc<$ty>) -> Metric { Metric::$variant(m) }
        }

        impl From<$ty> for Metric {
            fn from(m: $ty) -> Metric { Metric::$variant(Arc::new(m)) }
        }
    };
}

metric_from!(Counter, Counter);
metric_from!(Gauge, Gauge);
metric_from!(GaugeFloat64, GaugeFloat64);
metric_from!(Histogram, Histogram);
metric_from!(Meter, Meter);
metric_from!(Timer, Timer);

struct Entry {
    id: MetricId,
    metric: Metric,
}

/// A name-keyed collection of metrics.
///
/// Metrics are addressed by name plus tags; see [`MetricId`] for how the two are combined into a
/// key.  All operations take `&self`, and the registry can be shared freely between threads.
#[derive(Default)]
pub struct Registry {
    entries: RwLock<HashMap<String, Entry, FnvBuildHasher>>,
}

impl Registry {
    pub fn new() -> Registry { Registry::default() }

    /// Registers `metric` under the given name and tags.
    ///
    /// Fails if a metric is already registered under the same key.
    pub fn register<I, K, V, M>(&self, name: &str, tags: I, metric: M) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
        M: Into<Metric>,
    {
        self.register_id(MetricId::new(name, tags), metric.into())
    }

    /// Registers `metric` under an already-built identity.
    pub fn register_id(&self, id: MetricId, metric: Metric) -> Result<()> {
        let key = id.key();
        let mut entries = self.entries.write();
        if entries.contains_key(&key) {
            return Err(Error::DuplicateMetric(key));
        }

        entries.insert(key, Entry { id, metric });
        Ok(())
    }

    pub fn get<I, K, V>(&self, name: &str, tags: I) -> Option<Metric>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.get_id(&MetricId::new(name, tags))
    }

    pub fn get_id(&self, id: &MetricId) -> Option<Metric> {
        self.entries.read().get(&id.key()).map(|entry| entry.metric.clone())
    }

    /// Returns the metric registered under the given name and tags, registering the one built by
    /// `f` if there is none yet.
    pub fn get_or_register<I, K, V, F>(&self, name: &str, tags: I, f: F) -> Metric
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
        F: FnOnce() -> Metric,
    {
        self.get_or_register_id(MetricId::new(name, tags), f)
    }

    pub fn get_or_register_id<F>(&self, id: MetricId, f: F) -> Metric
    where
        F: FnOnce() -> Metric,
    {
        let key = id.key();
        if let Some(entry) = self.entries.read().get(&key) {
            return entry.metric.clone();
        }

        let mut entries = self.entries.write();
        entries
            .entry(key)
            .or_insert_with(|| Entry { id, metric: f() })
            .metric
            .clone()
    }

    /// Removes the metric registered under the given name and tags, returning whether there was one.
    pub fn unregister<I, K, V>(&self, name: &str, tags: I) -> bool
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.unregister_id(&MetricId::new(name, tags))
    }

    pub fn unregister_id(&self, id: &MetricId) -> bool { self.entries.write().remove(&id.key()).is_some() }

    /// Visits every registered metric.
    ///
    /// The visitor sees the entries present when the call started, and runs without holding the
    /// registry lock, so it may freely register or unregister metrics.
    pub fn each<F>(&self, mut f: F)
    where
        F: FnMut(&MetricId, &Metric),
    {
        for (id, metric) in self.entries() {
            f(&id, &metric);
        }
    }

    /// Copies out every registered identity and metric.
    pub fn entries(&self) -> Vec<(MetricId, Metric)> {
        self.entries
            .read()
            .values()
            .map(|entry| (entry.id.clone(), entry.metric.clone()))
            .collect()
    }

    pub fn len(&self) -> usize { self.entries.read().len() }

    pub fn is_empty(&self) -> bool { self.entries.read().is_empty() }

    /// Gets or creates a counter.
    pub fn counter<I, K, V>(&self, name: &str, tags: I) -> Result<Arc<Counter>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.typed(MetricId::new(name, tags), "counter", || Counter::new().into(), |m| match m {
            Metric::Counter(c) => Some(c),
            _ => None,
        })
    }

    /// Gets or creates a counter that is drained on every flush.
    pub fn delta_counter<I, K, V>(&self, name: &str, tags: I) -> Result<Arc<Counter>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.typed(MetricId::delta(name, tags), "counter", || Counter::new().into(), |m| match m {
            Metric::Counter(c) => Some(c),
            _ => None,
        })
    }

    pub fn gauge<I, K, V>(&self, name: &str, tags: I) -> Result<Arc<Gauge>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.typed(MetricId::new(name, tags), "gauge", || Gauge::new().into(), |m| match m {
            Metric::Gauge(g) => Some(g),
            _ => None,
        })
    }

    pub fn gauge_f64<I, K, V>(&self, name: &str, tags: I) -> Result<Arc<GaugeFloat64>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.typed(MetricId::new(name, tags), "gauge_f64", || GaugeFloat64::new().into(), |m| match m {
            Metric::GaugeFloat64(g) => Some(g),
            _ => None,
        })
    }

    /// Gets or creates a histogram, building it with `f` when missing.
    pub fn histogram<I, K, V, F>(&self, name: &str, tags: I, f: F) -> Result<Arc<Histogram>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
        F: FnOnce() -> Histogram,
    {
        self.typed(MetricId::new(name, tags), "histogram", || f().into(), |m| match m {
            Metric::Histogram(h) => Some(h),
            _ => None,
        })
    }

    pub fn meter<I, K, V>(&self, name: &str, tags: I) -> Result<Arc<Meter>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.typed(MetricId::new(name, tags), "meter", || Meter::new().into(), |m| match m {
            Metric::Meter(m) => Some(m),
            _ => None,
        })
    }

    pub fn timer<I, K, V>(&self, name: &str, tags: I) -> Result<Arc<Timer>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.typed(MetricId::new(name, tags), "timer", || Timer::new().into(), |m| match m {
            Metric::Timer(t) => Some(t),
            _ => None,
        })
    }

    fn typed<T, F, X>(&self, id: MetricId, expected: &'static str, f: F, extract: X) -> Result<T>
    where
        F: FnOnce() -> Metric,
        X: FnOnce(Metric) -> Option<T>,
    {
        let key = id.key();
        let metric = self.get_or_register_id(id, f);
        let found = metric.kind();
        extract(metric).ok_or(Error::KindMismatch { key, expected, found })
    }
}

#[cfg(test)]
mod tests {
    use super::{Metric, Registry};
    use crate::{
        data::{Counter, Gauge},
        error::Error,
        key::delta_counter_name,
    };
    use std::{collections::HashMap, sync::Arc};

    fn tags(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_registry_register_and_get() {
        let registry = Registry::new();
        let counter = Arc::new(Counter::new());
        registry
            .register("requests", &tags(&[("a", "1"), ("b", "2")]), counter.clone())
            .unwrap();
        counter.inc(3);

        match registry.get("requests", &tags(&[("b", "2"), ("a", "1")])) {
            Some(Metric::Counter(c)) => assert_eq!(c.count(), 3),
            _ => panic!("expected the registered counter"),
        }
        assert!(registry.get("requests", &tags(&[])).is_none());
    }

    #[test]
    fn test_registry_rejects_duplicates() {
        let registry = Registry::new();
        registry.register("foo", &tags(&[]), Counter::new()).unwrap();
        match registry.register("foo", &tags(&[]), Gauge::new()) {
            Err(Error::DuplicateMetric(key)) => assert_eq!(key, "foo"),
            other => panic!("expected duplicate error, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_registry_unregister() {
        let registry = Registry::new();
        registry.register("foo", &tags(&[("k", "v")]), Counter::new()).unwrap();
        assert_eq!(registry.len(), 1);

        assert!(registry.unregister("foo", &tags(&[("k", "v")])));
        assert!(!registry.unregister("foo", &tags(&[("k", "v")])));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_registry_get_or_register() {
        let registry = Registry::new();
        let first = registry.get_or_register("foo", &tags(&[]), || Counter::new().into());
        let second = registry.get_or_register("foo", &tags(&[]), || Gauge::new().into());
        assert_eq!(first.kind(), "counter");
        assert_eq!(second.kind(), "counter");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_registry_typed_helpers() {
        let registry = Registry::new();
        let counter = registry.counter("hits", &tags(&[])).unwrap();
        counter.inc(1);
        assert_eq!(registry.counter("hits", &tags(&[])).unwrap().count(), 1);

        match registry.gauge("hits", &tags(&[])) {
            Err(Error::KindMismatch { expected, found, .. }) => {
                assert_eq!(expected, "gauge");
                assert_eq!(found, "counter");
            },
            _ => panic!("expected a kind mismatch"),
        }
    }

    #[test]
    fn test_registry_delta_counters_are_distinct() {
        let registry = Registry::new();
        let plain = registry.counter("hits", &tags(&[])).unwrap();
        let delta = registry.delta_counter("hits", &tags(&[])).unwrap();
        plain.inc(1);
        delta.inc(5);

        assert_eq!(registry.len(), 2);
        let via_marker = registry.counter(&delta_counter_name("hits"), &tags(&[])).unwrap();
        assert_eq!(via_marker.count(), 5);

        let mut deltas = 0;
        registry.each(|id, _| {
            if id.is_delta() {
                deltas += 1;
            }
        });
        assert_eq!(deltas, 1);
    }

    #[test]
    fn test_registry_each_allows_reentrant_registration() {
        let registry = Registry::new();
        registry.register("foo", &tags(&[]), Counter::new()).unwrap();
        registry.each(|id, _| {
            let name = format!("{}.copy", id.name());
            registry.register(&name, &tags(&[]), Counter::new()).unwrap();
        });
        assert_eq!(registry.len(), 2);
    }
}
