//! Maps externally decoded measurements onto the registry.
//!
//! A host process receives `(instance, value, dimensions)` triples from its callers and forwards
//! them here.  Each instance name is bound, through a [`MetricDefinition`], to one metric kind, and
//! the value is recorded into the matching registry metric.
use crate::{
    data::{Histogram, ReservoirManager},
    error::{Error, Result},
    registry::Registry,
};
use hashbrown::{HashMap, HashSet};
use log::warn;
use std::{sync::Arc, time::Duration};

/// How a measurement is recorded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetricKind {
    Gauge,
    Counter,
    DeltaCounter,
    Histogram,
}

/// The reservoir backing a histogram.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SampleDefinition {
    ExpDecay { size: usize, alpha: f64 },
    Uniform { size: usize },
    TimeWindow { lifetime: Duration, size: usize },
}

/// Binds an instance name to a metric.
#[derive(Clone, Debug, PartialEq)]
pub struct MetricDefinition {
    /// Reported name; the instance name is used when empty.
    pub name: String,
    pub instance_name: String,
    pub kind: MetricKind,
    pub sample: Option<SampleDefinition>,
}

impl MetricDefinition {
    pub fn new(instance_name: &str, kind: MetricKind) -> MetricDefinition {
        MetricDefinition {
            name: String::new(),
            instance_name: instance_name.to_owned(),
            kind,
            sample: None,
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_owned();
        self
    }

    pub fn sample(mut self, sample: SampleDefinition) -> Self {
        self.sample = Some(sample);
        self
    }

    /// The name metrics are registered and reported under.
    pub fn metric_name(&self) -> &str {
        if self.name.is_empty() {
            &self.instance_name
        } else {
            &self.name
        }
    }
}

/// Checks that histograms carry a sample definition and that names are unique.
pub fn validate_metrics(definitions: &[MetricDefinition]) -> Result<()> {
    let mut names = HashSet::new();
    let mut instance_names = HashSet::new();

    for definition in definitions {
        let name = definition.metric_name();
        if definition.kind == MetricKind::Histogram && definition.sample.is_none() {
            return Err(Error::InvalidMetricDefinition(format!(
                "no sample definition was found for histogram metric {}",
                name
            )));
        }
        if !names.insert(name) {
            return Err(Error::InvalidMetricDefinition(format!(
                "duplicate metric {} found, please supply or change the metric name",
                name
            )));
        }
        if !instance_names.insert(definition.instance_name.as_str()) {
            return Err(Error::InvalidMetricDefinition(format!(
                "duplicate metrics found for instance {}",
                definition.instance_name
            )));
        }
    }

    Ok(())
}

/// Records externally reported measurements according to a set of metric definitions.
pub struct Adapter {
    definitions: HashMap<String, MetricDefinition>,
    registry: Arc<Registry>,
    reservoirs: ReservoirManager,
}

impl Adapter {
    pub fn new(
        definitions: Vec<MetricDefinition>, registry: Arc<Registry>, reservoirs: ReservoirManager,
    ) -> Result<Adapter> {
        validate_metrics(&definitions)?;

        let definitions = definitions
            .into_iter()
            .map(|d| (d.instance_name.clone(), d))
            .collect();

        Ok(Adapter {
            definitions,
            registry,
            reservoirs,
        })
    }

    pub fn registry(&self) -> &Arc<Registry> { &self.registry }

    /// Records `value` for the instance.
    ///
    /// Returns `false`, after logging a warning, when the instance is unknown or its metric is
    /// registered as another kind.  Histogram values are truncated to integers.
    pub fn record<I, K, V>(&self, instance_name: &str, value: f64, tags: I) -> bool
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let definition = match self.definitions.get(instance_name) {
            Some(definition) => definition,
            None => {
                warn!("couldn't identify metric {}", instance_name);
                return false;
            },
        };

        let name = definition.metric_name();
        let recorded = match definition.kind {
            MetricKind::Gauge => self.registry.gauge_f64(name, tags).map(|g| g.update(value)),
            MetricKind::Counter => self.registry.counter(name, tags).map(|c| c.inc(value as i64)),
            MetricKind::DeltaCounter => self.registry.delta_counter(name, tags).map(|c| c.inc(value as i64)),
            MetricKind::Histogram => self
                .registry
                .histogram(name, tags, || self.build_histogram(definition.sample))
                .map(|h| h.update(value as i64)),
        };

        match recorded {
            Ok(()) => true,
            Err(e) => {
                warn!("couldn't record {} for instance {}: {}", value, instance_name, e);
                false
            },
        }
    }

    fn build_histogram(&self, sample: Option<SampleDefinition>) -> Histogram {
        match sample {
            Some(SampleDefinition::ExpDecay { size, alpha }) => Histogram::with_exp_decay(size, alpha),
            Some(SampleDefinition::Uniform { size }) => Histogram::with_uniform(size),
            Some(SampleDefinition::TimeWindow { lifetime, size }) => {
                Histogram::new(self.reservoirs.time_uniform_sample(lifetime, size))
            },
            None => Histogram::default(),
        }
    }
}
