//! Client-side metrics for Wavefront.
//!
//! Metrics live in a [`Registry`] under a name plus an unordered set of tags.  An [`Exporter`]
//! walks the registry on a fixed interval, renders every metric into Wavefront line-protocol
//! points, and ships them either to a proxy over TCP or to a direct-ingestion [`Reporter`].
//!
//! ```no_run
//! use std::{sync::Arc, time::Duration};
//! use wavefront_metrics::{resolve_proxy, Exporter, Registry};
//!
//! # fn main() -> wavefront_metrics::Result<()> {
//! let registry = Arc::new(Registry::new());
//! registry.counter("requests", vec![("method", "GET")])?.inc(1);
//!
//! let controller = Exporter::builder()
//!     .proxy(resolve_proxy("localhost:2878")?)
//!     .prefix("app")
//!     .flush_interval(Duration::from_secs(10))
//!     .build(registry)
//!     .spawn()?;
//! controller.flush_now()?;
//! controller.shutdown()
//! # }
//! ```
mod adapter;
mod clock;
mod configuration;
mod control;
mod data;
mod encoder;
mod error;
mod exporter;
mod helper;
mod key;
mod registry;
mod transport;

pub use self::{
    adapter::{validate_metrics, Adapter, MetricDefinition, MetricKind, SampleDefinition},
    clock::{Clock, ClockSource, Mock},
    configuration::{resolve_proxy, validate_direct, Destination, ReporterConfig, DEFAULT_BATCH_SIZE},
    control::{ControlMessage, Controller},
    data::{
        default_percentiles, percentile_label, Counter, ExpDecaySample, Gauge, GaugeFloat64, Histogram, Meter,
        MeterSnapshot, Percentile, Queue, ReservoirManager, Sample, SampleSnapshot, TimeUniformSample, Timer,
        TimerSnapshot, UniformSample, DEFAULT_SAMPLE_ALPHA, DEFAULT_SAMPLE_SIZE, DEFAULT_SWEEP_INTERVAL,
    },
    encoder::PointEncoder,
    error::{Error, Result},
    exporter::Exporter,
    key::{
        decode_key, delta_counter_name, encode_key, has_delta_prefix, render_tags, MetricId, ALT_DELTA_PREFIX,
        DELTA_PREFIX,
    },
    registry::{Metric, Registry},
    transport::{ProxyConnection, Reporter, WAVEFRONT_FORMAT},
};
