use crate::{
    configuration::ReporterConfig,
    data::{Counter, MeterSnapshot, Percentile, SampleSnapshot, TimerSnapshot},
    helper::duration_as_sample,
    key::{render_tags, MetricId, DELTA_PREFIX},
    registry::Metric,
};
use log::debug;

/// Renders metrics into Wavefront line-protocol points.
///
/// Every point has the shape `<prefix><name>.<suffix> <value> [<timestamp>] <tags>`.  Integers are
/// written as-is, rates, means and percentiles with two decimals, and floating-point gauges with
/// six.  Lines are returned without a trailing newline.
pub struct PointEncoder {
    prefix: String,
    delta_prefix: String,
    percentiles: Vec<Percentile>,
    duration_unit: i64,
    host_tags: String,
}

// Accumulates the points of a single metric.
struct Points<'a> {
    prefix: &'a str,
    name: &'a str,
    timestamp: Option<u64>,
    tags: &'a str,
    lines: Vec<String>,
}

impl<'a> Points<'a> {
    fn push(&mut self, suffix: &str, value: String) {
        let mut line = format!("{}{}.{} {}", self.prefix, self.name, suffix, value);
        if let Some(ts) = self.timestamp {
            line.push(' ');
            line.push_str(&ts.to_string());
        }
        if !self.tags.is_empty() {
            line.push(' ');
            line.push_str(self.tags);
        }
        self.lines.push(line);
    }
}

fn fixed2(value: f64) -> String { format!("{:.2}", value) }

impl PointEncoder {
    pub fn new(config: &ReporterConfig) -> PointEncoder {
        let duration_unit = duration_as_sample(config.duration_unit).max(1);

        PointEncoder {
            prefix: config.prefix.clone(),
            delta_prefix: format!("{}{}", DELTA_PREFIX, config.prefix),
            percentiles: config.percentiles.iter().map(|p| Percentile::from(*p)).collect(),
            duration_unit,
            host_tags: render_tags(&config.host_tags),
        }
    }

    /// Renders every point of `metric`.
    ///
    /// With a timestamp, in unix seconds, points are stamped explicitly; without one the backend
    /// assigns the time of receipt.  Delta counters are drained as a side effect: the value that is
    /// rendered is subtracted from the counter, and is lost if the points never make it out.
    pub fn encode(&self, id: &MetricId, metric: &Metric, timestamp: Option<u64>) -> Vec<String> {
        let tags = self.line_tags(id.tags());
        let mut points = Points {
            prefix: &self.prefix,
            name: id.name(),
            timestamp,
            tags: &tags,
            lines: Vec::new(),
        };

        match metric {
            Metric::Counter(counter) if id.is_delta() => {
                points.prefix = &self.delta_prefix;
                self.delta_points(&mut points, counter);
            },
            Metric::Counter(counter) => points.push("count", counter.count().to_string()),
            Metric::Gauge(gauge) => points.push("value", gauge.value().to_string()),
            Metric::GaugeFloat64(gauge) => points.push("value", format!("{:.6}", gauge.value())),
            Metric::Histogram(histogram) => self.histogram_points(&mut points, &histogram.snapshot()),
            Metric::Meter(meter) => self.meter_points(&mut points, &meter.snapshot()),
            Metric::Timer(timer) => self.timer_points(&mut points, &timer.snapshot()),
        }

        if id.is_delta() && metric.kind() != "counter" {
            debug!("{} {} carries a delta marker, reported as a plain metric", metric.kind(), id.name());
        }

        points.lines
    }

    fn line_tags(&self, metric_tags: &str) -> String {
        match (metric_tags.is_empty(), self.host_tags.is_empty()) {
            (true, _) => self.host_tags.clone(),
            (false, true) => metric_tags.to_owned(),
            (false, false) => format!("{} {}", metric_tags, self.host_tags),
        }
    }

    fn delta_points(&self, points: &mut Points, counter: &Counter) {
        let value = counter.take();
        points.push("count", value.to_string());
    }

    fn histogram_points(&self, points: &mut Points, h: &SampleSnapshot) {
        let ps = h.percentiles(&self.percentile_values());
        points.push("count", h.count().to_string());
        points.push("min", h.min().to_string());
        points.push("max", h.max().to_string());
        points.push("mean", fixed2(h.mean()));
        points.push("std-dev", fixed2(h.std_dev()));
        for (percentile, value) in self.percentiles.iter().zip(ps) {
            points.push(&percentile.to_string(), fixed2(value));
        }
    }

    fn meter_points(&self, points: &mut Points, m: &MeterSnapshot) {
        points.push("count", m.count.to_string());
        points.push("one-minute", fixed2(m.rate1));
        points.push("five-minute", fixed2(m.rate5));
        points.push("fifteen-minute", fixed2(m.rate15));
        points.push("mean", fixed2(m.rate_mean));
    }

    fn timer_points(&self, points: &mut Points, t: &TimerSnapshot) {
        let h = &t.durations;
        let du = self.duration_unit as f64;
        let ps = h.percentiles(&self.percentile_values());

        points.push("count", h.count().to_string());
        points.push("min", (h.min() / self.duration_unit).to_string());
        points.push("max", (h.max() / self.duration_unit).to_string());
        points.push("mean", fixed2(h.mean() / du));
        points.push("std-dev", fixed2(h.std_dev() / du));
        for (percentile, value) in self.percentiles.iter().zip(ps) {
            points.push(&percentile.to_string(), fixed2(value / du));
        }
        points.push("one-minute", fixed2(t.rates.rate1));
        points.push("five-minute", fixed2(t.rates.rate5));
        points.push("fifteen-minute", fixed2(t.rates.rate15));
        points.push("mean-rate", fixed2(t.rates.rate_mean));
    }

    fn percentile_values(&self) -> Vec<f64> { self.percentiles.iter().map(Percentile::value).collect() }
}
