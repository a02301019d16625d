use std::fmt;

pub mod counter;
pub mod exp_decay;
pub mod gauge;
pub mod histogram;
pub mod meter;
pub mod queue;
pub mod reservoir;
pub mod sample;
pub mod snapshot;
pub mod time_uniform;
pub mod timer;
pub mod uniform;

pub use self::{
    counter::Counter,
    exp_decay::ExpDecaySample,
    gauge::{Gauge, GaugeFloat64},
    histogram::{Histogram, DEFAULT_SAMPLE_ALPHA, DEFAULT_SAMPLE_SIZE},
    meter::{Meter, MeterSnapshot},
    queue::Queue,
    reservoir::{ReservoirManager, DEFAULT_SWEEP_INTERVAL},
    sample::Sample,
    snapshot::SampleSnapshot,
    time_uniform::TimeUniformSample,
    timer::{Timer, TimerSnapshot},
    uniform::UniformSample,
};

/// A labeled percentile.
///
/// This represents a fraction from 0 to 1, with the label used to name the reported series: the
/// percentage with its decimal point removed, so `0.999` is labeled `999`.
#[derive(Clone, Debug, PartialEq)]
pub struct Percentile {
    label: String,
    value: f64,
}

impl Percentile {
    pub fn label(&self) -> &str { &self.label }

    /// The fraction, between `0.0` and `1.0`.
    pub fn value(&self) -> f64 { self.value }
}

impl From<f64> for Percentile {
    fn from(p: f64) -> Self {
        // Force our value between +0.0 and +1.0.
        let clamped = p.max(0.0).min(1.0);

        Percentile {
            label: percentile_label(clamped),
            value: clamped,
        }
    }
}

impl fmt::Display for Percentile {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { write!(f, "{}-percentile", self.label) }
}

/// Names a percentile fraction: its percentage in shortest form with the first `.` removed.
pub fn percentile_label(p: f64) -> String {
    // Round away binary noise such as 0.29 * 100 = 28.999999999999996.
    let percent = (p * 100.0 * 1e9).round() / 1e9;
    format!("{}", percent).replacen('.', "", 1)
}

/// The percentiles reported when none are configured.
pub fn default_percentiles() -> Vec<f64> { vec![0.5, 0.75, 0.95, 0.99, 0.999] }

#[cfg(test)]
mod tests {
    use super::{percentile_label, Percentile};

    #[test]
    fn test_percentiles() {
        let p50 = Percentile::from(0.5);
        assert_eq!(p50.label(), "50");

        let p75 = Percentile::from(0.75);
        assert_eq!(p75.label(), "75");

        let p999 = Percentile::from(0.999);
        assert_eq!(p999.label(), "999");
        assert_eq!(p999.to_string(), "999-percentile");

        let p9999 = Percentile::from(0.9999);
        assert_eq!(p9999.label(), "9999");

        let p29 = Percentile::from(0.29);
        assert_eq!(p29.label(), "29");

        let clamped_min = Percentile::from(-20.0);
        assert_eq!(clamped_min.label(), "0");
        assert_eq!(clamped_min.value(), 0.0);

        let clamped_max = Percentile::from(1442.0);
        assert_eq!(clamped_max.label(), "100");
        assert_eq!(clamped_max.value(), 1.0);
    }

    #[test]
    fn test_percentile_labels() {
        assert_eq!(percentile_label(0.5), "50");
        assert_eq!(percentile_label(0.999), "999");
        assert_eq!(percentile_label(0.05), "5");
        assert_eq!(percentile_label(0.125), "125");
        assert_eq!(percentile_label(1.0), "100");
    }
}
