use super::{ExpDecaySample, Sample, SampleSnapshot, UniformSample};
use std::sync::Arc;

/// Reservoir size of the default exponentially-decaying sample.
pub const DEFAULT_SAMPLE_SIZE: usize = 1028;

/// Bias of the default exponentially-decaying sample, roughly the last five minutes.
pub const DEFAULT_SAMPLE_ALPHA: f64 = 0.015;

/// Distribution of integer values, backed by a [`Sample`].
pub struct Histogram {
    sample: Arc<dyn Sample>,
}

impl Histogram {
    pub fn new(sample: Arc<dyn Sample>) -> Histogram { Histogram { sample } }

    pub fn with_exp_decay(capacity: usize, alpha: f64) -> Histogram {
        Histogram::new(Arc::new(ExpDecaySample::new(capacity, alpha)))
    }

    pub fn with_uniform(capacity: usize) -> Histogram { Histogram::new(Arc::new(UniformSample::new(capacity))) }

    pub fn update(&self, value: i64) { self.sample.update(value); }

    pub fn count(&self) -> i64 { self.sample.count() }

    pub fn snapshot(&self) -> SampleSnapshot { self.sample.snapshot() }

    pub fn clear(&self) { self.sample.clear(); }

    pub fn sample(&self) -> &Arc<dyn Sample> { &self.sample }
}

impl Default for Histogram {
    fn default() -> Histogram { Histogram::with_exp_decay(DEFAULT_SAMPLE_SIZE, DEFAULT_SAMPLE_ALPHA) }
}

#[cfg(test)]
mod tests {
    use super::Histogram;
    use crate::{
        clock::Clock,
        data::{Sample, TimeUniformSample},
    };
    use std::{sync::Arc, time::Duration};

    #[test]
    fn test_histogram_simple_update() {
        let histogram = Histogram::default();
        histogram.update(1245);
        histogram.update(5);

        let snapshot = histogram.snapshot();
        assert_eq!(snapshot.count(), 2);
        assert_eq!(snapshot.max(), 1245);
        assert_eq!(snapshot.min(), 5);
    }

    #[test]
    fn test_histogram_shares_its_sample() {
        let (clock, mock) = Clock::mock();
        let sample = Arc::new(TimeUniformSample::with_clock(Duration::from_secs(1), 16, clock));
        let histogram = Histogram::new(sample.clone());
        histogram.update(10);
        assert_eq!(sample.count(), 1);

        mock.increment(2_000_000_000);
        sample.evict_expired();
        assert_eq!(histogram.count(), 0);
        assert_eq!(histogram.snapshot().mean(), 0.0);
    }

    #[test]
    fn test_histogram_clear() {
        let histogram = Histogram::with_uniform(4);
        histogram.update(3);
        histogram.clear();
        assert_eq!(histogram.count(), 0);
        assert_eq!(histogram.sample().size(), 0);
    }
}
