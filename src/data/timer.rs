use super::{Histogram, Meter, MeterSnapshot, SampleSnapshot};
use crate::helper::duration_as_sample;
use std::time::{Duration, Instant};

/// Durations, in nanoseconds, together with the rate at which they are recorded.
#[derive(Default)]
pub struct Timer {
    histogram: Histogram,
    meter: Meter,
}

/// A frozen view of a [`Timer`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TimerSnapshot {
    pub durations: SampleSnapshot,
    pub rates: MeterSnapshot,
}

impl Timer {
    /// Creates a timer over the default exponentially-decaying sample.
    pub fn new() -> Timer { Timer::default() }

    pub fn from_parts(histogram: Histogram, meter: Meter) -> Timer { Timer { histogram, meter } }

    pub fn update(&self, duration: Duration) {
        self.histogram.update(duration_as_sample(duration));
        self.meter.mark(1);
    }

    /// Records the time elapsed since `start`.
    pub fn update_since(&self, start: Instant) { self.update(start.elapsed()); }

    /// Runs `f` and records how long it took.
    pub fn time<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let start = Instant::now();
        let result = f();
        self.update_since(start);
        result
    }

    pub fn count(&self) -> i64 { self.histogram.count() }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            durations: self.histogram.snapshot(),
            rates: self.meter.snapshot(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Timer;
    use crate::{
        clock::Clock,
        data::{Histogram, Meter},
    };
    use std::time::Duration;

    #[test]
    fn test_timer_records_durations_and_rate() {
        let (clock, mock) = Clock::mock();
        let timer = Timer::from_parts(Histogram::with_uniform(16), Meter::with_clock(clock));
        timer.update(Duration::from_millis(10));
        timer.update(Duration::from_millis(30));
        mock.increment(5_000_000_000);

        let snapshot = timer.snapshot();
        assert_eq!(snapshot.durations.count(), 2);
        assert_eq!(snapshot.durations.min(), 10_000_000);
        assert_eq!(snapshot.durations.max(), 30_000_000);
        assert_eq!(snapshot.durations.mean(), 20_000_000.0);
        assert_eq!(snapshot.rates.count, 2);
        assert_eq!(snapshot.rates.rate1, 0.4);
    }

    #[test]
    fn test_timer_time_closure() {
        let timer = Timer::new();
        let answer = timer.time(|| 42);
        assert_eq!(answer, 42);
        assert_eq!(timer.count(), 1);
        assert!(timer.snapshot().durations.min() >= 0);
    }

    #[test]
    fn test_timer_saturates_huge_durations() {
        let timer = Timer::from_parts(Histogram::with_uniform(4), Meter::new());
        timer.update(Duration::from_secs(u64::MAX / 1_000_000));

        let snapshot = timer.snapshot();
        assert_eq!(snapshot.durations.count(), 1);
        assert_eq!(snapshot.durations.min(), i64::MAX);
    }
}
