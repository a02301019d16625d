use std::sync::Arc;

mod monotonic;
pub use self::monotonic::Monotonic;
mod mock;
pub use self::mock::Mock;

/// A source of nanosecond timestamps on an arbitrary, monotonic base.
pub trait ClockSource {
    fn now(&self) -> u64;
}

impl<T: ClockSource> ClockSource for Arc<T> {
    fn now(&self) -> u64 {
        (**self).now()
    }
}

/// Shared time source for everything that ages or rates values.
///
/// Reservoirs, meters and timers all read time through a `Clock`, which is either backed by the
/// monotonic system clock or by a [`Mock`] that tests advance by hand.
#[derive(Clone)]
pub struct Clock {
    source: Arc<dyn ClockSource + Send + Sync>,
}

impl Clock {
    /// Creates a clock backed by the monotonic system clock.
    pub fn new() -> Clock {
        Clock::from_source(Monotonic::new())
    }

    /// Creates a clock backed by a manually-advanced mock, returning the handle used to advance it.
    pub fn mock() -> (Clock, Arc<Mock>) {
        let mock = Arc::new(Mock::new(0));
        (Clock::from_source(mock.clone()), mock)
    }

    pub fn from_source<S: ClockSource + Send + Sync + 'static>(source: S) -> Clock {
        Clock { source: Arc::new(source) }
    }

    /// Current time, in nanoseconds.
    pub fn now(&self) -> u64 { self.source.now() }

    /// Nanoseconds elapsed between `start` and `end`, saturating at zero.
    pub fn delta(&self, start: u64, end: u64) -> u64 { end.saturating_sub(start) }
}

impl Default for Clock {
    fn default() -> Clock { Clock::new() }
}

#[cfg(test)]
mod tests {
    use super::Clock;

    #[test]
    fn test_mock_clock_advances() {
        let (clock, mock) = Clock::mock();
        let t0 = clock.now();
        mock.increment(1_500);
        let t1 = clock.now();
        assert_eq!(clock.delta(t0, t1), 1_500);
        assert_eq!(clock.delta(t1, t0), 0);
    }

    #[test]
    fn test_monotonic_clock_never_goes_backwards() {
        let clock = Clock::new();
        let t0 = clock.now();
        let t1 = clock.now();
        assert!(t1 >= t0);
    }
}
