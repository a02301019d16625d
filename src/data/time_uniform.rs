use super::{Queue, Sample, SampleSnapshot};
use crate::{clock::Clock, helper::duration_as_nanos};
use log::trace;
use parking_lot::Mutex;
use std::time::Duration;

struct TimedValue {
    value: i64,
    at: u64,
}

/// A sample that only keeps observations younger than a fixed lifetime.
///
/// Values live in a bounded ring buffer in arrival order.  Expired values are evicted eagerly on
/// every update, and periodically by a [`ReservoirManager`](super::ReservoirManager) sweep; reads
/// do not evict, so a value may remain visible for up to one sweep interval after it expires.
///
/// When the buffer is full, the oldest value is dropped to make room regardless of its age.
pub struct TimeUniformSample {
    values: Mutex<Queue<TimedValue>>,
    lifetime: u64,
    clock: Clock,
}

impl TimeUniformSample {
    /// Creates a sample keeping at most `capacity` values for at most `lifetime`.
    pub fn new(lifetime: Duration, capacity: usize) -> TimeUniformSample {
        TimeUniformSample::with_clock(lifetime, capacity, Clock::new())
    }

    pub fn with_clock(lifetime: Duration, capacity: usize, clock: Clock) -> TimeUniformSample {
        TimeUniformSample {
            values: Mutex::new(Queue::new(capacity)),
            lifetime: duration_as_nanos(lifetime),
            clock,
        }
    }

    pub fn lifetime(&self) -> Duration { Duration::from_nanos(self.lifetime) }

    /// Drops every value older than the lifetime.
    pub fn evict_expired(&self) {
        let mut values = self.values.lock();
        self.evict_locked(&mut values);
    }

    // Arrival order is age order, so eviction can stop at the first live value.
    fn evict_locked(&self, values: &mut Queue<TimedValue>) {
        let now = self.clock.now();
        while let Some(oldest) = values.peek() {
            if self.clock.delta(oldest.at, now) <= self.lifetime {
                break;
            }
            values.pop();
        }
    }
}

impl Sample for TimeUniformSample {
    fn update(&self, value: i64) {
        let mut values = self.values.lock();
        self.evict_locked(&mut values);
        if values.is_full() {
            values.pop();
        }

        let entry = TimedValue {
            value,
            at: self.clock.now(),
        };
        if values.push(entry).is_err() {
            trace!("dropping value {}, reservoir has no capacity", value);
        }
    }

    fn snapshot(&self) -> SampleSnapshot {
        let values = self.values.lock();
        let raw: Vec<i64> = values.iter().map(|entry| entry.value).collect();
        SampleSnapshot::new(raw.len() as i64, raw)
    }

    fn clear(&self) { self.values.lock().clear(); }
}
