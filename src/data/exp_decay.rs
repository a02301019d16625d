use super::{Sample, SampleSnapshot};
use crate::clock::Clock;
use parking_lot::Mutex;
use rand::Rng;
use std::{
    cmp::{Ordering, Reverse},
    collections::BinaryHeap,
};

const NANOS_PER_SEC: f64 = 1_000_000_000.0;
const RESCALE_THRESHOLD: u64 = 60 * 60 * 1_000_000_000;

struct Weighted {
    priority: f64,
    value: i64,
}

impl PartialEq for Weighted {
    fn eq(&self, other: &Self) -> bool { self.cmp(other) == Ordering::Equal }
}

impl Eq for Weighted {}

impl PartialOrd for Weighted {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for Weighted {
    fn cmp(&self, other: &Self) -> Ordering { self.priority.total_cmp(&other.priority) }
}

struct State {
    count: i64,
    start: u64,
    next_rescale: u64,
    // Min-heap on priority, so the least significant value is always on top.
    values: BinaryHeap<Reverse<Weighted>>,
}

/// An exponentially-decaying sample, biased towards recent values.
///
/// Each value is given a priority that grows exponentially with the time it was recorded, scaled by
/// a random factor; the reservoir keeps the `capacity` highest priorities.  `alpha` controls how
/// strongly recent values are favoured (`0.015` roughly covers the last five minutes).
pub struct ExpDecaySample {
    capacity: usize,
    alpha: f64,
    clock: Clock,
    state: Mutex<State>,
}

impl ExpDecaySample {
    pub fn new(capacity: usize, alpha: f64) -> ExpDecaySample {
        ExpDecaySample::with_clock(capacity, alpha, Clock::new())
    }

    pub fn with_clock(capacity: usize, alpha: f64, clock: Clock) -> ExpDecaySample {
        let start = clock.now();
        ExpDecaySample {
            capacity,
            alpha,
            clock,
            state: Mutex::new(State {
                count: 0,
                start,
                next_rescale: start + RESCALE_THRESHOLD,
                values: BinaryHeap::with_capacity(capacity),
            }),
        }
    }

    fn weight(&self, elapsed: u64) -> f64 { (self.alpha * (elapsed as f64 / NANOS_PER_SEC)).exp() }

    // Priorities grow without bound, so periodically move the landmark forward and scale every
    // existing priority down by the same factor.
    fn rescale(&self, state: &mut State, now: u64) {
        let factor = (-self.alpha * (self.clock.delta(state.start, now) as f64 / NANOS_PER_SEC)).exp();
        let values = std::mem::take(&mut state.values);
        state.values = values
            .into_iter()
            .map(|Reverse(w)| {
                Reverse(Weighted {
                    priority: w.priority * factor,
                    value: w.value,
                })
            })
            .collect();
        state.start = now;
        state.next_rescale = now + RESCALE_THRESHOLD;
    }
}

impl Sample for ExpDecaySample {
    fn update(&self, value: i64) {
        let now = self.clock.now();
        let mut state = self.state.lock();
        if now >= state.next_rescale {
            self.rescale(&mut state, now);
        }

        state.count += 1;
        if self.capacity == 0 {
            return;
        }

        let u = 1.0 - rand::thread_rng().gen::<f64>();
        let priority = self.weight(self.clock.delta(state.start, now)) / u;
        let candidate = Weighted { priority, value };

        if state.values.len() < self.capacity {
            state.values.push(Reverse(candidate));
            return;
        }

        let displaces = state
            .values
            .peek()
            .map_or(false, |Reverse(lowest)| candidate.priority > lowest.priority);
        if displaces {
            state.values.pop();
            state.values.push(Reverse(candidate));
        }
    }

    fn snapshot(&self) -> SampleSnapshot {
        let state = self.state.lock();
        let values = state.values.iter().map(|Reverse(w)| w.value).collect();
        SampleSnapshot::new(state.count, values)
    }

    fn clear(&self) {
        let now = self.clock.now();
        let mut state = self.state.lock();
        state.count = 0;
        state.values.clear();
        state.start = now;
        state.next_rescale = now + RESCALE_THRESHOLD;
    }
}
