use crate::clock::Clock;
use parking_lot::Mutex;

const NANOS_PER_SEC: f64 = 1_000_000_000.0;
const TICK_INTERVAL: u64 = 5 * 1_000_000_000;
const TICK_SECONDS: f64 = 5.0;

// Exponentially-weighted moving average of a per-second rate, ticked every five seconds.
struct Ewma {
    alpha: f64,
    rate: f64,
    initialized: bool,
}

impl Ewma {
    fn over_minutes(minutes: f64) -> Ewma {
        Ewma {
            alpha: 1.0 - (-TICK_SECONDS / 60.0 / minutes).exp(),
            rate: 0.0,
            initialized: false,
        }
    }

    fn tick(&mut self, uncounted: i64) {
        let instant = uncounted as f64 / TICK_SECONDS;
        if self.initialized {
            self.rate += self.alpha * (instant - self.rate);
        } else {
            self.rate = instant;
            self.initialized = true;
        }
    }
}

struct State {
    count: i64,
    uncounted: i64,
    last_tick: u64,
    m1: Ewma,
    m5: Ewma,
    m15: Ewma,
}

/// Rates of a [`Meter`], frozen at the time of the snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MeterSnapshot {
    pub count: i64,
    pub rate1: f64,
    pub rate5: f64,
    pub rate15: f64,
    pub rate_mean: f64,
}

/// Tracks the rate of events: one, five and fifteen minute moving averages plus the lifetime mean.
///
/// Averages advance in five second ticks.  Ticks are applied lazily, on the next mark or snapshot,
/// for every full interval that elapsed since the previous one.
pub struct Meter {
    clock: Clock,
    start: u64,
    state: Mutex<State>,
}

impl Meter {
    pub fn new() -> Meter { Meter::with_clock(Clock::new()) }

    pub fn with_clock(clock: Clock) -> Meter {
        let start = clock.now();
        Meter {
            clock,
            start,
            state: Mutex::new(State {
                count: 0,
                uncounted: 0,
                last_tick: start,
                m1: Ewma::over_minutes(1.0),
                m5: Ewma::over_minutes(5.0),
                m15: Ewma::over_minutes(15.0),
            }),
        }
    }

    /// Records `n` events.
    pub fn mark(&self, n: i64) {
        let now = self.clock.now();
        let mut state = self.state.lock();
        tick_if_necessary(&mut state, now);
        state.count = state.count.wrapping_add(n);
        state.uncounted = state.uncounted.wrapping_add(n);
    }

    pub fn count(&self) -> i64 { self.state.lock().count }

    pub fn snapshot(&self) -> MeterSnapshot {
        let now = self.clock.now();
        let mut state = self.state.lock();
        tick_if_necessary(&mut state, now);

        let elapsed = self.clock.delta(self.start, now) as f64 / NANOS_PER_SEC;
        let rate_mean = if elapsed > 0.0 { state.count as f64 / elapsed } else { 0.0 };

        MeterSnapshot {
            count: state.count,
            rate1: state.m1.rate,
            rate5: state.m5.rate,
            rate15: state.m15.rate,
            rate_mean,
        }
    }
}

impl Default for Meter {
    fn default() -> Meter { Meter::new() }
}

fn tick_if_necessary(state: &mut State, now: u64) {
    let ticks = now.saturating_sub(state.last_tick) / TICK_INTERVAL;
    if ticks == 0 {
        return;
    }

    state.last_tick += ticks * TICK_INTERVAL;
    for _ in 0..ticks {
        let uncounted = state.uncounted;
        state.uncounted = 0;
        state.m1.tick(uncounted);
        state.m5.tick(uncounted);
        state.m15.tick(uncounted);
    }
}
