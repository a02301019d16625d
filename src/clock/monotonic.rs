use crate::clock::ClockSource;
use std::time::Instant;

/// Monotonic clock source measuring from the moment it was created.
#[derive(Clone)]
pub struct Monotonic {
    base: Instant,
}

impl Monotonic {
    pub fn new() -> Self {
        Monotonic { base: Instant::now() }
    }
}

impl ClockSource for Monotonic {
    fn now(&self) -> u64 {
        let elapsed = self.base.elapsed();
        elapsed.as_secs() * 1_000_000_000 + u64::from(elapsed.subsec_nanos())
    }
}
