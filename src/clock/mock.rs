use crate::clock::ClockSource;
use std::sync::atomic::{AtomicU64, Ordering};

/// A clock source that only moves when told to.
pub struct Mock {
    offset: AtomicU64,
}

impl Mock {
    pub fn new(offset: u64) -> Self {
        Self { offset: AtomicU64::new(offset) }
    }

    /// Advances the clock by `amount` nanoseconds.
    pub fn increment(&self, amount: u64) {
        self.offset.fetch_add(amount, Ordering::Release);
    }
}

impl ClockSource for Mock {
    fn now(&self) -> u64 {
        self.offset.load(Ordering::Acquire)
    }
}
