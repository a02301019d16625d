use std::sync::atomic::{AtomicI64, Ordering};

/// A signed running total.
///
/// Counters registered under a delta identity are drained by the exporter on every flush, see
/// [`Counter::take`].
#[derive(Debug, Default)]
pub struct Counter {
    count: AtomicI64,
}

impl Counter {
    pub fn new() -> Counter { Counter::default() }

    pub fn inc(&self, amount: i64) { self.count.fetch_add(amount, Ordering::AcqRel); }

    pub fn dec(&self, amount: i64) { self.count.fetch_sub(amount, Ordering::AcqRel); }

    pub fn count(&self) -> i64 { self.count.load(Ordering::Acquire) }

    pub fn clear(&self) { self.count.store(0, Ordering::Release); }

    /// Reads the current total and subtracts exactly that amount.
    ///
    /// Increments racing with the read are not lost: they remain in the counter for the next take.
    pub fn take(&self) -> i64 {
        let value = self.count();
        self.dec(value);
        value
    }
}
