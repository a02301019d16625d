use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

/// A last-write-wins integer value.
#[derive(Debug, Default)]
pub struct Gauge {
    value: AtomicI64,
}

impl Gauge {
    pub fn new() -> Gauge { Gauge::default() }

    pub fn update(&self, value: i64) { self.value.store(value, Ordering::Release); }

    pub fn value(&self) -> i64 { self.value.load(Ordering::Acquire) }
}

/// A last-write-wins floating-point value.
#[derive(Debug, Default)]
pub struct GaugeFloat64 {
    bits: AtomicU64,
}

impl GaugeFloat64 {
    pub fn new() -> GaugeFloat64 { GaugeFloat64::default() }

    pub fn update(&self, value: f64) { self.bits.store(value.to_bits(), Ordering::Release); }

    pub fn value(&self) -> f64 { f64::from_bits(self.bits.load(Ordering::Acquire)) }
}
