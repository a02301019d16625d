use super::{Sample, SampleSnapshot};
use parking_lot::Mutex;
use rand::Rng;

struct Reservoir {
    count: i64,
    values: Vec<i64>,
}

/// A uniform sample over every value ever recorded, using Vitter's algorithm R.
///
/// The count reported is the total number of updates, which may exceed the reservoir capacity.
pub struct UniformSample {
    capacity: usize,
    reservoir: Mutex<Reservoir>,
}

impl UniformSample {
    pub fn new(capacity: usize) -> UniformSample {
        UniformSample {
            capacity,
            reservoir: Mutex::new(Reservoir {
                count: 0,
                values: Vec::with_capacity(capacity),
            }),
        }
    }
}

impl Sample for UniformSample {
    fn update(&self, value: i64) {
        let mut reservoir = self.reservoir.lock();
        reservoir.count += 1;
        if reservoir.values.len() < self.capacity {
            reservoir.values.push(value);
        } else {
            let r = rand::thread_rng().gen_range(0..reservoir.count) as usize;
            if r < reservoir.values.len() {
                reservoir.values[r] = value;
            }
        }
    }

    fn snapshot(&self) -> SampleSnapshot {
        let reservoir = self.reservoir.lock();
        SampleSnapshot::new(reservoir.count, reservoir.values.clone())
    }

    fn clear(&self) {
        let mut reservoir = self.reservoir.lock();
        reservoir.count = 0;
        reservoir.values.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::UniformSample;
    use crate::data::Sample;

    #[test]
    fn test_uniform_sample_under_capacity() {
        let sample = UniformSample::new(100);
        for value in 0..10 {
            sample.update(value);
        }

        let snapshot = sample.snapshot();
        assert_eq!(snapshot.count(), 10);
        assert_eq!(snapshot.size(), 10);
        assert_eq!(snapshot.min(), 0);
        assert_eq!(snapshot.max(), 9);
    }

    #[test]
    fn test_uniform_sample_bounded() {
        let sample = UniformSample::new(100);
        for value in 0..1_000 {
            sample.update(value);
        }

        let snapshot = sample.snapshot();
        assert_eq!(snapshot.count(), 1_000);
        assert_eq!(snapshot.size(), 100);
        assert!(snapshot.values().iter().all(|v| *v >= 0 && *v < 1_000));

        sample.clear();
        assert_eq!(sample.count(), 0);
        assert_eq!(sample.size(), 0);
    }
}
