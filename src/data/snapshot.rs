/// A frozen, point-in-time view of a sample.
///
/// Derived statistics are all computed over the same copy of the values, so a reader can pull
/// min, max, mean and percentiles without the underlying reservoir moving in between.  An empty
/// snapshot reports zero for everything.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SampleSnapshot {
    count: i64,
    values: Vec<i64>,
}

impl SampleSnapshot {
    /// Creates a snapshot from a count and a copy of the sampled values.
    ///
    /// `count` is whatever the originating sample reports as its count, which for some reservoirs
    /// is the number of values ever seen rather than the number retained.
    pub fn new(count: i64, values: Vec<i64>) -> SampleSnapshot {
        SampleSnapshot { count, values }
    }

    pub fn count(&self) -> i64 { self.count }

    /// Number of values held by the snapshot.
    pub fn size(&self) -> usize { self.values.len() }

    pub fn values(&self) -> &[i64] { &self.values }

    pub fn min(&self) -> i64 { self.values.iter().cloned().min().unwrap_or(0) }

    pub fn max(&self) -> i64 { self.values.iter().cloned().max().unwrap_or(0) }

    /// Sum of the values, wrapping around on overflow.
    pub fn sum(&self) -> i64 { self.values.iter().fold(0i64, |acc, v| acc.wrapping_add(*v)) }

    pub fn mean(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let total: i128 = self.values.iter().map(|v| i128::from(*v)).sum();
        total as f64 / self.values.len() as f64
    }

    /// Population variance of the values.
    pub fn variance(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }

        let mean = self.mean();
        let squares: f64 = self
            .values
            .iter()
            .map(|v| {
                let d = *v as f64 - mean;
                d * d
            })
            .sum();
        squares / self.values.len() as f64
    }

    pub fn std_dev(&self) -> f64 { self.variance().sqrt() }

    /// Value at the given fraction, e.g. `0.99`.
    pub fn percentile(&self, p: f64) -> f64 { self.percentiles(&[p])[0] }

    /// Values at each of the given fractions, computed over a single sorted copy.
    pub fn percentiles(&self, ps: &[f64]) -> Vec<f64> {
        let mut sorted = self.values.clone();
        sorted.sort_unstable();
        ps.iter().map(|p| rank_interpolate(&sorted, *p)).collect()
    }
}

// Ranks are 1-based: position `p * (n + 1)` lands between two neighbours which are interpolated.
fn rank_interpolate(sorted: &[i64], p: f64) -> f64 {
    let size = sorted.len();
    if size == 0 {
        return 0.0;
    }

    let pos = p * (size + 1) as f64;
    if pos < 1.0 {
        sorted[0] as f64
    } else if pos >= size as f64 {
        sorted[size - 1] as f64
    } else {
        let lower = sorted[pos as usize - 1] as f64;
        let upper = sorted[pos as usize] as f64;
        lower + (pos - pos.floor()) * (upper - lower)
    }
}
