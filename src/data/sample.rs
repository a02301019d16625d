use super::SampleSnapshot;

/// A statistically representative reservoir of integer observations.
///
/// Implementations guard their own state, so a sample can be updated and read from several
/// threads at once.  Every accessor works over a fresh [`SampleSnapshot`]; callers that need more
/// than one statistic should take a snapshot once and read from it instead.
pub trait Sample: Send + Sync {
    /// Records a new observation.
    fn update(&self, value: i64);

    /// Copies the current contents into a frozen view.
    fn snapshot(&self) -> SampleSnapshot;

    /// Drops every observation.
    fn clear(&self);

    fn count(&self) -> i64 { self.snapshot().count() }

    fn size(&self) -> usize { self.snapshot().size() }

    fn values(&self) -> Vec<i64> { self.snapshot().values().to_vec() }

    fn min(&self) -> i64 { self.snapshot().min() }

    fn max(&self) -> i64 { self.snapshot().max() }

    fn sum(&self) -> i64 { self.snapshot().sum() }

    fn mean(&self) -> f64 { self.snapshot().mean() }

    fn variance(&self) -> f64 { self.snapshot().variance() }

    fn std_dev(&self) -> f64 { self.snapshot().std_dev() }

    fn percentile(&self, p: f64) -> f64 { self.snapshot().percentile(p) }

    fn percentiles(&self, ps: &[f64]) -> Vec<f64> { self.snapshot().percentiles(ps) }
}
