// Metric sink used by the scanner (one call per emitted metric)

use crate::models::Metric;

pub trait Accumulator {
    fn add_metric(&mut self, metric: Metric);
}

impl Accumulator for Vec<Metric> {
    fn add_metric(&mut self, metric: Metric) {
        self.push(metric);
    }
}

impl<A: Accumulator + ?Sized> Accumulator for &mut A {
    fn add_metric(&mut self, metric: Metric) {
        (**self).add_metric(metric);
    }
}
