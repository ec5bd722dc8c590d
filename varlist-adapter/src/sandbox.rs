use core::fmt;

use varlist::{MeasureError, MeasurementBatch, MeasurementSandbox};

/// A [`MeasurementSandbox`] backed by a closure that renders one item at a given width.
///
/// Useful for hosts whose layout engine can measure synchronously (terminal text wrapping,
/// fixed-font layout) and for tests.
pub struct FnSandbox<F> {
    f: F,
}

impl<F> FnSandbox<F>
where
    F: FnMut(usize, f64) -> Result<f64, MeasureError>,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }

    pub fn into_inner(self) -> F {
        self.f
    }
}

impl<F> MeasurementSandbox for FnSandbox<F>
where
    F: FnMut(usize, f64) -> Result<f64, MeasureError>,
{
    fn measure_batch(
        &mut self,
        batch: &MeasurementBatch,
        report: &mut dyn FnMut(usize, Result<f64, MeasureError>),
    ) {
        let width = batch.width();
        for &index in batch.indices() {
            report(index, (self.f)(index, width));
        }
    }
}

impl<F> fmt::Debug for FnSandbox<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSandbox").finish_non_exhaustive()
    }
}

/// Convenience constructor for [`FnSandbox`].
pub fn sandbox_fn<F>(f: F) -> FnSandbox<F>
where
    F: FnMut(usize, f64) -> Result<f64, MeasureError>,
{
    FnSandbox::new(f)
}
