use alloc::vec::Vec;

use varlist::{
    BatchOutcome, LookAhead, MeasureError, MeasurementBatch, MeasurementSandbox, RenderPlan,
    SetOutcome, Virtualizer, VirtualizerOptions,
};

use crate::ResizeSubscription;

/// A framework-neutral controller that owns a [`Virtualizer`] and the sandbox that measures
/// for it.
///
/// Every signal that starts a measurement batch runs it through the sandbox right away and
/// feeds the results back, so the host only has to forward events and render
/// [`Self::plan`]. Hosts with an asynchronous layout engine should drive the `Virtualizer`
/// directly and complete batches themselves.
#[derive(Debug)]
pub struct Controller<S> {
    v: Virtualizer,
    sandbox: S,
    subscription: Option<ResizeSubscription>,
    batches_run: u64,
}

impl<S: MeasurementSandbox> Controller<S> {
    pub fn new(options: VirtualizerOptions, sandbox: S) -> Self {
        Self::from_virtualizer(Virtualizer::new(options), sandbox)
    }

    pub fn from_virtualizer(v: Virtualizer, sandbox: S) -> Self {
        Self {
            v,
            sandbox,
            subscription: None,
            batches_run: 0,
        }
    }

    pub fn virtualizer(&self) -> &Virtualizer {
        &self.v
    }

    /// Direct access to the virtualizer. Batches started through it are not run by the
    /// controller.
    pub fn virtualizer_mut(&mut self) -> &mut Virtualizer {
        &mut self.v
    }

    pub fn sandbox(&self) -> &S {
        &self.sandbox
    }

    pub fn sandbox_mut(&mut self) -> &mut S {
        &mut self.sandbox
    }

    /// Releases the resize subscription, if any, and returns the virtualizer and sandbox.
    pub fn into_parts(mut self) -> (Virtualizer, S) {
        self.release_subscription();
        (self.v, self.sandbox)
    }

    /// Number of batches handed to the sandbox so far.
    pub fn batches_run(&self) -> u64 {
        self.batches_run
    }

    /// Stores the release hook of the host's resize subscription. A previously stored
    /// subscription is released first.
    pub fn set_resize_subscription(&mut self, subscription: ResizeSubscription) {
        self.release_subscription();
        self.subscription = Some(subscription);
    }

    pub fn has_resize_subscription(&self) -> bool {
        self.subscription
            .as_ref()
            .is_some_and(ResizeSubscription::is_active)
    }

    pub fn plan(&self) -> RenderPlan {
        self.v.plan()
    }

    pub fn attach(&mut self, len: usize, version: u64) -> Option<BatchOutcome> {
        let batch = self.v.attach(len, version);
        self.run(batch)
    }

    /// Detaches the virtualizer and releases the resize subscription.
    pub fn detach(&mut self) {
        self.v.detach();
        self.release_subscription();
    }

    pub fn replace_sequence(&mut self, len: usize, version: u64) -> Option<BatchOutcome> {
        let batch = self.v.replace_sequence(len, version);
        self.run(batch)
    }

    pub fn sync_sequence(&mut self, len: usize, version: u64) -> Option<BatchOutcome> {
        let batch = self.v.sync_sequence(len, version);
        self.run(batch)
    }

    pub fn on_scroll(&mut self, scroll_offset: f64) -> Option<BatchOutcome> {
        let batch = self.v.on_scroll(scroll_offset);
        self.run(batch)
    }

    pub fn on_container_resize(&mut self, width: f64, height: f64) -> Option<BatchOutcome> {
        let batch = self.v.on_container_resize(width, height);
        self.run(batch)
    }

    pub fn on_measured(&mut self, index: usize, height: f64) -> SetOutcome {
        self.v.on_measured(index, height)
    }

    /// Measures whatever is still unmeasured inside the current render plan.
    ///
    /// The initial batch is sized from the default estimate; when real heights come out
    /// smaller, the plan grows past it and this fills the gap.
    pub fn measure_visible(&mut self) -> Option<BatchOutcome> {
        let plan = self.v.plan();
        let batch = self.v.request_look_ahead(plan.start_index, plan.len());
        self.run(batch.into_batch())
    }

    pub fn tick(&mut self, now_ms: u64) -> Option<u64> {
        self.v.tick(now_ms)
    }

    /// Requests an explicit look-ahead and runs it.
    pub fn request_look_ahead(&mut self, from: usize, count: usize) -> LookAhead {
        let result = self.v.request_look_ahead(from, count);
        if let LookAhead::Started(batch) = &result {
            self.execute(batch);
        }
        result
    }

    fn run(&mut self, batch: Option<MeasurementBatch>) -> Option<BatchOutcome> {
        batch.map(|batch| self.execute(&batch))
    }

    fn execute(&mut self, batch: &MeasurementBatch) -> BatchOutcome {
        let mut results: Vec<(usize, Result<f64, MeasureError>)> =
            Vec::with_capacity(batch.indices().len());
        self.sandbox
            .measure_batch(batch, &mut |index, result| results.push((index, result)));
        self.batches_run += 1;
        let outcome = self.v.complete_batch(batch, results);
        #[cfg(feature = "tracing")]
        tracing::trace!(
            target: "varlist_adapter",
            batch = batch.id(),
            items = batch.indices().len(),
            ?outcome,
            "batch run"
        );
        outcome
    }

    fn release_subscription(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.release();
        }
    }
}
