//! Look-ahead measurement scheduling.
//!
//! The scheduler is a two-state machine (`Idle → Measuring → Idle`). A look-ahead request
//! that finds nothing unmeasured leaves it `Idle`; a request that arrives while a batch is in
//! flight is dropped rather than queued, because the next scroll event asks again.
//!
//! The sandbox round-trip is the only asynchronous boundary, so a started batch is handed out
//! as a [`MeasurementBatch`] ticket. Whoever runs the sandbox passes the results back through
//! [`MeasurementScheduler::complete`]. Tickets from a cancelled generation are ignored.

use alloc::vec::Vec;

use crate::{HeightCache, MeasureError, SetOutcome};

/// Capability that renders items offscreen and reports their heights.
///
/// One call measures a whole batch, so implementations can set up their offscreen context
/// once. Implementations must call `report` at most once per index in `batch.indices()`;
/// indexes they never report stay unmeasured.
pub trait MeasurementSandbox {
    fn measure_batch(
        &mut self,
        batch: &MeasurementBatch,
        report: &mut dyn FnMut(usize, Result<f64, MeasureError>),
    );
}

impl<S: MeasurementSandbox + ?Sized> MeasurementSandbox for &mut S {
    fn measure_batch(
        &mut self,
        batch: &MeasurementBatch,
        report: &mut dyn FnMut(usize, Result<f64, MeasureError>),
    ) {
        (**self).measure_batch(batch, report);
    }
}

impl<S: MeasurementSandbox + ?Sized> MeasurementSandbox for alloc::boxed::Box<S> {
    fn measure_batch(
        &mut self,
        batch: &MeasurementBatch,
        report: &mut dyn FnMut(usize, Result<f64, MeasureError>),
    ) {
        (**self).measure_batch(batch, report);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SchedulerState {
    Idle,
    Measuring,
}

/// A started measurement batch: the unmeasured indexes to render at `width`.
#[derive(Clone, Debug, PartialEq)]
pub struct MeasurementBatch {
    id: u64,
    generation: u64,
    width: f64,
    indices: Vec<usize>,
}

impl MeasurementBatch {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Container width the items must be laid out at.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Indexes to measure, ascending and without duplicates.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }
}

/// Result of [`MeasurementScheduler::request_look_ahead`].
#[derive(Clone, Debug, PartialEq)]
pub enum LookAhead {
    /// Every index in the window is already measured (or out of bounds).
    Nothing,
    /// Another batch is in flight; the request was dropped.
    Dropped,
    /// A batch was started and the guard is held until it completes or is cancelled.
    Started(MeasurementBatch),
    /// Nothing was requested because the engine is detached or the container has no width
    /// yet. Only [`crate::Virtualizer`] reports this.
    Deferred,
}

impl LookAhead {
    pub fn into_batch(self) -> Option<MeasurementBatch> {
        match self {
            Self::Started(batch) => Some(batch),
            Self::Nothing | Self::Dropped | Self::Deferred => None,
        }
    }
}

/// Per-batch tallies returned by [`MeasurementScheduler::complete`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BatchReport {
    /// Heights newly written to the cache.
    pub measured: usize,
    /// Heights that were already stored with the same value.
    pub unchanged: usize,
    /// Heights that replaced a different stored value.
    pub overwritten: usize,
    /// Indexes the sandbox failed on, reported degenerate values for, or never reported.
    pub failed: usize,
}

impl BatchReport {
    pub fn changed(&self) -> bool {
        self.measured > 0 || self.overwritten > 0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchOutcome {
    Applied(BatchReport),
    /// The batch was cancelled (invalidation, sequence replacement, detach, timeout) or is
    /// not the one in flight. Its results were ignored.
    Stale,
}

#[derive(Clone, Copy, Debug)]
struct InFlight {
    id: u64,
    /// First clock reading observed after the batch started.
    first_seen_ms: Option<u64>,
}

/// Single-flight look-ahead scheduler.
#[derive(Clone, Debug)]
pub struct MeasurementScheduler {
    in_flight: Option<InFlight>,
    /// Indexes of the in-flight batch, ascending.
    queue: Vec<usize>,
    generation: u64,
    next_id: u64,
    accept_zero: bool,
}

impl Default for MeasurementScheduler {
    fn default() -> Self {
        Self::new(false)
    }
}

impl MeasurementScheduler {
    /// `accept_zero` controls whether a sandbox height of exactly `0.0` is cached or treated
    /// as a failed measurement.
    pub fn new(accept_zero: bool) -> Self {
        Self {
            in_flight: None,
            queue: Vec::new(),
            generation: 0,
            next_id: 0,
            accept_zero,
        }
    }

    pub fn state(&self) -> SchedulerState {
        if self.in_flight.is_some() {
            SchedulerState::Measuring
        } else {
            SchedulerState::Idle
        }
    }

    pub fn is_measuring(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Indexes awaiting the in-flight batch.
    pub fn pending(&self) -> &[usize] {
        &self.queue
    }

    pub fn set_accept_zero(&mut self, accept_zero: bool) {
        self.accept_zero = accept_zero;
    }

    /// Starts a batch for the unmeasured indexes in `[from, from + count) ∩ [0, N)`.
    pub fn request_look_ahead(
        &mut self,
        from: usize,
        count: usize,
        cache: &HeightCache,
        width: f64,
    ) -> LookAhead {
        let indices: Vec<usize> = cache.unmeasured_in(from, count).collect();
        if indices.is_empty() {
            return LookAhead::Nothing;
        }
        if self.is_measuring() {
            vtrace!(from, count, "look-ahead dropped");
            return LookAhead::Dropped;
        }

        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        self.in_flight = Some(InFlight {
            id,
            first_seen_ms: None,
        });
        self.queue.clone_from(&indices);
        vdebug!(id, from, len = indices.len(), width, "measurement batch started");

        LookAhead::Started(MeasurementBatch {
            id,
            generation: self.generation,
            width,
            indices,
        })
    }

    /// Applies the results of `batch` to `cache` and releases the guard.
    ///
    /// Results for indexes outside the batch are ignored. Failed or degenerate measurements
    /// leave the index unmeasured.
    pub fn complete(
        &mut self,
        batch: &MeasurementBatch,
        results: impl IntoIterator<Item = (usize, Result<f64, MeasureError>)>,
        cache: &mut HeightCache,
    ) -> BatchOutcome {
        if !self.owns(batch) {
            vdebug!(id = batch.id, "stale measurement batch ignored");
            return BatchOutcome::Stale;
        }

        let mut report = BatchReport::default();
        let mut reported = 0usize;
        for (index, result) in results {
            if batch.indices.binary_search(&index).is_err() {
                vwarn!(id = batch.id, index, "result for an index outside the batch");
                continue;
            }
            reported += 1;
            let height = match result.and_then(|h| self.check(h)) {
                Ok(h) => h,
                Err(_err) => {
                    vtrace!(index, error = %_err, "measurement failed");
                    report.failed += 1;
                    continue;
                }
            };
            match cache.set(index, height) {
                SetOutcome::Inserted { .. } => report.measured += 1,
                SetOutcome::Unchanged => report.unchanged += 1,
                SetOutcome::Overwritten { .. } => report.overwritten += 1,
                SetOutcome::OutOfBounds | SetOutcome::Rejected => report.failed += 1,
            }
        }
        report.failed += batch.indices.len().saturating_sub(reported);

        self.release();
        vdebug!(
            id = batch.id,
            measured = report.measured,
            failed = report.failed,
            "measurement batch completed"
        );
        BatchOutcome::Applied(report)
    }

    /// Abandons the in-flight batch, if any. Its eventual completion is ignored.
    ///
    /// Returns `true` when a batch was cancelled.
    pub fn cancel(&mut self) -> bool {
        self.generation = self.generation.wrapping_add(1);
        let cancelled = self.in_flight.is_some();
        self.release();
        cancelled
    }

    /// Advances the scheduler clock; cancels the in-flight batch once it has been observed for
    /// at least `timeout_ms`. Returns the id of a batch abandoned this way.
    pub fn observe_clock(&mut self, now_ms: u64, timeout_ms: Option<u64>) -> Option<u64> {
        let in_flight = self.in_flight.as_mut()?;
        let first_seen = *in_flight.first_seen_ms.get_or_insert(now_ms);
        let timeout = timeout_ms?;
        if now_ms.saturating_sub(first_seen) < timeout {
            return None;
        }
        let id = in_flight.id;
        vdebug!(id, timeout, "measurement batch timed out");
        self.cancel();
        Some(id)
    }

    fn owns(&self, batch: &MeasurementBatch) -> bool {
        batch.generation == self.generation
            && self.in_flight.is_some_and(|in_flight| in_flight.id == batch.id)
    }

    fn check(&self, height: f64) -> Result<f64, MeasureError> {
        let zero_rejected = height == 0.0 && !self.accept_zero;
        if !height.is_finite() || height < 0.0 || zero_rejected {
            Err(MeasureError::Degenerate(height))
        } else {
            Ok(height)
        }
    }

    fn release(&mut self) {
        self.in_flight = None;
        self.queue.clear();
    }
}
