use core::cell::Cell;

use crate::resolver;
use crate::{
    BatchOutcome, HeightCache, LookAhead, MeasureError, MeasurementBatch, MeasurementScheduler,
    MeasurementSnapshot, OptionsError, PlannedItem, RenderPlan, SchedulerState, SetOutcome,
    SnapshotError, ViewportState, VirtualizerOptions, VisibleRange,
};

/// A headless variable-height virtualization engine.
///
/// This type is UI-agnostic:
/// - It holds no UI objects and never touches item content; items are addressed by index.
/// - The host drives it with scroll/resize signals and sequence changes.
/// - Measurement batches are handed back to the host as [`MeasurementBatch`] tickets, so the
///   sandbox may run synchronously or suspend. See `varlist-adapter` for a controller that
///   drives a sandbox directly.
///
/// Every input republishes a [`RenderPlan`] through `on_plan`. The plan is a pure function of
/// the viewport and the height cache and is never stored.
#[derive(Clone, Debug)]
pub struct Virtualizer {
    options: VirtualizerOptions,
    viewport: ViewportState,
    cache: HeightCache,
    scheduler: MeasurementScheduler,
    version: u64,
    attached: bool,
    /// The first screenful still needs a look-ahead (no width yet, no height yet, or the
    /// request was dropped).
    initial_pending: bool,

    notify_depth: Cell<usize>,
    notify_pending: Cell<bool>,
}

impl Virtualizer {
    /// Creates a detached virtualizer. An invalid `default_estimate` is replaced by the
    /// built-in default.
    pub fn new(options: VirtualizerOptions) -> Self {
        let options = options.sanitized();
        vdebug!(
            default_estimate = options.default_estimate,
            buffer_before = options.buffer_before,
            buffer_after = options.buffer_after,
            look_ahead_count = options.look_ahead_count,
            "Virtualizer::new"
        );
        Self {
            cache: HeightCache::new(0, options.default_estimate),
            scheduler: MeasurementScheduler::new(options.accept_zero_from_sandbox),
            viewport: ViewportState::default(),
            version: 0,
            attached: false,
            initial_pending: false,
            options,
            notify_depth: Cell::new(0),
            notify_pending: Cell::new(false),
        }
    }

    /// Like [`Self::new`], but rejects invalid options instead of sanitizing them.
    pub fn try_new(options: VirtualizerOptions) -> Result<Self, OptionsError> {
        options.validate()?;
        Ok(Self::new(options))
    }

    pub fn options(&self) -> &VirtualizerOptions {
        &self.options
    }

    /// Replaces the options. A new `default_estimate` re-prices unmeasured items; every
    /// measurement is kept.
    pub fn set_options(&mut self, options: VirtualizerOptions) {
        let options = options.sanitized();
        self.cache.set_default_estimate(options.default_estimate);
        self.scheduler
            .set_accept_zero(options.accept_zero_from_sandbox);
        self.options = options;
        self.notify();
    }

    /// Clones the current options, applies `f`, then delegates to `set_options`.
    pub fn update_options(&mut self, f: impl FnOnce(&mut VirtualizerOptions)) {
        let mut next = self.options.clone();
        f(&mut next);
        self.set_options(next);
    }

    pub fn set_on_plan(&mut self, on_plan: Option<impl Fn(&RenderPlan) + Send + Sync + 'static>) {
        self.options.on_plan = on_plan.map(|f| alloc::sync::Arc::new(f) as _);
        self.notify();
    }

    fn notify_now(&self) {
        if let Some(cb) = &self.options.on_plan {
            cb(&self.plan());
        }
    }

    fn notify(&self) {
        if self.notify_depth.get() > 0 {
            self.notify_pending.set(true);
            return;
        }
        self.notify_now();
    }

    /// Batches multiple updates into a single `on_plan` notification.
    ///
    /// Useful when a host frame delivers a resize and a scroll together.
    pub fn batch_update<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let depth = self.notify_depth.get();
        self.notify_depth.set(depth.saturating_add(1));

        let out = f(self);

        let depth = self.notify_depth.get();
        debug_assert!(depth > 0, "notify_depth underflow");
        let next = depth.saturating_sub(1);
        self.notify_depth.set(next);

        if next == 0 && self.notify_pending.replace(false) {
            self.notify_now();
        }
        out
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Version of the attached item sequence.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Number of items (`N`). Zero while detached.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn viewport(&self) -> ViewportState {
        self.viewport
    }

    /// Read-only view of the measured heights.
    pub fn cache(&self) -> &HeightCache {
        &self.cache
    }

    pub fn scheduler_state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    /// Indexes of the in-flight measurement batch.
    pub fn pending_measurements(&self) -> &[usize] {
        self.scheduler.pending()
    }

    /// Attaches to an item sequence of length `len`. Returns the initial look-ahead batch, if
    /// one could be started.
    pub fn attach(&mut self, len: usize, version: u64) -> Option<MeasurementBatch> {
        vdebug!(len, version, "Virtualizer::attach");
        self.attached = true;
        self.replace_sequence(len, version)
    }

    /// Tears down all per-sequence state. An outstanding batch is abandoned; completing it
    /// later has no effect.
    pub fn detach(&mut self) {
        if !self.attached {
            return;
        }
        vdebug!(len = self.cache.len(), "Virtualizer::detach");
        self.attached = false;
        self.initial_pending = false;
        self.scheduler.cancel();
        self.cache.reset(0);
        self.notify();
    }

    /// Replaces the item sequence wholesale: heights, pending measurements and the scroll
    /// offset are reset, then the first screenful is requested.
    pub fn replace_sequence(&mut self, len: usize, version: u64) -> Option<MeasurementBatch> {
        if !self.attached {
            return self.attach(len, version);
        }
        vdebug!(len, version, "Virtualizer::replace_sequence");
        self.version = version;
        self.scheduler.cancel();
        self.cache.reset(len);
        self.viewport.scroll_offset = 0.0;
        self.initial_pending = true;
        let batch = self.initial_look_ahead().into_batch();
        self.notify();
        batch
    }

    /// Reconciles with the host's current sequence.
    ///
    /// A different `version` means a new sequence (see [`Self::replace_sequence`]). The same
    /// version with a different `len` keeps surviving measurements: growth appends unmeasured
    /// items and shrinking prunes entries past the new end.
    pub fn sync_sequence(&mut self, len: usize, version: u64) -> Option<MeasurementBatch> {
        if !self.attached || version != self.version {
            return self.replace_sequence(len, version);
        }
        if len == self.cache.len() {
            return None;
        }
        vdebug!(from = self.cache.len(), to = len, "Virtualizer::sync_sequence resize");
        self.cache.resize(len);
        let batch = self.look_ahead_past_plan().into_batch();
        self.notify();
        batch
    }

    /// Scroll signal from the host. Returns a look-ahead batch for the items just past the
    /// rendered range, if one was started.
    pub fn on_scroll(&mut self, scroll_offset: f64) -> Option<MeasurementBatch> {
        vtrace!(scroll_offset, "Virtualizer::on_scroll");
        self.viewport.set_scroll_offset(scroll_offset);
        let batch = self.look_ahead_past_plan().into_batch();
        self.notify();
        batch
    }

    /// Resize signal from the host.
    ///
    /// A width change invalidates every measured height (they depend on line wrapping) and
    /// re-runs the initial measurement; a height-only change tops up the look-ahead.
    pub fn on_container_resize(&mut self, width: f64, height: f64) -> Option<MeasurementBatch> {
        let width_changed = self.viewport.set_container_size(width, height);
        vtrace!(width, height, width_changed, "Virtualizer::on_container_resize");
        if width_changed && self.attached {
            self.scheduler.cancel();
            self.cache.invalidate_all();
            self.initial_pending = true;
        }
        let batch = if self.initial_pending {
            self.initial_look_ahead()
        } else {
            self.look_ahead_past_plan()
        }
        .into_batch();
        self.notify();
        batch
    }

    /// Feeds back the height of a row the host actually rendered.
    ///
    /// Goes through the same path as sandbox results. Zero is a valid height here.
    pub fn on_measured(&mut self, index: usize, height: f64) -> SetOutcome {
        if !self.attached {
            return SetOutcome::OutOfBounds;
        }
        let outcome = self.cache.set(index, height);
        if outcome.changed() {
            self.notify();
        }
        outcome
    }

    /// Requests measurement of the unmeasured items in `[from, from + count)`.
    pub fn request_look_ahead(&mut self, from: usize, count: usize) -> LookAhead {
        if !self.attached || self.viewport.container_width <= 0.0 {
            return LookAhead::Deferred;
        }
        self.scheduler
            .request_look_ahead(from, count, &self.cache, self.viewport.container_width)
    }

    /// Applies the results of a batch previously returned by this virtualizer.
    ///
    /// Results are ignored when the virtualizer was detached, invalidated or re-sequenced
    /// since the batch started, or when the batch timed out.
    pub fn complete_batch(
        &mut self,
        batch: &MeasurementBatch,
        results: impl IntoIterator<Item = (usize, Result<f64, MeasureError>)>,
    ) -> BatchOutcome {
        if !self.attached {
            return BatchOutcome::Stale;
        }
        let outcome = self.scheduler.complete(batch, results, &mut self.cache);
        if let BatchOutcome::Applied(report) = outcome {
            if report.changed() {
                self.notify();
            }
        }
        outcome
    }

    /// Advances the measurement clock. An in-flight batch observed for longer than
    /// `measure_timeout_ms` is abandoned; its items stay unmeasured.
    ///
    /// Returns the id of a batch abandoned by this call.
    pub fn tick(&mut self, now_ms: u64) -> Option<u64> {
        self.scheduler
            .observe_clock(now_ms, self.options.measure_timeout_ms)
    }

    /// The current render plan.
    pub fn plan(&self) -> RenderPlan {
        if !self.attached {
            return RenderPlan::default();
        }
        RenderPlan::new(self.visible_range(), self.cache.total_height())
    }

    /// The buffered range for the current viewport.
    pub fn visible_range(&self) -> VisibleRange {
        if !self.attached {
            return VisibleRange::EMPTY;
        }
        resolver::resolve(
            &self.viewport,
            &self.cache,
            self.options.buffer_before,
            self.options.buffer_after,
        )
    }

    /// Visits every item of the current plan with its content-space position.
    pub fn for_each_planned_item(&self, mut f: impl FnMut(PlannedItem)) {
        let range = self.visible_range();
        let mut start = range.start_offset;
        for index in range.indices() {
            let measured = self.cache.measured(index);
            let height = measured.unwrap_or(self.cache.default_estimate());
            f(PlannedItem {
                index,
                start,
                height,
                measured: measured.is_some(),
            });
            start += height;
        }
    }

    pub fn total_height(&self) -> f64 {
        self.cache.total_height()
    }

    pub fn index_at_offset(&self, offset: f64) -> Option<usize> {
        self.cache.index_at_offset(offset)
    }

    pub fn item_start(&self, index: usize) -> Option<f64> {
        (index < self.cache.len()).then(|| self.cache.prefix_height(index))
    }

    pub fn item_height(&self, index: usize) -> Option<f64> {
        (index < self.cache.len()).then(|| self.cache.get(index))
    }

    pub fn is_measured(&self, index: usize) -> bool {
        self.cache.is_measured(index)
    }

    /// Captures the measured heights together with the width and sequence version they are
    /// valid for.
    pub fn export_measurements(&self) -> MeasurementSnapshot {
        let mut entries = alloc::vec::Vec::with_capacity(self.cache.measured_count());
        self.cache.for_each_measured(|i, h| entries.push((i, h)));
        MeasurementSnapshot {
            width: self.viewport.container_width,
            version: self.version,
            entries,
        }
    }

    /// Restores heights from [`Self::export_measurements`]. Entries past the current end are
    /// skipped. Returns the number of heights that changed.
    pub fn import_measurements(
        &mut self,
        snapshot: &MeasurementSnapshot,
    ) -> Result<usize, SnapshotError> {
        if snapshot.version != self.version {
            return Err(SnapshotError::VersionMismatch {
                snapshot: snapshot.version,
                current: self.version,
            });
        }
        if snapshot.width != self.viewport.container_width {
            return Err(SnapshotError::WidthMismatch {
                snapshot: snapshot.width,
                current: self.viewport.container_width,
            });
        }
        let mut changed = 0usize;
        for &(index, height) in &snapshot.entries {
            if self.cache.set(index, height).changed() {
                changed += 1;
            }
        }
        vdebug!(entries = snapshot.len(), changed, "import_measurements");
        if changed > 0 {
            self.notify();
        }
        Ok(changed)
    }

    fn look_ahead_past_plan(&mut self) -> LookAhead {
        let end = self.visible_range().end_index;
        self.request_look_ahead(end, self.options.look_ahead_count)
    }

    /// Requests the estimated first screenful plus `buffer_after` rows from index 0.
    fn initial_look_ahead(&mut self) -> LookAhead {
        let rows = rows_to_fill(self.viewport.container_height, self.cache.default_estimate());
        let count = rows.saturating_add(self.options.buffer_after);
        let result = self.request_look_ahead(0, count);
        let settled = matches!(result, LookAhead::Started(_) | LookAhead::Nothing);
        if settled && self.viewport.container_height > 0.0 {
            self.initial_pending = false;
        }
        result
    }
}

/// `ceil(height / estimate)` without relying on `std` float math.
fn rows_to_fill(height: f64, estimate: f64) -> usize {
    if height <= 0.0 || estimate <= 0.0 {
        return 0;
    }
    let rows = height / estimate;
    let whole = rows as usize;
    if (whole as f64) < rows { whole + 1 } else { whole }
}
