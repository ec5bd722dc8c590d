use alloc::sync::Arc;

use crate::{OptionsError, RenderPlan};

/// Receives every republished [`RenderPlan`].
pub type OnPlanCallback = Arc<dyn Fn(&RenderPlan) + Send + Sync>;

pub const DEFAULT_ESTIMATE: f64 = 50.0;
pub const DEFAULT_BUFFER_BEFORE: usize = 2;
pub const DEFAULT_BUFFER_AFTER: usize = 5;
pub const DEFAULT_LOOK_AHEAD_COUNT: usize = 5;
pub const DEFAULT_MEASURE_TIMEOUT_MS: u64 = 1_000;

/// The plain-data part of [`VirtualizerOptions`].
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`; missing fields
/// take their defaults.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Tuning {
    pub default_estimate: f64,
    pub buffer_before: usize,
    pub buffer_after: usize,
    pub look_ahead_count: usize,
    pub measure_timeout_ms: Option<u64>,
    pub accept_zero_from_sandbox: bool,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            default_estimate: DEFAULT_ESTIMATE,
            buffer_before: DEFAULT_BUFFER_BEFORE,
            buffer_after: DEFAULT_BUFFER_AFTER,
            look_ahead_count: DEFAULT_LOOK_AHEAD_COUNT,
            measure_timeout_ms: Some(DEFAULT_MEASURE_TIMEOUT_MS),
            accept_zero_from_sandbox: false,
        }
    }
}

/// Configuration for [`crate::Virtualizer`].
///
/// Cheap to clone: the callback is stored in an `Arc`.
pub struct VirtualizerOptions {
    /// Height reported for every unmeasured item. Must be finite and `> 0`.
    pub default_estimate: f64,
    /// Extra rows rendered before the first visible row.
    pub buffer_before: usize,
    /// Extra rows rendered after the last visible row.
    pub buffer_after: usize,
    /// Rows to pre-measure past the end of the rendered range.
    pub look_ahead_count: usize,
    /// Abandon a sandbox batch after this long (driven by `Virtualizer::tick`). `None` waits
    /// forever.
    pub measure_timeout_ms: Option<u64>,
    /// Cache `0.0` heights reported by the sandbox. When `false` they count as failed
    /// measurements. Heights fed back through `on_measured` always accept zero.
    pub accept_zero_from_sandbox: bool,
    /// Fired after every input that changes the render plan inputs.
    pub on_plan: Option<OnPlanCallback>,
}

impl Clone for VirtualizerOptions {
    fn clone(&self) -> Self {
        Self {
            default_estimate: self.default_estimate,
            buffer_before: self.buffer_before,
            buffer_after: self.buffer_after,
            look_ahead_count: self.look_ahead_count,
            measure_timeout_ms: self.measure_timeout_ms,
            accept_zero_from_sandbox: self.accept_zero_from_sandbox,
            on_plan: self.on_plan.clone(),
        }
    }
}

impl Default for VirtualizerOptions {
    fn default() -> Self {
        Self::from_tuning(Tuning::default())
    }
}

impl VirtualizerOptions {
    pub fn new(default_estimate: f64) -> Self {
        Self::default().with_default_estimate(default_estimate)
    }

    pub fn from_tuning(tuning: Tuning) -> Self {
        Self {
            default_estimate: tuning.default_estimate,
            buffer_before: tuning.buffer_before,
            buffer_after: tuning.buffer_after,
            look_ahead_count: tuning.look_ahead_count,
            measure_timeout_ms: tuning.measure_timeout_ms,
            accept_zero_from_sandbox: tuning.accept_zero_from_sandbox,
            on_plan: None,
        }
    }

    pub fn tuning(&self) -> Tuning {
        Tuning {
            default_estimate: self.default_estimate,
            buffer_before: self.buffer_before,
            buffer_after: self.buffer_after,
            look_ahead_count: self.look_ahead_count,
            measure_timeout_ms: self.measure_timeout_ms,
            accept_zero_from_sandbox: self.accept_zero_from_sandbox,
        }
    }

    pub fn validate(&self) -> Result<(), OptionsError> {
        if !self.default_estimate.is_finite() || self.default_estimate <= 0.0 {
            return Err(OptionsError::InvalidEstimate(self.default_estimate));
        }
        Ok(())
    }

    /// Replaces an invalid `default_estimate` with [`DEFAULT_ESTIMATE`].
    pub(crate) fn sanitized(mut self) -> Self {
        if self.validate().is_err() {
            vwarn!(
                default_estimate = self.default_estimate,
                "invalid default_estimate, using fallback"
            );
            self.default_estimate = DEFAULT_ESTIMATE;
        }
        self
    }

    pub fn with_default_estimate(mut self, default_estimate: f64) -> Self {
        self.default_estimate = default_estimate;
        self
    }

    pub fn with_buffers(mut self, buffer_before: usize, buffer_after: usize) -> Self {
        self.buffer_before = buffer_before;
        self.buffer_after = buffer_after;
        self
    }

    pub fn with_look_ahead_count(mut self, look_ahead_count: usize) -> Self {
        self.look_ahead_count = look_ahead_count;
        self
    }

    pub fn with_measure_timeout_ms(mut self, measure_timeout_ms: Option<u64>) -> Self {
        self.measure_timeout_ms = measure_timeout_ms;
        self
    }

    pub fn with_accept_zero_from_sandbox(mut self, accept: bool) -> Self {
        self.accept_zero_from_sandbox = accept;
        self
    }

    pub fn with_on_plan(
        mut self,
        on_plan: Option<impl Fn(&RenderPlan) + Send + Sync + 'static>,
    ) -> Self {
        self.on_plan = on_plan.map(|f| Arc::new(f) as _);
        self
    }
}

impl core::fmt::Debug for VirtualizerOptions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VirtualizerOptions")
            .field("default_estimate", &self.default_estimate)
            .field("buffer_before", &self.buffer_before)
            .field("buffer_after", &self.buffer_after)
            .field("look_ahead_count", &self.look_ahead_count)
            .field("measure_timeout_ms", &self.measure_timeout_ms)
            .field("accept_zero_from_sandbox", &self.accept_zero_from_sandbox)
            .finish_non_exhaustive()
    }
}
