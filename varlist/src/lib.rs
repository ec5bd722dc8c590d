//! A headless variable-height virtualization engine.
//!
//! Given `N` items whose heights are unknown until measured, the engine decides on every
//! scroll or resize which contiguous slice of items to materialize and where, while
//! discovering true heights lazily and keeping an always-consistent total content height.
//!
//! The pieces, leaf first:
//! - [`HeightCache`]: measured heights with a default estimate for the rest, backed by a
//!   Fenwick tree for `O(log n)` prefix sums, offset lookups and updates.
//! - [`MeasurementScheduler`]: single-flight look-ahead batches against a
//!   [`MeasurementSandbox`].
//! - [`ViewportState`]: scroll offset and container size.
//! - [`resolve`]: viewport + cache → buffered [`VisibleRange`].
//! - [`RenderPlan`]: what the host renders, republished after every input.
//! - [`Virtualizer`]: wires the above to scroll/resize/sequence signals.
//!
//! It is UI-agnostic. The host is expected to provide:
//! - scroll offsets and container size
//! - the item sequence length and a version that changes on wholesale replacement
//! - a sandbox (or real-row feedback) that reports rendered heights
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod cache;
mod error;
mod fenwick;
mod options;
mod resolver;
mod scheduler;
mod snapshot;
mod state;
mod types;
mod virtualizer;


pub use cache::{HeightCache, SetOutcome};
pub use error::{MeasureError, OptionsError, SnapshotError};
pub use options::{
    DEFAULT_BUFFER_AFTER, DEFAULT_BUFFER_BEFORE, DEFAULT_ESTIMATE, DEFAULT_LOOK_AHEAD_COUNT,
    DEFAULT_MEASURE_TIMEOUT_MS, OnPlanCallback, Tuning, VirtualizerOptions,
};
pub use resolver::{resolve, resolve_linear};
pub use scheduler::{
    BatchOutcome, BatchReport, LookAhead, MeasurementBatch, MeasurementSandbox,
    MeasurementScheduler, SchedulerState,
};
pub use snapshot::MeasurementSnapshot;
pub use state::ViewportState;
pub use types::{PlannedItem, RenderPlan, VisibleRange};
pub use virtualizer::Virtualizer;
