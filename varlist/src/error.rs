use alloc::string::String;

use thiserror::Error;

/// Why a sandbox could not produce a height for one item.
///
/// Measurement failures are never fatal: the item keeps reporting the default estimate and is
/// requested again by a later look-ahead pass.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum MeasureError {
    /// The item content was not available to the sandbox.
    #[error("item content is missing")]
    MissingContent,
    /// The sandbox failed to render the item.
    #[error("render failed: {0}")]
    Render(String),
    /// The sandbox produced a value that cannot be a row height (NaN, infinite, negative, or
    /// zero when zero heights from the sandbox are not accepted).
    #[error("degenerate height {0}")]
    Degenerate(f64),
    /// The sandbox gave up on the item after its own time limit.
    #[error("measurement timed out")]
    TimedOut,
}

/// Rejected configuration, reported by [`crate::VirtualizerOptions::validate`].
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum OptionsError {
    #[error("default_estimate must be finite and greater than zero (got {0})")]
    InvalidEstimate(f64),
}

/// Why a [`crate::MeasurementSnapshot`] could not be imported.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum SnapshotError {
    /// Heights were measured at a different container width.
    #[error("snapshot was taken at width {snapshot}, container is {current}")]
    WidthMismatch { snapshot: f64, current: f64 },
    /// Heights belong to a different item sequence.
    #[error("snapshot belongs to sequence version {snapshot}, current is {current}")]
    VersionMismatch { snapshot: u64, current: u64 },
}
