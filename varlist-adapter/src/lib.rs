//! Adapter utilities for the `varlist` crate.
//!
//! `varlist` only hands out measurement batches; running them is up to the host. This crate
//! provides the pieces most hosts end up writing:
//!
//! - [`Controller`]: owns a `Virtualizer` and a [`varlist::MeasurementSandbox`], running each
//!   batch as soon as a signal starts one
//! - [`FnSandbox`]: a sandbox backed by a per-item closure
//! - [`ResizeSubscription`]: the release hook of a host resize listener, run on detach
//!
//! Framework-agnostic: no DOM, terminal, or GUI bindings.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

mod controller;
mod sandbox;
mod subscription;

#[cfg(test)]
mod tests;

pub use controller::Controller;
pub use sandbox::{FnSandbox, sandbox_fn};
pub use subscription::ResizeSubscription;
