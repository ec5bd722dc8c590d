// Every event goes to the `varlist` target. Without the `tracing` feature these expand to
// nothing and their arguments are never evaluated.

#[cfg(feature = "tracing")]
macro_rules! vtrace {
    ($($tt:tt)*) => {
        tracing::trace!(target: "varlist", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! vtrace {
    ($($tt:tt)*) => {};
}

#[cfg(feature = "tracing")]
macro_rules! vdebug {
    ($($tt:tt)*) => {
        tracing::debug!(target: "varlist", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! vdebug {
    ($($tt:tt)*) => {};
}

#[cfg(feature = "tracing")]
macro_rules! vwarn {
    ($($tt:tt)*) => {
        tracing::warn!(target: "varlist", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! vwarn {
    ($($tt:tt)*) => {};
}
