use alloc::boxed::Box;
use core::fmt;

/// Owns the release hook of a host resize subscription (a `ResizeObserver`, a SIGWINCH
/// handler, a window event listener).
///
/// The hook runs at most once: on [`Self::release`] or when the value is dropped.
#[derive(Default)]
pub struct ResizeSubscription {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl ResizeSubscription {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    pub fn is_active(&self) -> bool {
        self.release.is_some()
    }

    /// Runs the release hook. Returns `false` if it already ran.
    pub fn release(&mut self) -> bool {
        match self.release.take() {
            Some(f) => {
                f();
                true
            }
            None => false,
        }
    }
}

impl Drop for ResizeSubscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for ResizeSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResizeSubscription")
            .field("active", &self.is_active())
            .finish()
    }
}
