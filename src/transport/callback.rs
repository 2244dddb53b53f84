//! Handles for registered callbacks.

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_CALLBACK_ID: AtomicU64 = AtomicU64::new(0);

/// Callback handle for unregistering callbacks.
///
/// Returned by every callback registration on a transport or device.
/// Dropping the handle unregisters the callback.
pub struct CallbackHandle {
    id: u64,
    unregister_fn: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl CallbackHandle {
    /// Create a new callback handle that runs `unregister_fn` once.
    pub fn new(unregister_fn: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            id: NEXT_CALLBACK_ID.fetch_add(1, Ordering::SeqCst),
            unregister_fn: Some(Box::new(unregister_fn)),
        }
    }

    /// A handle with nothing to unregister.
    pub fn noop() -> Self {
        Self {
            id: NEXT_CALLBACK_ID.fetch_add(1, Ordering::SeqCst),
            unregister_fn: None,
        }
    }

    /// Unregister this callback.
    pub fn unregister(mut self) {
        if let Some(f) = self.unregister_fn.take() {
            f();
        }
    }

    /// Get the callback ID.
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Drop for CallbackHandle {
    fn drop(&mut self) {
        if let Some(f) = self.unregister_fn.take() {
            f();
        }
    }
}

impl std::fmt::Debug for CallbackHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackHandle").field("id", &self.id).finish()
    }
}
