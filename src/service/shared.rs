//! Shared handle for multi-threaded hosts
//!
//! The registry is single-writer by design. `SharedRollbook` is the one
//! mutual-exclusion boundary: every operation runs to completion under the
//! lock, so no thread can observe a partially-updated reverse map or a
//! partially-allocated assignment slot.

use std::sync::{Arc, Mutex};

use super::Rollbook;

/// Clone-able, thread-safe handle to a [`Rollbook`]
#[derive(Clone)]
pub struct SharedRollbook {
    inner: Arc<Mutex<Rollbook>>,
}

impl SharedRollbook {
    pub fn new(rollbook: Rollbook) -> Self {
        Self {
            inner: Arc::new(Mutex::new(rollbook)),
        }
    }

    /// Run a closure with exclusive access to the registry.
    ///
    /// No operation suspends, so the lock is held only for bounded,
    /// in-memory work.
    pub fn with<R>(&self, f: impl FnOnce(&mut Rollbook) -> R) -> R {
        let mut guard = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard)
    }
}
