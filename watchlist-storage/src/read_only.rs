//! Read-only switch with a settable reason.

use crate::ReadOnlyMode;
use std::sync::{Mutex, PoisonError};

/// [`ReadOnlyMode`] backed by an optional reason string.
#[derive(Debug, Default)]
pub struct StaticReadOnlyMode {
    reason: Mutex<Option<String>>,
}

impl StaticReadOnlyMode {
    /// A writable site.
    pub fn writable() -> Self {
        Self::default()
    }

    /// A site that is read-only for `reason`.
    pub fn read_only(reason: impl Into<String>) -> Self {
        Self {
            reason: Mutex::new(Some(reason.into())),
        }
    }

    pub fn set_read_only(&self, reason: impl Into<String>) {
        *self.reason.lock().unwrap_or_else(PoisonError::into_inner) = Some(reason.into());
    }

    pub fn set_writable(&self) {
        *self.reason.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl ReadOnlyMode for StaticReadOnlyMode {
    fn is_read_only(&self) -> bool {
        self.reason().is_some()
    }

    fn reason(&self) -> Option<String> {
        self.reason
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
