//! Deferred updates: work queued to run after the response is produced.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Mutex, PoisonError};
use watchlist_core::WatchlistResult;

type DeferredWork = Box<dyn FnOnce() -> WatchlistResult<()> + Send>;

/// A named unit of deferred work.
pub struct DeferredUpdate {
    name: String,
    work: DeferredWork,
}

impl DeferredUpdate {
    pub fn new<F>(name: impl Into<String>, work: F) -> Self
    where
        F: FnOnce() -> WatchlistResult<()> + Send + 'static,
    {
        Self {
            name: name.into(),
            work: Box::new(work),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn run(self) -> WatchlistResult<()> {
        (self.work)()
    }
}

impl fmt::Debug for DeferredUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredUpdate")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Where callers push deferred work. Implementations must not run it inline.
pub trait DeferredUpdateSink: Send + Sync {
    fn add_update(&self, update: DeferredUpdate);
}

/// Outcome of draining a [`DeferredUpdateQueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeferredRunReport {
    pub executed: usize,
    pub failed: usize,
}

impl DeferredRunReport {
    pub fn succeeded(&self) -> usize {
        self.executed - self.failed
    }
}

/// FIFO queue of deferred updates, drained by the request harness.
#[derive(Debug, Default)]
pub struct DeferredUpdateQueue {
    pending: Mutex<VecDeque<DeferredUpdate>>,
}

impl DeferredUpdateQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Names of pending updates in run order.
    pub fn pending_names(&self) -> Vec<String> {
        self.lock().iter().map(|u| u.name.clone()).collect()
    }

    /// Run pending updates one at a time in enqueue order, including any
    /// enqueued while draining. Failures are logged and counted only.
    pub fn run_pending(&self) -> DeferredRunReport {
        let mut report = DeferredRunReport::default();
        while let Some(update) = self.pop() {
            let name = update.name.clone();
            report.executed += 1;
            match update.run() {
                Ok(()) => tracing::trace!(update = %name, "deferred update completed"),
                Err(e) => {
                    report.failed += 1;
                    tracing::error!(update = %name, error = %e, "deferred update failed");
                }
            }
        }
        if report.failed > 0 {
            tracing::warn!(
                executed = report.executed,
                failed = report.failed,
                "deferred updates finished with failures"
            );
        }
        report
    }

    /// Drop pending updates without running them. Returns how many were dropped.
    pub fn discard_pending(&self) -> usize {
        let mut pending = self.lock();
        let dropped = pending.len();
        pending.clear();
        dropped
    }

    fn pop(&self) -> Option<DeferredUpdate> {
        self.lock().pop_front()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<DeferredUpdate>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DeferredUpdateSink for DeferredUpdateQueue {
    fn add_update(&self, update: DeferredUpdate) {
        tracing::trace!(update = %update.name, "deferred update queued");
        self.lock().push_back(update);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use watchlist_core::{StorageError, WatchlistError};

    #[test]
    fn test_updates_run_in_enqueue_order() {
        let queue = DeferredUpdateQueue::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        for i in 0..3 {
            let log = Arc::clone(&log);
            queue.add_update(DeferredUpdate::new(format!("step-{i}"), move || {
                log.lock().unwrap().push(i);
                Ok(())
            }));
        }
        assert_eq!(queue.pending_names(), vec!["step-0", "step-1", "step-2"]);
        assert!(log.lock().unwrap().is_empty());

        let report = queue.run_pending();
        assert_eq!(report, DeferredRunReport { executed: 3, failed: 0 });
        assert_eq!(*log.lock().unwrap(), vec![0, 1, 2]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_failure_does_not_stop_queue() {
        let queue = DeferredUpdateQueue::new();
        let ran = Arc::new(Mutex::new(false));

        queue.add_update(DeferredUpdate::new("fails", || {
            Err(WatchlistError::Storage(StorageError::Unavailable {
                reason: "primary down".to_string(),
            }))
        }));
        let flag = Arc::clone(&ran);
        queue.add_update(DeferredUpdate::new("succeeds", move || {
            *flag.lock().unwrap() = true;
            Ok(())
        }));

        let report = queue.run_pending();
        assert_eq!(report.executed, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.succeeded(), 1);
        assert!(*ran.lock().unwrap());
    }

    #[test]
    fn test_updates_enqueued_while_draining_also_run() {
        let queue = Arc::new(DeferredUpdateQueue::new());
        let inner_ran = Arc::new(Mutex::new(false));

        let q = Arc::clone(&queue);
        let flag = Arc::clone(&inner_ran);
        queue.add_update(DeferredUpdate::new("outer", move || {
            q.add_update(DeferredUpdate::new("inner", move || {
                *flag.lock().unwrap() = true;
                Ok(())
            }));
            Ok(())
        }));

        let report = queue.run_pending();
        assert_eq!(report.executed, 2);
        assert!(*inner_ran.lock().unwrap());
    }

    #[test]
    fn test_discard_pending() {
        let queue = DeferredUpdateQueue::new();
        queue.add_update(DeferredUpdate::new("never", || Ok(())));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.discard_pending(), 1);
        assert_eq!(queue.run_pending(), DeferredRunReport::default());
    }
}
