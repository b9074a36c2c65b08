//! Watchlist Events - Hooks and Deferred Updates
//!
//! The watchlist fires one hook (`UserClearNewTalkNotification`) and queues
//! talk page bookkeeping to run after the response. Both are injected into
//! the manager so the host decides how handlers are registered and when the
//! queue is drained.

mod deferred;
mod hooks;

pub use deferred::{DeferredRunReport, DeferredUpdate, DeferredUpdateQueue, DeferredUpdateSink};
pub use hooks::{HookOutcome, HookRegistry, HookRunner, NoopHookRunner};
