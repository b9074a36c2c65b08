//! Watchlist Manager - Watch State and Notification Tracking
//!
//! Mediates read/write access to which users watch which pages and whether
//! they have unseen changes. Every operation follows the same path:
//! permission gate, delegate to an injected collaborator, then update the
//! request-scoped cache or queue follow-up work.
//!
//! # Example
//!
//! ```ignore
//! let manager = WatchlistManager::new(config, services);
//! manager.add_watch(&performer, &PageTarget::new(Namespace::MAIN, "Foo"), None)?;
//! assert!(manager.is_watched(&performer, &PageTarget::new(Namespace::TALK, "Foo"))?);
//! ```

pub mod cache;
mod manager;

pub use cache::{NotificationCacheKey, NotificationCacheStats, NotificationTimestampCache};
pub use manager::{WatchlistManager, WatchlistServices};

// Re-export the types callers need to drive the manager.
pub use watchlist_core::{
    Authority, Capability, Namespace, NotificationTimestamp, PageTarget, RevisionId,
    UserAuthority, UserIdentity, WatchlistConfig, WatchlistError, WatchlistResult,
};
