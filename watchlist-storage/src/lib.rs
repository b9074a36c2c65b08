//! Watchlist Storage - Collaborator Traits and In-Memory Implementations
//!
//! Defines the narrow interfaces the watchlist manager talks to. The host
//! platform supplies the real implementations; the in-memory ones here back
//! tests and embedding without a database.

pub mod expiry;
pub mod namespace;
pub mod read_only;
pub mod revisions;
pub mod talk_notifications;
pub mod user_cache;
pub mod watched_items;

pub use expiry::{parse_expiry, ParsedExpiry};
pub use namespace::StandardNamespacePolicy;
pub use read_only::StaticReadOnlyMode;
pub use revisions::InMemoryRevisionStore;
pub use talk_notifications::InMemoryTalkPageNotifications;
pub use user_cache::UserTouchTracker;
pub use watched_items::InMemoryWatchedItemStore;

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use watchlist_core::{
    Namespace, PageTarget, ReadConsistency, RevisionId, RevisionRecord, StorageError,
    UserIdentity, WatchedItem, WatchlistResult,
};

// ============================================================================
// WATCHED ITEM STORE
// ============================================================================

/// Persistence of (user, page) watch relationships.
pub trait WatchedItemStore: Send + Sync {
    /// Whether `user` watches `target` (permanently or temporarily).
    fn is_watched(&self, user: &UserIdentity, target: &PageTarget) -> WatchlistResult<bool>;

    /// Whether `user` watches `target` with an expiry.
    fn is_temp_watched(&self, user: &UserIdentity, target: &PageTarget) -> WatchlistResult<bool>;

    /// Add a watch.
    ///
    /// `expiry` is an opaque string the store interprets. `None` keeps any
    /// existing expiry and creates a permanent watch otherwise.
    /// Returns whether anything was written.
    fn add_watch(
        &self,
        user: &UserIdentity,
        target: &PageTarget,
        expiry: Option<&str>,
    ) -> WatchlistResult<bool>;

    /// Remove a watch. Returns whether one existed.
    fn remove_watch(&self, user: &UserIdentity, target: &PageTarget) -> WatchlistResult<bool>;

    /// Load the watch record, if any.
    fn get_watched_item(
        &self,
        user: &UserIdentity,
        target: &PageTarget,
    ) -> WatchlistResult<Option<WatchedItem>>;

    /// Mark `target` as seen by `user` up to `old_rev_id` (or fully when it
    /// is [`RevisionId::NONE`]).
    ///
    /// Without `force` the store may skip the write when it believes the
    /// page is not watched.
    fn reset_notification_timestamp(
        &self,
        user: &UserIdentity,
        target: &PageTarget,
        force: bool,
        old_rev_id: RevisionId,
    ) -> WatchlistResult<bool>;

    /// Mark every watched page of `user` as seen.
    fn reset_all_notification_timestamps_for_user(&self, user: &UserIdentity) -> WatchlistResult<()>;
}

// ============================================================================
// TALK PAGE NOTIFICATIONS
// ============================================================================

/// The "you have new messages" flag on a user's own talk page.
pub trait TalkPageNotificationManager: Send + Sync {
    fn user_has_new_messages(&self, user: &UserIdentity) -> WatchlistResult<bool>;

    /// Set the flag, optionally anchored to the first unseen revision.
    fn set_user_has_new_messages(
        &self,
        user: &UserIdentity,
        revision: Option<&RevisionRecord>,
    ) -> WatchlistResult<()>;

    fn remove_user_has_new_messages(&self, user: &UserIdentity) -> WatchlistResult<()>;
}

// ============================================================================
// REVISION LOOKUP
// ============================================================================

/// Read access to page history.
pub trait RevisionLookup: Send + Sync {
    fn get_revision_by_id(
        &self,
        id: RevisionId,
        consistency: ReadConsistency,
    ) -> WatchlistResult<Option<RevisionRecord>>;

    /// The revision of the same page saved right after `revision`.
    fn get_next_revision(&self, revision: &RevisionRecord) -> WatchlistResult<Option<RevisionRecord>>;
}

// ============================================================================
// NAMESPACE POLICY
// ============================================================================

/// Which namespaces can be watched and how subject/talk pages pair up.
pub trait NamespacePolicy: Send + Sync {
    fn is_watchable(&self, namespace: Namespace) -> bool;

    fn can_have_talk_page(&self, target: &PageTarget) -> bool;

    /// The subject page of `target` (itself when already a subject page).
    fn subject_page(&self, target: &PageTarget) -> PageTarget;

    /// The talk page of `target`, `None` when it cannot have one.
    fn talk_page(&self, target: &PageTarget) -> Option<PageTarget>;
}

// ============================================================================
// READ-ONLY MODE / USER CACHE
// ============================================================================

/// Site-wide read-only switch.
pub trait ReadOnlyMode: Send + Sync {
    fn is_read_only(&self) -> bool;

    fn reason(&self) -> Option<String>;
}

/// Invalidates the cached "last touched" marker of a user after a change
/// to their watchlist.
pub trait UserCacheInvalidator: Send + Sync {
    fn invalidate_cache(&self, user: &UserIdentity) -> WatchlistResult<()>;
}

// ============================================================================
// LOCK HELPERS
// ============================================================================

pub(crate) fn read_lock<T>(lock: &RwLock<T>) -> WatchlistResult<RwLockReadGuard<'_, T>> {
    lock.read().map_err(|_| StorageError::LockPoisoned.into())
}

pub(crate) fn write_lock<T>(lock: &RwLock<T>) -> WatchlistResult<RwLockWriteGuard<'_, T>> {
    lock.write().map_err(|_| StorageError::LockPoisoned.into())
}
