//! Watchlist Test Utilities
//!
//! Centralized test infrastructure for the watchlist workspace:
//! - A harness wiring every in-memory collaborator
//! - A call-recording watched-item store
//! - Fixtures for users, pages and performers
//! - Proptest generators

// Re-export in-memory collaborators from their source crates
pub use watchlist_events::{DeferredRunReport, DeferredUpdateQueue, HookOutcome, HookRegistry};
pub use watchlist_storage::{
    InMemoryRevisionStore, InMemoryTalkPageNotifications, InMemoryWatchedItemStore,
    StandardNamespacePolicy, StaticReadOnlyMode, UserTouchTracker,
};

// Re-export core types for convenience
pub use watchlist_core::{
    Authority, Capability, Namespace, NotificationTimestamp, PageTarget, RevisionId,
    RevisionRecord, Timestamp, UserAuthority, UserIdentity, WatchedItem, WatchlistConfig,
    WatchlistResult,
};

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use watchlist_storage::WatchedItemStore;

// ============================================================================
// RECORDING STORE
// ============================================================================

/// Store methods tracked by [`RecordingWatchedItemStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreCall {
    IsWatched,
    IsTempWatched,
    AddWatch,
    RemoveWatch,
    GetWatchedItem,
    ResetNotificationTimestamp,
    ResetAllNotificationTimestamps,
}

/// Arguments of one `reset_notification_timestamp` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetCall {
    pub user: UserIdentity,
    pub target: PageTarget,
    pub force: bool,
    pub old_rev_id: RevisionId,
}

/// Wraps an [`InMemoryWatchedItemStore`] and counts every call.
#[derive(Debug)]
pub struct RecordingWatchedItemStore {
    inner: Arc<InMemoryWatchedItemStore>,
    calls: Mutex<HashMap<StoreCall, usize>>,
    resets: Mutex<Vec<ResetCall>>,
}

impl RecordingWatchedItemStore {
    pub fn new(inner: Arc<InMemoryWatchedItemStore>) -> Self {
        Self {
            inner,
            calls: Mutex::default(),
            resets: Mutex::default(),
        }
    }

    pub fn inner(&self) -> &InMemoryWatchedItemStore {
        &self.inner
    }

    pub fn calls(&self, call: StoreCall) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&call)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .sum()
    }

    /// Arguments of every `reset_notification_timestamp` call, in order.
    pub fn reset_calls(&self) -> Vec<ResetCall> {
        self.resets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, call: StoreCall) {
        *self
            .calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(call)
            .or_insert(0) += 1;
    }
}

impl WatchedItemStore for RecordingWatchedItemStore {
    fn is_watched(&self, user: &UserIdentity, target: &PageTarget) -> WatchlistResult<bool> {
        self.record(StoreCall::IsWatched);
        self.inner.is_watched(user, target)
    }

    fn is_temp_watched(&self, user: &UserIdentity, target: &PageTarget) -> WatchlistResult<bool> {
        self.record(StoreCall::IsTempWatched);
        self.inner.is_temp_watched(user, target)
    }

    fn add_watch(
        &self,
        user: &UserIdentity,
        target: &PageTarget,
        expiry: Option<&str>,
    ) -> WatchlistResult<bool> {
        self.record(StoreCall::AddWatch);
        self.inner.add_watch(user, target, expiry)
    }

    fn remove_watch(&self, user: &UserIdentity, target: &PageTarget) -> WatchlistResult<bool> {
        self.record(StoreCall::RemoveWatch);
        self.inner.remove_watch(user, target)
    }

    fn get_watched_item(
        &self,
        user: &UserIdentity,
        target: &PageTarget,
    ) -> WatchlistResult<Option<WatchedItem>> {
        self.record(StoreCall::GetWatchedItem);
        self.inner.get_watched_item(user, target)
    }

    fn reset_notification_timestamp(
        &self,
        user: &UserIdentity,
        target: &PageTarget,
        force: bool,
        old_rev_id: RevisionId,
    ) -> WatchlistResult<bool> {
        self.record(StoreCall::ResetNotificationTimestamp);
        self.resets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ResetCall {
                user: user.clone(),
                target: target.clone(),
                force,
                old_rev_id,
            });
        self.inner
            .reset_notification_timestamp(user, target, force, old_rev_id)
    }

    fn reset_all_notification_timestamps_for_user(&self, user: &UserIdentity) -> WatchlistResult<()> {
        self.record(StoreCall::ResetAllNotificationTimestamps);
        self.inner.reset_all_notification_timestamps_for_user(user)
    }
}

// ============================================================================
// HARNESS
// ============================================================================

/// Every in-memory collaborator, shared through `Arc`s so tests can inspect
/// them after driving a manager.
#[derive(Debug, Clone)]
pub struct TestHarness {
    pub store: Arc<RecordingWatchedItemStore>,
    pub talk_notifications: Arc<InMemoryTalkPageNotifications>,
    pub revisions: Arc<InMemoryRevisionStore>,
    pub namespaces: Arc<StandardNamespacePolicy>,
    pub read_only: Arc<StaticReadOnlyMode>,
    pub user_cache: Arc<UserTouchTracker>,
    pub hooks: Arc<HookRegistry>,
    pub deferred: Arc<DeferredUpdateQueue>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_namespace_policy(StandardNamespacePolicy::new())
    }

    pub fn with_namespace_policy(namespaces: StandardNamespacePolicy) -> Self {
        let revisions = Arc::new(InMemoryRevisionStore::new());
        let inner = Arc::new(InMemoryWatchedItemStore::with_revision_lookup(revisions.clone()));
        Self {
            store: Arc::new(RecordingWatchedItemStore::new(inner)),
            talk_notifications: Arc::new(InMemoryTalkPageNotifications::new()),
            revisions,
            namespaces: Arc::new(namespaces),
            read_only: Arc::new(StaticReadOnlyMode::writable()),
            user_cache: Arc::new(UserTouchTracker::new()),
            hooks: Arc::new(HookRegistry::new()),
            deferred: Arc::new(DeferredUpdateQueue::new()),
        }
    }

    /// Save a revision of `page` stamped now.
    pub fn save_revision(&self, page: &PageTarget) -> WatchlistResult<RevisionRecord> {
        self.revisions.append(page.clone(), chrono::Utc::now())
    }

    /// Record an edit to `page` by `editor`, notifying other watchers.
    pub fn edit_page(&self, editor: &UserIdentity, page: &PageTarget) -> WatchlistResult<RevisionRecord> {
        let revision = self.save_revision(page)?;
        self.store
            .inner()
            .update_notification_timestamp(editor, page, revision.timestamp)?;
        Ok(revision)
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub fn alice() -> UserIdentity {
    UserIdentity::new(1, "Alice")
}

pub fn bob() -> UserIdentity {
    UserIdentity::new(2, "Bob")
}

pub fn anonymous() -> UserIdentity {
    UserIdentity::anonymous("192.0.2.1")
}

pub fn article(title: &str) -> PageTarget {
    PageTarget::new(Namespace::MAIN, title)
}

pub fn article_talk(title: &str) -> PageTarget {
    PageTarget::new(Namespace::TALK, title)
}

pub fn user_talk(user: &UserIdentity) -> PageTarget {
    PageTarget::new(Namespace::USER_TALK, &user.name)
}

pub fn special(title: &str) -> PageTarget {
    PageTarget::new(Namespace::SPECIAL, title)
}

/// Performer holding every watchlist capability.
pub fn full_rights(user: UserIdentity) -> UserAuthority {
    UserAuthority::with_all_rights(user)
}

/// Performer holding no capability.
pub fn no_rights(user: UserIdentity) -> UserAuthority {
    UserAuthority::without_rights(user)
}

// ============================================================================
// GENERATORS
// ============================================================================

pub mod generators {
    use super::*;
    use proptest::prelude::*;

    /// Any namespace, virtual ones included.
    pub fn namespace() -> impl Strategy<Value = Namespace> {
        (-2i32..16).prop_map(Namespace)
    }

    /// Real (non-virtual) namespaces.
    pub fn real_namespace() -> impl Strategy<Value = Namespace> {
        (0i32..16).prop_map(Namespace)
    }

    pub fn virtual_namespace() -> impl Strategy<Value = Namespace> {
        prop_oneof![Just(Namespace::MEDIA), Just(Namespace::SPECIAL)]
    }

    pub fn title() -> impl Strategy<Value = String> {
        "[A-Z][a-z]{0,8}( [A-Za-z0-9]{1,6}){0,2}"
    }

    /// Local pages that can exist.
    pub fn existing_page() -> impl Strategy<Value = PageTarget> {
        (real_namespace(), title()).prop_map(|(ns, t)| PageTarget::new(ns, t))
    }

    /// Any page target, including virtual, empty and interwiki ones.
    pub fn any_page() -> impl Strategy<Value = PageTarget> {
        prop_oneof![
            4 => existing_page(),
            1 => (virtual_namespace(), title()).prop_map(|(ns, t)| PageTarget::new(ns, t)),
            1 => namespace().prop_map(|ns| PageTarget::new(ns, "")),
            1 => (namespace(), title()).prop_map(|(ns, t)| PageTarget::interwiki("en", ns, t)),
        ]
    }

    pub fn registered_user() -> impl Strategy<Value = UserIdentity> {
        (1u64..10_000, "[A-Z][a-z]{2,10}").prop_map(|(id, name)| UserIdentity::new(id, name))
    }

    pub fn capabilities() -> impl Strategy<Value = Vec<Capability>> {
        (any::<bool>(), any::<bool>()).prop_map(|(edit, view)| {
            let mut caps = Vec::new();
            if edit {
                caps.push(Capability::EditWatchlist);
            }
            if view {
                caps.push(Capability::ViewWatchlist);
            }
            caps
        })
    }

    pub fn config() -> impl Strategy<Value = WatchlistConfig> {
        (any::<bool>(), any::<bool>()).prop_map(|(email, marker)| {
            WatchlistConfig::new()
                .with_email_notification(email)
                .with_updated_marker(marker)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_store_counts_calls() {
        let harness = TestHarness::new();
        harness.store.add_watch(&alice(), &article("Foo"), None).unwrap();
        harness.store.is_watched(&alice(), &article("Foo")).unwrap();
        harness.store.is_watched(&alice(), &article("Bar")).unwrap();

        assert_eq!(harness.store.calls(StoreCall::AddWatch), 1);
        assert_eq!(harness.store.calls(StoreCall::IsWatched), 2);
        assert_eq!(harness.store.calls(StoreCall::RemoveWatch), 0);
        assert_eq!(harness.store.total_calls(), 3);
    }

    #[test]
    fn test_edit_page_notifies_other_watchers() {
        let harness = TestHarness::new();
        harness.store.inner().add_watch(&bob(), &article("Foo"), None).unwrap();

        let rev = harness.edit_page(&alice(), &article("Foo")).unwrap();

        let item = harness
            .store
            .inner()
            .get_watched_item(&bob(), &article("Foo"))
            .unwrap()
            .unwrap();
        assert_eq!(item.notification_timestamp, Some(rev.timestamp));
    }

    #[test]
    fn test_reset_calls_are_recorded() {
        let harness = TestHarness::new();
        harness
            .store
            .reset_notification_timestamp(&alice(), &article("Foo"), true, RevisionId(3))
            .unwrap();
        assert_eq!(
            harness.store.reset_calls(),
            vec![ResetCall {
                user: alice(),
                target: article("Foo"),
                force: true,
                old_rev_id: RevisionId(3),
            }]
        );
    }
}
