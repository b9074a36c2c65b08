//! The watchlist manager.

use crate::cache::{NotificationCacheKey, NotificationCacheStats, NotificationTimestampCache};
use std::sync::Arc;
use watchlist_core::{
    to_text, Authority, Capability, Namespace, NotificationTimestamp, PageTarget, ReadConsistency,
    RevisionId, UserIdentity, WatchlistConfig, WatchlistResult,
};
use watchlist_events::{DeferredUpdate, DeferredUpdateSink, HookRunner};
use watchlist_storage::{
    NamespacePolicy, ReadOnlyMode, RevisionLookup, TalkPageNotificationManager,
    UserCacheInvalidator, WatchedItemStore,
};

/// Collaborators the manager delegates to.
#[derive(Clone)]
pub struct WatchlistServices {
    pub store: Arc<dyn WatchedItemStore>,
    pub talk_notifications: Arc<dyn TalkPageNotificationManager>,
    pub revisions: Arc<dyn RevisionLookup>,
    pub namespaces: Arc<dyn NamespacePolicy>,
    pub read_only: Arc<dyn ReadOnlyMode>,
    pub user_cache: Arc<dyn UserCacheInvalidator>,
    pub hooks: Arc<dyn HookRunner>,
    pub deferred: Arc<dyn DeferredUpdateSink>,
}

/// Permission-gated access to per-(user, page) watch and notification state.
///
/// Construct one per request. Denied capabilities and read-only mode make
/// operations silent no-ops; collaborator errors propagate unchanged.
pub struct WatchlistManager {
    config: WatchlistConfig,
    services: WatchlistServices,
    notification_cache: NotificationTimestampCache,
}

impl WatchlistManager {
    pub fn new(config: WatchlistConfig, services: WatchlistServices) -> Self {
        Self {
            config,
            services,
            notification_cache: NotificationTimestampCache::new(),
        }
    }

    pub fn config(&self) -> &WatchlistConfig {
        &self.config
    }

    pub fn notification_cache_stats(&self) -> NotificationCacheStats {
        self.notification_cache.stats()
    }

    // ------------------------------------------------------------------
    // Watch state
    // ------------------------------------------------------------------

    /// Whether `target` is in a watchable namespace and can be a real page.
    pub fn is_watchable(&self, target: &PageTarget) -> bool {
        self.services.namespaces.is_watchable(target.namespace) && target.can_exist()
    }

    /// Watch check without a permission check; the caller has authorized access.
    pub fn is_watched_ignoring_rights(
        &self,
        user: &UserIdentity,
        target: &PageTarget,
    ) -> WatchlistResult<bool> {
        if !self.is_watchable(target) {
            return Ok(false);
        }
        self.services.store.is_watched(user, target)
    }

    /// Watch check for the performer's own watchlist. `false` without `view-watchlist`.
    pub fn is_watched(&self, performer: &dyn Authority, target: &PageTarget) -> WatchlistResult<bool> {
        if !self.allows(performer, Capability::ViewWatchlist) {
            return Ok(false);
        }
        self.is_watched_ignoring_rights(performer.user(), target)
    }

    pub fn is_temp_watched_ignoring_rights(
        &self,
        user: &UserIdentity,
        target: &PageTarget,
    ) -> WatchlistResult<bool> {
        if !self.is_watchable(target) {
            return Ok(false);
        }
        self.services.store.is_temp_watched(user, target)
    }

    pub fn is_temp_watched(
        &self,
        performer: &dyn Authority,
        target: &PageTarget,
    ) -> WatchlistResult<bool> {
        if !self.allows(performer, Capability::ViewWatchlist) {
            return Ok(false);
        }
        self.is_temp_watched_ignoring_rights(performer.user(), target)
    }

    /// Watch `target` and its subject/talk counterpart.
    ///
    /// `expiry` is passed to the store untouched. `None` keeps an existing
    /// expiry and adds no new one.
    pub fn add_watch_ignoring_rights(
        &self,
        user: &UserIdentity,
        target: &PageTarget,
        expiry: Option<&str>,
    ) -> WatchlistResult<()> {
        if !self.writable("add_watch") || !self.watchable_or_log(target) {
            return Ok(());
        }
        for page in self.watch_pair(target) {
            self.services.store.add_watch(user, &page, expiry)?;
        }
        tracing::debug!(user = %user.name, page = %target, expiry = ?expiry, "watch added");
        self.services.user_cache.invalidate_cache(user)
    }

    /// [`Self::add_watch_ignoring_rights`] gated on `edit-watchlist`.
    pub fn add_watch(
        &self,
        performer: &dyn Authority,
        target: &PageTarget,
        expiry: Option<&str>,
    ) -> WatchlistResult<()> {
        if !self.allows(performer, Capability::EditWatchlist) {
            return Ok(());
        }
        self.add_watch_ignoring_rights(performer.user(), target, expiry)
    }

    /// Unwatch `target` and its subject/talk counterpart.
    pub fn remove_watch_ignoring_rights(
        &self,
        user: &UserIdentity,
        target: &PageTarget,
    ) -> WatchlistResult<()> {
        if !self.writable("remove_watch") || !self.watchable_or_log(target) {
            return Ok(());
        }
        for page in self.watch_pair(target) {
            self.services.store.remove_watch(user, &page)?;
        }
        tracing::debug!(user = %user.name, page = %target, "watch removed");
        self.services.user_cache.invalidate_cache(user)
    }

    /// [`Self::remove_watch_ignoring_rights`] gated on `edit-watchlist`.
    pub fn remove_watch(&self, performer: &dyn Authority, target: &PageTarget) -> WatchlistResult<()> {
        if !self.allows(performer, Capability::EditWatchlist) {
            return Ok(());
        }
        self.remove_watch_ignoring_rights(performer.user(), target)
    }

    /// Bring the watch state of `target` in line with `watch`.
    ///
    /// Watching an already watched page only writes when a new expiry is
    /// given; unwatching an unwatched page writes nothing.
    pub fn set_watch_ignoring_rights(
        &self,
        watch: bool,
        user: &UserIdentity,
        target: &PageTarget,
        expiry: Option<&str>,
    ) -> WatchlistResult<()> {
        let currently_watched = self.is_watched_ignoring_rights(user, target)?;
        if watch && (!currently_watched || expiry.is_some()) {
            self.add_watch_ignoring_rights(user, target, expiry)
        } else if !watch && currently_watched {
            self.remove_watch_ignoring_rights(user, target)
        } else {
            Ok(())
        }
    }

    /// [`Self::set_watch_ignoring_rights`] gated on `edit-watchlist`.
    pub fn set_watch(
        &self,
        watch: bool,
        performer: &dyn Authority,
        target: &PageTarget,
        expiry: Option<&str>,
    ) -> WatchlistResult<()> {
        if !self.allows(performer, Capability::EditWatchlist) {
            return Ok(());
        }
        self.set_watch_ignoring_rights(watch, performer.user(), target, expiry)
    }

    // ------------------------------------------------------------------
    // Notification timestamps
    // ------------------------------------------------------------------

    /// Notification state of `title` for `user`, memoized for the lifetime
    /// of this manager.
    pub fn get_title_notification_timestamp(
        &self,
        user: &UserIdentity,
        title: &PageTarget,
    ) -> WatchlistResult<NotificationTimestamp> {
        if !user.is_registered() {
            return Ok(NotificationTimestamp::NotWatched);
        }

        let key = NotificationCacheKey::new(user, title);
        if let Some(cached) = self.notification_cache.get(&key) {
            tracing::trace!(user = %user.id, page = %title, "notification timestamp cache hit");
            return Ok(cached);
        }

        let value = match self.services.store.get_watched_item(user, title)? {
            Some(item) => item.notification_state(),
            None => NotificationTimestamp::NotWatched,
        };
        Ok(self.notification_cache.insert(key, value))
    }

    /// Mark every watched page of the performer as seen.
    pub fn clear_all_user_notifications(&self, performer: &dyn Authority) -> WatchlistResult<()> {
        if !self.writable("clear_all_user_notifications") {
            return Ok(());
        }
        if !self.allows(performer, Capability::EditWatchlist) {
            return Ok(());
        }
        let user = performer.user();

        if !self.config.notifications_enabled() {
            return self.services.talk_notifications.remove_user_has_new_messages(user);
        }
        if !user.is_registered() {
            tracing::debug!(user = %user.name, "anonymous user has no watchlist to clear");
            return Ok(());
        }
        self.services.store.reset_all_notification_timestamps_for_user(user)
    }

    /// Mark `title` as seen by the performer up to `old_revision_id`.
    ///
    /// Viewing one's own talk page also clears the "new messages" flag after
    /// the response, unless a `UserClearNewTalkNotification` handler aborts.
    pub fn clear_title_user_notifications(
        &self,
        performer: &dyn Authority,
        title: &PageTarget,
        old_revision_id: RevisionId,
    ) -> WatchlistResult<()> {
        if !self.writable("clear_title_user_notifications") {
            return Ok(());
        }
        if !self.allows(performer, Capability::EditWatchlist) {
            return Ok(());
        }
        let user = performer.user();
        let is_user_talk_page = is_own_talk_page(user, title);

        if is_user_talk_page {
            if self
                .services
                .hooks
                .on_user_clear_new_talk_notification(user, old_revision_id)
                .is_abort()
            {
                tracing::debug!(user = %user.name, "talk page notification clear aborted by hook");
                return Ok(());
            }
            self.services
                .deferred
                .add_update(self.clear_new_talk_update(user, old_revision_id));
        }

        if !self.config.notifications_enabled() {
            return Ok(());
        }
        if !user.is_registered() {
            tracing::debug!(user = %user.name, "anonymous user has no watched page to reset");
            return Ok(());
        }
        self.services
            .store
            .reset_notification_timestamp(user, title, is_user_talk_page, old_revision_id)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn allows(&self, performer: &dyn Authority, capability: Capability) -> bool {
        let allowed = performer.is_allowed(capability);
        if !allowed {
            tracing::debug!(
                user = %performer.user().name,
                capability = %capability,
                "capability missing, skipping watchlist operation"
            );
        }
        allowed
    }

    fn writable(&self, operation: &'static str) -> bool {
        if self.services.read_only.is_read_only() {
            tracing::debug!(
                operation,
                reason = ?self.services.read_only.reason(),
                "read-only mode, skipping watchlist write"
            );
            return false;
        }
        true
    }

    fn watchable_or_log(&self, target: &PageTarget) -> bool {
        let watchable = self.is_watchable(target);
        if !watchable {
            tracing::debug!(page = %target, "page is not watchable, skipping watchlist write");
        }
        watchable
    }

    /// Subject page of `target` plus its talk page when one applies.
    fn watch_pair(&self, target: &PageTarget) -> Vec<PageTarget> {
        let namespaces = &self.services.namespaces;
        let subject = namespaces.subject_page(target);
        let talk = if namespaces.can_have_talk_page(target) {
            namespaces.talk_page(&subject)
        } else {
            None
        };
        std::iter::once(subject).chain(talk).collect()
    }

    /// Deferred clear of the "new messages" flag after `user` viewed their
    /// talk page at `old_revision_id`.
    ///
    /// A newer talk page edit may land before this runs; its successor
    /// revision then becomes the new anchor of the flag.
    fn clear_new_talk_update(&self, user: &UserIdentity, old_revision_id: RevisionId) -> DeferredUpdate {
        let talk_notifications = Arc::clone(&self.services.talk_notifications);
        let revisions = Arc::clone(&self.services.revisions);
        let user = user.clone();

        DeferredUpdate::new("clear-new-talk-notification", move || {
            if !talk_notifications.user_has_new_messages(&user)? {
                return Ok(());
            }
            talk_notifications.remove_user_has_new_messages(&user)?;

            if old_revision_id.is_none() {
                return Ok(());
            }
            let Some(old) = revisions.get_revision_by_id(old_revision_id, ReadConsistency::Latest)?
            else {
                return Ok(());
            };
            if let Some(next) = revisions.get_next_revision(&old)? {
                tracing::debug!(
                    user = %user.name,
                    revision = %next.id,
                    "newer talk page revision pending, keeping new messages flag"
                );
                talk_notifications.set_user_has_new_messages(&user, Some(&next))?;
            }
            Ok(())
        })
    }
}

/// Whether `title` is the user talk page of `user`.
fn is_own_talk_page(user: &UserIdentity, title: &PageTarget) -> bool {
    title.namespace == Namespace::USER_TALK && title.text() == to_text(&user.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_own_talk_page_matches_after_normalization() {
        let user = UserIdentity::new(1, "Alice Smith");
        assert!(is_own_talk_page(
            &user,
            &PageTarget::new(Namespace::USER_TALK, "Alice_Smith")
        ));
        assert!(is_own_talk_page(
            &UserIdentity::new(1, "Alice_Smith"),
            &PageTarget::new(Namespace::USER_TALK, "Alice Smith")
        ));
    }

    #[test]
    fn test_other_pages_are_not_own_talk_page() {
        let user = UserIdentity::new(1, "Alice");
        assert!(!is_own_talk_page(&user, &PageTarget::new(Namespace::USER, "Alice")));
        assert!(!is_own_talk_page(&user, &PageTarget::new(Namespace::USER_TALK, "Bob")));
        assert!(!is_own_talk_page(&user, &PageTarget::new(Namespace::TALK, "Alice")));
    }
}
