//! In-memory watched-item store.

use crate::expiry::{parse_expiry, ParsedExpiry};
use crate::{read_lock, write_lock, RevisionLookup, WatchedItemStore};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use watchlist_core::{
    Namespace, PageTarget, ReadConsistency, RevisionId, Timestamp, UserId, UserIdentity,
    WatchedItem, WatchlistResult,
};

type ItemKey = (UserId, Namespace, String);

fn item_key(user: &UserIdentity, target: &PageTarget) -> ItemKey {
    (user.id, target.namespace, target.db_key.clone())
}

/// In-memory [`WatchedItemStore`].
///
/// Expired temporary watches read as unwatched and are dropped on the next
/// write that touches them. Anonymous users never get items.
#[derive(Default)]
pub struct InMemoryWatchedItemStore {
    items: RwLock<HashMap<ItemKey, WatchedItem>>,
    revisions: Option<Arc<dyn RevisionLookup>>,
}

impl std::fmt::Debug for InMemoryWatchedItemStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryWatchedItemStore")
            .field("items", &self.items)
            .field("has_revision_lookup", &self.revisions.is_some())
            .finish()
    }
}

impl InMemoryWatchedItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `revisions` to keep later unseen changes when a page is marked as
    /// seen up to an older revision.
    pub fn with_revision_lookup(revisions: Arc<dyn RevisionLookup>) -> Self {
        Self {
            items: RwLock::default(),
            revisions: Some(revisions),
        }
    }

    /// Insert or replace a record as-is.
    pub fn insert_item(&self, item: WatchedItem) -> WatchlistResult<()> {
        let key = item_key(&item.user, &item.target);
        write_lock(&self.items)?.insert(key, item);
        Ok(())
    }

    /// Record an edit by `editor` at `timestamp`: every other watcher that
    /// has seen the page so far now has an unseen change.
    ///
    /// Returns the ids of the users whose state changed.
    pub fn update_notification_timestamp(
        &self,
        editor: &UserIdentity,
        target: &PageTarget,
        timestamp: Timestamp,
    ) -> WatchlistResult<Vec<UserId>> {
        let now = Utc::now();
        let mut items = write_lock(&self.items)?;
        let mut notified: Vec<UserId> = items
            .values_mut()
            .filter(|item| {
                item.target.namespace == target.namespace
                    && item.target.db_key == target.db_key
                    && item.user.id != editor.id
                    && item.notification_timestamp.is_none()
                    && !item.is_expired(now)
            })
            .map(|item| {
                item.notification_timestamp = Some(timestamp);
                item.user.id
            })
            .collect();
        notified.sort();
        Ok(notified)
    }

    /// All live items of `user`, ordered by namespace and title.
    pub fn items_for_user(&self, user: &UserIdentity) -> WatchlistResult<Vec<WatchedItem>> {
        let now = Utc::now();
        let items = read_lock(&self.items)?;
        let mut result: Vec<WatchedItem> = items
            .values()
            .filter(|item| item.user.id == user.id && !item.is_expired(now))
            .cloned()
            .collect();
        result.sort_by(|a, b| {
            (a.target.namespace, &a.target.db_key).cmp(&(b.target.namespace, &b.target.db_key))
        });
        Ok(result)
    }

    /// Number of stored records, expired ones included.
    pub fn item_count(&self) -> WatchlistResult<usize> {
        Ok(read_lock(&self.items)?.len())
    }

    pub fn clear(&self) -> WatchlistResult<()> {
        write_lock(&self.items)?.clear();
        Ok(())
    }

    fn live_item(&self, user: &UserIdentity, target: &PageTarget) -> WatchlistResult<Option<WatchedItem>> {
        let items = read_lock(&self.items)?;
        Ok(items
            .get(&item_key(user, target))
            .filter(|item| !item.is_expired(Utc::now()))
            .cloned())
    }

    /// Notification timestamp to keep after the user has seen `old_rev_id`.
    fn timestamp_after_view(&self, old_rev_id: RevisionId) -> WatchlistResult<Option<Timestamp>> {
        let Some(revisions) = &self.revisions else {
            return Ok(None);
        };
        if old_rev_id.is_none() {
            return Ok(None);
        }
        let Some(old) = revisions.get_revision_by_id(old_rev_id, ReadConsistency::Latest)? else {
            return Ok(None);
        };
        Ok(revisions.get_next_revision(&old)?.map(|next| next.timestamp))
    }
}

impl WatchedItemStore for InMemoryWatchedItemStore {
    fn is_watched(&self, user: &UserIdentity, target: &PageTarget) -> WatchlistResult<bool> {
        Ok(self.live_item(user, target)?.is_some())
    }

    fn is_temp_watched(&self, user: &UserIdentity, target: &PageTarget) -> WatchlistResult<bool> {
        Ok(self
            .live_item(user, target)?
            .is_some_and(|item| item.is_temporary()))
    }

    fn add_watch(
        &self,
        user: &UserIdentity,
        target: &PageTarget,
        expiry: Option<&str>,
    ) -> WatchlistResult<bool> {
        if !user.is_registered() {
            return Ok(false);
        }
        let now = Utc::now();
        let parsed = expiry.map(|value| parse_expiry(value, now)).transpose()?;

        let mut items = write_lock(&self.items)?;
        let key = item_key(user, target);
        if items.get(&key).is_some_and(|item| item.is_expired(now)) {
            items.remove(&key);
        }
        let item = items
            .entry(key)
            .or_insert_with(|| WatchedItem::new(user.clone(), target.clone()));
        match parsed {
            Some(ParsedExpiry::Infinite) => item.expiry = None,
            Some(ParsedExpiry::At(at)) => item.expiry = Some(at),
            None => {}
        }
        tracing::trace!(user = %user.id, page = %target, expiry = ?item.expiry, "watch stored");
        Ok(true)
    }

    fn remove_watch(&self, user: &UserIdentity, target: &PageTarget) -> WatchlistResult<bool> {
        if !user.is_registered() {
            return Ok(false);
        }
        let removed = write_lock(&self.items)?.remove(&item_key(user, target));
        Ok(removed.is_some_and(|item| !item.is_expired(Utc::now())))
    }

    fn get_watched_item(
        &self,
        user: &UserIdentity,
        target: &PageTarget,
    ) -> WatchlistResult<Option<WatchedItem>> {
        if !user.is_registered() {
            return Ok(None);
        }
        self.live_item(user, target)
    }

    fn reset_notification_timestamp(
        &self,
        user: &UserIdentity,
        target: &PageTarget,
        force: bool,
        old_rev_id: RevisionId,
    ) -> WatchlistResult<bool> {
        if !user.is_registered() {
            return Ok(false);
        }
        if !force {
            match self.live_item(user, target)? {
                Some(item) if item.notification_timestamp.is_some() => {}
                _ => return Ok(false),
            }
        }

        let new_timestamp = self.timestamp_after_view(old_rev_id)?;
        let now = Utc::now();
        let mut items = write_lock(&self.items)?;
        match items.get_mut(&item_key(user, target)) {
            Some(item) if !item.is_expired(now) => {
                item.notification_timestamp = new_timestamp;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn reset_all_notification_timestamps_for_user(&self, user: &UserIdentity) -> WatchlistResult<()> {
        if !user.is_registered() {
            return Ok(());
        }
        let mut items = write_lock(&self.items)?;
        for item in items.values_mut().filter(|item| item.user.id == user.id) {
            item.notification_timestamp = None;
        }
        Ok(())
    }
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Watch state after a sequence of adds/removes matches the last operation per page.
        #[test]
        fn prop_last_write_wins(ops in prop::collection::vec((any::<bool>(), 0usize..4), 1..30)) {
            let store = InMemoryWatchedItemStore::new();
            let user = UserIdentity::new(1, "Alice");
            let titles = ["A", "B", "C", "D"];
            let mut expected = [false; 4];

            for (add, idx) in ops {
                let target = PageTarget::new(Namespace::MAIN, titles[idx]);
                if add {
                    store.add_watch(&user, &target, None).unwrap();
                } else {
                    store.remove_watch(&user, &target).unwrap();
                }
                expected[idx] = add;
            }

            for (idx, title) in titles.iter().enumerate() {
                let target = PageTarget::new(Namespace::MAIN, *title);
                prop_assert_eq!(store.is_watched(&user, &target).unwrap(), expected[idx]);
            }
        }
    }
}
