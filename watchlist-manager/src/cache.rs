//! Request-scoped memoization of notification timestamps.
//!
//! Entries are written once and never refreshed or evicted. The cache lives
//! exactly as long as the manager that owns it, so staleness is bounded by
//! one logical request.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use watchlist_core::{Namespace, NotificationTimestamp, PageTarget, UserId, UserIdentity};

/// Cache key for one (user, page) pair.
///
/// Only constructible from a user and a page, so a key always names both.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NotificationCacheKey {
    inner: KeyInner,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct KeyInner {
    user_id: UserId,
    namespace: Namespace,
    db_key: String,
}

impl NotificationCacheKey {
    pub fn new(user: &UserIdentity, target: &PageTarget) -> Self {
        Self {
            inner: KeyInner {
                user_id: user.id,
                namespace: target.namespace,
                db_key: target.db_key.clone(),
            },
        }
    }

    pub fn user_id(&self) -> UserId {
        self.inner.user_id
    }

    pub fn namespace(&self) -> Namespace {
        self.inner.namespace
    }

    pub fn db_key(&self) -> &str {
        &self.inner.db_key
    }
}

/// Hit/miss counters of a [`NotificationTimestampCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotificationCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entry_count: u64,
}

impl NotificationCacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Single-threaded memo of resolved notification states.
///
/// A missing entry means "never computed"; a stored
/// [`NotificationTimestamp::NotWatched`] or [`NotificationTimestamp::Seen`]
/// is a hit like any other value.
#[derive(Debug, Default)]
pub struct NotificationTimestampCache {
    entries: RefCell<HashMap<NotificationCacheKey, NotificationTimestamp>>,
    hits: Cell<u64>,
    misses: Cell<u64>,
}

impl NotificationTimestampCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up `key`, counting the hit or miss.
    pub fn get(&self, key: &NotificationCacheKey) -> Option<NotificationTimestamp> {
        let found = self.entries.borrow().get(key).copied();
        match found {
            Some(_) => self.hits.set(self.hits.get() + 1),
            None => self.misses.set(self.misses.get() + 1),
        }
        found
    }

    /// Store the first value computed for `key`. Later inserts for the same
    /// key keep the original value, which is returned.
    pub fn insert(&self, key: NotificationCacheKey, value: NotificationTimestamp) -> NotificationTimestamp {
        *self.entries.borrow_mut().entry(key).or_insert(value)
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn stats(&self) -> NotificationCacheStats {
        NotificationCacheStats {
            hits: self.hits.get(),
            misses: self.misses.get(),
            entry_count: self.len() as u64,
        }
    }
}
