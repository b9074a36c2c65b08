//! Watched items and the notification-timestamp tri-state.

use crate::{PageTarget, Timestamp, UserIdentity};
use serde::{Deserialize, Serialize};

/// A (user, page) watch relationship as stored by the watched-item store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchedItem {
    pub user: UserIdentity,
    pub target: PageTarget,
    /// Time of the first change the user has not seen, if any.
    pub notification_timestamp: Option<Timestamp>,
    /// When the watch lapses. `None` is a permanent watch.
    pub expiry: Option<Timestamp>,
}

impl WatchedItem {
    pub fn new(user: UserIdentity, target: PageTarget) -> Self {
        Self {
            user,
            target,
            notification_timestamp: None,
            expiry: None,
        }
    }

    pub fn with_expiry(mut self, expiry: Option<Timestamp>) -> Self {
        self.expiry = expiry;
        self
    }

    pub fn with_notification_timestamp(mut self, ts: Option<Timestamp>) -> Self {
        self.notification_timestamp = ts;
        self
    }

    pub fn is_temporary(&self) -> bool {
        self.expiry.is_some()
    }

    /// A temporary watch is expired once its expiry is at or before `now`.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        matches!(self.expiry, Some(expiry) if expiry <= now)
    }

    /// Notification state this record implies.
    pub fn notification_state(&self) -> NotificationTimestamp {
        match self.notification_timestamp {
            Some(ts) => NotificationTimestamp::Unseen(ts),
            None => NotificationTimestamp::Seen,
        }
    }
}

/// Per-(user, page) notification state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "since", rename_all = "snake_case")]
pub enum NotificationTimestamp {
    /// The page is not watched, or the user has no registered identity.
    NotWatched,
    /// Watched, and nothing unseen.
    Seen,
    /// Watched, with unseen changes since the given time.
    Unseen(Timestamp),
}

impl NotificationTimestamp {
    pub fn is_watched(&self) -> bool {
        !matches!(self, NotificationTimestamp::NotWatched)
    }

    pub fn has_unseen_changes(&self) -> bool {
        matches!(self, NotificationTimestamp::Unseen(_))
    }

    pub fn unseen_since(&self) -> Option<Timestamp> {
        match self {
            NotificationTimestamp::Unseen(ts) => Some(*ts),
            _ => None,
        }
    }
}
