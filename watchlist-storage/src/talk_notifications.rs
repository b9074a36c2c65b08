//! In-memory "new messages" flags for user talk pages.

use crate::{read_lock, write_lock, TalkPageNotificationManager};
use std::collections::HashMap;
use std::sync::RwLock;
use watchlist_core::{RevisionId, RevisionRecord, UserId, UserIdentity, WatchlistResult};

/// Registered users are tracked by id, anonymous ones by name (their IP).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum FlagKey {
    Registered(UserId),
    Anonymous(String),
}

impl From<&UserIdentity> for FlagKey {
    fn from(user: &UserIdentity) -> Self {
        if user.is_registered() {
            FlagKey::Registered(user.id)
        } else {
            FlagKey::Anonymous(user.name.clone())
        }
    }
}

/// In-memory [`TalkPageNotificationManager`].
///
/// Each flag remembers the first unseen talk page revision when one was given.
#[derive(Debug, Default)]
pub struct InMemoryTalkPageNotifications {
    flags: RwLock<HashMap<FlagKey, Option<RevisionId>>>,
}

impl InMemoryTalkPageNotifications {
    pub fn new() -> Self {
        Self::default()
    }

    /// Revision the flag of `user` is anchored to, if the flag is set and anchored.
    pub fn anchor_revision(&self, user: &UserIdentity) -> WatchlistResult<Option<RevisionId>> {
        Ok(read_lock(&self.flags)?
            .get(&FlagKey::from(user))
            .copied()
            .flatten())
    }
}

impl TalkPageNotificationManager for InMemoryTalkPageNotifications {
    fn user_has_new_messages(&self, user: &UserIdentity) -> WatchlistResult<bool> {
        Ok(read_lock(&self.flags)?.contains_key(&FlagKey::from(user)))
    }

    fn set_user_has_new_messages(
        &self,
        user: &UserIdentity,
        revision: Option<&RevisionRecord>,
    ) -> WatchlistResult<()> {
        write_lock(&self.flags)?.insert(FlagKey::from(user), revision.map(|r| r.id));
        Ok(())
    }

    fn remove_user_has_new_messages(&self, user: &UserIdentity) -> WatchlistResult<()> {
        write_lock(&self.flags)?.remove(&FlagKey::from(user));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use watchlist_core::{Namespace, PageTarget};

    #[test]
    fn test_set_and_remove_flag() {
        let tracker = InMemoryTalkPageNotifications::new();
        let alice = UserIdentity::new(1, "Alice");
        assert!(!tracker.user_has_new_messages(&alice).unwrap());

        tracker.set_user_has_new_messages(&alice, None).unwrap();
        assert!(tracker.user_has_new_messages(&alice).unwrap());
        assert_eq!(tracker.anchor_revision(&alice).unwrap(), None);

        tracker.remove_user_has_new_messages(&alice).unwrap();
        assert!(!tracker.user_has_new_messages(&alice).unwrap());
    }

    #[test]
    fn test_flag_remembers_anchor() {
        let tracker = InMemoryTalkPageNotifications::new();
        let alice = UserIdentity::new(1, "Alice");
        let rev = RevisionRecord {
            id: RevisionId(12),
            page: PageTarget::new(Namespace::USER_TALK, "Alice"),
            timestamp: Utc::now(),
        };
        tracker.set_user_has_new_messages(&alice, Some(&rev)).unwrap();
        assert_eq!(tracker.anchor_revision(&alice).unwrap(), Some(RevisionId(12)));
    }

    #[test]
    fn test_anonymous_users_are_tracked_by_name() {
        let tracker = InMemoryTalkPageNotifications::new();
        let a = UserIdentity::anonymous("10.0.0.1");
        let b = UserIdentity::anonymous("10.0.0.2");
        tracker.set_user_has_new_messages(&a, None).unwrap();
        assert!(tracker.user_has_new_messages(&a).unwrap());
        assert!(!tracker.user_has_new_messages(&b).unwrap());
    }
}
