//! User "last touched" markers.

use crate::{read_lock, write_lock, UserCacheInvalidator};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::RwLock;
use watchlist_core::{Timestamp, UserId, UserIdentity, WatchlistResult};

#[derive(Debug, Clone, Copy)]
struct Touch {
    at: Timestamp,
    count: u64,
}

/// [`UserCacheInvalidator`] that records when each user was last touched.
#[derive(Debug, Default)]
pub struct UserTouchTracker {
    touches: RwLock<HashMap<UserId, Touch>>,
}

impl UserTouchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn touched_at(&self, user: &UserIdentity) -> WatchlistResult<Option<Timestamp>> {
        Ok(read_lock(&self.touches)?.get(&user.id).map(|t| t.at))
    }

    /// How many times the marker of `user` was invalidated.
    pub fn touch_count(&self, user: &UserIdentity) -> WatchlistResult<u64> {
        Ok(read_lock(&self.touches)?
            .get(&user.id)
            .map_or(0, |t| t.count))
    }
}

impl UserCacheInvalidator for UserTouchTracker {
    fn invalidate_cache(&self, user: &UserIdentity) -> WatchlistResult<()> {
        if !user.is_registered() {
            return Ok(());
        }
        let mut touches = write_lock(&self.touches)?;
        let touch = touches.entry(user.id).or_insert(Touch {
            at: Utc::now(),
            count: 0,
        });
        touch.at = Utc::now();
        touch.count += 1;
        Ok(())
    }
}
