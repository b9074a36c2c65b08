//! In-memory revision history.

use crate::{read_lock, write_lock, RevisionLookup};
use std::collections::BTreeMap;
use std::sync::RwLock;
use watchlist_core::{
    PageTarget, ReadConsistency, RevisionId, RevisionRecord, Timestamp, WatchlistResult,
};

/// Append-only revision store. Ids are assigned in save order starting at 1.
#[derive(Debug, Default)]
pub struct InMemoryRevisionStore {
    revisions: RwLock<BTreeMap<RevisionId, RevisionRecord>>,
}

impl InMemoryRevisionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Save a new revision of `page`.
    pub fn append(&self, page: PageTarget, timestamp: Timestamp) -> WatchlistResult<RevisionRecord> {
        let mut revisions = write_lock(&self.revisions)?;
        let next_id = revisions
            .keys()
            .next_back()
            .map_or(RevisionId(1), |last| RevisionId(last.0 + 1));
        let record = RevisionRecord {
            id: next_id,
            page,
            timestamp,
        };
        revisions.insert(next_id, record.clone());
        Ok(record)
    }

    /// Most recent revision of `page`.
    pub fn latest_for_page(&self, page: &PageTarget) -> WatchlistResult<Option<RevisionRecord>> {
        let revisions = read_lock(&self.revisions)?;
        Ok(revisions.values().rev().find(|r| &r.page == page).cloned())
    }

    pub fn len(&self) -> WatchlistResult<usize> {
        Ok(read_lock(&self.revisions)?.len())
    }

    pub fn is_empty(&self) -> WatchlistResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl RevisionLookup for InMemoryRevisionStore {
    fn get_revision_by_id(
        &self,
        id: RevisionId,
        _consistency: ReadConsistency,
    ) -> WatchlistResult<Option<RevisionRecord>> {
        Ok(read_lock(&self.revisions)?.get(&id).cloned())
    }

    fn get_next_revision(&self, revision: &RevisionRecord) -> WatchlistResult<Option<RevisionRecord>> {
        let revisions = read_lock(&self.revisions)?;
        Ok(revisions
            .range(RevisionId(revision.id.0.saturating_add(1))..)
            .map(|(_, r)| r)
            .find(|r| r.page == revision.page)
            .cloned())
    }
}
