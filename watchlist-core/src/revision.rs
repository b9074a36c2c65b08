//! Revision records as returned by the revision lookup.

use crate::{PageTarget, RevisionId, Timestamp};
use serde::{Deserialize, Serialize};

/// A single saved revision of a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionRecord {
    pub id: RevisionId,
    pub page: PageTarget,
    pub timestamp: Timestamp,
}

/// How fresh a revision read must be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ReadConsistency {
    /// A replica read is acceptable.
    #[default]
    Replica,
    /// Read from the primary, seeing writes from this request.
    Latest,
}
