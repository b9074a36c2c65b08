//! Identity types for users and revisions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Numeric user identifier. Zero is reserved for anonymous users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl UserId {
    /// Identifier carried by every anonymous (unregistered) user.
    pub const ANONYMOUS: UserId = UserId(0);

    /// Whether this identifier belongs to a registered account.
    pub fn is_registered(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Numeric revision identifier. Zero means "no revision".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct RevisionId(pub u64);

impl RevisionId {
    /// Placeholder used when no revision was supplied.
    pub const NONE: RevisionId = RevisionId(0);

    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user as seen by the watchlist: a numeric identity plus a display name.
///
/// Anonymous users carry [`UserId::ANONYMOUS`] and usually an IP address as
/// their name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: UserId,
    pub name: String,
}

impl UserIdentity {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id: UserId(id),
            name: name.into(),
        }
    }

    /// Build an anonymous identity.
    pub fn anonymous(name: impl Into<String>) -> Self {
        Self {
            id: UserId::ANONYMOUS,
            name: name.into(),
        }
    }

    pub fn is_registered(&self) -> bool {
        self.id.is_registered()
    }
}
