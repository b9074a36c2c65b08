//! Capabilities and the capability-bearing performer.

use crate::{UserIdentity, WatchlistError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Rights consulted by the watchlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    /// Add, remove and clear items on one's own watchlist.
    EditWatchlist,
    /// Read one's own watchlist.
    ViewWatchlist,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::EditWatchlist => "edit-watchlist",
            Capability::ViewWatchlist => "view-watchlist",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = WatchlistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "edit-watchlist" => Ok(Capability::EditWatchlist),
            "view-watchlist" => Ok(Capability::ViewWatchlist),
            other => Err(WatchlistError::InvalidCapability {
                name: other.to_string(),
            }),
        }
    }
}

/// A performer: a user together with the rights it holds for this request.
///
/// Permission policy lives with the host; the watchlist only asks.
pub trait Authority {
    /// The user on whose behalf the request runs.
    fn user(&self) -> &UserIdentity;

    /// Whether the performer holds `capability`.
    fn is_allowed(&self, capability: Capability) -> bool;
}

/// An [`Authority`] with a fixed set of rights.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAuthority {
    user: UserIdentity,
    rights: HashSet<Capability>,
}

impl UserAuthority {
    pub fn new(user: UserIdentity, rights: impl IntoIterator<Item = Capability>) -> Self {
        Self {
            user,
            rights: rights.into_iter().collect(),
        }
    }

    /// A performer holding every watchlist capability.
    pub fn with_all_rights(user: UserIdentity) -> Self {
        Self::new(user, [Capability::EditWatchlist, Capability::ViewWatchlist])
    }

    /// A performer holding no rights at all.
    pub fn without_rights(user: UserIdentity) -> Self {
        Self::new(user, [])
    }

    pub fn grant(mut self, capability: Capability) -> Self {
        self.rights.insert(capability);
        self
    }

    pub fn revoke(mut self, capability: Capability) -> Self {
        self.rights.remove(&capability);
        self
    }
}

impl Authority for UserAuthority {
    fn user(&self) -> &UserIdentity {
        &self.user
    }

    fn is_allowed(&self, capability: Capability) -> bool {
        self.rights.contains(&capability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_roundtrips_through_name() {
        for cap in [Capability::EditWatchlist, Capability::ViewWatchlist] {
            assert_eq!(cap.as_str().parse::<Capability>().unwrap(), cap);
        }
    }

    #[test]
    fn test_unknown_capability_is_rejected() {
        let err = "delete-everything".parse::<Capability>().unwrap_err();
        assert_eq!(
            err,
            WatchlistError::InvalidCapability {
                name: "delete-everything".to_string()
            }
        );
    }

    #[test]
    fn test_capability_serde_uses_kebab_case() {
        let json = serde_json::to_string(&Capability::ViewWatchlist).unwrap();
        assert_eq!(json, "\"view-watchlist\"");
    }

    #[test]
    fn test_grant_and_revoke() {
        let user = UserIdentity::new(1, "Alice");
        let authority = UserAuthority::without_rights(user.clone())
            .grant(Capability::ViewWatchlist);
        assert!(authority.is_allowed(Capability::ViewWatchlist));
        assert!(!authority.is_allowed(Capability::EditWatchlist));

        let authority = UserAuthority::with_all_rights(user).revoke(Capability::ViewWatchlist);
        assert!(authority.is_allowed(Capability::EditWatchlist));
        assert!(!authority.is_allowed(Capability::ViewWatchlist));
    }
}
