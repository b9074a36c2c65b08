//! Watchlist Core - Entity Types
//!
//! Pure data structures with no behavior beyond simple predicates.
//! All other watchlist crates depend on this.

mod authority;
mod config;
mod error;
mod identity;
mod page;
mod revision;
mod watched_item;

pub use authority::{Authority, Capability, UserAuthority};
pub use config::WatchlistConfig;
pub use error::{ConfigError, StorageError, WatchlistError, WatchlistResult};
pub use identity::{RevisionId, Timestamp, UserId, UserIdentity};
pub use page::{to_db_key, to_text, Namespace, PageTarget};
pub use revision::{ReadConsistency, RevisionRecord};
pub use watched_item::{NotificationTimestamp, WatchedItem};
