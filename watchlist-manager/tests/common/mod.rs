//! Shared setup for watchlist manager integration tests.

#![allow(dead_code)]

use watchlist_manager::{WatchlistConfig, WatchlistManager, WatchlistServices};
use watchlist_test_utils::TestHarness;

/// Route `tracing` output through the test writer. Set `RUST_LOG` to see it.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Wire every harness collaborator into a fresh manager.
pub fn manager(harness: &TestHarness, config: WatchlistConfig) -> WatchlistManager {
    init_tracing();
    let services = WatchlistServices {
        store: harness.store.clone(),
        talk_notifications: harness.talk_notifications.clone(),
        revisions: harness.revisions.clone(),
        namespaces: harness.namespaces.clone(),
        read_only: harness.read_only.clone(),
        user_cache: harness.user_cache.clone(),
        hooks: harness.hooks.clone(),
        deferred: harness.deferred.clone(),
    };
    WatchlistManager::new(config, services)
}

/// Config with both notification flags on.
pub fn notifying_config() -> WatchlistConfig {
    WatchlistConfig::new()
        .with_email_notification(true)
        .with_updated_marker(true)
}
