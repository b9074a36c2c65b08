//! Hook dispatch for watchlist events.

use std::sync::{PoisonError, RwLock};
use watchlist_core::{RevisionId, UserIdentity};

/// What a hook handler asks the caller to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookOutcome {
    Continue,
    /// Stop the operation that fired the hook.
    Abort,
}

impl HookOutcome {
    pub fn is_abort(self) -> bool {
        self == HookOutcome::Abort
    }
}

/// Hooks the watchlist fires.
pub trait HookRunner: Send + Sync {
    /// Fired before the "new messages" flag of `user` is cleared because
    /// they viewed their own talk page at `old_rev_id`.
    fn on_user_clear_new_talk_notification(
        &self,
        user: &UserIdentity,
        old_rev_id: RevisionId,
    ) -> HookOutcome;
}

/// Runner with no handlers; every hook continues.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHookRunner;

impl HookRunner for NoopHookRunner {
    fn on_user_clear_new_talk_notification(&self, _user: &UserIdentity, _old_rev_id: RevisionId) -> HookOutcome {
        HookOutcome::Continue
    }
}

type ClearNewTalkHandler = Box<dyn Fn(&UserIdentity, RevisionId) -> HookOutcome + Send + Sync>;

/// Runner with registered handlers, called in registration order.
///
/// The first handler returning [`HookOutcome::Abort`] ends the chain.
#[derive(Default)]
pub struct HookRegistry {
    clear_new_talk: RwLock<Vec<ClearNewTalkHandler>>,
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let handlers = self
            .clear_new_talk
            .read()
            .map_or(0, |handlers| handlers.len());
        f.debug_struct("HookRegistry")
            .field("clear_new_talk_handlers", &handlers)
            .finish()
    }
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_clear_new_talk_notification<F>(&self, handler: F)
    where
        F: Fn(&UserIdentity, RevisionId) -> HookOutcome + Send + Sync + 'static,
    {
        self.clear_new_talk
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Box::new(handler));
    }
}

impl HookRunner for HookRegistry {
    fn on_user_clear_new_talk_notification(
        &self,
        user: &UserIdentity,
        old_rev_id: RevisionId,
    ) -> HookOutcome {
        let handlers = self
            .clear_new_talk
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        for (index, handler) in handlers.iter().enumerate() {
            if handler(user, old_rev_id).is_abort() {
                tracing::debug!(
                    user = %user.name,
                    handler = index,
                    "UserClearNewTalkNotification aborted by handler"
                );
                return HookOutcome::Abort;
            }
        }
        HookOutcome::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_noop_runner_continues() {
        let user = UserIdentity::new(1, "Alice");
        assert_eq!(
            NoopHookRunner.on_user_clear_new_talk_notification(&user, RevisionId::NONE),
            HookOutcome::Continue
        );
    }

    #[test]
    fn test_empty_registry_continues() {
        let user = UserIdentity::new(1, "Alice");
        let registry = HookRegistry::new();
        assert_eq!(
            registry.on_user_clear_new_talk_notification(&user, RevisionId(4)),
            HookOutcome::Continue
        );
    }

    #[test]
    fn test_abort_stops_chain() {
        let user = UserIdentity::new(1, "Alice");
        let registry = HookRegistry::new();
        let later_calls = Arc::new(AtomicUsize::new(0));

        registry.on_clear_new_talk_notification(|_, _| HookOutcome::Continue);
        registry.on_clear_new_talk_notification(|_, rev| {
            if rev == RevisionId(7) {
                HookOutcome::Abort
            } else {
                HookOutcome::Continue
            }
        });
        let counter = Arc::clone(&later_calls);
        registry.on_clear_new_talk_notification(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            HookOutcome::Continue
        });

        assert!(registry
            .on_user_clear_new_talk_notification(&user, RevisionId(7))
            .is_abort());
        assert_eq!(later_calls.load(Ordering::SeqCst), 0);

        assert!(!registry
            .on_user_clear_new_talk_notification(&user, RevisionId(8))
            .is_abort());
        assert_eq!(later_calls.load(Ordering::SeqCst), 1);
    }
}
