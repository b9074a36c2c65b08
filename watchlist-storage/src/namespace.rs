//! Default namespace policy.

use crate::NamespacePolicy;
use std::collections::HashSet;
use watchlist_core::{Namespace, PageTarget, WatchlistConfig};

/// Every real namespace is watchable except those listed as excluded.
/// Pages pair with talk pages by the even/odd namespace convention.
#[derive(Debug, Clone, Default)]
pub struct StandardNamespacePolicy {
    non_watchable: HashSet<Namespace>,
}

impl StandardNamespacePolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &WatchlistConfig) -> Self {
        Self {
            non_watchable: config.non_watchable_namespaces.iter().copied().collect(),
        }
    }

    pub fn exclude(mut self, namespace: Namespace) -> Self {
        self.non_watchable.insert(namespace);
        self
    }
}

impl NamespacePolicy for StandardNamespacePolicy {
    fn is_watchable(&self, namespace: Namespace) -> bool {
        !namespace.is_virtual() && !self.non_watchable.contains(&namespace)
    }

    fn can_have_talk_page(&self, target: &PageTarget) -> bool {
        target.can_exist()
    }

    fn subject_page(&self, target: &PageTarget) -> PageTarget {
        match target.namespace.subject() {
            Some(ns) => target.with_namespace(ns),
            None => target.clone(),
        }
    }

    fn talk_page(&self, target: &PageTarget) -> Option<PageTarget> {
        if !self.can_have_talk_page(target) {
            return None;
        }
        target.namespace.talk().map(|ns| target.with_namespace(ns))
    }
}
