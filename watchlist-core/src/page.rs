//! Namespaces and page targets.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Page namespace.
///
/// Non-negative namespaces come in subject/talk pairs: every even namespace
/// is a subject namespace and the following odd one is its talk namespace.
/// Negative namespaces are virtual and have no pages of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Namespace(pub i32);

impl Namespace {
    pub const MEDIA: Namespace = Namespace(-2);
    pub const SPECIAL: Namespace = Namespace(-1);
    pub const MAIN: Namespace = Namespace(0);
    pub const TALK: Namespace = Namespace(1);
    pub const USER: Namespace = Namespace(2);
    pub const USER_TALK: Namespace = Namespace(3);
    pub const PROJECT: Namespace = Namespace(4);
    pub const PROJECT_TALK: Namespace = Namespace(5);

    pub fn id(self) -> i32 {
        self.0
    }

    /// Virtual namespaces (Special, Media) cannot hold real pages.
    pub fn is_virtual(self) -> bool {
        self.0 < 0
    }

    pub fn is_talk(self) -> bool {
        !self.is_virtual() && self.0 % 2 == 1
    }

    /// Subject namespace of this pair, `None` for virtual namespaces.
    pub fn subject(self) -> Option<Namespace> {
        if self.is_virtual() {
            None
        } else {
            Some(Namespace(self.0 & !1))
        }
    }

    /// Talk namespace of this pair, `None` for virtual namespaces.
    pub fn talk(self) -> Option<Namespace> {
        if self.is_virtual() {
            None
        } else {
            Some(Namespace(self.0 | 1))
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A page the watchlist can refer to.
///
/// `db_key` is the title in storage form (underscores instead of spaces).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageTarget {
    pub namespace: Namespace,
    pub db_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interwiki: Option<String>,
}

impl PageTarget {
    /// Create a local page target. Spaces in `title` are stored as underscores.
    pub fn new(namespace: Namespace, title: impl AsRef<str>) -> Self {
        Self {
            namespace,
            db_key: to_db_key(title.as_ref()),
            interwiki: None,
        }
    }

    /// Create a target pointing at another wiki.
    pub fn interwiki(prefix: impl Into<String>, namespace: Namespace, title: impl AsRef<str>) -> Self {
        Self {
            interwiki: Some(prefix.into()),
            ..Self::new(namespace, title)
        }
    }

    /// The same title in another namespace.
    pub fn with_namespace(&self, namespace: Namespace) -> Self {
        Self {
            namespace,
            ..self.clone()
        }
    }

    /// Display form of the title (underscores shown as spaces).
    pub fn text(&self) -> String {
        to_text(&self.db_key)
    }

    /// Whether this target could be a real local page.
    pub fn can_exist(&self) -> bool {
        !self.namespace.is_virtual() && self.interwiki.is_none() && !self.db_key.is_empty()
    }
}

impl fmt::Display for PageTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(prefix) = &self.interwiki {
            write!(f, "{}:", prefix)?;
        }
        write!(f, "{}:{}", self.namespace, self.db_key)
    }
}

/// Storage form of a title: trimmed, spaces as underscores.
pub fn to_db_key(title: &str) -> String {
    title.trim().replace(' ', "_")
}

/// Display form of a title: underscores as spaces.
pub fn to_text(db_key: &str) -> String {
    db_key.replace('_', " ")
}
