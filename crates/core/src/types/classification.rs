//! Result of applying the path pattern to a request path

use std::fmt::{self, Display};
use std::ops::Deref;

/// Policy identifier captured from a request path.
///
/// The value is opaque: it is only ever used as a lookup key and as part of
/// the cache tag, never parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PolicyId(String);

impl PolicyId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for PolicyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Deref for PolicyId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// How a request path was classified.
///
/// `Unmatched` is distinct from `Matched` with an empty policy id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Classification {
    Matched(PolicyId),
    Unmatched,
}

impl Classification {
    pub fn matched(id: impl Into<String>) -> Self {
        Classification::Matched(PolicyId::new(id))
    }

    pub fn is_matched(&self) -> bool {
        matches!(self, Classification::Matched(_))
    }

    pub fn policy_id(&self) -> Option<&PolicyId> {
        match self {
            Classification::Matched(id) => Some(id),
            Classification::Unmatched => None,
        }
    }

    /// Marker bound into cache tags: `M<id>` or `N`
    pub fn marker(&self) -> String {
        match self {
            Classification::Matched(id) => format!("M{id}"),
            Classification::Unmatched => "N".to_string(),
        }
    }
}
