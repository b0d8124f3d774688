//! Identity paths for positioning units in a spawn tree
//!
//! Provides [`IdentityPath`] for tracking where a unit sits in the spawn
//! hierarchy of a test session, and [`PathKey`] for the individual segments.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// One segment of an identity path.
///
/// Also used as the process-key component of a registration key: singleton
/// units register under their kind alone, multi-instance units under a
/// `(kind, id)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathKey {
    /// Plain key: an owner atom or a unit-type identifier.
    Name(String),
    /// Compound key for units with several live instances per owner.
    Instance {
        /// Unit-type identifier.
        kind: String,
        /// Caller-chosen instance identifier.
        id: String,
    },
}

impl PathKey {
    /// Plain key from a name
    #[inline]
    #[must_use]
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    /// Compound per-instance key
    #[inline]
    #[must_use]
    pub fn instance(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self::Instance {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// The unit-type portion of the key
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::Name(name) => name,
            Self::Instance { kind, .. } => kind,
        }
    }
}

impl Display for PathKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Instance { kind, id } => write!(f, "{kind}:{id}"),
        }
    }
}

impl From<&str> for PathKey {
    fn from(name: &str) -> Self {
        Self::name(name)
    }
}

impl From<String> for PathKey {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<(&str, &str)> for PathKey {
    fn from((kind, id): (&str, &str)) -> Self {
        Self::instance(kind, id)
    }
}

impl From<(String, String)> for PathKey {
    fn from((kind, id): (String, String)) -> Self {
        Self::Instance { kind, id }
    }
}

/// Position of a unit in the spawn tree, rooted at the session owner.
///
/// Always non-empty: segment 0 is the owner. Paths are immutable; the only
/// way to grow one is the strictly-appending [`IdentityPath::child`], which
/// copies by value. No parent pointers, no shared mutable nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentityPath {
    segments: Vec<PathKey>,
}

impl IdentityPath {
    /// Single-segment path holding only the owner
    #[inline]
    #[must_use]
    pub fn root(owner: impl Into<PathKey>) -> Self {
        Self {
            segments: vec![owner.into()],
        }
    }

    /// The owner (segment 0)
    #[inline]
    #[must_use]
    pub fn owner(&self) -> &PathKey {
        // invariant: segments is never empty
        &self.segments[0]
    }

    /// The most recently appended segment
    #[inline]
    #[must_use]
    pub fn last(&self) -> &PathKey {
        &self.segments[self.segments.len() - 1]
    }

    /// All segments, owner first
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[PathKey] {
        &self.segments
    }

    /// Number of segments (at least 1)
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Append a segment, returning the extended path.
    ///
    /// Idempotent on the last segment only: appending a key equal to
    /// [`IdentityPath::last`] returns the path unchanged. A key equal to an
    /// earlier, non-last segment still extends.
    #[must_use]
    pub fn child(&self, key: impl Into<PathKey>) -> Self {
        let key = key.into();
        if *self.last() == key {
            return self.clone();
        }
        let mut next = self.clone();
        next.segments.push(key);
        next
    }

    /// Iterator over segments from owner to leaf
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &PathKey> {
        self.segments.iter()
    }

    /// Join segments with a custom separator
    #[inline]
    #[must_use]
    pub fn join(&self, separator: &str) -> String {
        self.segments
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(separator)
    }
}

impl Display for IdentityPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.join("/"))
    }
}
