//! Head and history snapshot types, and the history builder.
//!
//! A [`HeadSet`] is the "current world state": the priority-ordered list of
//! `(name, revision)` pairs the heads resolved to at the start of a run. It
//! doubles as the cache key — any change to any head invalidates the cached
//! [`History`] wholesale.
//!
//! The builder walks heads in priority order with an accumulating exclusion
//! set, so a revision reachable from several heads is attributed to the
//! highest-priority one. The domain models hierarchical upstreams: a commit
//! that already landed in the top-level tree belongs there even when it is
//! also reachable from a narrower downstream head.

use std::collections::HashSet;
use std::fmt;

use tracing::instrument;
use upsort_git::{GitBackend, GitOid};

use crate::cache::HistoryCache;
use crate::error::SortError;

// ---------------------------------------------------------------------------
// HeadName
// ---------------------------------------------------------------------------

/// The human-readable label of a priority slot (e.g. `"mainline"`, `"net"`).
///
/// Unique within one [`HeadSet`] — constructing a set with a duplicate name
/// fails with [`SortError::DuplicateHeadName`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HeadName(String);

impl HeadName {
    /// Create a head name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Return the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HeadName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HeadName {
    fn from(name: &str) -> Self {
        Self(name.to_owned())
    }
}

// ---------------------------------------------------------------------------
// ResolvedHead / HeadSet
// ---------------------------------------------------------------------------

/// The concrete state a head was in at resolution time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedHead {
    /// The head's display name.
    pub name: HeadName,
    /// The revision the head pointed at.
    pub rev: GitOid,
}

impl fmt::Display for ResolvedHead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.name, self.rev)
    }
}

/// A priority-ordered list of resolved heads.
///
/// Index 0 is the highest-priority head (the one downstream heads feed
/// into). Equality is positional, which is exactly the cache-validity
/// comparison: same names in the same order pointing at the same revisions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeadSet(Vec<ResolvedHead>);

impl HeadSet {
    /// Build a head set, enforcing name uniqueness.
    ///
    /// # Errors
    /// [`SortError::DuplicateHeadName`] if two entries share a name.
    pub fn new(heads: Vec<ResolvedHead>) -> Result<Self, SortError> {
        let mut seen = HashSet::new();
        for head in &heads {
            if !seen.insert(head.name.as_str()) {
                return Err(SortError::DuplicateHeadName(head.name.clone()));
            }
        }
        Ok(Self(heads))
    }

    /// Heads in priority order, highest first.
    pub fn iter(&self) -> std::slice::Iter<'_, ResolvedHead> {
        self.0.iter()
    }

    /// The highest-priority head, if any.
    #[must_use]
    pub fn first(&self) -> Option<&ResolvedHead> {
        self.0.first()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a HeadSet {
    type Item = &'a ResolvedHead;
    type IntoIter = std::slice::Iter<'a, ResolvedHead>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// One head's slice of the total order: the revisions attributable to it
/// (reachable from it but from no higher-priority head), oldest-first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistorySegment {
    /// The head these revisions are attributed to.
    pub head: HeadName,
    /// Revisions in oldest-first (reverse topological) order.
    pub revisions: Vec<GitOid>,
}

/// The full per-head order over every revision reachable from any head.
///
/// Segments are stored in head priority order; concatenating them yields
/// the total order the merge engine walks. Each reachable revision appears
/// in exactly one segment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct History {
    segments: Vec<HistorySegment>,
}

impl History {
    pub(crate) fn from_segments(segments: Vec<HistorySegment>) -> Self {
        Self { segments }
    }

    /// Segments in head priority order.
    #[must_use]
    pub fn segments(&self) -> &[HistorySegment] {
        &self.segments
    }

    /// Total number of revisions across all segments.
    #[must_use]
    pub fn total_revisions(&self) -> usize {
        self.segments.iter().map(|s| s.revisions.len()).sum()
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Build a [`History`] for `heads` by querying the backend once per head.
///
/// Heads are processed highest-priority first; each head's tip joins the
/// exclusion set for every later head, so revisions already attributed
/// upstream never reappear downstream.
///
/// # Errors
/// [`SortError::Git`] if any traversal fails. Not retried — a traversal
/// failure is not transient.
#[instrument(skip_all, fields(heads = heads.len()))]
pub fn build_history(heads: &HeadSet, git: &dyn GitBackend) -> Result<History, SortError> {
    let mut exclude: Vec<GitOid> = Vec::new();
    let mut segments = Vec::with_capacity(heads.len());
    for head in heads {
        let revisions = git.walk_oldest_first(head.rev, &exclude)?;
        tracing::debug!(head = %head.name, revisions = revisions.len(), "attributed revisions");
        segments.push(HistorySegment {
            head: head.name.clone(),
            revisions,
        });
        exclude.push(head.rev);
    }
    Ok(History::from_segments(segments))
}

/// Return the history for `heads`, reusing the cache when it is still
/// valid and rebuilding (write-through) when it is not.
///
/// # Errors
/// [`SortError::Git`] from a rebuild traversal, or
/// [`SortError::CacheWrite`] if the rebuilt history cannot be persisted.
pub fn cached_history(
    heads: &HeadSet,
    git: &dyn GitBackend,
    cache: &HistoryCache,
) -> Result<History, SortError> {
    if let Some((cached_heads, history)) = cache.load()
        && cached_heads == *heads
    {
        tracing::debug!("head set unchanged, reusing cached history");
        return Ok(history);
    }
    tracing::debug!("head set changed or cache absent, rebuilding history");
    let history = build_history(heads, git)?;
    cache.store(heads, &history)?;
    Ok(history)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
