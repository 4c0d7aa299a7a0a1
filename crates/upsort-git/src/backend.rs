//! The [`GitBackend`] trait — the single abstraction boundary between
//! upsort and the revision graph.
//!
//! The sorter never touches git directly; everything it needs is one of
//! three narrow queries: resolve a name, enumerate configured remotes, and
//! walk reachable history in oldest-first order. The trait is object-safe
//! so callers can use `&dyn GitBackend`.

use std::collections::BTreeMap;

use crate::error::GitError;
use crate::types::GitOid;

/// The revision-graph abstraction used by the upsort crates.
///
/// Implementations may be backed by a real repository ([`GixBackend`]) or
/// an in-memory graph for tests ([`MemoryBackend`]).
///
/// [`GixBackend`]: crate::GixBackend
/// [`MemoryBackend`]: crate::MemoryBackend
pub trait GitBackend {
    /// Resolve a revision specification to an OID.
    ///
    /// Supports whatever spellings the backend understands: full and
    /// abbreviated hashes, `HEAD`, `<remote>/<branch>`, etc.
    ///
    /// Returns [`GitError::NotFound`] if the spec cannot be resolved.
    ///
    /// Replaces: `git rev-parse --verify <spec>`.
    fn rev_parse(&self, spec: &str) -> Result<GitOid, GitError>;

    /// Enumerate configured remotes as a fetch-URL → local-name mapping.
    ///
    /// The mapping is keyed by URL because head definitions declare the
    /// canonical upstream URLs, and the local name for any of them is
    /// whatever the user happened to call the remote.
    ///
    /// Replaces: `git config --get-regexp '^remote\..+\.url$'`.
    fn remotes(&self) -> Result<BTreeMap<String, String>, GitError>;

    /// List every revision reachable from `tip` but not from any of the
    /// `exclude` tips, oldest-first (reverse topological order).
    ///
    /// Returns an empty list when everything reachable from `tip` is also
    /// reachable from an excluded tip.
    ///
    /// Replaces: `git log --topo-order --reverse ^ex1 ^ex2 <tip>`.
    fn walk_oldest_first(&self, tip: GitOid, exclude: &[GitOid]) -> Result<Vec<GitOid>, GitError>;
}
