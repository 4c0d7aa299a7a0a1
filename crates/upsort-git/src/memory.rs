//! In-memory [`GitBackend`] test double.
//!
//! Holds a hand-built commit DAG, a name table, and a remote table, so the
//! resolver and history builder can be exercised without a repository on
//! disk. [`MemoryBackend::walk_oldest_first`] performs a deterministic
//! oldest-first topological walk: parents are visited in declared order,
//! which makes expected sequences stable across runs.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::backend::GitBackend;
use crate::error::GitError;
use crate::types::GitOid;

/// Build a synthetic OID from a single byte, for concise test graphs.
#[must_use]
pub fn oid(n: u8) -> GitOid {
    GitOid::from_bytes([n; 20])
}

/// An in-memory commit graph implementing [`GitBackend`].
#[derive(Debug, Default)]
pub struct MemoryBackend {
    /// OID → parent OIDs, in declared order.
    commits: HashMap<GitOid, Vec<GitOid>>,
    /// Registration order, used for deterministic prefix resolution.
    registered: Vec<GitOid>,
    /// Symbolic names (`"HEAD"`, `"origin/master"`, …) → OID.
    names: HashMap<String, GitOid>,
    /// Fetch URL → local remote name.
    remotes: BTreeMap<String, String>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a commit with the given parents and return its OID.
    pub fn commit(&mut self, id: GitOid, parents: &[GitOid]) -> GitOid {
        self.commits.insert(id, parents.to_vec());
        self.registered.push(id);
        id
    }

    /// Bind a symbolic name (e.g. `"HEAD"`, `"origin/master"`) to an OID.
    pub fn name(&mut self, name: &str, id: GitOid) {
        self.names.insert(name.to_owned(), id);
    }

    /// Register a remote under its fetch URL.
    pub fn remote(&mut self, url: &str, local_name: &str) {
        self.remotes.insert(url.to_owned(), local_name.to_owned());
    }

    /// Every commit reachable from any of `tips`, including the tips.
    fn reachable(&self, tips: &[GitOid]) -> Result<HashSet<GitOid>, GitError> {
        let mut seen = HashSet::new();
        let mut stack: Vec<GitOid> = tips.to_vec();
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            let parents = self.commits.get(&id).ok_or_else(|| GitError::Traversal {
                command: "memory walk".to_owned(),
                detail: format!("unknown commit {id}"),
            })?;
            stack.extend(parents.iter().copied());
        }
        Ok(seen)
    }
}

impl GitBackend for MemoryBackend {
    fn rev_parse(&self, spec: &str) -> Result<GitOid, GitError> {
        if let Some(id) = self.names.get(spec) {
            return Ok(*id);
        }
        if let Ok(full) = spec.parse::<GitOid>() {
            if self.commits.contains_key(&full) {
                return Ok(full);
            }
        } else if spec.len() >= 4 && spec.chars().all(|c| c.is_ascii_hexdigit()) {
            // Abbreviated hash: accept a unique prefix, like rev-parse does.
            let lower = spec.to_ascii_lowercase();
            let mut matches = self
                .registered
                .iter()
                .filter(|id| id.to_string().starts_with(&lower));
            if let Some(first) = matches.next()
                && matches.next().is_none()
            {
                return Ok(*first);
            }
        }
        Err(GitError::NotFound {
            message: format!("rev-parse '{spec}': no such revision"),
        })
    }

    fn remotes(&self) -> Result<BTreeMap<String, String>, GitError> {
        Ok(self.remotes.clone())
    }

    fn walk_oldest_first(&self, tip: GitOid, exclude: &[GitOid]) -> Result<Vec<GitOid>, GitError> {
        let hidden = self.reachable(exclude)?;
        let mut out = Vec::new();
        let mut visited = HashSet::new();
        // Iterative post-order DFS: parents are emitted before children,
        // yielding an oldest-first topological order.
        let mut stack = vec![(tip, false)];
        while let Some((id, expanded)) = stack.pop() {
            if hidden.contains(&id) || visited.contains(&id) {
                continue;
            }
            if expanded {
                visited.insert(id);
                out.push(id);
                continue;
            }
            stack.push((id, true));
            let parents = self.commits.get(&id).ok_or_else(|| GitError::Traversal {
                command: "memory walk".to_owned(),
                detail: format!("unknown commit {id}"),
            })?;
            // Reversed so the first-declared parent is visited first.
            for parent in parents.iter().rev() {
                stack.push((*parent, false));
            }
        }
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
