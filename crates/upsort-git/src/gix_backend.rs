//! The production [`GitBackend`] implementation.
//!
//! Name resolution and remote enumeration go through
//! [gix](https://github.com/GitoxideLabs/gitoxide). History traversal
//! shells out to `git log --topo-order --reverse`, which produces exactly
//! the required order and `^tip` exclusion semantics; its output is parsed
//! back into [`GitOid`]s.

use std::collections::BTreeMap;
use std::path::Path;
use std::process::Command;

use crate::backend::GitBackend;
use crate::error::GitError;
use crate::types::GitOid;

/// A [`GitBackend`] backed by a real repository on disk.
///
/// Construct via [`GixBackend::open`] or [`GixBackend::discover`].
pub struct GixBackend {
    repo: gix::Repository,
}

impl GixBackend {
    /// Open the repository at exactly `path` (a `.git` directory or a
    /// worktree root).
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = gix::open(path).map_err(|e| GitError::Backend {
            message: e.to_string(),
        })?;
        Ok(Self { repo })
    }

    /// Discover the repository at or above `path`.
    pub fn discover(path: &Path) -> Result<Self, GitError> {
        let repo = gix::discover(path).map_err(|e| GitError::Backend {
            message: e.to_string(),
        })?;
        Ok(Self { repo })
    }

    /// Path to the repository's `.git` directory.
    #[must_use]
    pub fn git_dir(&self) -> &Path {
        self.repo.git_dir()
    }
}

/// Convert a `gix::ObjectId` (or `&gix::oid`) to a `GitOid`.
fn from_gix_oid(oid: &gix::oid) -> GitOid {
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(oid.as_bytes());
    GitOid::from_bytes(bytes)
}

impl GitBackend for GixBackend {
    fn rev_parse(&self, spec: &str) -> Result<GitOid, GitError> {
        let id = self
            .repo
            .rev_parse_single(spec)
            .map_err(|e| GitError::NotFound {
                message: format!("rev-parse '{spec}': {e}"),
            })?;
        Ok(from_gix_oid(id.as_ref()))
    }

    fn remotes(&self) -> Result<BTreeMap<String, String>, GitError> {
        let mut urls = BTreeMap::new();
        for name in self.repo.remote_names() {
            let name = name.to_string();
            let remote =
                self.repo
                    .find_remote(name.as_str())
                    .map_err(|e| GitError::Backend {
                        message: format!("remote '{name}': {e}"),
                    })?;
            // Remotes without a fetch URL (push-only configs) cannot anchor
            // a head and are skipped.
            if let Some(url) = remote.url(gix::remote::Direction::Fetch) {
                urls.insert(url.to_bstring().to_string(), name);
            }
        }
        Ok(urls)
    }

    fn walk_oldest_first(&self, tip: GitOid, exclude: &[GitOid]) -> Result<Vec<GitOid>, GitError> {
        let mut cmd = Command::new("git");
        cmd.arg("--git-dir")
            .arg(self.repo.git_dir())
            .args(["log", "--topo-order", "--reverse", "--pretty=tformat:%H"]);
        for oid in exclude {
            cmd.arg(format!("^{oid}"));
        }
        cmd.arg(tip.to_string());

        let rendered = render_command(&cmd);
        let output = cmd.output()?;
        if !output.status.success() {
            return Err(GitError::Traversal {
                command: rendered,
                detail: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut revisions = Vec::new();
        for line in stdout.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let oid = line.parse::<GitOid>().map_err(|e| GitError::Traversal {
                command: rendered.clone(),
                detail: format!("unexpected output line: {e}"),
            })?;
            revisions.push(oid);
        }
        tracing::debug!(tip = %tip, excluded = exclude.len(), revisions = revisions.len(), "traversal complete");
        Ok(revisions)
    }
}

fn render_command(cmd: &Command) -> String {
    let mut rendered = cmd.get_program().to_string_lossy().into_owned();
    for arg in cmd.get_args() {
        rendered.push(' ');
        rendered.push_str(&arg.to_string_lossy());
    }
    rendered
}
