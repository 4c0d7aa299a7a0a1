//! Head resolver: turns the static head registry plus the repository's
//! configured remotes into the current [`HeadSet`].
//!
//! Definitions are scanned in priority order. A head participates when any
//! of its declared fetch URLs matches a configured remote; its branch is
//! then resolved as `<local-remote-name>/<branch>`. When nothing usable
//! resolves — or the top-priority head is missing — the whole partial
//! result is discarded in favor of a single synthetic `HEAD` entry, so the
//! sorter degrades to a local-only total order instead of sorting against
//! an unreliable subset of upstreams.

use tracing::instrument;
use upsort_git::{GitBackend, GitError};

use crate::config::Config;
use crate::error::SortError;
use crate::history::{HeadName, HeadSet, ResolvedHead};

/// Name of the synthetic fallback head representing the current position.
pub const FALLBACK_HEAD: &str = "HEAD";

/// Resolve the configured heads against the repository's remotes.
///
/// # Errors
/// [`SortError::UnresolvableReference`] when a matched remote's branch does
/// not resolve (a misconfigured or unexpectedly-shaped remote),
/// [`SortError::Git`] on backend failures, and
/// [`SortError::DuplicateHeadName`] when the registry resolves two heads to
/// the same name.
#[instrument(skip_all)]
pub fn resolve_heads(config: &Config, git: &dyn GitBackend) -> Result<HeadSet, SortError> {
    let remotes = git.remotes()?;
    let mut resolved = Vec::new();

    for def in &config.heads {
        for url in &def.urls {
            let Some(local_name) = remotes.get(url) else {
                continue;
            };
            let reference = format!("{local_name}/{}", def.branch);
            let rev = match git.rev_parse(&reference) {
                Ok(rev) => rev,
                Err(GitError::NotFound { .. }) => {
                    return Err(SortError::UnresolvableReference {
                        reference,
                        branch: def.branch.clone(),
                    });
                }
                Err(e) => return Err(e.into()),
            };
            tracing::debug!(head = %def.name, %reference, %rev, "resolved head");
            resolved.push(ResolvedHead {
                name: HeadName::new(def.name.as_str()),
                rev,
            });
            break;
        }
    }

    // Per the registry's URLs this is not a clone of the expected upstream
    // hierarchy; sort by what is reachable from the current position.
    let top_name = config.heads.first().map(|d| d.name.as_str());
    if resolved.first().is_none_or(|h| Some(h.name.as_str()) != top_name) {
        if !resolved.is_empty() {
            tracing::warn!(
                resolved = resolved.len(),
                "top-priority head did not resolve; discarding partial resolution"
            );
        }
        let rev = git.rev_parse(FALLBACK_HEAD)?;
        return HeadSet::new(vec![ResolvedHead {
            name: HeadName::from(FALLBACK_HEAD),
            rev,
        }]);
    }

    HeadSet::new(resolved)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
