//! Error types for the upsort core.
//!
//! [`SortError`] is the unified error type for head resolution, history
//! building, and caching. Configuration and backend failures abort the run
//! with no partial output — a partially sorted result would be silently
//! incomplete and misleading.

use thiserror::Error;
use upsort_git::GitError;

use crate::config::ConfigError;
use crate::history::HeadName;

/// Errors from the resolution / build / cache pipeline.
#[derive(Debug, Error)]
pub enum SortError {
    /// No configuration file was found anywhere on the search path.
    #[error("configuration file upsort.toml not found (searched: {searched})")]
    ConfigMissing {
        /// The paths that were tried, pre-rendered for display.
        searched: String,
    },

    /// A configuration file existed but could not be read or parsed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A head's declared URL matched a configured remote, but the expected
    /// branch did not resolve. Likely a topology change upstream (e.g. a
    /// renamed or deleted default branch).
    #[error("could not read revision \"{reference}\": does that remote have a \"{branch}\" branch?")]
    UnresolvableReference {
        /// The reference that failed to resolve, e.g. `origin/master`.
        reference: String,
        /// The branch component from the head definition.
        branch: String,
    },

    /// Two heads in one resolved head set carry the same name. A
    /// configuration bug — aborts rather than silently overwriting one
    /// head's history with the other's.
    #[error("head name \"{0}\" is not unique")]
    DuplicateHeadName(HeadName),

    /// The git backend failed (traversal error, unreadable repository, …).
    #[error(transparent)]
    Git(#[from] GitError),

    /// The history cache could not be written.
    #[error("could not write history cache: {0}")]
    CacheWrite(#[from] std::io::Error),
}
