//! Error types for git backend operations.
//!
//! [`GitError`] is the single error type returned by all
//! [`GitBackend`](crate::GitBackend) trait methods. It uses rich enum
//! variants so callers can match on specific failure modes (missing
//! revision, failed traversal) without parsing error messages.

use thiserror::Error;

/// Errors returned by [`GitBackend`](crate::GitBackend) operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// A revision specification did not resolve to any object.
    #[error("not found: {message}")]
    NotFound {
        /// Human-readable description of what was missing.
        message: String,
    },

    /// A history traversal failed partway through.
    ///
    /// Covers a non-zero exit from the external `git log` process as well
    /// as unparseable traversal output (e.g. a corrupt graph). Not retried
    /// by callers — a traversal failure is not transient.
    #[error("history traversal `{command}` failed: {detail}")]
    Traversal {
        /// The traversal command that was run.
        command: String,
        /// Captured stderr or a description of the bad output.
        detail: String,
    },

    /// An OID string could not be parsed or was otherwise invalid.
    #[error("invalid OID `{value}`: {reason}")]
    InvalidOid {
        /// The raw value that failed validation.
        value: String,
        /// Why validation failed.
        reason: String,
    },

    /// An I/O error occurred (file system, process spawn, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The underlying git backend (gix) returned an unclassified error.
    ///
    /// This is the catch-all for errors that don't fit other variants. The
    /// `message` should include enough context to diagnose the failure.
    #[error("git backend error: {message}")]
    Backend {
        /// Freeform error description from the backend.
        message: String,
    },
}
