//! Core domain logic for upsort.
//!
//! upsort assigns a canonical total order to records keyed by git
//! revisions: the order those revisions were integrated into a
//! priority-ordered chain of upstream heads. This crate holds everything
//! between the git backend and the CLI framing:
//!
//! - [`config`] — the static head registry (`upsort.toml`).
//! - [`resolve`] — head registry + configured remotes → [`HeadSet`].
//! - [`history`] — the [`History`] builder and its cache-aware wrapper.
//! - [`cache`] — the persistent, versioned history cache.
//! - [`sort`] — the order resolver over an [`InputMapping`].
//! - [`error`] — the [`SortError`] taxonomy.
//!
//! The pipeline for one run:
//!
//! ```text
//! Config ──resolve_heads──▶ HeadSet ──cached_history──▶ History
//!                                        (cache hit/miss)   │
//! InputMapping ─────────────sort_mapping────────────────────┴──▶ sorted + unresolved
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod history;
pub mod resolve;
pub mod sort;

pub use cache::HistoryCache;
pub use config::{Config, ConfigError, HeadDefinition};
pub use error::SortError;
pub use history::{HeadName, HeadSet, History, HistorySegment, ResolvedHead, build_history, cached_history};
pub use resolve::{FALLBACK_HEAD, resolve_heads};
pub use sort::{InputMapping, SortedEntry, sort_mapping};
