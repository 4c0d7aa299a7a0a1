//! Persistent history cache.
//!
//! A single versioned JSON document holding the [`HeadSet`] a history was
//! built from together with the history itself. Both are written in one
//! document and replaced via rename, so cache validity (the head set) can
//! never desynchronize from cache content (the history).
//!
//! Read failures of any kind — missing file, unreadable, unparseable,
//! unknown format version, malformed OID — mean "cache absent", never an
//! error: the consumer falls back to rebuilding.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use upsort_git::GitOid;

use crate::history::{HeadName, HeadSet, History, HistorySegment, ResolvedHead};

/// Bumped whenever the on-disk schema changes; older documents are treated
/// as cache-absent rather than misread.
pub const CACHE_FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// On-disk schema
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct CacheDoc {
    version: u32,
    heads: Vec<CachedHead>,
    history: Vec<CachedSegment>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CachedHead {
    name: String,
    rev: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct CachedSegment {
    head: String,
    revisions: Vec<String>,
}

// ---------------------------------------------------------------------------
// HistoryCache
// ---------------------------------------------------------------------------

/// Handle to the cache file. Opened, read or written, and dropped within
/// one run; concurrent runs against the same path are last-writer-wins.
#[derive(Clone, Debug)]
pub struct HistoryCache {
    path: PathBuf,
}

impl HistoryCache {
    /// A cache stored at `path`.
    #[must_use]
    pub const fn at(path: PathBuf) -> Self {
        Self { path }
    }

    /// The cache at its default location, `<cache_dir>/upsort/history.json`.
    ///
    /// `None` when the platform reports no cache directory.
    #[must_use]
    pub fn default_location() -> Option<Self> {
        Some(Self::at(
            dirs::cache_dir()?.join("upsort").join("history.json"),
        ))
    }

    /// The cache file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the cached head set and history, or `None` when the cache is
    /// absent, unreadable, or from an incompatible version.
    #[must_use]
    pub fn load(&self) -> Option<(HeadSet, History)> {
        let contents = fs::read_to_string(&self.path).ok()?;
        let doc: CacheDoc = match serde_json::from_str(&contents) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::debug!(path = %self.path.display(), "discarding undecodable cache: {e}");
                return None;
            }
        };
        if doc.version != CACHE_FORMAT_VERSION {
            tracing::debug!(
                found = doc.version,
                expected = CACHE_FORMAT_VERSION,
                "discarding cache with incompatible format version"
            );
            return None;
        }
        decode(doc)
    }

    /// Write the head set and history through to disk as one document.
    ///
    /// # Errors
    /// Any I/O failure creating the cache directory or replacing the file.
    pub fn store(&self, heads: &HeadSet, history: &History) -> io::Result<()> {
        let doc = encode(heads, history);
        let json = serde_json::to_string(&doc).map_err(io::Error::other)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        // Replace via rename so a crash mid-write leaves the old document
        // intact rather than a torn one.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        tracing::debug!(path = %self.path.display(), heads = heads.len(), "stored history cache");
        Ok(())
    }
}

fn encode(heads: &HeadSet, history: &History) -> CacheDoc {
    CacheDoc {
        version: CACHE_FORMAT_VERSION,
        heads: heads
            .iter()
            .map(|h| CachedHead {
                name: h.name.as_str().to_owned(),
                rev: h.rev.to_string(),
            })
            .collect(),
        history: history
            .segments()
            .iter()
            .map(|s| CachedSegment {
                head: s.head.as_str().to_owned(),
                revisions: s.revisions.iter().map(ToString::to_string).collect(),
            })
            .collect(),
    }
}

fn decode(doc: CacheDoc) -> Option<(HeadSet, History)> {
    let mut heads = Vec::with_capacity(doc.heads.len());
    for h in doc.heads {
        heads.push(ResolvedHead {
            name: HeadName::new(h.name),
            rev: h.rev.parse::<GitOid>().ok()?,
        });
    }
    let heads = HeadSet::new(heads).ok()?;

    let mut segments = Vec::with_capacity(doc.history.len());
    for s in doc.history {
        let mut revisions = Vec::with_capacity(s.revisions.len());
        for rev in s.revisions {
            revisions.push(rev.parse::<GitOid>().ok()?);
        }
        segments.push(HistorySegment {
            head: HeadName::new(s.head),
            revisions,
        });
    }
    Some((heads, History::from_segments(segments)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use upsort_git::memory::oid;

    use super::*;

    fn sample() -> (HeadSet, History) {
        let heads = HeadSet::new(vec![
            ResolvedHead {
                name: HeadName::from("mainline"),
                rev: oid(3),
            },
            ResolvedHead {
                name: HeadName::from("net"),
                rev: oid(4),
            },
        ])
        .unwrap();
        let history = History::from_segments(vec![
            HistorySegment {
                head: HeadName::from("mainline"),
                revisions: vec![oid(1), oid(2), oid(3)],
            },
            HistorySegment {
                head: HeadName::from("net"),
                revisions: vec![oid(4)],
            },
        ]);
        (heads, history)
    }

    fn cache_in(dir: &tempfile::TempDir) -> HistoryCache {
        HistoryCache::at(dir.path().join("upsort").join("history.json"))
    }

    #[test]
    fn store_then_load_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir);
        let (heads, history) = sample();

        cache.store(&heads, &history).unwrap();
        let (loaded_heads, loaded_history) = cache.load().unwrap();
        assert_eq!(loaded_heads, heads);
        assert_eq!(loaded_history, history);
    }

    #[test]
    fn load_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(cache_in(&dir).load().is_none());
    }

    #[test]
    fn load_corrupt_json_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir);
        fs::create_dir_all(cache.path().parent().unwrap()).unwrap();
        fs::write(cache.path(), "{not json").unwrap();
        assert!(cache.load().is_none());
    }

    #[test]
    fn load_wrong_version_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir);
        let (heads, history) = sample();
        cache.store(&heads, &history).unwrap();

        let bumped = fs::read_to_string(cache.path())
            .unwrap()
            .replace("\"version\":1", "\"version\":99");
        fs::write(cache.path(), bumped).unwrap();
        assert!(cache.load().is_none());
    }

    #[test]
    fn load_malformed_oid_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir);
        let doc = format!(
            r#"{{"version":{CACHE_FORMAT_VERSION},"heads":[{{"name":"mainline","rev":"zzz"}}],"history":[]}}"#
        );
        fs::create_dir_all(cache.path().parent().unwrap()).unwrap();
        fs::write(cache.path(), doc).unwrap();
        assert!(cache.load().is_none());
    }

    #[test]
    fn store_overwrites_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir);
        let (heads, history) = sample();
        cache.store(&heads, &history).unwrap();

        let new_heads = HeadSet::new(vec![ResolvedHead {
            name: HeadName::from("HEAD"),
            rev: oid(9),
        }])
        .unwrap();
        let new_history = History::from_segments(vec![HistorySegment {
            head: HeadName::from("HEAD"),
            revisions: vec![oid(9)],
        }]);
        cache.store(&new_heads, &new_history).unwrap();

        let (loaded_heads, loaded_history) = cache.load().unwrap();
        assert_eq!(loaded_heads, new_heads);
        assert_eq!(loaded_history, new_history);
    }
}
