//! Head registry configuration (`upsort.toml`).
//!
//! The configuration declares the priority-ordered list of upstream heads:
//! each entry names a head, the branch to resolve on it, and the set of
//! fetch URLs under which that upstream may be configured as a remote.
//! Loaded once at startup into an immutable [`Config`] that is passed to
//! the head resolver — no ambient global state.
//!
//! ```toml
//! [[head]]
//! name = "mainline"
//! urls = ["git://git.example.org/pub/scm/mainline.git"]
//!
//! [[head]]
//! name = "net"
//! branch = "main"
//! urls = ["git://git.example.org/pub/scm/net.git"]
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::SortError;

/// File name looked for on the search path.
pub const CONFIG_FILE_NAME: &str = "upsort.toml";

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Top-level upsort configuration.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Repository to sort against, overriding discovery from the current
    /// directory. `GIT_DIR` in the environment takes precedence over this.
    #[serde(default)]
    pub git_dir: Option<PathBuf>,

    /// Priority-ordered head definitions, highest priority first.
    #[serde(rename = "head", default)]
    pub heads: Vec<HeadDefinition>,
}

/// One priority slot in the head registry.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeadDefinition {
    /// Display name, unique across the registry.
    pub name: String,

    /// Branch to resolve on whichever remote matches (default `"master"`).
    #[serde(default = "default_branch")]
    pub branch: String,

    /// Fetch URLs this upstream is known under. A head matches when any of
    /// its URLs equals a configured remote's fetch URL.
    #[serde(default)]
    pub urls: Vec<String>,
}

fn default_branch() -> String {
    "master".to_owned()
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Error loading an upsort configuration file.
#[derive(Debug)]
pub struct ConfigError {
    /// The path that was being loaded (if available).
    pub path: Option<PathBuf>,
    /// Human-readable message with line-level detail when possible.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(p) = &self.path {
            write!(f, "{}: {}", p.display(), self.message)
        } else {
            write!(f, "config error: {}", self.message)
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    /// Load configuration from the first `upsort.toml` found on the search
    /// path: the current directory, then the user config directory
    /// (`$XDG_CONFIG_HOME/upsort/` or platform equivalent).
    ///
    /// # Errors
    /// [`SortError::ConfigMissing`] when no file exists anywhere on the
    /// search path, [`SortError::Config`] when a file exists but cannot be
    /// read or parsed.
    pub fn find() -> Result<(PathBuf, Self), SortError> {
        let candidates = search_paths();
        for path in &candidates {
            if path.exists() {
                let config = Self::load(path)?;
                return Ok((path.clone(), config));
            }
        }
        let searched = candidates
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        Err(SortError::ConfigMissing { searched })
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when the file cannot be read (including
    /// not-found — this entry point is also used for explicit `--config`
    /// paths, where a missing file is a user error) or fails to parse.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError {
            path: Some(path.to_owned()),
            message: format!("could not read file: {e}"),
        })?;
        Self::parse(&contents).map_err(|mut e| {
            e.path = Some(path.to_owned());
            e
        })
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    /// Returns [`ConfigError`] on invalid TOML, unknown fields, or an empty
    /// head registry.
    pub fn parse(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| {
            let mut message = e.message().to_owned();
            if let Some(span) = e.span() {
                // Calculate line number from byte offset.
                let line = toml_str[..span.start]
                    .chars()
                    .filter(|&c| c == '\n')
                    .count()
                    + 1;
                message = format!("line {line}: {message}");
            }
            ConfigError {
                path: None,
                message,
            }
        })?;
        if config.heads.is_empty() {
            return Err(ConfigError {
                path: None,
                message: "at least one [[head]] definition is required".to_owned(),
            });
        }
        Ok(config)
    }
}

fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("upsort").join(CONFIG_FILE_NAME));
    }
    paths
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
