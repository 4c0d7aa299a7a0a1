//! Input framing: parse identifier-keyed lines into an [`InputMapping`].
//!
//! The first whitespace-delimited token of each line is resolved through
//! the backend, so abbreviated hashes and symbolic names are accepted and
//! collapse onto their canonical OID. Resolution failures abort the run
//! with the offending line number — a token that is not a revision at all
//! is presumed an input-authoring mistake, not a legitimately-unreachable
//! commit.

use std::io::BufRead;

use thiserror::Error;
use upsort_core::InputMapping;
use upsort_git::{GitBackend, GitError};

/// A fatal problem with the input stream.
#[derive(Debug, Error)]
pub enum InputError {
    /// A line carried no identifier token at all.
    #[error("did not find a commit hash on line {line}:\n{text}")]
    Malformed {
        /// 1-based input line number.
        line: usize,
        /// The offending line, verbatim.
        text: String,
    },

    /// A line's identifier did not resolve to any revision.
    #[error("commit hash on line {line} not found in the repository:\n{text}")]
    Unknown {
        /// 1-based input line number.
        line: usize,
        /// The offending line, verbatim.
        text: String,
    },

    /// The backend failed while resolving an identifier.
    #[error(transparent)]
    Git(GitError),

    /// The input stream could not be read.
    #[error("could not read input: {0}")]
    Io(#[from] std::io::Error),
}

/// Read every line of `reader` into a mapping keyed by resolved OID.
///
/// Lines sharing a revision (including via different spellings) are kept
/// together in input order.
///
/// # Errors
/// Fails fast on the first unreadable, empty, or unresolvable line.
pub fn read_mapping(
    reader: impl BufRead,
    git: &dyn GitBackend,
) -> Result<InputMapping, InputError> {
    let mut mapping = InputMapping::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let number = index + 1;
        let Some(token) = line.split_whitespace().next() else {
            return Err(InputError::Malformed {
                line: number,
                text: line,
            });
        };
        let rev = match git.rev_parse(token) {
            Ok(rev) => rev,
            Err(GitError::NotFound { .. }) => {
                return Err(InputError::Unknown {
                    line: number,
                    text: line,
                });
            }
            Err(e) => return Err(InputError::Git(e)),
        };
        mapping.insert(rev, line);
    }
    Ok(mapping)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use upsort_git::MemoryBackend;
    use upsort_git::memory::oid;

    use super::*;

    fn backend() -> MemoryBackend {
        let mut git = MemoryBackend::new();
        git.commit(oid(1), &[]);
        git.commit(oid(2), &[oid(1)]);
        git
    }

    #[test]
    fn groups_lines_by_resolved_revision() {
        let git = backend();
        let input = format!(
            "{} first patch\n{} second patch\n{} also first\n",
            oid(1),
            oid(2),
            // Abbreviated spelling of oid(1) collapses onto the same entry.
            &oid(1).to_string()[..12],
        );
        let mapping = read_mapping(Cursor::new(input), &git).unwrap();
        assert_eq!(mapping.len(), 2);

        let leftovers = mapping.into_leftovers();
        assert_eq!(leftovers[0].0, oid(1));
        assert_eq!(
            leftovers[0].1,
            vec![
                format!("{} first patch", oid(1)),
                format!("{} also first", &oid(1).to_string()[..12]),
            ]
        );
    }

    #[test]
    fn unknown_identifier_cites_line_number() {
        let git = backend();
        let input = format!("{} fine\nnotahash extra text\n", oid(1));
        let err = read_mapping(Cursor::new(input), &git).unwrap_err();
        match err {
            InputError::Unknown { line, text } => {
                assert_eq!(line, 2);
                assert_eq!(text, "notahash extra text");
            }
            other => panic!("expected Unknown, got {other:?}"),
        }
    }

    #[test]
    fn blank_line_is_malformed() {
        let git = backend();
        let input = format!("{} fine\n\n", oid(1));
        let err = read_mapping(Cursor::new(input), &git).unwrap_err();
        assert!(matches!(err, InputError::Malformed { line: 2, .. }));
    }

    #[test]
    fn empty_input_is_empty_mapping() {
        let git = backend();
        let mapping = read_mapping(Cursor::new(""), &git).unwrap();
        assert!(mapping.is_empty());
    }

    #[test]
    fn payload_is_the_whole_line() {
        let git = backend();
        let line = format!("{}   indented  payload\twith tabs", oid(2));
        let mapping = read_mapping(Cursor::new(line.clone()), &git).unwrap();
        let leftovers = mapping.into_leftovers();
        assert_eq!(leftovers[0].1, vec![line]);
    }
}
