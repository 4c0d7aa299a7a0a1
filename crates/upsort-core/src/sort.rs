//! Order resolver / merge engine.
//!
//! Walks the heads in priority order and each head's revisions in their
//! stored oldest-first order, popping matching entries out of the input
//! mapping into the output sequence. One linear pass; entries that never
//! match remain in the mapping and are the caller's unresolved set.

use std::collections::HashMap;

use upsort_git::GitOid;

use crate::history::{HeadName, History};

// ---------------------------------------------------------------------------
// InputMapping
// ---------------------------------------------------------------------------

/// The per-run mapping from revision to its payload lines.
///
/// Multiple payloads inserted under one revision stay together in their
/// original relative order and are emitted together at that revision's
/// position. Leftover iteration follows first-insertion order, so the
/// unresolved report is deterministic and matches the input.
#[derive(Debug, Default)]
pub struct InputMapping {
    entries: HashMap<GitOid, Vec<String>>,
    order: Vec<GitOid>,
}

impl InputMapping {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate another payload line with `rev`.
    pub fn insert(&mut self, rev: GitOid, payload: String) {
        let entry = self.entries.entry(rev).or_default();
        if entry.is_empty() {
            self.order.push(rev);
        }
        entry.push(payload);
    }

    /// Remove and return the payloads for `rev`, or `None` when the
    /// mapping holds no entry for it.
    pub fn try_remove(&mut self, rev: GitOid) -> Option<Vec<String>> {
        self.entries.remove(&rev)
    }

    /// Number of distinct revisions still in the mapping.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume the mapping, yielding the remaining entries in
    /// first-insertion order.
    #[must_use]
    pub fn into_leftovers(self) -> Vec<(GitOid, Vec<String>)> {
        let mut entries = self.entries;
        self.order
            .into_iter()
            .filter_map(|rev| entries.remove(&rev).map(|payloads| (rev, payloads)))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// SortedEntry / sort_mapping
// ---------------------------------------------------------------------------

/// One resolved slot of the output sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortedEntry {
    /// The head the matched revision is attributed to.
    pub head: HeadName,
    /// The payload lines, in original relative order.
    pub payloads: Vec<String>,
}

/// Partition `mapping` according to `history`.
///
/// Returns the matched entries in upstream order together with the
/// residual mapping (input identifiers valid as revisions but unreachable
/// from any configured head).
#[must_use]
pub fn sort_mapping(history: &History, mut mapping: InputMapping) -> (Vec<SortedEntry>, InputMapping) {
    let mut sorted = Vec::new();
    for segment in history.segments() {
        for rev in &segment.revisions {
            if let Some(payloads) = mapping.try_remove(*rev) {
                sorted.push(SortedEntry {
                    head: segment.head.clone(),
                    payloads,
                });
            }
        }
    }
    (sorted, mapping)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use upsort_git::memory::oid;

    use super::*;
    use crate::history::HistorySegment;

    fn two_head_history() -> History {
        History::from_segments(vec![
            HistorySegment {
                head: HeadName::from("a"),
                revisions: vec![oid(1), oid(3)],
            },
            HistorySegment {
                head: HeadName::from("b"),
                revisions: vec![oid(2)],
            },
        ])
    }

    #[test]
    fn sorts_by_upstream_order_and_reports_leftovers() {
        // Heads = [(A, rev1), (B, rev2)], History = {A: [c1, c3], B: [c2]},
        // Input = {c1: "x", c2: "y", c4: "z"}.
        let history = two_head_history();
        let mut mapping = InputMapping::new();
        mapping.insert(oid(1), "x".to_owned());
        mapping.insert(oid(2), "y".to_owned());
        mapping.insert(oid(4), "z".to_owned());

        let (sorted, residual) = sort_mapping(&history, mapping);
        let flat: Vec<_> = sorted
            .iter()
            .flat_map(|e| e.payloads.iter().cloned())
            .collect();
        assert_eq!(flat, ["x", "y"]);
        assert_eq!(sorted[0].head.as_str(), "a");
        assert_eq!(sorted[1].head.as_str(), "b");

        let leftovers = residual.into_leftovers();
        assert_eq!(leftovers, vec![(oid(4), vec!["z".to_owned()])]);
    }

    #[test]
    fn duplicate_keys_emit_together_in_input_order() {
        let history = two_head_history();
        let mut mapping = InputMapping::new();
        mapping.insert(oid(3), "first".to_owned());
        mapping.insert(oid(1), "other".to_owned());
        mapping.insert(oid(3), "second".to_owned());

        let (sorted, residual) = sort_mapping(&history, mapping);
        assert!(residual.is_empty());
        assert_eq!(sorted.len(), 2);
        assert_eq!(sorted[0].payloads, ["other"]);
        assert_eq!(sorted[1].payloads, ["first", "second"]);
    }

    #[test]
    fn empty_mapping_yields_empty_output() {
        let (sorted, residual) = sort_mapping(&two_head_history(), InputMapping::new());
        assert!(sorted.is_empty());
        assert!(residual.is_empty());
    }

    #[test]
    fn leftovers_preserve_input_order() {
        let history = two_head_history();
        let mut mapping = InputMapping::new();
        mapping.insert(oid(7), "later".to_owned());
        mapping.insert(oid(5), "earlier-key-inserted-second".to_owned());
        mapping.insert(oid(6), "third".to_owned());

        let (_, residual) = sort_mapping(&history, mapping);
        let keys: Vec<_> = residual.into_leftovers().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![oid(7), oid(5), oid(6)]);
    }

    mod properties {
        use proptest::prelude::*;

        use super::*;

        /// History over revisions 1..=40 split into up to 4 segments;
        /// input drawn from 1..=60, so some identifiers are unreachable.
        fn history_and_input() -> impl Strategy<Value = (History, Vec<(u8, String)>)> {
            let history = proptest::collection::vec(1u8..=40, 0..30).prop_map(|ids| {
                let mut seen = std::collections::HashSet::new();
                let unique: Vec<u8> = ids.into_iter().filter(|id| seen.insert(*id)).collect();
                let segments = unique
                    .chunks(10)
                    .enumerate()
                    .map(|(i, chunk)| HistorySegment {
                        head: HeadName::new(format!("head-{i}")),
                        revisions: chunk.iter().map(|&id| oid(id)).collect(),
                    })
                    .collect();
                History::from_segments(segments)
            });
            let input = proptest::collection::vec((1u8..=60, "[a-z]{1,8}"), 0..40);
            (history, input)
        }

        proptest! {
            #[test]
            fn no_entry_is_lost_or_duplicated((history, input) in history_and_input()) {
                let mut mapping = InputMapping::new();
                for (id, payload) in &input {
                    mapping.insert(oid(*id), payload.clone());
                }

                let (sorted, residual) = sort_mapping(&history, mapping);
                let leftovers = residual.into_leftovers();

                let emitted: usize = sorted.iter().map(|e| e.payloads.len()).sum();
                let left: usize = leftovers.iter().map(|(_, p)| p.len()).sum();
                prop_assert_eq!(emitted + left, input.len());

                // Each distinct input revision lands on exactly one side.
                let in_history: std::collections::HashSet<_> = history
                    .segments()
                    .iter()
                    .flat_map(|s| s.revisions.iter().copied())
                    .collect();
                for (rev, _) in &leftovers {
                    prop_assert!(!in_history.contains(rev));
                }
            }

            #[test]
            fn output_follows_history_order((history, input) in history_and_input()) {
                let mut mapping = InputMapping::new();
                for (id, payload) in &input {
                    mapping.insert(oid(*id), payload.clone());
                }
                let input_revs: std::collections::HashSet<_> =
                    input.iter().map(|(id, _)| oid(*id)).collect();

                let (sorted, _) = sort_mapping(&history, mapping);

                let expected: Vec<_> = history
                    .segments()
                    .iter()
                    .flat_map(|s| s.revisions.iter().copied())
                    .filter(|rev| input_revs.contains(rev))
                    .collect();
                prop_assert_eq!(sorted.len(), expected.len());
            }
        }
    }
}
