//! Turn a content rewrite into the minimal insert/remove spans that
//! produce it.

use similar::{Algorithm, DiffOp, DiffTag, TextDiff};
use std::time::Duration;

/// One planned edit, addressed by rune offsets into the text being diffed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiffEdit {
    Insert { at: usize, text: String },
    Remove { start: usize, end: usize },
}

/// What an `apply_diff` call changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ApplyDiffSummary {
    pub inserted_chars: usize,
    pub removed_chars: usize,
    /// Number of insert/remove events recorded.
    pub edits: usize,
}

impl ApplyDiffSummary {
    pub fn is_empty(&self) -> bool {
        self.edits == 0
    }
}

/// Plan the edits turning `old` into `new` using a rune-level Myers diff.
///
/// Edits are returned last-offset-first so each one can be applied to the
/// live text without shifting the offsets of those still pending. Within a
/// replaced span the removal comes before the insertion at the same offset.
/// When `timeout` elapses the diff degrades to coarser spans; the edits still
/// produce `new` exactly.
pub fn plan_edits(old: &str, new: &str, timeout: Option<Duration>) -> Vec<DiffEdit> {
    let mut config = TextDiff::configure();
    config.algorithm(Algorithm::Myers);
    if let Some(timeout) = timeout {
        config.timeout(timeout);
    }
    let diff = config.diff_chars(old, new);
    plan_from_ops(diff.ops(), diff.new_slices())
}

/// Lay the ops out against a running offset into the old text, then reverse
/// them. An op's own `old_range` is not used for placement: after cleanup an
/// insert can carry a range that does not follow the op before it.
fn plan_from_ops(ops: &[DiffOp], new_slices: &[&str]) -> Vec<DiffEdit> {
    let mut groups: Vec<Vec<DiffEdit>> = Vec::with_capacity(ops.len());
    let mut offset = 0;
    for op in ops {
        let (tag, old_range, new_range) = op.as_tag_tuple();
        let removed = old_range.len();
        let mut group = Vec::new();
        if matches!(tag, DiffTag::Delete | DiffTag::Replace) {
            group.push(DiffEdit::Remove {
                start: offset,
                end: offset + removed,
            });
        }
        if matches!(tag, DiffTag::Insert | DiffTag::Replace) {
            group.push(DiffEdit::Insert {
                at: offset,
                text: new_slices[new_range].concat(),
            });
        }
        offset += removed;
        if !group.is_empty() {
            groups.push(group);
        }
    }
    groups.into_iter().rev().flatten().collect()
}
