//! Structural diffs of bytecode.
//!
//! Two instruction sequences are aligned on their longest common subsequence,
//! comparing instructions with `Instruction::same_structure`. Instructions of
//! the new sequence outside of that alignment were inserted or modified.
//! Instructions of the old sequence outside of it were deleted, and a deletion
//! is charged to the new instruction which took the deleted instructions'
//! place.

use crate::il::Instruction;
use std::collections::BTreeSet;

/// The difference between an old and a new instruction sequence.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct BytecodeDiff {
    // Offsets into the new sequence with no counterpart in the old one
    inserted: BTreeSet<usize>,
    // Offsets into the old sequence with no counterpart in the new one
    deleted: BTreeSet<usize>,
    // Offsets into the new sequence at which old instructions were deleted
    anchors: BTreeSet<usize>,
}

impl BytecodeDiff {
    /// Diff two instruction sequences.
    pub fn new(old: &[Instruction], new: &[Instruction]) -> BytecodeDiff {
        let n = old.len();
        let m = new.len();

        // lcs[i][j] is the length of the longest common subsequence of
        // old[i..] and new[j..].
        let mut lcs = vec![vec![0usize; m + 1]; n + 1];
        for i in (0..n).rev() {
            for j in (0..m).rev() {
                lcs[i][j] = if old[i].same_structure(&new[j]) {
                    lcs[i + 1][j + 1] + 1
                } else {
                    lcs[i + 1][j].max(lcs[i][j + 1])
                };
            }
        }

        let mut diff = BytecodeDiff::default();
        let anchor = |j: usize| j.min(m.saturating_sub(1));

        let (mut i, mut j) = (0, 0);
        while i < n || j < m {
            if i < n && j < m && old[i].same_structure(&new[j]) {
                i += 1;
                j += 1;
            } else if i < n && (j == m || lcs[i + 1][j] >= lcs[i][j + 1]) {
                diff.deleted.insert(i);
                if m > 0 {
                    diff.anchors.insert(anchor(j));
                }
                i += 1;
            } else {
                diff.inserted.insert(j);
                j += 1;
            }
        }

        diff
    }

    /// Returns `true` if both sequences have the same structure.
    pub fn is_empty(&self) -> bool {
        self.inserted.is_empty() && self.deleted.is_empty()
    }

    pub fn inserted(&self) -> &BTreeSet<usize> {
        &self.inserted
    }

    pub fn deleted(&self) -> &BTreeSet<usize> {
        &self.deleted
    }

    /// Every offset into the new sequence touched by the change: inserted or
    /// modified instructions, and the places of deleted ones.
    pub fn changed(&self) -> BTreeSet<usize> {
        self.inserted.union(&self.anchors).cloned().collect()
    }
}

/// The offsets of `new` changed with respect to `old`.
pub fn changed_offsets(old: &[Instruction], new: &[Instruction]) -> BTreeSet<usize> {
    BytecodeDiff::new(old, new).changed()
}
