//! Change notifications pushed by the editor layer.
//!
//! Editors report each transaction as a set of mapped position ranges; the
//! reflow engine turns those into [`DocChange`]s to drive cache invalidation
//! and incremental recomputation.

/// One mapped range from an editor transaction: the span `[from_old, to_old)`
/// in the pre-transaction document was replaced by `[from_new, to_new)` in
/// the post-transaction document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappedRange {
    pub from_old: usize,
    pub to_old: usize,
    pub from_new: usize,
    pub to_new: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Insert,
    Delete,
    Update,
}

/// Post-transaction position range touched by a change, widened to cover the
/// old span as well so stale cache entries on either side are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeRange {
    pub from: usize,
    pub to: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocChange {
    pub kind: ChangeKind,
    pub pos: usize,
    pub range: ChangeRange,
}

impl DocChange {
    pub fn from_mapped(mapped: &MappedRange) -> Self {
        let kind = if mapped.to_new > mapped.from_new {
            ChangeKind::Insert
        } else if mapped.from_old != mapped.to_old {
            ChangeKind::Delete
        } else {
            ChangeKind::Update
        };
        DocChange {
            kind,
            pos: mapped.from_new,
            range: ChangeRange {
                from: mapped.from_new.min(mapped.from_old),
                to: mapped.to_new.max(mapped.to_old),
            },
        }
    }
}
