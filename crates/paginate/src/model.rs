//! The published output of a pagination pass.

use quire_doc::NodeKind;
use quire_types::PageDimensions;

/// One block (or a contiguous slice of a splittable block) attributed to a
/// page. For a partial container, `height` reflects only the kept portion.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub pos: usize,
    pub height: f32,
    pub kind: NodeKind,
    pub is_page_break: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageBoundary {
    /// 1-indexed, strictly increasing across the model.
    pub page_number: u32,
    pub start_pos: usize,
    pub end_pos: usize,
    /// Sum of placement heights on this page.
    pub content_height: f32,
    /// True iff this page began because a forced break node was consumed.
    pub forced_break: bool,
    pub node_positions: Vec<Placement>,
}

/// Immutable result of one compute pass. The reflow engine swaps the current
/// model atomically at the end of a pass; prior models are discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct PaginationModel {
    pub pages: Vec<PageBoundary>,
    pub dimensions: PageDimensions,
    /// Sum of all non-break block heights in the document.
    pub total_content_height: f32,
}

impl PaginationModel {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page(&self, page_number: u32) -> Option<&PageBoundary> {
        if page_number == 0 {
            return None;
        }
        self.pages.get(page_number as usize - 1)
    }

    /// Page number whose `[start_pos, end_pos)` range contains `pos`; the
    /// last page for positions beyond the final boundary. A position that
    /// falls exactly on a consumed break resolves to the following page.
    pub fn page_for_position(&self, pos: usize) -> Option<u32> {
        for page in &self.pages {
            if pos < page.end_pos {
                return Some(page.page_number);
            }
        }
        self.pages.last().map(|page| page.page_number)
    }

    /// The page-set equality predicate used to decide whether `pages-changed`
    /// fires: same page count and, per page, identical `start_pos`,
    /// `end_pos`, and `forced_break`. Placement membership is ignored.
    pub fn same_pages(&self, other: &PaginationModel) -> bool {
        self.pages.len() == other.pages.len()
            && self
                .pages
                .iter()
                .zip(other.pages.iter())
                .all(|(a, b)| {
                    a.start_pos == b.start_pos
                        && a.end_pos == b.end_pos
                        && a.forced_break == b.forced_break
                })
    }
}
