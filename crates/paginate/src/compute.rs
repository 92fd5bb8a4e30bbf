//! Deterministic packing of measured blocks into page boundaries.

use crate::PaginationError;
use crate::config::PaginationConfig;
use crate::measure::{BlockMeasurement, Measurer};
use crate::model::{PageBoundary, PaginationModel, Placement};
use quire_doc::{DocNode, Document, NodeKind};
use quire_types::PageDimensions;
use std::cell::RefCell;
use std::rc::Rc;

/// Tolerance for floating point comparisons against the page budget.
const EPSILON: f32 = 0.01;

/// A page being filled during a pass.
struct OpenPage {
    number: u32,
    start_pos: usize,
    forced: bool,
    height: f32,
    placements: Vec<Placement>,
}

impl OpenPage {
    fn new(number: u32, start_pos: usize, forced: bool) -> Self {
        Self {
            number,
            start_pos,
            forced,
            height: 0.0,
            placements: Vec::new(),
        }
    }

    fn place(&mut self, pos: usize, height: f32, kind: NodeKind) {
        self.placements.push(Placement {
            pos,
            height,
            kind,
            is_page_break: false,
        });
        self.height += height;
    }

    fn into_boundary(self, end_pos: usize) -> PageBoundary {
        PageBoundary {
            page_number: self.number,
            start_pos: self.start_pos,
            end_pos: end_pos.max(self.start_pos),
            content_height: self.height,
            forced_break: self.forced,
            node_positions: self.placements,
        }
    }
}

/// Packs an ordered sequence of measurements into pages, honoring forced
/// breaks, the orphan guard, and container splitting.
///
/// A computer without an attached [`Measurer`] can still [`PageComputer::pack`]
/// pre-measured blocks (exporters use this), but `compute`/`compute_from`
/// fail with [`PaginationError::MeasurerNotAttached`].
pub struct PageComputer {
    dims: PageDimensions,
    default_line_height: f32,
    measurer: Option<Rc<RefCell<Measurer>>>,
}

impl PageComputer {
    pub fn new(config: &PaginationConfig, dims: PageDimensions) -> Self {
        Self {
            dims,
            default_line_height: config.default_line_height,
            measurer: None,
        }
    }

    pub fn attach_measurer(&mut self, measurer: Rc<RefCell<Measurer>>) {
        self.measurer = Some(measurer);
    }

    pub fn set_dimensions(&mut self, dims: PageDimensions) {
        self.dims = dims;
    }

    pub fn apply_config(&mut self, config: &PaginationConfig, dims: PageDimensions) {
        self.default_line_height = config.default_line_height;
        self.dims = dims;
    }

    fn measurer(&self) -> Result<&Rc<RefCell<Measurer>>, PaginationError> {
        self.measurer
            .as_ref()
            .ok_or(PaginationError::MeasurerNotAttached)
    }

    /// Full pass over the document.
    pub fn compute(&self, doc: &Document) -> Result<PaginationModel, PaginationError> {
        let measurements = self.measurer()?.borrow_mut().measure_document(doc);
        Ok(self.pack(&measurements))
    }

    /// Incremental pass: keep every page of `prior` that strictly precedes
    /// the page containing `from`, re-measure the rest of the document, and
    /// pack from there. Output is equivalent to a full pass by the page-set
    /// equality predicate.
    pub fn compute_from(
        &self,
        doc: &Document,
        prior: &PaginationModel,
        from: usize,
    ) -> Result<PaginationModel, PaginationError> {
        let measurer = self.measurer()?;
        let kept_count = kept_page_count(prior, from);
        if kept_count == 0 {
            return self.compute(doc);
        }
        let mut pages: Vec<PageBoundary> = prior.pages[..kept_count].to_vec();
        let boundary_end = pages[kept_count - 1].end_pos;
        let resume_forced = prior.pages[kept_count].forced_break;
        // A forced boundary already consumed its break node; skip past it.
        let resume_pos = if resume_forced {
            boundary_end + 1
        } else {
            boundary_end
        };

        let requests: Vec<(usize, &DocNode)> =
            doc.blocks().filter(|&(pos, _)| pos >= resume_pos).collect();
        let measurements = measurer.borrow_mut().measure_batch(&requests);

        let kept_height: f32 = pages
            .iter()
            .flat_map(|page| page.node_positions.iter())
            .map(|placement| placement.height)
            .sum();
        let tail_height: f32 = measurements
            .iter()
            .filter(|m| m.kind != NodeKind::PageBreak)
            .map(|m| m.height)
            .sum();

        let next_number = pages.len() as u32 + 1;
        pages.extend(self.pack_from(&measurements, next_number, resume_pos, resume_forced, false));
        Ok(PaginationModel {
            pages,
            dimensions: self.dims.clone(),
            total_content_height: kept_height + tail_height,
        })
    }

    /// Pack pre-measured blocks into a fresh model.
    pub fn pack(&self, measurements: &[BlockMeasurement]) -> PaginationModel {
        let total: f32 = measurements
            .iter()
            .filter(|m| m.kind != NodeKind::PageBreak)
            .map(|m| m.height)
            .sum();
        PaginationModel {
            pages: self.pack_from(measurements, 1, 0, false, true),
            dimensions: self.dims.clone(),
            total_content_height: total,
        }
    }

    fn pack_from(
        &self,
        measurements: &[BlockMeasurement],
        first_number: u32,
        start_pos: usize,
        forced: bool,
        emit_empty_tail: bool,
    ) -> Vec<PageBoundary> {
        let available = self.dims.content_height;
        let mut pages: Vec<PageBoundary> = Vec::new();
        let mut page = OpenPage::new(first_number, start_pos, forced);

        for block in measurements {
            // Forced break: consume the node as a boundary.
            if block.kind == NodeKind::PageBreak {
                let number = page.number;
                pages.push(page.into_boundary(block.pos));
                page = OpenPage::new(number + 1, block.pos + 1, true);
                continue;
            }

            // Fits on the current page.
            if page.height + block.height <= available + EPSILON {
                page.place(block.pos, block.height, block.kind);
                continue;
            }

            // Overflow: try keeping a leading slice of a splittable
            // container in the remaining space.
            let mut consumed = 0usize;
            if let (true, Some(items), Some(min_height)) = (
                block.splittable,
                block.item_heights.as_deref(),
                block.min_height,
            ) {
                let remaining = (available - page.height).max(0.0);
                if !items.is_empty() && remaining + EPSILON >= min_height {
                    // The first item (a table's header row) is kept
                    // unconditionally, the rest greedily.
                    let mut kept = 1usize;
                    let mut kept_height = items[0];
                    while kept < items.len() && kept_height + items[kept] <= remaining + EPSILON {
                        kept_height += items[kept];
                        kept += 1;
                    }
                    // Widow correction: never leave a single trailing item
                    // when three or more would be kept.
                    if items.len() - kept == 1 && kept >= 3 {
                        kept -= 1;
                        kept_height -= items[kept];
                    }
                    if kept > 0 {
                        page.place(block.pos, kept_height, block.kind);
                        consumed = kept;
                    }
                    if consumed == items.len() {
                        // Every item fit in the remaining space.
                        continue;
                    }
                }
            }

            // Orphan guard: a short trailing paragraph moves to the next
            // page rather than staying alone at the bottom.
            let mut carried: Option<Placement> = None;
            if let Some(last) = page.placements.last() {
                if last.kind == NodeKind::Paragraph
                    && last.height < 2.0 * self.default_line_height
                {
                    if let Some(popped) = page.placements.pop() {
                        page.height -= popped.height;
                        carried = Some(popped);
                    }
                }
            }

            let boundary_pos = carried.as_ref().map(|c| c.pos).unwrap_or(block.pos);
            if !page.placements.is_empty() {
                let number = page.number;
                pages.push(page.into_boundary(boundary_pos));
                page = OpenPage::new(number + 1, boundary_pos, false);
            }
            if let Some(placement) = carried {
                page.height += placement.height;
                page.placements.push(placement);
            }

            // Remainder of the overflowing block.
            let items = block.item_heights.as_deref().unwrap_or(&[]);
            let splitting = block.splittable
                && !items.is_empty()
                && (consumed > 0 || block.height > available + EPSILON);
            if splitting {
                let mut idx = consumed;
                while idx < items.len() {
                    // Continuation slices of a table re-render the header
                    // row, so reserve its height up front.
                    let reserve = if block.kind == NodeKind::Table && idx > 0 {
                        block.min_height.unwrap_or(0.0)
                    } else {
                        0.0
                    };
                    let capacity = (available - page.height).max(0.0);
                    let slice_start = idx;
                    let mut slice_height = reserve;
                    while idx < items.len() && slice_height + items[idx] <= capacity + EPSILON {
                        slice_height += items[idx];
                        idx += 1;
                    }
                    if idx == slice_start {
                        if !page.placements.is_empty() {
                            // Retry on a fresh page before forcing an item
                            // into space another block already claimed.
                            let number = page.number;
                            pages.push(page.into_boundary(block.pos));
                            page = OpenPage::new(number + 1, block.pos, false);
                            continue;
                        }
                        // Force one item through to guarantee progress.
                        slice_height += items[idx];
                        idx += 1;
                    }
                    page.place(block.pos, slice_height, block.kind);
                    if idx < items.len() {
                        let number = page.number;
                        pages.push(page.into_boundary(block.pos));
                        page = OpenPage::new(number + 1, block.pos, false);
                    }
                }
            } else {
                if !page.placements.is_empty() && page.height + block.height > available + EPSILON {
                    // The carried orphan plus this block still overflow;
                    // give the block its own page.
                    let number = page.number;
                    pages.push(page.into_boundary(block.pos));
                    page = OpenPage::new(number + 1, block.pos, false);
                }
                // Oversized non-splittable blocks overflow their page and
                // are tolerated.
                page.place(block.pos, block.height, block.kind);
            }
        }

        // End of input: drop a trailing empty page unless it is the only one.
        if !page.placements.is_empty() || (pages.is_empty() && emit_empty_tail) {
            let end = measurements
                .last()
                .map(|m| m.pos + 1)
                .unwrap_or(page.start_pos);
            pages.push(page.into_boundary(end));
        }
        pages
    }
}

/// How many leading pages of `prior` survive a change at `from`.
///
/// Strict-predecessor rule: the page containing `from` is recomputed, the
/// final page is always recomputed, and we back off further when the
/// boundary itself is suspect (a forced break exactly at the change point,
/// or a container slice straddling into the recomputed region).
fn kept_page_count(prior: &PaginationModel, from: usize) -> usize {
    if prior.pages.is_empty() {
        return 0;
    }
    let mut k = prior
        .pages
        .iter()
        .position(|page| page.end_pos > from)
        .unwrap_or(prior.pages.len());
    if k == prior.pages.len() {
        k -= 1;
    }
    while k > 0 {
        let prev = &prior.pages[k - 1];
        let touched_break = prev.end_pos == from && prior.pages[k].forced_break;
        let straddles = prev
            .node_positions
            .last()
            .is_some_and(|placement| placement.pos >= prev.end_pos);
        if touched_break || straddles {
            k -= 1;
        } else {
            break;
        }
    }
    k
}
