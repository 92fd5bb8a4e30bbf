//! Line-level splitting for blocks whose host can supply line rectangles.
//!
//! When the rendering surface exposes inline geometry, a paragraph that
//! overflows a page can be cut between lines instead of moving wholesale.
//! Rectangles are clustered into lines by vertical position, then a split
//! point is chosen under the widow/orphan constraints. Hosts without line
//! geometry simply skip this module; the packer's block-level rules apply.

use crate::config::PaginationConfig;
use crate::surface::{SurfaceElement, SurfaceError};
use quire_doc::NodeKind;

/// Vertical tolerance when clustering rectangles into lines.
const CLUSTER_TOLERANCE_PX: f32 = 2.0;

const EPSILON: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineInfo {
    pub index: usize,
    /// Top offset relative to the block's first line, pixels.
    pub top: f32,
    pub bottom: f32,
    pub height: f32,
    pub is_first: bool,
    pub is_last: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockLines {
    pub line_count: usize,
    pub lines: Vec<LineInfo>,
    pub total_height: f32,
    pub splittable_at_line: bool,
}

/// Chosen division of a block's lines between the current and next page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitPoint {
    pub keep_lines: usize,
    pub keep_height: f32,
    pub overflow_lines: usize,
    pub overflow_height: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct LineSplitter {
    widow_lines: usize,
    orphan_lines: usize,
}

impl LineSplitter {
    pub fn new(config: &PaginationConfig) -> Self {
        Self {
            widow_lines: config.widow_lines,
            orphan_lines: config.orphan_lines,
        }
    }

    /// Block kinds that may be cut between lines.
    pub fn is_splittable_kind(kind: NodeKind) -> bool {
        matches!(
            kind,
            NodeKind::Paragraph | NodeKind::ListItem | NodeKind::Blockquote
        )
    }

    /// Extract the line list of a rendered block by clustering the
    /// rectangles of its text nodes and inline elements.
    pub fn measure_lines(&self, element: &dyn SurfaceElement) -> Result<BlockLines, SurfaceError> {
        let rects = element.inline_rects_px()?;

        // Cluster by top edge within the tolerance.
        let mut clusters: Vec<(f32, f32)> = Vec::new();
        for rect in &rects {
            match clusters
                .iter_mut()
                .find(|(top, _)| (rect.top() - *top).abs() <= CLUSTER_TOLERANCE_PX)
            {
                Some(cluster) => {
                    cluster.0 = cluster.0.min(rect.top());
                    cluster.1 = cluster.1.max(rect.bottom());
                }
                None => clusters.push((rect.top(), rect.bottom())),
            }
        }
        clusters.sort_by(|a, b| a.0.total_cmp(&b.0));

        let origin = clusters.first().map(|&(top, _)| top).unwrap_or(0.0);
        let count = clusters.len();
        let lines: Vec<LineInfo> = clusters
            .iter()
            .enumerate()
            .map(|(index, &(top, bottom))| LineInfo {
                index,
                top: top - origin,
                bottom: bottom - origin,
                height: bottom - top,
                is_first: index == 0,
                is_last: index + 1 == count,
            })
            .collect();
        let total_height = lines.last().map(|line| line.bottom).unwrap_or(0.0);

        Ok(BlockLines {
            line_count: count,
            lines,
            total_height,
            splittable_at_line: count > 1,
        })
    }

    /// Pick a split point for a block against the space left on the page.
    pub fn calculate_split_point(&self, block: &BlockLines, available_height: f32) -> SplitPoint {
        let count = block.line_count;
        let total = block.total_height;
        let all_forward = SplitPoint {
            keep_lines: 0,
            keep_height: 0.0,
            overflow_lines: count,
            overflow_height: total,
        };
        let all_kept = SplitPoint {
            keep_lines: count,
            keep_height: total,
            overflow_lines: 0,
            overflow_height: 0.0,
        };

        if !block.splittable_at_line || count <= 1 {
            return if total <= available_height + EPSILON {
                all_kept
            } else {
                all_forward
            };
        }

        let mut keep = block
            .lines
            .iter()
            .take_while(|line| line.bottom <= available_height + EPSILON)
            .count();
        if keep == count {
            return all_kept;
        }
        if keep > 0 && keep < self.orphan_lines {
            return all_forward;
        }

        let remainder = count - keep;
        if remainder < self.widow_lines {
            keep = keep.saturating_sub(self.widow_lines - remainder);
            if keep == 0 || keep < self.orphan_lines {
                return all_forward;
            }
        }
        if keep == 0 {
            return all_forward;
        }

        let keep_height = block.lines[keep - 1].bottom;
        SplitPoint {
            keep_lines: keep,
            keep_height,
            overflow_lines: count - keep,
            overflow_height: total - keep_height,
        }
    }
}
