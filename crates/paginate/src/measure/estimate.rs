//! Content-based height estimation.
//!
//! Used whenever no rendering surface is attached (or a probe fails). The
//! formulas are deliberately simple: deterministic, total, and monotone in
//! text length, so the packer behaves identically across hosts.

use quire_doc::{DocNode, NodeKind};

#[derive(Debug, Clone, Copy)]
pub(crate) struct EstimateParams {
    pub content_width: f32,
    pub line_height: f32,
    pub pixels_per_point: f32,
}

/// Fallback height when an image carries no height attribute.
const IMAGE_FALLBACK_PT: f32 = 200.0;

/// Estimated height of one table row, header rows included.
pub(crate) const TABLE_ROW_PT: f32 = 30.0;

pub(crate) fn estimate_height(node: &DocNode, params: &EstimateParams) -> f32 {
    match node {
        DocNode::Paragraph { .. } => paragraph_height(node.text_len(), params),
        DocNode::Heading { level, .. } => {
            heading_height(*level, node.text_len(), params.content_width)
        }
        DocNode::CodeBlock { .. } => {
            let newlines = node.text_content().matches('\n').count() as f32;
            (newlines + 1.0) * 16.0 + 24.0
        }
        DocNode::Blockquote { children } => {
            children
                .iter()
                .map(|child| estimate_height(child, params))
                .sum::<f32>()
                + 16.0
        }
        DocNode::BulletList { children } | DocNode::OrderedList { children, .. } => children
            .iter()
            .map(|item| list_item_height(item, params))
            .sum(),
        DocNode::Table { children } => children.len() as f32 * TABLE_ROW_PT + 4.0,
        DocNode::Image { attrs } => attrs
            .height
            .map(|px| px / params.pixels_per_point)
            .unwrap_or(IMAGE_FALLBACK_PT),
        DocNode::HorizontalRule => 20.0,
        DocNode::PageBreak => 0.0,
        // Anything else behaves like a paragraph of its text content.
        _ => paragraph_height(node.text_len(), params),
    }
}

fn paragraph_height(text_len: usize, params: &EstimateParams) -> f32 {
    let chars_per_line = (params.content_width / 7.0).floor().max(1.0);
    let lines = (text_len as f32 / chars_per_line).ceil().max(1.0);
    lines * params.line_height + 12.0
}

fn heading_height(level: u8, text_len: usize, content_width: f32) -> f32 {
    let font_size = (28.0 - 4.0 * level as f32).max(12.0);
    let chars_per_line = (content_width / (font_size * 0.6)).max(1.0);
    let lines = (text_len as f32 / chars_per_line).ceil().max(1.0);
    lines * font_size * 1.2 + font_size * 0.8
}

/// One list item: its block children stacked, never shorter than a line.
fn list_item_height(item: &DocNode, params: &EstimateParams) -> f32 {
    let stacked: f32 = item
        .children()
        .iter()
        .map(|child| estimate_height(child, params))
        .sum();
    stacked.max(params.line_height)
}

/// Per-child heights for containers whose items may be redistributed across
/// pages: table rows and list items.
pub(crate) fn item_heights(node: &DocNode, params: &EstimateParams) -> Option<Vec<f32>> {
    match node {
        DocNode::Table { children } => Some(vec![TABLE_ROW_PT; children.len()]),
        DocNode::BulletList { children } | DocNode::OrderedList { children, .. } => Some(
            children
                .iter()
                .map(|item| list_item_height(item, params))
                .collect(),
        ),
        _ => None,
    }
}

/// Minimum height that must accompany the first kept item of a splittable
/// container: a header row for tables, the leading item for lists. A split
/// is refused when less than this remains, so the unconditionally-kept
/// first item always fits.
pub(crate) fn min_split_height(node: &DocNode, params: &EstimateParams) -> Option<f32> {
    match node {
        DocNode::Table { .. } => Some(TABLE_ROW_PT),
        DocNode::BulletList { children } | DocNode::OrderedList { children, .. } => Some(
            children
                .first()
                .map(|item| list_item_height(item, params))
                .unwrap_or(params.line_height),
        ),
        _ => None,
    }
}

pub(crate) fn is_splittable(kind: NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::Table | NodeKind::BulletList | NodeKind::OrderedList
    )
}
