//! The in-memory document tree consumed by the pagination core.
//!
//! This is the structural representation handed over by the editor layer:
//! a root with ordered block children, a fixed node vocabulary, and a linear
//! position scheme. Positions are the identity used by measurement caching
//! and page boundaries, so they must be stable for unchanged content.
//!
//! Position scheme: a text leaf occupies as many positions as it has
//! characters, a content-less leaf (image, rule, hard break, page break)
//! occupies one, and a container occupies `2 + sum of child sizes` (one
//! position for each side of its boundary). Top-level child `i` therefore
//! starts at `1 + sum(size of children 0..i-1)`.

pub mod change;

pub use change::{ChangeKind, ChangeRange, DocChange, MappedRange};

/// Image attributes carried by the editor. `height`/`width` are rendered
/// pixels when present.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImageAttrs {
    pub src: String,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub alt: Option<String>,
}

/// A node in the document tree.
///
/// The vocabulary is fixed; anything an editor extension produces beyond it
/// must be mapped onto one of these variants before pagination.
#[derive(Debug, Clone, PartialEq)]
pub enum DocNode {
    Paragraph { children: Vec<DocNode> },
    Heading { level: u8, children: Vec<DocNode> },
    CodeBlock { children: Vec<DocNode> },
    Blockquote { children: Vec<DocNode> },
    BulletList { children: Vec<DocNode> },
    OrderedList { start: usize, children: Vec<DocNode> },
    ListItem { children: Vec<DocNode> },
    Table { children: Vec<DocNode> },
    TableRow { children: Vec<DocNode> },
    TableCell { children: Vec<DocNode> },
    Image { attrs: ImageAttrs },
    HorizontalRule,
    HardBreak,
    PageBreak,
    Text { text: String },
}

/// Discriminant tags for [`DocNode`].
///
/// Replaces stringly-typed identifiers for dispatch in the measurer and
/// packer, providing compile-time safety and cheap comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Paragraph,
    Heading,
    CodeBlock,
    Blockquote,
    BulletList,
    OrderedList,
    ListItem,
    Table,
    TableRow,
    TableCell,
    Image,
    HorizontalRule,
    HardBreak,
    PageBreak,
    Text,
}

impl NodeKind {
    /// Returns the wire tag used by editors and exporters.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Paragraph => "paragraph",
            NodeKind::Heading => "heading",
            NodeKind::CodeBlock => "codeBlock",
            NodeKind::Blockquote => "blockquote",
            NodeKind::BulletList => "bulletList",
            NodeKind::OrderedList => "orderedList",
            NodeKind::ListItem => "listItem",
            NodeKind::Table => "table",
            NodeKind::TableRow => "tableRow",
            NodeKind::TableCell => "tableCell",
            NodeKind::Image => "image",
            NodeKind::HorizontalRule => "horizontalRule",
            NodeKind::HardBreak => "hardBreak",
            NodeKind::PageBreak => "pageBreak",
            NodeKind::Text => "text",
        }
    }
}

impl DocNode {
    pub fn kind(&self) -> NodeKind {
        match self {
            DocNode::Paragraph { .. } => NodeKind::Paragraph,
            DocNode::Heading { .. } => NodeKind::Heading,
            DocNode::CodeBlock { .. } => NodeKind::CodeBlock,
            DocNode::Blockquote { .. } => NodeKind::Blockquote,
            DocNode::BulletList { .. } => NodeKind::BulletList,
            DocNode::OrderedList { .. } => NodeKind::OrderedList,
            DocNode::ListItem { .. } => NodeKind::ListItem,
            DocNode::Table { .. } => NodeKind::Table,
            DocNode::TableRow { .. } => NodeKind::TableRow,
            DocNode::TableCell { .. } => NodeKind::TableCell,
            DocNode::Image { .. } => NodeKind::Image,
            DocNode::HorizontalRule => NodeKind::HorizontalRule,
            DocNode::HardBreak => NodeKind::HardBreak,
            DocNode::PageBreak => NodeKind::PageBreak,
            DocNode::Text { .. } => NodeKind::Text,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, DocNode::Text { .. })
    }

    /// Text value of a text leaf, `None` otherwise.
    pub fn text(&self) -> Option<&str> {
        match self {
            DocNode::Text { text } => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn children(&self) -> &[DocNode] {
        match self {
            DocNode::Paragraph { children }
            | DocNode::Heading { children, .. }
            | DocNode::CodeBlock { children }
            | DocNode::Blockquote { children }
            | DocNode::BulletList { children }
            | DocNode::OrderedList { children, .. }
            | DocNode::ListItem { children }
            | DocNode::Table { children }
            | DocNode::TableRow { children }
            | DocNode::TableCell { children } => children,
            _ => &[],
        }
    }

    pub fn child_count(&self) -> usize {
        self.children().len()
    }

    /// Size of the node in the linear position space.
    pub fn size(&self) -> usize {
        match self {
            DocNode::Text { text } => text.chars().count(),
            DocNode::Image { .. }
            | DocNode::HorizontalRule
            | DocNode::HardBreak
            | DocNode::PageBreak => 1,
            _ => 2 + self.children().iter().map(DocNode::size).sum::<usize>(),
        }
    }

    /// Concatenated text content of the subtree.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let DocNode::Text { text } = self {
            out.push_str(text);
            return;
        }
        for child in self.children() {
            child.collect_text(out);
        }
    }

    /// Number of characters of text content, without building the string.
    pub fn text_len(&self) -> usize {
        match self {
            DocNode::Text { text } => text.chars().count(),
            _ => self.children().iter().map(DocNode::text_len).sum(),
        }
    }

    // --- construction helpers -------------------------------------------

    pub fn text_node(text: impl Into<String>) -> Self {
        DocNode::Text { text: text.into() }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        let text = text.into();
        let children = if text.is_empty() {
            Vec::new()
        } else {
            vec![DocNode::Text { text }]
        };
        DocNode::Paragraph { children }
    }

    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        DocNode::Heading {
            level,
            children: vec![DocNode::Text { text: text.into() }],
        }
    }

    pub fn code_block(text: impl Into<String>) -> Self {
        DocNode::CodeBlock {
            children: vec![DocNode::Text { text: text.into() }],
        }
    }

    pub fn blockquote(children: Vec<DocNode>) -> Self {
        DocNode::Blockquote { children }
    }

    pub fn bullet_list(items: Vec<DocNode>) -> Self {
        DocNode::BulletList { children: items }
    }

    pub fn ordered_list(start: usize, items: Vec<DocNode>) -> Self {
        DocNode::OrderedList {
            start,
            children: items,
        }
    }

    pub fn list_item(children: Vec<DocNode>) -> Self {
        DocNode::ListItem { children }
    }

    /// A table of `rows x cols` cells, each holding one short paragraph.
    pub fn table(rows: usize, cols: usize) -> Self {
        let children = (0..rows)
            .map(|r| DocNode::TableRow {
                children: (0..cols)
                    .map(|c| DocNode::TableCell {
                        children: vec![DocNode::paragraph(format!("r{r}c{c}"))],
                    })
                    .collect(),
            })
            .collect();
        DocNode::Table { children }
    }

    pub fn image(height: Option<f32>) -> Self {
        DocNode::Image {
            attrs: ImageAttrs {
                height,
                ..ImageAttrs::default()
            },
        }
    }
}

/// The document root: ordered top-level blocks.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub children: Vec<DocNode>,
}

impl Document {
    pub fn new(children: Vec<DocNode>) -> Self {
        Self { children }
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Iterate top-level blocks with their linear positions.
    pub fn blocks(&self) -> impl Iterator<Item = (usize, &DocNode)> {
        let mut pos = 1usize;
        self.children.iter().map(move |child| {
            let here = pos;
            pos += child.size();
            (here, child)
        })
    }

    /// Total size of the document content in the position space.
    pub fn content_size(&self) -> usize {
        self.children.iter().map(DocNode::size).sum()
    }
}
