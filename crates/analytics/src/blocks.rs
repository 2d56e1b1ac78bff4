//! Structural counts over the node tree.

use quire_doc_tree::{DocumentTree, Node, NodeType, Position};
use serde::Serialize;

/// Occurrences of block and mark types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockCounts {
    pub paragraphs: usize,
    pub headings: usize,
    /// Bullet, ordered and task lists.
    pub lists: usize,
    pub list_items: usize,
    pub images: usize,
    /// Link spans; adjacent runs with the same target count once.
    pub links: usize,
    pub code_blocks: usize,
    pub tables: usize,
    pub blockquotes: usize,
}

/// Count block and link occurrences in one pass over the tree.
pub fn count_blocks<T: DocumentTree + ?Sized>(tree: &T) -> BlockCounts {
    let mut counts = BlockCounts::default();
    // Target of the link run the walk is currently inside, if any.
    let mut open_link: Option<String> = None;

    tree.descendants(&mut |node: &Node, _: Position| {
        match node.kind {
            NodeType::Text => {
                let href = node
                    .marks
                    .iter()
                    .find(|m| m.kind == "link")
                    .map(|m| m.attr_str("href").unwrap_or_default().to_string());
                if let Some(href) = &href {
                    if open_link.as_ref() != Some(href) {
                        counts.links += 1;
                    }
                }
                open_link = href;
                return true;
            }
            NodeType::Paragraph => counts.paragraphs += 1,
            NodeType::Heading => counts.headings += 1,
            NodeType::BulletList | NodeType::OrderedList | NodeType::TaskList => {
                counts.lists += 1
            }
            NodeType::ListItem | NodeType::TaskItem => counts.list_items += 1,
            NodeType::Image => counts.images += 1,
            NodeType::CodeBlock => counts.code_blocks += 1,
            NodeType::Table => counts.tables += 1,
            NodeType::Blockquote => counts.blockquotes += 1,
            _ => {}
        }
        open_link = None;
        true
    });
    counts
}
