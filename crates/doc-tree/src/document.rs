//! In-memory document tree.

use serde_json::Value;

use crate::node::{Mark, Node, NodeType};
use crate::{DocumentTree, Edit, EditError, Position};

/// Current selection range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub from: Position,
    pub to: Position,
}

/// Document tree held in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Node,
    selection: Option<Selection>,
    scroll_target: Option<Position>,
}

/// One unit of a textblock's inline content.
#[derive(Debug, Clone)]
enum Inline {
    Char(char, Vec<Mark>),
    Atom(Node),
}

impl Document {
    /// Wrap a root node. Anything other than `doc` is placed inside one.
    pub fn new(root: Node) -> Self {
        let root = if root.kind == NodeType::Doc {
            root
        } else {
            Node::doc(vec![root])
        };
        Self {
            root,
            selection: None,
            scroll_target: None,
        }
    }

    /// Document holding a single empty paragraph.
    pub fn empty() -> Self {
        Self::new(Node::doc(vec![Node::paragraph(vec![])]))
    }

    /// Parse rich-document JSON.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let root: Node = serde_json::from_str(json)?;
        Ok(Self::new(root))
    }

    /// Build a document from a serialized tree.
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        let root: Node = serde_json::from_value(value)?;
        Ok(Self::new(root))
    }

    /// Build a document from plain text, one paragraph per line.
    pub fn from_plain_text(text: &str) -> Self {
        let paragraphs: Vec<Node> = text
            .lines()
            .map(|line| {
                if line.is_empty() {
                    Node::paragraph(vec![])
                } else {
                    Node::paragraph(vec![Node::text(line)])
                }
            })
            .collect();
        if paragraphs.is_empty() {
            return Self::empty();
        }
        Self::new(Node::doc(paragraphs))
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn into_root(self) -> Node {
        self.root
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    /// Position last scrolled into view.
    pub fn scroll_target(&self) -> Option<Position> {
        self.scroll_target
    }

    /// Find the textblock containing `pos`.
    ///
    /// Returns the child-index path to the block and the inline offset of
    /// `pos` inside it.
    fn resolve_text(&self, pos: Position) -> Option<(Vec<usize>, usize)> {
        let mut path = Vec::new();
        let offset = resolve_in(&self.root.content, 0, pos, &mut path)?;
        Some((path, offset))
    }

    fn node_at_mut(&mut self, path: &[usize]) -> &mut Node {
        let mut node = &mut self.root;
        for &idx in path {
            node = &mut node.content[idx];
        }
        node
    }
}

fn resolve_in(
    nodes: &[Node],
    start: Position,
    pos: Position,
    path: &mut Vec<usize>,
) -> Option<usize> {
    let mut cursor = start;
    for (idx, node) in nodes.iter().enumerate() {
        let end = cursor + node.node_size();
        if node.kind.is_textblock() {
            if pos > cursor && pos < end {
                path.push(idx);
                return Some(pos - cursor - 1);
            }
        } else if !node.is_leaf() && pos > cursor && pos < end {
            path.push(idx);
            let found = resolve_in(&node.content, cursor + 1, pos, path);
            if found.is_none() {
                path.pop();
            }
            return found;
        }
        if end > pos {
            break;
        }
        cursor = end;
    }
    None
}

fn inline_units(block: &Node) -> Vec<Inline> {
    let mut units = Vec::new();
    for child in &block.content {
        match (&child.kind, &child.text) {
            (NodeType::Text, Some(text)) => {
                units.extend(text.chars().map(|c| Inline::Char(c, child.marks.clone())));
            }
            (NodeType::Text, None) => {}
            _ => units.push(Inline::Atom(child.clone())),
        }
    }
    units
}

/// Marks picked up by text replacing `[from, to)`.
///
/// A replacement takes the marks of the first replaced character; a pure
/// insertion takes them from the character before, then the one after.
fn inherited_marks(units: &[Inline], from: usize, to: usize) -> Vec<Mark> {
    if to > from {
        if let Some(Inline::Char(_, marks)) = units.get(from) {
            return marks.clone();
        }
    }
    let before = from.checked_sub(1).and_then(|i| units.get(i));
    match (before, units.get(from)) {
        (Some(Inline::Char(_, marks)), _) => marks.clone(),
        (_, Some(Inline::Char(_, marks))) => marks.clone(),
        _ => Vec::new(),
    }
}

/// Rebuild inline content, merging adjacent characters with equal marks.
fn rebuild_inline(units: Vec<Inline>) -> Vec<Node> {
    let mut content: Vec<Node> = Vec::new();
    for unit in units {
        match unit {
            Inline::Char(c, marks) => match content.last_mut() {
                Some(last) if last.kind == NodeType::Text && last.marks == marks => {
                    last.text.get_or_insert_with(String::new).push(c);
                }
                _ => content.push(Node::marked_text(c.to_string(), marks)),
            },
            Inline::Atom(node) => content.push(node),
        }
    }
    content
}

impl DocumentTree for Document {
    fn descendants(&self, visitor: &mut dyn FnMut(&Node, Position) -> bool) {
        self.root.descendants(visitor);
    }

    fn apply_edit(&mut self, edit: &Edit) -> Result<(), EditError> {
        if edit.from > edit.to {
            return Err(EditError::InvalidRange {
                from: edit.from,
                to: edit.to,
            });
        }
        let size = self.root.content_size();
        if edit.to > size {
            return Err(EditError::OutOfRange { pos: edit.to, size });
        }

        let (start_path, start_offset) = self
            .resolve_text(edit.from)
            .ok_or(EditError::NotInTextblock { pos: edit.from })?;
        let (end_path, end_offset) = if edit.from == edit.to {
            (start_path.clone(), start_offset)
        } else {
            self.resolve_text(edit.to)
                .ok_or(EditError::NotInTextblock { pos: edit.to })?
        };

        if start_path == end_path {
            let block = self.node_at_mut(&start_path);
            let mut units = inline_units(block);
            let marks = inherited_marks(&units, start_offset, end_offset);
            units.splice(
                start_offset..end_offset,
                edit.insert.chars().map(|c| Inline::Char(c, marks.clone())),
            );
            block.content = rebuild_inline(units);
            return Ok(());
        }

        // Range spans several textblocks: join the first and the last.
        let (start_idx, parent_path) = match start_path.split_last() {
            Some((idx, parent)) => (*idx, parent),
            None => return Err(EditError::NotInTextblock { pos: edit.from }),
        };
        let end_idx = match end_path.split_last() {
            Some((idx, parent)) if parent == parent_path => *idx,
            _ => {
                return Err(EditError::CrossesContainers {
                    from: edit.from,
                    to: edit.to,
                })
            }
        };

        let parent = self.node_at_mut(parent_path);
        let tail = inline_units(&parent.content[end_idx]).split_off(end_offset);
        let first = &mut parent.content[start_idx];
        let mut units = inline_units(first);
        let marks = inherited_marks(&units, start_offset, units.len());
        units.truncate(start_offset);
        units.extend(edit.insert.chars().map(|c| Inline::Char(c, marks.clone())));
        units.extend(tail);
        first.content = rebuild_inline(units);
        parent.content.drain(start_idx + 1..=end_idx);
        Ok(())
    }

    fn set_selection(&mut self, from: Position, to: Position) {
        self.selection = Some(Selection { from, to });
        self.scroll_target = Some(from);
    }

    fn plain_text(&self) -> String {
        let mut blocks = Vec::new();
        self.root.descendants(&mut |node: &Node, _| {
            if node.kind.is_textblock() {
                blocks.push(node.text_content());
                return false;
            }
            true
        });
        blocks.join("\n\n")
    }

    fn serialized_tree(&self) -> Value {
        serde_json::to_value(&self.root).unwrap_or_default()
    }

    fn content_size(&self) -> usize {
        self.root.content_size()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_paragraphs() -> Document {
        // <p>Hello</p><p>World</p>: "Hello" at 1..6, "World" at 8..13
        Document::from_plain_text("Hello\nWorld")
    }

    #[test]
    fn test_from_plain_text() {
        let doc = two_paragraphs();
        assert_eq!(doc.root().content.len(), 2);
        assert_eq!(doc.content_size(), 14);
        assert_eq!(doc.plain_text(), "Hello\n\nWorld");
    }

    #[test]
    fn test_replace_inside_text() {
        let mut doc = two_paragraphs();
        doc.apply_edit(&Edit::replace(8, 13, "There")).unwrap();
        assert_eq!(doc.plain_text(), "Hello\n\nThere");

        doc.apply_edit(&Edit::insert(6, ", you")).unwrap();
        assert_eq!(doc.plain_text(), "Hello, you\n\nThere");
    }

    #[test]
    fn test_delete_across_paragraphs_joins_them() {
        let mut doc = two_paragraphs();
        // From after "He" to before "rld"
        doc.apply_edit(&Edit::delete(3, 10)).unwrap();
        assert_eq!(doc.root().content.len(), 1);
        assert_eq!(doc.plain_text(), "Herld");
    }

    #[test]
    fn test_inserted_text_inherits_marks() {
        let root = Node::doc(vec![Node::paragraph(vec![
            Node::text("plain "),
            Node::marked_text("bold", vec![Mark::new("bold")]),
        ])]);
        let mut doc = Document::new(root);
        // Replace "bold" (positions 7..11)
        doc.apply_edit(&Edit::replace(7, 11, "strong")).unwrap();

        let para = &doc.root().content[0];
        assert_eq!(para.content.len(), 2);
        assert_eq!(para.content[1].text.as_deref(), Some("strong"));
        assert!(para.content[1].has_mark("bold"));
    }

    #[test]
    fn test_edit_rejections() {
        let mut doc = two_paragraphs();
        assert_eq!(
            doc.apply_edit(&Edit::delete(5, 2)),
            Err(EditError::InvalidRange { from: 5, to: 2 })
        );
        assert_eq!(
            doc.apply_edit(&Edit::delete(1, 99)),
            Err(EditError::OutOfRange { pos: 99, size: 14 })
        );
        // Position 7 sits between the two paragraphs
        assert_eq!(
            doc.apply_edit(&Edit::insert(7, "x")),
            Err(EditError::NotInTextblock { pos: 7 })
        );
        assert_eq!(doc, two_paragraphs());
    }

    #[test]
    fn test_cross_container_edit_rejected() {
        let root = Node::doc(vec![
            Node::paragraph(vec![Node::text("ab")]),
            Node::new(NodeType::Blockquote)
                .with_content(vec![Node::paragraph(vec![Node::text("cd")])]),
        ]);
        let mut doc = Document::new(root);
        // "ab" at 1..3, blockquote opens at 4, "cd" at 6..8
        assert_eq!(
            doc.apply_edit(&Edit::delete(2, 7)),
            Err(EditError::CrossesContainers { from: 2, to: 7 })
        );
        doc.apply_edit(&Edit::replace(6, 8, "xy")).unwrap();
        assert_eq!(doc.plain_text(), "ab\n\nxy");
    }

    #[test]
    fn test_edit_around_hard_break() {
        let root = Node::doc(vec![Node::paragraph(vec![
            Node::text("ab"),
            Node::new(NodeType::HardBreak),
            Node::text("cd"),
        ])]);
        let mut doc = Document::new(root);
        // "cd" starts after the break at 4
        doc.apply_edit(&Edit::replace(4, 6, "XY")).unwrap();
        assert_eq!(doc.plain_text(), "ab\nXY");
        assert_eq!(doc.root().content[0].content.len(), 3);
    }

    #[test]
    fn test_selection_scrolls() {
        let mut doc = two_paragraphs();
        doc.set_selection(8, 13);
        assert_eq!(doc.selection(), Some(Selection { from: 8, to: 13 }));
        assert_eq!(doc.scroll_target(), Some(8));
    }

    #[test]
    fn test_serialized_tree_round_trip() {
        let doc = two_paragraphs();
        let value = doc.serialized_tree();
        let restored = Document::from_json(&value.to_string()).unwrap();
        assert_eq!(restored, doc);
    }
}
