//! Heading outline used for table-of-contents navigation.

use quire_doc_tree::{DocumentTree, NodeType, Position};

use crate::flatten_with;

/// A heading and where it lives in both address spaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub level: u8,
    pub text: String,
    /// Position of the heading node itself.
    pub pos: Position,
    /// Offset of the heading's first character in the flattened text.
    pub offset: usize,
}

impl Heading {
    /// Position of the first character inside the heading.
    pub fn content_start(&self) -> Position {
        self.pos + 1
    }
}

/// Headings in document order.
pub fn outline<T: DocumentTree + ?Sized>(tree: &T) -> Vec<Heading> {
    let mut headings = Vec::new();
    flatten_with(tree, |node, pos, offset| {
        if node.kind == NodeType::Heading {
            headings.push(Heading {
                level: node.heading_level().unwrap_or(1),
                text: node.text_content(),
                pos,
                offset,
            });
        }
    });
    headings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten;
    use quire_doc_tree::{Document, Node};

    #[test]
    fn test_outline_offsets_match_flattened_text() {
        let root = Node::doc(vec![
            Node::heading(1, vec![Node::text("Overview")]),
            Node::paragraph(vec![Node::text("Body text.")]),
            Node::heading(2, vec![Node::text("Details")]),
        ]);
        let doc = Document::new(root);
        let headings = outline(&doc);
        let flat = flatten(&doc);

        assert_eq!(headings.len(), 2);
        assert_eq!(headings[0].level, 1);
        assert_eq!(headings[0].offset, 0);
        assert_eq!(headings[1].text, "Details");
        assert_eq!(headings[1].level, 2);

        let chars: Vec<char> = flat.text().chars().collect();
        let found: String = chars[headings[1].offset..headings[1].offset + 7]
            .iter()
            .collect();
        assert_eq!(found, "Details");
        assert_eq!(
            flat.map().offset_to_position(headings[1].offset).unwrap(),
            headings[1].content_start()
        );
    }

    #[test]
    fn test_outline_without_headings() {
        let doc = Document::from_plain_text("just a paragraph");
        assert!(outline(&doc).is_empty());
    }
}
