//! Node and mark schema of the rich document.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Position;

/// Node type names, serialized the way the editing surface writes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeType {
    Doc,
    Paragraph,
    Heading,
    Blockquote,
    BulletList,
    OrderedList,
    TaskList,
    ListItem,
    TaskItem,
    CodeBlock,
    HorizontalRule,
    HardBreak,
    Image,
    Table,
    TableRow,
    TableCell,
    TableHeader,
    Text,
    /// Any node type the engine does not know about (diagrams, math, ...).
    #[serde(other)]
    Unknown,
}

impl NodeType {
    pub fn is_text(self) -> bool {
        self == NodeType::Text
    }

    /// Leaf nodes other than text. They occupy a single position.
    pub fn is_atom(self) -> bool {
        matches!(
            self,
            NodeType::HardBreak | NodeType::Image | NodeType::HorizontalRule
        )
    }

    pub fn is_leaf(self) -> bool {
        self.is_text() || self.is_atom()
    }

    /// Blocks whose content is inline (text and inline atoms).
    pub fn is_textblock(self) -> bool {
        matches!(
            self,
            NodeType::Paragraph | NodeType::Heading | NodeType::CodeBlock
        )
    }

    pub fn is_inline(self) -> bool {
        matches!(self, NodeType::Text | NodeType::HardBreak)
    }

    /// Block-level nodes below the root.
    pub fn is_block(self) -> bool {
        self != NodeType::Doc && !self.is_inline()
    }

    pub fn is_list(self) -> bool {
        matches!(
            self,
            NodeType::BulletList | NodeType::OrderedList | NodeType::TaskList
        )
    }
}

/// Inline formatting span attached to a text node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attrs: Map<String, Value>,
}

impl Mark {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            attrs: Map::new(),
        }
    }

    /// Hyperlink mark pointing at `href`.
    pub fn link(href: impl Into<String>) -> Self {
        let mut mark = Self::new("link");
        mark.attrs
            .insert("href".to_string(), Value::String(href.into()));
        mark
    }

    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).and_then(Value::as_str)
    }
}

/// A node of the rich document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "type")]
    pub kind: NodeType,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attrs: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<Mark>,
}

impl Node {
    pub fn new(kind: NodeType) -> Self {
        Self {
            kind,
            attrs: Map::new(),
            content: Vec::new(),
            text: None,
            marks: Vec::new(),
        }
    }

    pub fn doc(content: Vec<Node>) -> Self {
        Self::new(NodeType::Doc).with_content(content)
    }

    pub fn paragraph(content: Vec<Node>) -> Self {
        Self::new(NodeType::Paragraph).with_content(content)
    }

    pub fn heading(level: u8, content: Vec<Node>) -> Self {
        Self::new(NodeType::Heading)
            .with_attr("level", Value::from(level))
            .with_content(content)
    }

    pub fn text(text: impl Into<String>) -> Self {
        let mut node = Self::new(NodeType::Text);
        node.text = Some(text.into());
        node
    }

    pub fn marked_text(text: impl Into<String>, marks: Vec<Mark>) -> Self {
        let mut node = Self::text(text);
        node.marks = marks;
        node
    }

    pub fn with_content(mut self, content: Vec<Node>) -> Self {
        self.content = content;
        self
    }

    pub fn with_attr(mut self, key: &str, value: Value) -> Self {
        self.attrs.insert(key.to_string(), value);
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.kind.is_leaf()
    }

    pub fn has_mark(&self, kind: &str) -> bool {
        self.marks.iter().any(|m| m.kind == kind)
    }

    /// Heading level, defaulting to 1 when the attribute is missing.
    pub fn heading_level(&self) -> Option<u8> {
        if self.kind != NodeType::Heading {
            return None;
        }
        let level = self
            .attrs
            .get("level")
            .and_then(Value::as_u64)
            .unwrap_or(1);
        Some(level.clamp(1, 6) as u8)
    }

    /// Number of positions this node occupies in its parent.
    pub fn node_size(&self) -> usize {
        match self.kind {
            NodeType::Text => self.text.as_deref().map_or(0, |t| t.chars().count()),
            kind if kind.is_atom() => 1,
            _ => 2 + self.content_size(),
        }
    }

    /// Number of positions inside this node.
    pub fn content_size(&self) -> usize {
        self.content.iter().map(Node::node_size).sum()
    }

    /// Text of this node and its descendants. Hard breaks become newlines.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self.kind {
            NodeType::Text => out.push_str(self.text.as_deref().unwrap_or_default()),
            NodeType::HardBreak => out.push('\n'),
            _ => {
                for child in &self.content {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Pre-order walk over the descendants of this node.
    ///
    /// Positions are relative to the start of this node's content, so for a
    /// `doc` root they are absolute document positions.
    pub fn descendants<F>(&self, visitor: &mut F)
    where
        F: FnMut(&Node, Position) -> bool + ?Sized,
    {
        walk(&self.content, 0, visitor);
    }
}

fn walk<F>(nodes: &[Node], mut pos: Position, visitor: &mut F)
where
    F: FnMut(&Node, Position) -> bool + ?Sized,
{
    for node in nodes {
        if visitor(node, pos) && !node.content.is_empty() {
            walk(&node.content, pos + 1, visitor);
        }
        pos += node.node_size();
    }
}
