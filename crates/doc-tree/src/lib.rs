//! Rich document tree for quire.
//!
//! The text engine treats the document as an externally owned tree. This
//! crate defines that seam ([`DocumentTree`]) together with the node schema
//! it speaks, and ships [`Document`], an in-memory tree that implements it.
//!
//! # Addressing
//!
//! Positions count node boundaries, not just characters:
//!
//! ```text
//!  <p>  H   i  </p> <p>  !  </p>
//! 0    1   2   3     4    5   6     7
//! ```
//!
//! Entering a non-leaf node costs one position, each character costs one,
//! each atom (`hardBreak`, `image`, `horizontalRule`) costs one, and leaving
//! a non-leaf node costs one.

mod document;
mod node;

pub use document::{Document, Selection};
pub use node::{Mark, Node, NodeType};

use serde_json::Value;

/// Address understood by the document tree.
pub type Position = usize;

/// Delete `[from, to)` and insert `insert` at `from`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub from: Position,
    pub to: Position,
    pub insert: String,
}

impl Edit {
    /// Replace a range with text.
    pub fn replace(from: Position, to: Position, insert: impl Into<String>) -> Self {
        Self {
            from,
            to,
            insert: insert.into(),
        }
    }

    /// Delete a range.
    pub fn delete(from: Position, to: Position) -> Self {
        Self::replace(from, to, String::new())
    }

    /// Insert text at a position.
    pub fn insert(at: Position, text: impl Into<String>) -> Self {
        Self::replace(at, at, text)
    }
}

/// Reasons the tree rejects an edit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("invalid range {from}..{to}")]
    InvalidRange { from: Position, to: Position },
    #[error("position {pos} is outside the document (content size {size})")]
    OutOfRange { pos: Position, size: usize },
    #[error("position {pos} does not point into text content")]
    NotInTextblock { pos: Position },
    #[error("range {from}..{to} spans blocks in different containers")]
    CrossesContainers { from: Position, to: Position },
}

/// Operations the text engine consumes from the editing surface.
pub trait DocumentTree {
    /// Pre-order walk over every node below the root.
    ///
    /// The visitor receives each node with its position; returning `false`
    /// skips that node's children.
    fn descendants(&self, visitor: &mut dyn FnMut(&Node, Position) -> bool);

    /// Apply one transactional edit. A rejected edit leaves the tree as it was.
    fn apply_edit(&mut self, edit: &Edit) -> Result<(), EditError>;

    /// Move the selection and scroll it into view.
    fn set_selection(&mut self, from: Position, to: Position);

    /// Plain text of the document, textblocks separated by a blank line.
    fn plain_text(&self) -> String;

    /// Serialized tree in rich-document JSON form.
    fn serialized_tree(&self) -> Value;

    /// Size of the root's content in positions.
    fn content_size(&self) -> usize;
}
