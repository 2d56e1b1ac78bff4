//! Linear text view of the document tree.
//!
//! [`flatten`] walks the tree once and produces the plain text that search
//! and analytics run over, together with a [`PositionMap`] translating text
//! offsets back into document positions.
//!
//! Text nodes contribute their characters, hard breaks contribute `'\n'`,
//! and every boundary between blocks that carry text contributes exactly
//! one `'\n'` separator. Offsets count Unicode scalar values.

mod map;
mod outline;

pub use map::PositionMap;
pub use outline::{outline, Heading};

use quire_doc_tree::{DocumentTree, Node, NodeType, Position};

use map::Segment;

/// Separator emitted between blocks.
pub const BLOCK_SEPARATOR: char = '\n';

/// Offset lookups outside the flattened text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FlattenError {
    #[error("offset {offset} is outside the flattened text (length {len})")]
    OutOfRange { offset: usize, len: usize },
}

/// Flattened document text and its position map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatText {
    text: String,
    map: PositionMap,
}

impl FlatText {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn map(&self) -> &PositionMap {
        &self.map
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.len() == 0
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

/// Flatten the document.
///
/// Blocks without text add no separator, so an empty paragraph leaves no
/// trace: consecutive blocks are always joined by a single `'\n'`, and a
/// search for `"\n\n"` never matches across a blank line.
pub fn flatten<T: DocumentTree + ?Sized>(tree: &T) -> FlatText {
    flatten_with(tree, |_, _, _| {})
}

/// Flatten the document, reporting every block as it is entered.
///
/// `on_block` receives the block, its position, and the offset at which
/// its first character lands in the flattened text.
pub(crate) fn flatten_with<T, F>(tree: &T, mut on_block: F) -> FlatText
where
    T: DocumentTree + ?Sized,
    F: FnMut(&Node, Position, usize),
{
    let mut builder = Builder::default();
    tree.descendants(&mut |node: &Node, pos: Position| match node.kind {
        NodeType::Text => {
            if let Some(text) = node.text.as_deref() {
                builder.push_text(text, pos);
            }
            false
        }
        NodeType::HardBreak => {
            builder.push_text("\n", pos);
            false
        }
        kind if kind.is_block() => {
            builder.enter_block();
            on_block(node, pos, builder.next_offset());
            true
        }
        _ => true,
    });
    builder.finish()
}

#[derive(Debug, Default)]
struct Builder {
    text: String,
    segments: Vec<Segment>,
    len: usize,
    pending_separator: bool,
}

impl Builder {
    fn enter_block(&mut self) {
        if self.len > 0 {
            self.pending_separator = true;
        }
    }

    /// Offset the next text character will land on.
    fn next_offset(&self) -> usize {
        if self.pending_separator {
            self.len + 1
        } else {
            self.len
        }
    }

    fn push_text(&mut self, text: &str, pos: Position) {
        let count = text.chars().count();
        if count == 0 {
            return;
        }

        // Separators are written lazily so that the text never ends in one
        // and each separator knows where the following text starts.
        if self.pending_separator {
            let prev_end = self.segments.last().map_or(pos, |s| s.end);
            self.text.push(BLOCK_SEPARATOR);
            self.segments.push(Segment::separator(self.len, prev_end, pos));
            self.len += 1;
            self.pending_separator = false;
        }

        self.text.push_str(text);
        match self.segments.last_mut() {
            Some(last) if last.continues(self.len, pos) => last.extend(count),
            _ => self.segments.push(Segment::text(self.len, pos, count)),
        }
        self.len += count;
    }

    fn finish(self) -> FlatText {
        FlatText {
            text: self.text,
            map: PositionMap::new(self.segments, self.len),
        }
    }
}
