//! Text offset to document position mapping.

use quire_doc_tree::Position;

use crate::FlattenError;

/// Run of flattened characters with a known position.
///
/// Text runs map offset `offset + i` to `pos + i`. A separator run is a
/// single `'\n'` sitting between `pos` (end of the preceding text) and
/// `end` (start of the following text).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Segment {
    pub offset: usize,
    pub len: usize,
    pub pos: Position,
    pub end: Position,
    pub separator: bool,
}

impl Segment {
    pub fn text(offset: usize, pos: Position, len: usize) -> Self {
        Self {
            offset,
            len,
            pos,
            end: pos + len,
            separator: false,
        }
    }

    pub fn separator(offset: usize, pos: Position, end: Position) -> Self {
        Self {
            offset,
            len: 1,
            pos,
            end,
            separator: true,
        }
    }

    /// Whether text at `offset`/`pos` directly continues this run.
    pub fn continues(&self, offset: usize, pos: Position) -> bool {
        !self.separator && self.offset + self.len == offset && self.end == pos
    }

    pub fn extend(&mut self, count: usize) {
        self.len += count;
        self.end += count;
    }
}

/// Maps offsets of the flattened text to document positions.
///
/// Both lookups are monotonically non-decreasing over `[0, len]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionMap {
    segments: Vec<Segment>,
    len: usize,
}

impl PositionMap {
    pub(crate) fn new(segments: Vec<Segment>, len: usize) -> Self {
        Self { segments, len }
    }

    /// Length of the flattened text in characters.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Clamp an offset into `[0, len]`.
    pub fn clamp(&self, offset: usize) -> usize {
        offset.min(self.len)
    }

    /// Position in front of the character at `offset`.
    ///
    /// `offset == len` yields the position after the last character.
    pub fn offset_to_position(&self, offset: usize) -> Result<Position, FlattenError> {
        self.check(offset)?;
        if offset == self.len {
            return Ok(self.segments.last().map_or(0, |s| s.end));
        }
        let seg = self.segment_at(offset);
        if seg.separator {
            Ok(seg.pos)
        } else {
            Ok(seg.pos + (offset - seg.offset))
        }
    }

    /// Position after the character at `offset - 1`.
    ///
    /// Used for exclusive range ends: a range ending on the last character
    /// of a block ends inside that block, not at the start of the next one.
    pub fn end_position(&self, offset: usize) -> Result<Position, FlattenError> {
        self.check(offset)?;
        if offset == 0 {
            return self.offset_to_position(0);
        }
        let seg = self.segment_at(offset - 1);
        if seg.separator {
            Ok(seg.end)
        } else {
            Ok(seg.pos + (offset - seg.offset))
        }
    }

    fn check(&self, offset: usize) -> Result<(), FlattenError> {
        if offset > self.len {
            return Err(FlattenError::OutOfRange {
                offset,
                len: self.len,
            });
        }
        Ok(())
    }

    /// Segment covering `offset`. Requires `offset < len`.
    fn segment_at(&self, offset: usize) -> &Segment {
        let idx = self
            .segments
            .partition_point(|s| s.offset + s.len <= offset);
        &self.segments[idx]
    }
}
