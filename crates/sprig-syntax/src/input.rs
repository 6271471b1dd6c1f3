//! # Input Views
//!
//! The engine never copies input. Every matched region is a [`Span`]: the
//! caller's buffer plus absolute `start..end` offsets into it. Spans borrow
//! the buffer, so a receiver that wants to keep text past the call that
//! produced it must copy it out (`span.text().into_owned()`).
//!
//! Positions are byte offsets. Diagnostics report 1-based lines and columns,
//! computed through a [`LineIndex`] built once per parse.

use std::borrow::Cow;
use std::fmt;
use std::ops::Range;

/// A borrowed region of the input buffer.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span<'a> {
    source: &'a [u8],
    start: usize,
    end: usize,
}

impl<'a> Span<'a> {
    /// Create a span over `source[start..end]`.
    ///
    /// Offsets are clamped to the buffer so a span can never index out of
    /// bounds.
    pub fn new(source: &'a [u8], start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start {start} is past its end {end}");
        let end = end.min(source.len());
        let start = start.min(end);
        Self { source, start, end }
    }

    /// A span covering the whole buffer.
    pub fn whole(source: &'a [u8]) -> Self {
        Self::new(source, 0, source.len())
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The buffer this span points into.
    pub fn source(&self) -> &'a [u8] {
        self.source
    }

    /// The matched bytes.
    pub fn as_bytes(&self) -> &'a [u8] {
        &self.source[self.start..self.end]
    }

    /// The matched bytes as text, replacing invalid UTF-8 sequences.
    pub fn text(&self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.as_bytes())
    }

    /// A span over different offsets of the same buffer.
    pub fn with_range(&self, start: usize, end: usize) -> Span<'a> {
        Span::new(self.source, start, end)
    }

    /// Strip spaces and tabs from both ends.
    pub fn trim_blanks(&self) -> Span<'a> {
        let bytes = self.as_bytes();
        let is_blank = |b: &u8| *b == b' ' || *b == b'\t';
        let leading = bytes.iter().take_while(|b| is_blank(b)).count();
        let trailing = bytes[leading..].iter().rev().take_while(|b| is_blank(b)).count();
        Span::new(self.source, self.start + leading, self.end - trailing)
    }
}

impl fmt::Debug for Span<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{}..{}", self.text(), self.start, self.end)
    }
}

impl fmt::Display for Span<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

/// A 1-based line and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Offsets of every line start in a buffer.
#[derive(Debug, Clone, Default)]
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &[u8]) -> Self {
        let mut starts = vec![0];
        starts.extend(
            source
                .iter()
                .enumerate()
                .filter(|(_, b)| **b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self { starts }
    }

    /// Line and column of a byte offset.
    pub fn position(&self, offset: usize) -> Position {
        let line = self.starts.partition_point(|&start| start <= offset).max(1);
        let column = offset - self.starts[line - 1] + 1;
        Position {
            line: to_u32(line),
            column: to_u32(column),
        }
    }

    pub fn line(&self, offset: usize) -> u32 {
        self.position(offset).line
    }
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn span_exposes_matched_bytes() {
        let source = b"key = value";
        let span = Span::new(source, 6, 11);
        assert_eq!(span.as_bytes(), b"value");
        assert_eq!(span.text(), "value");
        assert_eq!(span.len(), 5);
        assert_eq!(format!("{span:?}"), "\"value\"@6..11");
    }

    #[test]
    fn span_clamps_to_buffer() {
        let span = Span::new(b"abc", 1, 10);
        assert_eq!(span.range(), 1..3);
    }

    #[test]
    fn trim_blanks_strips_spaces_and_tabs() {
        let source = b"[ \tname \t]";
        let span = Span::new(source, 1, 9).trim_blanks();
        assert_eq!(span.text(), "name");
        assert_eq!(span.range(), 3..7);
    }

    #[test]
    fn trim_blanks_of_only_blanks_is_empty() {
        let span = Span::whole(b"  \t ").trim_blanks();
        assert!(span.is_empty());
    }

    #[test]
    fn line_index_positions() {
        let index = LineIndex::new(b"ab\ncd\n\nef");
        assert_eq!(index.position(0), Position { line: 1, column: 1 });
        assert_eq!(index.position(1), Position { line: 1, column: 2 });
        assert_eq!(index.position(3), Position { line: 2, column: 1 });
        assert_eq!(index.position(6), Position { line: 3, column: 1 });
        assert_eq!(index.position(8), Position { line: 4, column: 2 });
    }
}
