//! Byte-offset locations and line mapping.
//!
//! Every token, node, comment and diagnostic carries a `Location` into the
//! source buffer. Offsets are bytes, never characters.

use std::fmt;
use std::ops::Range;

/// A position in source text, measured as a byte offset from the start.
pub type TextPos = u32;

/// A half-open byte range `[start, end)` into the source buffer.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct Location {
    /// The byte offset where this location starts (inclusive).
    pub start: TextPos,
    /// The byte offset where this location ends (exclusive).
    pub end: TextPos,
}

impl Location {
    /// Create a new location.
    #[inline]
    pub fn new(start: TextPos, end: TextPos) -> Self {
        debug_assert!(end >= start);
        Self { start, end }
    }

    /// Create a location from `usize` offsets as produced by the lexer cursor.
    #[inline]
    pub fn from_offsets(start: usize, end: usize) -> Self {
        Self::new(start as TextPos, end as TextPos)
    }

    /// Create a zero-width location at a position.
    #[inline]
    pub fn empty(pos: TextPos) -> Self {
        Self { start: pos, end: pos }
    }

    /// The length of this location in bytes.
    #[inline]
    pub fn len(&self) -> TextPos {
        self.end - self.start
    }

    /// Whether this location is zero-width.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether this location contains the given position.
    #[inline]
    pub fn contains(&self, pos: TextPos) -> bool {
        pos >= self.start && pos < self.end
    }

    /// Whether `other` lies entirely within this location.
    #[inline]
    pub fn covers(&self, other: &Location) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    /// Convert to a byte range.
    #[inline]
    pub fn to_range(&self) -> Range<usize> {
        self.start as usize..self.end as usize
    }

    /// Return a new location spanning from the start of `self` to the end of `other`.
    pub fn join(&self, other: &Location) -> Location {
        let start = self.start.min(other.start);
        let end = self.end.max(other.end);
        Location::new(start, end)
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

impl From<Range<usize>> for Location {
    fn from(range: Range<usize>) -> Self {
        Location::from_offsets(range.start, range.end)
    }
}

/// Line and column information derived from source text.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct LineAndColumn {
    /// Line number, offset by the configured first line.
    pub line: i64,
    /// 0-based byte column.
    pub column: u32,
}

impl LineAndColumn {
    pub fn new(line: i64, column: u32) -> Self {
        Self { line, column }
    }
}

/// A map from byte offsets to line numbers, built from source bytes.
/// Used to render locations as line/column pairs for humans.
#[derive(Debug, Clone)]
pub struct LineMap {
    /// Byte offsets of the start of each line.
    line_starts: Vec<TextPos>,
    /// The number reported for the first line.
    first_line: i64,
}

impl LineMap {
    /// Build a line map from source bytes, numbering lines from 1.
    pub fn new(source: &[u8]) -> Self {
        Self::with_first_line(source, 1)
    }

    /// Build a line map whose first line reports as `first_line`.
    pub fn with_first_line(source: &[u8], first_line: i64) -> Self {
        let mut line_starts = vec![0u32];
        for (i, byte) in source.iter().enumerate() {
            if *byte == b'\n' {
                line_starts.push((i + 1) as u32);
            }
        }
        Self { line_starts, first_line }
    }

    /// Get the 0-based line index for a byte offset.
    pub fn line_index_of(&self, pos: TextPos) -> usize {
        match self.line_starts.binary_search(&pos) {
            Ok(line) => line,
            Err(line) => line - 1,
        }
    }

    /// Get the line and column for a byte offset.
    pub fn line_and_column_of(&self, pos: TextPos) -> LineAndColumn {
        let index = self.line_index_of(pos);
        LineAndColumn {
            line: self.first_line + index as i64,
            column: pos - self.line_starts[index],
        }
    }

    /// Get the byte offset of the start of a 0-based line index.
    pub fn line_start(&self, index: usize) -> TextPos {
        self.line_starts[index]
    }

    /// Get the total number of lines.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Get all line starts.
    pub fn line_starts(&self) -> &[TextPos] {
        &self.line_starts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location() {
        let loc = Location::new(5, 15);
        assert_eq!(loc.len(), 10);
        assert!(loc.contains(5));
        assert!(loc.contains(14));
        assert!(!loc.contains(15));
        assert!(!loc.is_empty());
        assert!(Location::empty(3).is_empty());
    }

    #[test]
    fn test_location_join_and_covers() {
        let a = Location::new(2, 4);
        let b = Location::new(8, 10);
        let joined = a.join(&b);
        assert_eq!(joined, Location::new(2, 10));
        assert!(joined.covers(&a));
        assert!(joined.covers(&b));
        assert!(!a.covers(&joined));
    }

    #[test]
    fn test_line_map() {
        let map = LineMap::new(b"line1\nline2\nline3");
        assert_eq!(map.line_count(), 3);
        assert_eq!(map.line_index_of(0), 0);
        assert_eq!(map.line_index_of(5), 0); // newline byte
        assert_eq!(map.line_index_of(6), 1);
        assert_eq!(map.line_index_of(12), 2);

        let lc = map.line_and_column_of(8);
        assert_eq!(lc.line, 2);
        assert_eq!(lc.column, 2);
    }

    #[test]
    fn test_line_map_first_line() {
        let map = LineMap::with_first_line(b"a\nb", 10);
        assert_eq!(map.line_and_column_of(2).line, 11);
    }
}
