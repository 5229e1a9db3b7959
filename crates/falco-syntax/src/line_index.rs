//! Offset to line/column translation.

use text_size::{TextRange, TextSize};

/// A 1-based line/column pair for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineCol {
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number (bytes, not characters).
    pub column: u32,
}

/// Maps byte offsets to line/column pairs.
///
/// Built once per source file; lookups are a binary search over line starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    /// Byte offset of the start of each line.
    line_starts: Vec<TextSize>,
}

impl LineIndex {
    /// Builds a line index for the given source text.
    #[must_use]
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![TextSize::from(0)];
        for (offset, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(TextSize::from(offset as u32 + 1));
            }
        }
        Self { line_starts }
    }

    /// Returns the 1-based line/column of a byte offset.
    #[must_use]
    pub fn line_col(&self, offset: TextSize) -> LineCol {
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        let line_start = self.line_starts[line];
        LineCol {
            line: line as u32 + 1,
            column: u32::from(offset) - u32::from(line_start) + 1,
        }
    }

    /// Returns the 1-based line number of a range's start.
    #[must_use]
    pub fn line_of(&self, range: TextRange) -> u32 {
        self.line_col(range.start()).line
    }

    /// Returns the number of lines in the source.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Returns the byte offset of the start of a 1-based line, if it exists.
    #[must_use]
    pub fn line_start(&self, line: u32) -> Option<TextSize> {
        self.line_starts.get(line.checked_sub(1)? as usize).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col() {
        let index = LineIndex::new("abc\ndef\n\nghi");
        assert_eq!(index.line_col(0.into()), LineCol { line: 1, column: 1 });
        assert_eq!(index.line_col(2.into()), LineCol { line: 1, column: 3 });
        assert_eq!(index.line_col(4.into()), LineCol { line: 2, column: 1 });
        assert_eq!(index.line_col(8.into()), LineCol { line: 3, column: 1 });
        assert_eq!(index.line_col(9.into()), LineCol { line: 4, column: 1 });
    }

    #[test]
    fn test_offset_at_newline_belongs_to_its_line() {
        let index = LineIndex::new("ab\ncd");
        assert_eq!(index.line_col(2.into()), LineCol { line: 1, column: 3 });
        assert_eq!(index.line_col(3.into()), LineCol { line: 2, column: 1 });
    }

    #[test]
    fn test_line_count() {
        assert_eq!(LineIndex::new("").line_count(), 1);
        assert_eq!(LineIndex::new("a\nb").line_count(), 2);
        assert_eq!(LineIndex::new("a\nb\n").line_count(), 3);
    }
}
