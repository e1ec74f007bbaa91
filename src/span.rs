//! Source code location tracking
//!
//! Spans are byte ranges into the source text. Diagnostics are reported as
//! 1-indexed line/column positions, computed on demand through a [`LineIndex`].

use std::fmt;

/// A position in the source code (line and column, both 1-indexed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Position {
    /// Line number (1-indexed)
    pub line: u32,
    /// Column number (1-indexed, counted in characters)
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A span representing a range in the source code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Span {
    /// Start position (byte offset)
    pub start: usize,
    /// End position (byte offset, exclusive)
    pub end: usize,
}

impl Span {
    /// Create a new span
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Get the source text for this span
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Line start table for converting byte offsets into line/column positions
#[derive(Debug, Clone)]
pub struct LineIndex<'src> {
    source: &'src str,
    /// Byte offset of the first character of every line
    line_starts: Vec<usize>,
}

impl<'src> LineIndex<'src> {
    /// Build the index for `source`
    pub fn new(source: &'src str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            source
                .bytes()
                .enumerate()
                .filter(|&(_, b)| b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self { source, line_starts }
    }

    /// Convert a byte offset to a 1-indexed position
    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.source.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line.saturating_sub(1),
        };
        let line_start = self.line_starts[line];
        let column = self
            .source
            .get(line_start..offset)
            .map(|prefix| prefix.chars().count())
            .unwrap_or(offset - line_start);

        Position::new(line as u32 + 1, column as u32 + 1)
    }

    /// Position of the start of a span
    pub fn span_start(&self, span: Span) -> Position {
        self.position(span.start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_text_is_byte_range() {
        let source = "node n; n = add_node(g, \"A\");";
        let start = source.find("add_node").unwrap();
        assert_eq!(Span::new(start, start + 8).text(source), "add_node");
        assert_eq!(Span::new(0, 4).to_string(), "0..4");
    }

    #[test]
    fn test_line_index_positions() {
        let source = "graph g;\n  node n;\n";
        let index = LineIndex::new(source);
        assert_eq!(index.position(0), Position::new(1, 1));
        assert_eq!(index.position(6), Position::new(1, 7));
        assert_eq!(index.position(11), Position::new(2, 3));
        assert_eq!(index.span_start(Span::new(13, 14)), Position::new(2, 5));
    }

    #[test]
    fn test_line_index_counts_characters() {
        let source = "\"ÿÿ\" x";
        let index = LineIndex::new(source);
        let x = source.find('x').unwrap();
        assert_eq!(index.position(x), Position::new(1, 6));
    }

    #[test]
    fn test_line_index_clamps_past_end() {
        let index = LineIndex::new("ab");
        assert_eq!(index.position(100), Position::new(1, 3));
    }
}
