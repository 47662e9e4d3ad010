//! Source location tracking for error reporting.
//!
//! A schema loads from a single source string, so spans are plain byte
//! ranges into that string and [`SourceText`] carries the line index used to
//! turn an offset into a human-readable position.
//!
//! # Examples
//!
//! ```
//! # use typecull::span::*;
//! let text = SourceText::new("type A=never;\ntype B=A;");
//! let span = Span::new(14, 18);
//! assert_eq!(text.snippet(span), "type");
//! assert_eq!(text.line_col(span.start), (2, 1));
//! ```

/// Byte range in the schema source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    /// Byte offset of start position
    pub start: u32,
    /// Byte offset of end position (exclusive)
    pub end: u32,
}

impl Span {
    /// Create a new span.
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Zero-length span at a byte offset.
    pub fn at(offset: u32) -> Self {
        Self::new(offset, offset)
    }

    /// Check if this span is zero-length.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Span covering both `self` and `other`.
    pub fn merge(&self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl From<std::ops::Range<usize>> for Span {
    fn from(range: std::ops::Range<usize>) -> Self {
        Span::new(range.start as u32, range.end as u32)
    }
}

/// Schema source text with a precomputed line index.
#[derive(Debug, Clone)]
pub struct SourceText {
    source: String,
    /// Byte offsets of each line start; `line_starts[0]` is always 0 and the
    /// final entry is the EOF sentinel.
    line_starts: Vec<u32>,
}

impl SourceText {
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let line_starts = compute_line_starts(&source);
        Self {
            source,
            line_starts,
        }
    }

    /// The full source text.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Source excerpt covered by `span`.
    pub fn snippet(&self, span: Span) -> &str {
        &self.source[span.start as usize..span.end as usize]
    }

    /// 1-based (line, column) for a byte offset.
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        let offset = offset.min(self.source.len() as u32);
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx.min(self.line_count().saturating_sub(1)),
            Err(idx) => idx.max(1) - 1,
        };
        let line = (line_idx + 1) as u32;
        let col = (offset - self.line_starts[line_idx]) + 1;
        (line, col)
    }

    /// Number of lines in the source.
    pub fn line_count(&self) -> usize {
        self.line_starts.len() - 1
    }
}

fn compute_line_starts(source: &str) -> Vec<u32> {
    let mut line_starts = vec![0];
    for (idx, ch) in source.char_indices() {
        if ch == '\n' {
            line_starts.push((idx + 1) as u32);
        }
    }
    if line_starts.last() != Some(&(source.len() as u32)) {
        line_starts.push(source.len() as u32);
    }
    line_starts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_basics() {
        let span = Span::new(10, 20);
        assert!(!span.is_empty());
        assert!(Span::at(3).is_empty());
        let merged = span.merge(Span::new(15, 30));
        assert_eq!(merged, Span::new(10, 30));
    }

    #[test]
    fn test_line_col() {
        let text = SourceText::new("type A=1;\ntype B=2;\n");
        assert_eq!(text.line_col(0), (1, 1));
        assert_eq!(text.line_col(5), (1, 6));
        assert_eq!(text.line_col(10), (2, 1));
        assert_eq!(text.line_col(18), (2, 9));
    }

    #[test]
    fn test_line_col_no_trailing_newline() {
        let text = SourceText::new("abc");
        assert_eq!(text.line_count(), 1);
        assert_eq!(text.line_col(2), (1, 3));
        // Clamped to EOF rather than panicking on stale offsets.
        assert_eq!(text.line_col(99), (1, 4));
    }

    #[test]
    fn test_snippet() {
        let text = SourceText::new("type Drink=\"Cola\";");
        assert_eq!(text.snippet(Span::new(5, 10)), "Drink");
    }
}
