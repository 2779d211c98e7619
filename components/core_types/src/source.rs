//! Source span type for error reporting and node positions.

/// Represents a range in source code.
///
/// `start` and `end` are character offsets into the unit's text, `line` is
/// the 1-based line the range starts on.
///
/// # Examples
///
/// ```
/// use core_types::Span;
///
/// let span = Span::new(10, 150, 155);
///
/// assert_eq!(span.line, 10);
/// assert_eq!(span.len(), 5);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Span {
    /// Line number (1-based)
    pub line: u32,
    /// Offset of the first character
    pub start: usize,
    /// Offset one past the last character
    pub end: usize,
}

impl Span {
    /// Create a new span
    pub fn new(line: u32, start: usize, end: usize) -> Self {
        Self { line, start, end }
    }

    /// Number of characters covered
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the span covers no characters
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Smallest span covering both `self` and `other`
    pub fn to(self, other: Span) -> Span {
        Span {
            line: self.line.min(other.line),
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}
