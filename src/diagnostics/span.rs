/// A location in a single source file, one-indexed for both line and column
/// to match how editors and compiler diagnostics normally report position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub line: usize,
    pub column: usize,
    pub length: usize,
}

impl Span {
    pub fn new(line: usize, column: usize, length: usize) -> Self {
        Span { line, column, length }
    }

    pub fn point(line: usize, column: usize) -> Self {
        Span { line, column, length: 1 }
    }

    /// Smallest span covering both `self` and `other`, assuming `other` starts
    /// on the same line or later.
    pub fn merge(&self, other: &Span) -> Span {
        if self.line != other.line {
            return *self;
        }
        let end = (other.column + other.length).max(self.column + self.length);
        Span {
            line: self.line,
            column: self.column,
            length: end - self.column,
        }
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
