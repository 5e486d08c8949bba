//! Byte offsets → human-readable positions for diagnostics.

use std::fmt;

/// A 1-indexed line/column pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl Position {
    /// Compute the position of `offset` within `source`.
    pub fn of(offset: usize, source: &str) -> Self {
        let mut line = 1;
        let mut line_start = 0;
        for (i, ch) in source.char_indices() {
            if i >= offset {
                break;
            }
            if ch == '\n' {
                line += 1;
                line_start = i + 1;
            }
        }
        Position {
            line,
            col: offset - line_start + 1,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_of_file() {
        assert_eq!(Position::of(0, "func main() [ ]\n"), Position { line: 1, col: 1 });
    }

    #[test]
    fn test_second_line() {
        let src = "import <c:stdio>\nclass C [ ]\n";
        assert_eq!(Position::of(17, src), Position { line: 2, col: 1 });
    }

    #[test]
    fn test_column_within_line() {
        let src = "func f() [ ]\n";
        assert_eq!(Position::of(5, src), Position { line: 1, col: 6 });
    }

    #[test]
    fn test_display() {
        assert_eq!(Position { line: 3, col: 7 }.to_string(), "3:7");
    }
}
