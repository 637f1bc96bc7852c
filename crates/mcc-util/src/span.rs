//! Span module - source location tracking.
//!
//! This compiler processes exactly one in-memory source string per
//! invocation, so a `Span` is just a byte-offset range plus the 1-based
//! line/column of its start, no file identifier needed.

/// A source location span: a half-open byte range `[start, end)` plus
/// the human-readable line/column of `start`.
///
/// # Examples
///
/// ```
/// use mcc_util::span::Span;
///
/// let span = Span::new(10, 20, 1, 5);
/// assert_eq!(span.len(), 10);
/// assert!(!span.is_empty());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Span {
    /// Start byte offset in source.
    pub start: usize,
    /// End byte offset in source.
    pub end: usize,
    /// Line number (1-based).
    pub line: u32,
    /// Column number (1-based).
    pub column: u32,
}

impl Span {
    /// Dummy span used where no real source location applies.
    pub const DUMMY: Span = Span {
        start: 0,
        end: 0,
        line: 0,
        column: 0,
    };

    #[inline]
    pub fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    /// A zero-width span at a single point (used for end-of-input).
    #[inline]
    pub fn point(offset: usize, line: u32, column: u32) -> Self {
        Self {
            start: offset,
            end: offset,
            line,
            column,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Merge two spans into the smallest span covering both.
    #[inline]
    pub fn merge(self, other: Span) -> Span {
        if self.start <= other.start {
            Span {
                start: self.start,
                end: self.end.max(other.end),
                line: self.line,
                column: self.column,
            }
        } else {
            other.merge(self)
        }
    }
}

/// Locates the 1-based line and column of a byte offset within `source`,
/// and returns the full text of that line (without its trailing newline).
///
/// This is the primitive the lexer and parser use to stamp `Span::line`/
/// `Span::column` on every token and node, and that [`crate::diagnostic`]
/// uses to render the caret-pointer contract from the diagnostic format.
///
/// # Examples
///
/// ```
/// use mcc_util::span::locate;
///
/// let src = "int a;\nint b;\n";
/// let (line, col, text) = locate(src, 8);
/// assert_eq!(line, 2);
/// assert_eq!(col, 2);
/// assert_eq!(text, "int b;");
/// ```
pub fn locate(source: &str, offset: usize) -> (u32, u32, &str) {
    let offset = offset.min(source.len());
    let line_start = source[..offset].rfind('\n').map_or(0, |i| i + 1);
    let line_end = source[offset..]
        .find('\n')
        .map_or(source.len(), |i| offset + i);
    let line_no = 1 + source[..line_start].bytes().filter(|&b| b == b'\n').count() as u32;
    let column = (offset - line_start) as u32 + 1;
    (line_no, column, &source[line_start..line_end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[test]
    fn span_len_and_empty() {
        let span = Span::new(10, 20, 1, 5);
        assert_eq!(span.len(), 10);
        assert!(!span.is_empty());
        assert!(Span::new(5, 5, 1, 1).is_empty());
    }

    #[test]
    fn span_merge_picks_outer_bounds() {
        let a = Span::new(10, 20, 1, 1);
        let b = Span::new(5, 15, 1, 1);
        let merged = a.merge(b);
        assert_eq!(merged.start, 5);
        assert_eq!(merged.end, 20);
    }

    #[test]
    fn locate_first_line() {
        let src = "int main(){}";
        assert_eq!(locate(src, 4), (1, 5, "int main(){}"));
    }

    #[test]
    fn locate_second_line() {
        let src = "int a;\nint b;\n";
        assert_eq!(locate(src, 7), (2, 1, "int b;"));
    }

    #[test]
    fn locate_clamps_offset_past_end() {
        let src = "x;";
        let (line, col, text) = locate(src, 100);
        assert_eq!(line, 1);
        assert_eq!(col, 3);
        assert_eq!(text, "x;");
    }

    // Any offset within the source resolves to a line/column whose line
    // text does not itself contain a newline, and whose column never
    // exceeds the line length + 1.
    #[quickcheck]
    fn locate_never_splits_mid_line(source: String, raw_offset: usize) -> bool {
        if source.is_empty() {
            return true;
        }
        let offset = raw_offset % source.len();
        // quickcheck may hand us an offset that lands inside a multi-byte
        // UTF-8 sequence; round down to the nearest char boundary.
        let offset = (0..=offset).rev().find(|&o| source.is_char_boundary(o)).unwrap_or(0);
        let (_, col, text) = locate(&source, offset);
        !text.contains('\n') && (col as usize) <= text.len() + 1
    }
}
