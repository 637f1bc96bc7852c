//! Byte-level cursor over the source text.
//!
//! The supported grammar (spec.md §4.1) only ever branches on ASCII
//! bytes — digits, `[A-Za-z_]`, quotes, punctuation — so the cursor
//! walks the source a byte at a time rather than decoding UTF-8
//! scalars. String-literal payloads may still contain arbitrary bytes;
//! those are sliced out raw and decoded separately.

pub struct Cursor<'src> {
    src: &'src str,
    pos: usize,
    line: u32,
    col: u32,
}

impl<'src> Cursor<'src> {
    pub fn new(src: &'src str) -> Self {
        Self { src, pos: 0, line: 1, col: 1 }
    }

    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn line(&self) -> u32 {
        self.line
    }

    #[inline]
    pub fn col(&self) -> u32 {
        self.col
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.src.len()
    }

    /// The byte at the cursor, or `0` (the NUL sentinel) past the end.
    #[inline]
    pub fn peek(&self) -> u8 {
        self.peek_at(0)
    }

    #[inline]
    pub fn peek_at(&self, offset: usize) -> u8 {
        self.src.as_bytes().get(self.pos + offset).copied().unwrap_or(0)
    }

    /// Consumes and returns the current byte, advancing line/column.
    pub fn bump(&mut self) -> u8 {
        let b = self.peek();
        if !self.is_eof() {
            self.pos += 1;
        }
        if b == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        b
    }

    /// The source text from `start` (a byte offset previously returned by
    /// [`Cursor::pos`]) up to the current position.
    pub fn slice_from(&self, start: usize) -> &'src str {
        &self.src[start..self.pos]
    }

    pub fn raw_bytes(&self) -> &'src [u8] {
        self.src.as_bytes()
    }
}
