//! Recursive-descent parser for `mcc` (spec.md §4.2).
//!
//! Consumes the token sequence from `mcc-lex` and produces a typed
//! [`Program`]: every top-level function and global, with every
//! expression decorated by [`add_type`] and pointer arithmetic already
//! rewritten to byte offsets.

mod ast;
mod expr;
mod items;
mod stmt;
mod types;

pub use ast::{add_type, Function, GlobalIdx, LocalIdx, Node, NodeKind, Obj, ObjRef, Program};
pub use types::{Type, TypeKind};

use mcc_lex::Token;
use mcc_util::index_vec::{Idx, IndexVec};
use mcc_util::{Diagnostic, Result, Span};

/// Parses `source` end to end: tokenizes it, then recursive-descends
/// over the token stream, returning the typed [`Program`] or the first
/// fatal diagnostic (lexical or syntactic).
///
/// # Examples
///
/// ```
/// use mcc_par::parse;
///
/// let program = parse("int main(){ return 0; }").unwrap();
/// assert_eq!(program.functions.len(), 1);
/// ```
pub fn parse(source: &str) -> Result<Program<'_>> {
    let tokens = mcc_lex::tokenize(source)?;
    Parser::new(tokens).program()
}

/// Parser state: the token stream and cursor, the currently-being-built
/// function's `locals` (reset at each function entry) and the
/// process-wide `globals` list (spec.md §4.2, §5).
struct Parser<'src> {
    tokens: Vec<Token<'src>>,
    pos: usize,
    globals: IndexVec<GlobalIdx, Obj<'src>>,
    locals: IndexVec<LocalIdx, Obj<'src>>,
    functions: Vec<Function<'src>>,
    str_literal_count: usize,
    /// Span of the identifier most recently consumed by `declarator()` —
    /// a side channel so callers that need to build a `var` node right
    /// after declaring it don't have to thread a span through `Type`.
    last_decl_span: Span,
}

impl<'src> Parser<'src> {
    fn new(tokens: Vec<Token<'src>>) -> Self {
        Parser {
            tokens,
            pos: 0,
            globals: IndexVec::new(),
            locals: IndexVec::new(),
            functions: Vec::new(),
            str_literal_count: 0,
            last_decl_span: Span::DUMMY,
        }
    }

    fn peek(&self) -> &Token<'src> {
        &self.tokens[self.pos]
    }

    fn advance(&mut self) -> Token<'src> {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn at(&self, text: &str) -> bool {
        self.peek().is(text)
    }

    fn at_eof(&self) -> bool {
        self.peek().is_eof()
    }

    fn eat(&mut self, text: &str) -> bool {
        if self.at(text) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, text: &str) -> Result<Token<'src>> {
        if self.at(text) {
            Ok(self.advance())
        } else {
            Err(self.error(format!("expected '{text}'")))
        }
    }

    fn expect_ident(&mut self) -> Result<Token<'src>> {
        if self.peek().is_ident() {
            Ok(self.advance())
        } else {
            Err(self.error("expected an identifier"))
        }
    }

    fn expect_num(&mut self) -> Result<i64> {
        if let Some(v) = self.peek().as_num() {
            self.advance();
            Ok(v)
        } else {
            Err(self.error("expected a number"))
        }
    }

    fn error(&self, message: impl Into<String>) -> Diagnostic {
        Diagnostic::new(message, self.peek().span)
    }

    /// Locals first (most-recently-declared first, since there's no
    /// block-level scoping beyond function scope), then globals — the
    /// name resolution order from spec.md §3.4.
    fn resolve(&self, name: &str) -> Option<ObjRef> {
        for i in (0..self.locals.len()).rev() {
            let idx = LocalIdx::from_usize(i);
            if self.locals[idx].name == name {
                return Some(ObjRef::Local(idx));
            }
        }
        for i in (0..self.globals.len()).rev() {
            let idx = GlobalIdx::from_usize(i);
            if self.globals[idx].name == name {
                return Some(ObjRef::Global(idx));
            }
        }
        None
    }

    /// Registers an anonymous global for a string literal's backing
    /// storage, named `.L..<counter>` (spec.md §3.4).
    fn new_string_literal(&mut self, bytes: Vec<u8>) -> GlobalIdx {
        let name: &'src str = Box::leak(format!(".L..{}", self.str_literal_count).into_boxed_str());
        self.str_literal_count += 1;
        let ty = Type::array_of(Type::char(), bytes.len());
        self.globals.push(Obj::global(name, ty, Some(bytes)))
    }
}
