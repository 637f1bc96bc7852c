//! Lexical analysis for `mcc`.
//!
//! Turns a source string into the linear token sequence the parser
//! consumes (spec.md §4.1): a single left-to-right scan producing
//! punctuators, integer and string literals, identifiers and keywords,
//! terminated by an end-of-input token.

mod cursor;
mod lexer;
mod token;

pub use lexer::tokenize;
pub use token::{Token, TokenKind};
