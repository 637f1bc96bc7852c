//! Single left-to-right tokenization pass (spec.md §4.1).

use mcc_util::{Diagnostic, Result, Span};

use crate::cursor::Cursor;
use crate::token::{Token, TokenKind};

const KEYWORDS: &[&str] = &["return", "if", "else", "for", "while", "int", "sizeof", "char"];
const TWO_BYTE_PUNCT: &[&str] = &["==", "!=", "<=", ">="];

fn span(start: usize, end: usize, line: u32, col: u32) -> Span {
    Span::new(start, end, line, col)
}

/// Tokenizes `source` into a linear token sequence terminated by `Eof`.
///
/// # Examples
///
/// ```
/// use mcc_lex::tokenize;
///
/// let tokens = tokenize("int x = 1 + 2;").unwrap();
/// assert!(tokens.last().unwrap().is_eof());
/// ```
pub fn tokenize(source: &str) -> Result<Vec<Token<'_>>> {
    let mut cur = Cursor::new(source);
    let mut tokens = Vec::new();

    loop {
        skip_whitespace(&mut cur);
        if cur.is_eof() {
            break;
        }

        let start = cur.pos();
        let (line, col) = (cur.line(), cur.col());
        let b = cur.peek();

        if b.is_ascii_digit() {
            while cur.peek().is_ascii_digit() {
                cur.bump();
            }
            let text = cur.slice_from(start);
            let value: i64 = text
                .parse()
                .map_err(|_| Diagnostic::new("invalid integer literal", span(start, cur.pos(), line, col)))?;
            tokens.push(Token { kind: TokenKind::Num(value), span: span(start, cur.pos(), line, col), lexeme: text });
            continue;
        }

        if b == b'"' {
            tokens.push(lex_string(&mut cur, start, line, col)?);
            continue;
        }

        if b.is_ascii_alphabetic() || b == b'_' {
            while {
                let c = cur.peek();
                c.is_ascii_alphanumeric() || c == b'_'
            } {
                cur.bump();
            }
            let text = cur.slice_from(start);
            tokens.push(Token { kind: TokenKind::Ident, span: span(start, cur.pos(), line, col), lexeme: text });
            continue;
        }

        let two = [cur.peek(), cur.peek_at(1)];
        if TWO_BYTE_PUNCT.iter().any(|p| p.as_bytes() == two) {
            cur.bump();
            cur.bump();
            let text = cur.slice_from(start);
            tokens.push(Token { kind: TokenKind::Punct, span: span(start, cur.pos(), line, col), lexeme: text });
            continue;
        }

        if b.is_ascii_punctuation() {
            cur.bump();
            let text = cur.slice_from(start);
            tokens.push(Token { kind: TokenKind::Punct, span: span(start, cur.pos(), line, col), lexeme: text });
            continue;
        }

        return Err(Diagnostic::new("invalid token", span(start, start + 1, line, col)));
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        span: Span::point(cur.pos(), cur.line(), cur.col()),
        lexeme: "",
    });

    retag_keywords(&mut tokens);
    Ok(tokens)
}

fn skip_whitespace(cur: &mut Cursor<'_>) {
    while !cur.is_eof() && cur.peek().is_ascii_whitespace() {
        cur.bump();
    }
}

/// Scans a `"..."` literal, decoding escapes into a fresh byte buffer with
/// an explicit trailing NUL (spec.md §4.1, §9 last bullet: the original's
/// trailing NUL was an accident of zero-initialized allocation — this
/// rewrite makes the same observable contract explicit instead).
fn lex_string<'src>(cur: &mut Cursor<'src>, start: usize, line: u32, col: u32) -> Result<Token<'src>> {
    cur.bump(); // opening quote
    let content_start = cur.pos();
    loop {
        if cur.is_eof() || cur.peek() == b'\n' {
            return Err(Diagnostic::new("unclosed string literal", span(start, cur.pos(), line, col)));
        }
        if cur.peek() == b'"' {
            break;
        }
        if cur.peek() == b'\\' {
            cur.bump();
            if !cur.is_eof() {
                cur.bump();
            }
            continue;
        }
        cur.bump();
    }
    let raw = &cur.raw_bytes()[content_start..cur.pos()];
    let mut decoded = decode_escapes(raw, span(start, cur.pos(), line, col))?;
    cur.bump(); // closing quote
    decoded.push(0);
    let lexeme = cur.slice_from(start);
    Ok(Token { kind: TokenKind::Str(decoded), span: span(start, cur.pos(), line, col), lexeme })
}

/// Decodes C-style backslash escapes (spec.md §4.1 "Escape decoding").
fn decode_escapes(raw: &[u8], err_span: Span) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        if raw[i] != b'\\' {
            out.push(raw[i]);
            i += 1;
            continue;
        }
        i += 1;
        if i >= raw.len() {
            break;
        }
        match raw[i] {
            b'a' => {
                out.push(7);
                i += 1;
            }
            b'b' => {
                out.push(8);
                i += 1;
            }
            b't' => {
                out.push(9);
                i += 1;
            }
            b'n' => {
                out.push(10);
                i += 1;
            }
            b'v' => {
                out.push(11);
                i += 1;
            }
            b'f' => {
                out.push(12);
                i += 1;
            }
            b'r' => {
                out.push(13);
                i += 1;
            }
            b'e' => {
                out.push(27);
                i += 1;
            }
            b'x' => {
                i += 1;
                let hex_start = i;
                while i < raw.len() && raw[i].is_ascii_hexdigit() {
                    i += 1;
                }
                if i == hex_start {
                    return Err(Diagnostic::new("invalid hex escape sequence", err_span));
                }
                let hex = std::str::from_utf8(&raw[hex_start..i]).expect("hex digits are ASCII");
                let value = u64::from_str_radix(hex, 16).unwrap_or(0);
                out.push((value & 0xff) as u8);
            }
            b'0'..=b'7' => {
                let mut value: u32 = 0;
                let mut consumed = 0;
                while consumed < 3 && i < raw.len() && (b'0'..=b'7').contains(&raw[i]) {
                    value = value * 8 + (raw[i] - b'0') as u32;
                    i += 1;
                    consumed += 1;
                }
                out.push((value & 0xff) as u8);
            }
            other => {
                out.push(other);
                i += 1;
            }
        }
    }
    Ok(out)
}

/// Second pass: retags identifiers whose lexeme matches a keyword
/// (spec.md §4.1 "Keyword conversion").
fn retag_keywords(tokens: &mut [Token<'_>]) {
    for tok in tokens.iter_mut() {
        if matches!(tok.kind, TokenKind::Ident) && KEYWORDS.contains(&tok.lexeme) {
            tok.kind = TokenKind::Keyword;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn empty_source_is_just_eof() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
    }

    #[test]
    fn integer_literal() {
        let toks = tokenize("42").unwrap();
        assert_eq!(toks[0].as_num(), Some(42));
    }

    #[test]
    fn identifier_vs_keyword() {
        let toks = tokenize("return x").unwrap();
        assert_eq!(toks[0].kind, TokenKind::Keyword);
        assert_eq!(toks[1].kind, TokenKind::Ident);
    }

    #[test]
    fn two_byte_punctuators_are_greedy() {
        let toks = tokenize("a==b").unwrap();
        assert!(toks[1].is("=="));
        assert_eq!(toks.len(), 4); // a, ==, b, eof
    }

    #[test]
    fn single_byte_punct_not_confused_with_assign() {
        let toks = tokenize("a=b").unwrap();
        assert!(toks[1].is("="));
    }

    #[test]
    fn string_literal_decodes_escapes_and_nul_terminates() {
        let toks = tokenize(r#""ab\n""#).unwrap();
        assert_eq!(toks[0].as_str_bytes(), Some(&b"ab\n\0"[..]));
    }

    #[test]
    fn string_literal_hex_escape() {
        let toks = tokenize(r#""\x41""#).unwrap();
        assert_eq!(toks[0].as_str_bytes(), Some(&b"A\0"[..]));
    }

    #[test]
    fn string_literal_octal_escape() {
        let toks = tokenize(r#""\101""#).unwrap();
        assert_eq!(toks[0].as_str_bytes(), Some(&b"A\0"[..]));
    }

    #[test]
    fn unclosed_string_is_fatal() {
        assert!(tokenize("\"abc").is_err());
    }

    #[test]
    fn bad_hex_escape_is_fatal() {
        assert!(tokenize(r#""\x""#).is_err());
    }

    #[test]
    fn invalid_token_is_fatal() {
        assert!(tokenize("int a = 1 $ 2;").is_err());
    }

    #[test]
    fn keyword_set_is_exact_match_not_prefix() {
        let toks = tokenize("intx").unwrap();
        assert_eq!(toks[0].kind, TokenKind::Ident);
    }

    // Any non-negative integer, printed in decimal and tokenized back,
    // round-trips to the same value.
    #[quickcheck_macros::quickcheck]
    fn integer_literal_round_trips(value: u32) -> bool {
        let src = value.to_string();
        tokenize(&src).unwrap()[0].as_num() == Some(value as i64)
    }
}
