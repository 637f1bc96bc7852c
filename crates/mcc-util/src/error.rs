//! The single fatal-error taxonomy used across the whole pipeline.

use thiserror::Error;

use crate::span::{locate, Span};

/// A fatal compilation error, anchored to the span in the source that
/// caused it. Every stage (`mcc-lex`, `mcc-par`, `mcc-gen`) reports
/// failures through this one type — there is no separate warning level.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct Diagnostic {
    pub message: String,
    pub span: Span,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

pub type Result<T> = std::result::Result<T, Diagnostic>;

/// Renders a [`Diagnostic`] against the original source: the offending
/// line, a caret under the start column, then the message — the format
/// every stage's error path funnels into before `mcc-drv` prints it to
/// stderr and exits non-zero.
///
/// # Examples
///
/// ```
/// use mcc_util::error::{render, Diagnostic};
/// use mcc_util::span::Span;
///
/// let src = "int main() { retur 0; }";
/// let diag = Diagnostic::new("unexpected token", Span::new(13, 18, 1, 14));
/// let rendered = render(src, &diag);
/// assert!(rendered.contains("unexpected token"));
/// assert!(rendered.contains('^'));
/// ```
pub fn render(source: &str, diag: &Diagnostic) -> String {
    let (line, column, text) = locate(source, diag.span.start);
    let caret = " ".repeat(column.saturating_sub(1) as usize) + "^";
    format!("{text}\n{caret} {message}\nat line {line}, column {column}", message = diag.message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_points_caret_at_span_start() {
        let src = "int a = 1 +;";
        let diag = Diagnostic::new("expected expression", Span::new(11, 12, 1, 12));
        let rendered = render(src, &diag);
        assert!(rendered.starts_with("int a = 1 +;"));
        assert!(rendered.contains("expected expression"));
        assert!(rendered.contains("line 1, column 12"));
    }
}
