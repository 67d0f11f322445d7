use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use crate::token::Span;

/// Kind of parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnterminatedString,
    UnterminatedComment,
    UnterminatedChar,
    UnbalancedDelimiter,
    UnexpectedToken,
    UnexpectedEof,
    /// The C# grammar could not be loaded or produced no tree.
    Grammar,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::UnterminatedString => "Unterminated string literal",
            ErrorKind::UnterminatedComment => "Unterminated block comment",
            ErrorKind::UnterminatedChar => "Unterminated character literal",
            ErrorKind::UnbalancedDelimiter => "Unbalanced delimiter",
            ErrorKind::UnexpectedToken => "Unexpected token",
            ErrorKind::UnexpectedEof => "Unexpected end of file",
            ErrorKind::Grammar => "C# grammar failure",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error while reading C# source
#[derive(Debug, Clone, Error, Diagnostic)]
#[error("{kind} at line {line}: {message}")]
#[diagnostic(code(fgen::syntax))]
pub struct ParseError {
    pub kind: ErrorKind,
    pub message: String,
    pub line: usize,
    #[label("{kind}")]
    pub span: SourceSpan,
}

impl ParseError {
    /// Create a new parse error
    pub fn new(kind: ErrorKind, message: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            message: message.into(),
            line: span.line,
            span: span.into(),
        }
    }

    /// Attach the offending source so miette can render a snippet.
    pub fn with_source(
        self,
        name: impl AsRef<str>,
        source: impl Into<String>,
    ) -> miette::Report {
        miette::Report::new(self)
            .with_source_code(miette::NamedSource::new(name, source.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ParseError::new(
            ErrorKind::UnexpectedEof,
            "expected `}`",
            Span::new(10, 11, 3),
        );
        assert_eq!(
            err.to_string(),
            "Unexpected end of file at line 3: expected `}`"
        );
    }

    #[test]
    fn test_error_span_conversion() {
        let err = ParseError::new(ErrorKind::UnexpectedToken, "x", Span::new(4, 9, 1));
        assert_eq!(err.span.offset(), 4);
        assert_eq!(err.span.len(), 5);
    }
}
