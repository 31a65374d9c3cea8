//! Parse error types.

use std::fmt;
use vail_ast::Span;
use vail_lexer::TokenKind;

/// Parse error with source location and context.
///
/// One parse error aborts its top-level unit: the parser performs no
/// resynchronization, it folds the error into the unit's tree as a
/// terminal `Error` node.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// Kind of parse error
    pub kind: ParseErrorKind,
    /// Source location where the error occurred
    pub span: Span,
    /// Human-readable error message
    pub message: String,
}

/// Category of parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A specific token was expected and something else was found
    UnexpectedToken,
    /// Input ended while a construct was incomplete
    UnexpectedEof,
    /// Tokens are present but violate a grammar rule
    InvalidSyntax,
}

impl ParseError {
    /// Create an "expected token" error.
    pub fn expected_token(expected: &TokenKind, found: Option<&TokenKind>, span: Span) -> Self {
        let message = match found {
            Some(token) => format!("expected {}, found {}", expected.describe(), token.describe()),
            None => format!("expected {}, found end of file", expected.describe()),
        };
        Self {
            kind: if found.is_none() {
                ParseErrorKind::UnexpectedEof
            } else {
                ParseErrorKind::UnexpectedToken
            },
            span,
            message,
        }
    }

    /// Create an "unexpected token" error with a context phrase.
    pub fn unexpected_token(found: Option<&TokenKind>, context: &str, span: Span) -> Self {
        let message = match found {
            Some(token) => format!("unexpected {} {}", token.describe(), context),
            None => format!("unexpected end of file {}", context),
        };
        Self {
            kind: if found.is_none() {
                ParseErrorKind::UnexpectedEof
            } else {
                ParseErrorKind::UnexpectedToken
            },
            span,
            message,
        }
    }

    /// Create an "invalid syntax" error.
    pub fn invalid_syntax(message: impl Into<String>, span: Span) -> Self {
        Self {
            kind: ParseErrorKind::InvalidSyntax,
            span,
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseError {}
