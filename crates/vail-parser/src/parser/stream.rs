//! Token stream wrapper for the hand-written parser.

use vail_ast::Span;
use vail_lexer::{Token, TokenKind};

/// Token stream with lookahead and position tracking.
///
/// Provides consuming, lookahead, and span tracking for the recursive
/// descent parser. Tokens carry their byte spans from the lexer, so error
/// messages point at real source locations.
pub struct TokenStream<'src> {
    tokens: &'src [Token],
    pos: usize,
    file_id: u16,
}

impl<'src> TokenStream<'src> {
    /// Create a new token stream.
    pub fn new(tokens: &'src [Token], file_id: u16) -> Self {
        Self {
            tokens,
            pos: 0,
            file_id,
        }
    }

    /// Peek at the current token without consuming it.
    pub fn peek(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    /// Peek at the nth token ahead without consuming.
    pub fn peek_nth(&self, n: usize) -> Option<&TokenKind> {
        self.tokens.get(self.pos + n).map(|t| &t.kind)
    }

    /// Advance to the next token and return the consumed one.
    pub fn advance(&mut self) -> Option<&TokenKind> {
        let token = self.tokens.get(self.pos).map(|t| &t.kind);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Check if the current token matches the expected kind, comparing
    /// variants only (payloads are ignored).
    pub fn check(&self, expected: &TokenKind) -> bool {
        matches!(self.peek(), Some(t) if std::mem::discriminant(t) == std::mem::discriminant(expected))
    }

    /// Consume the current token if it matches; report whether it did.
    pub fn eat(&mut self, expected: &TokenKind) -> bool {
        if self.check(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Expect a specific token kind and advance past it.
    pub fn expect(&mut self, expected: &TokenKind) -> Result<Span, super::ParseError> {
        if self.check(expected) {
            let span = self.current_span();
            self.advance();
            Ok(span)
        } else {
            Err(super::ParseError::expected_token(
                expected,
                self.peek(),
                self.current_span(),
            ))
        }
    }

    /// Skip any run of newline tokens.
    ///
    /// Used inside bracketed constructs, where line breaks do not
    /// terminate anything.
    pub fn skip_newlines(&mut self) {
        while self.check(&TokenKind::Newline) {
            self.advance();
        }
    }

    /// Check if we've reached the end of the token stream.
    pub fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Get a span for the current token, or a zero-width span at EOF.
    pub fn current_span(&self) -> Span {
        if let Some(token) = self.tokens.get(self.pos) {
            token.span
        } else if let Some(token) = self.tokens.last() {
            Span::new(
                self.file_id,
                token.span.end,
                token.span.end,
                token.span.start_line,
            )
        } else {
            Span::zero(self.file_id)
        }
    }

    /// Get the span of the most recently consumed token.
    ///
    /// Falls back to the current span when nothing has been consumed yet.
    pub fn prev_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            self.current_span()
        }
    }

    /// Merge a start span with the span of the last consumed token.
    pub fn span_from(&self, start: Span) -> Span {
        start.merge(&self.prev_span())
    }
}
