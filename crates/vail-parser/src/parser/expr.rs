//! Expression parsing by precedence climbing.
//!
//! One function per precedence level, tightest binding last:
//!
//! ```text
//! expr1  ternary ?:               right-assoc
//! expr2  ||                       left-assoc
//! expr3  &&                       left-assoc
//! expr4  comparison family        non-associative, at most one
//! expr5  + -                      left-assoc
//! expr6  * / %                    left-assoc
//! expr7  prefix ! - +             right-assoc via recursion
//! expr8  postfix [] [a:b] . ()    left-assoc chain
//! expr9  atoms
//! ```
//!
//! expr4 deliberately does not chain: `a == b == c` is a syntax error, not
//! left-associated comparison.

use super::{ParseError, Parser};
use vail_ast::{strings, BinaryOp, Node, NodeKind, UnaryOp};
use vail_lexer::TokenKind;

impl Parser<'_, '_> {
    /// Parse a full expression.
    pub(crate) fn expr(&mut self) -> Result<Node, ParseError> {
        self.expr1()
    }

    /// Ternary `cond ? then : else`, right-associative.
    fn expr1(&mut self) -> Result<Node, ParseError> {
        let start = self.stream.current_span();
        let cond = self.expr2()?;
        if !self.stream.eat(&TokenKind::Question) {
            return Ok(cond);
        }
        self.stream.skip_newlines();
        let then = self.expr1()?;
        self.stream.skip_newlines();
        self.stream.expect(&TokenKind::Colon)?;
        self.stream.skip_newlines();
        let else_ = self.expr1()?;
        let span = self.stream.span_from(start);
        Ok(self.node(
            NodeKind::Ternary {
                cond: Box::new(cond),
                then: Box::new(then),
                else_: Box::new(else_),
            },
            span,
        ))
    }

    /// Logical or, left-associative.
    fn expr2(&mut self) -> Result<Node, ParseError> {
        let start = self.stream.current_span();
        let mut left = self.expr3()?;
        while self.stream.eat(&TokenKind::OrOr) {
            self.stream.skip_newlines();
            let right = self.expr3()?;
            let span = self.stream.span_from(start);
            left = self.node(
                NodeKind::Binary {
                    op: BinaryOp::Or,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            );
        }
        Ok(left)
    }

    /// Logical and, left-associative.
    fn expr3(&mut self) -> Result<Node, ParseError> {
        let start = self.stream.current_span();
        let mut left = self.expr4()?;
        while self.stream.eat(&TokenKind::AndAnd) {
            self.stream.skip_newlines();
            let right = self.expr4()?;
            let span = self.stream.span_from(start);
            left = self.node(
                NodeKind::Binary {
                    op: BinaryOp::And,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            );
        }
        Ok(left)
    }

    /// Comparison family, at most one per level.
    fn expr4(&mut self) -> Result<Node, ParseError> {
        let start = self.stream.current_span();
        let left = self.expr5()?;
        let (op, ignore_case) = match self.stream.peek() {
            Some(TokenKind::Cmp((op, flag))) => (*op, *flag),
            _ => return Ok(left),
        };
        self.stream.advance();
        self.stream.skip_newlines();
        let right = self.expr5()?;
        if let Some(TokenKind::Cmp(_)) = self.stream.peek() {
            return Err(ParseError::invalid_syntax(
                "comparison operators cannot be chained",
                self.stream.current_span(),
            ));
        }
        let span = self.stream.span_from(start);
        Ok(self.node(
            NodeKind::Binary {
                op: BinaryOp::Cmp { op, ignore_case },
                left: Box::new(left),
                right: Box::new(right),
            },
            span,
        ))
    }

    /// Additive, left-associative.
    fn expr5(&mut self) -> Result<Node, ParseError> {
        let start = self.stream.current_span();
        let mut left = self.expr6()?;
        loop {
            let op = match self.stream.peek() {
                Some(TokenKind::Plus) => BinaryOp::Add,
                Some(TokenKind::Minus) => BinaryOp::Sub,
                _ => return Ok(left),
            };
            self.stream.advance();
            self.stream.skip_newlines();
            let right = self.expr6()?;
            let span = self.stream.span_from(start);
            left = self.node(
                NodeKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            );
        }
    }

    /// Multiplicative, left-associative.
    fn expr6(&mut self) -> Result<Node, ParseError> {
        let start = self.stream.current_span();
        let mut left = self.expr7()?;
        loop {
            let op = match self.stream.peek() {
                Some(TokenKind::Star) => BinaryOp::Mul,
                Some(TokenKind::Slash) => BinaryOp::Div,
                Some(TokenKind::Percent) => BinaryOp::Mod,
                _ => return Ok(left),
            };
            self.stream.advance();
            self.stream.skip_newlines();
            let right = self.expr7()?;
            let span = self.stream.span_from(start);
            left = self.node(
                NodeKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            );
        }
    }

    /// Prefix operators, right-associative via recursion.
    fn expr7(&mut self) -> Result<Node, ParseError> {
        let start = self.stream.current_span();
        let op = match self.stream.peek() {
            Some(TokenKind::Bang) => UnaryOp::Not,
            Some(TokenKind::Minus) => UnaryOp::Minus,
            Some(TokenKind::Plus) => UnaryOp::Plus,
            _ => return self.expr8(),
        };
        self.stream.advance();
        let operand = self.expr7()?;
        let span = self.stream.span_from(start);
        Ok(self.node(
            NodeKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        ))
    }

    /// Postfix chains: subscript, slice, dot access, call.
    fn expr8(&mut self) -> Result<Node, ParseError> {
        let start = self.stream.current_span();
        let mut base = self.expr9()?;
        loop {
            match self.stream.peek() {
                Some(TokenKind::LBracket) => {
                    self.stream.advance();
                    base = self.subscript_or_slice(base, start)?;
                }
                Some(TokenKind::Dot) => {
                    self.stream.advance();
                    let name = self.ident("after `.`")?;
                    let span = self.stream.span_from(start);
                    base = self.node(
                        NodeKind::Dot {
                            base: Box::new(base),
                            name,
                        },
                        span,
                    );
                }
                Some(TokenKind::LParen) => {
                    self.stream.advance();
                    let args = self.expr_list(&TokenKind::RParen)?;
                    let span = self.stream.span_from(start);
                    base = self.node(
                        NodeKind::Call {
                            callee: Box::new(base),
                            args,
                        },
                        span,
                    );
                }
                _ => return Ok(base),
            }
        }
    }

    /// The rest of `base[...` once the bracket is consumed.
    fn subscript_or_slice(
        &mut self,
        base: Node,
        start: vail_ast::Span,
    ) -> Result<Node, ParseError> {
        self.stream.skip_newlines();
        // Leading colon means a from-less slice.
        if self.stream.eat(&TokenKind::Colon) {
            let to = self.slice_bound()?;
            let span = self.stream.span_from(start);
            return Ok(self.node(
                NodeKind::Slice {
                    base: Box::new(base),
                    from: None,
                    to,
                },
                span,
            ));
        }
        let first = self.expr()?;
        self.stream.skip_newlines();
        if self.stream.eat(&TokenKind::Colon) {
            let to = self.slice_bound()?;
            let span = self.stream.span_from(start);
            return Ok(self.node(
                NodeKind::Slice {
                    base: Box::new(base),
                    from: Some(Box::new(first)),
                    to,
                },
                span,
            ));
        }
        self.stream.expect(&TokenKind::RBracket)?;
        let span = self.stream.span_from(start);
        Ok(self.node(
            NodeKind::Subscript {
                base: Box::new(base),
                index: Box::new(first),
            },
            span,
        ))
    }

    /// Optional upper slice bound, consuming the closing bracket.
    fn slice_bound(&mut self) -> Result<Option<Box<Node>>, ParseError> {
        self.stream.skip_newlines();
        if self.stream.eat(&TokenKind::RBracket) {
            return Ok(None);
        }
        let to = self.expr()?;
        self.stream.skip_newlines();
        self.stream.expect(&TokenKind::RBracket)?;
        Ok(Some(Box::new(to)))
    }

    /// Atoms.
    fn expr9(&mut self) -> Result<Node, ParseError> {
        let span = self.stream.current_span();
        let kind = match self.stream.peek() {
            Some(TokenKind::Int(value)) => {
                let value = *value;
                self.stream.advance();
                NodeKind::Int { value }
            }
            Some(TokenKind::Float(value)) => {
                let value = *value;
                self.stream.advance();
                NodeKind::Float { value }
            }
            Some(TokenKind::True) => {
                self.stream.advance();
                NodeKind::Bool { value: true }
            }
            Some(TokenKind::False) => {
                self.stream.advance();
                NodeKind::Bool { value: false }
            }
            Some(TokenKind::Null) => {
                self.stream.advance();
                NodeKind::Null
            }
            Some(TokenKind::Str(raw)) => {
                let raw = raw.clone();
                self.stream.advance();
                let value = strings::eval_quoted(&raw).map_err(|err| {
                    ParseError::invalid_syntax(format!("invalid string literal: {err}"), span)
                })?;
                NodeKind::Str { value }
            }
            Some(TokenKind::Ident(name)) => {
                let name = name.clone();
                self.stream.advance();
                NodeKind::Ident { name }
            }
            Some(TokenKind::OptionVar(name)) => {
                let name = name.clone();
                self.stream.advance();
                NodeKind::OptionVar { name }
            }
            Some(TokenKind::Env(name)) => {
                let name = name.clone();
                self.stream.advance();
                NodeKind::Env { name }
            }
            Some(TokenKind::Reg(name)) => {
                let name = name.clone();
                self.stream.advance();
                NodeKind::Reg { name }
            }
            Some(TokenKind::LParen) => {
                self.stream.advance();
                self.stream.skip_newlines();
                let inner = self.expr()?;
                self.stream.skip_newlines();
                self.stream.expect(&TokenKind::RParen)?;
                return Ok(inner);
            }
            Some(TokenKind::LBracket) => {
                self.stream.advance();
                let items = self.expr_list(&TokenKind::RBracket)?;
                let span = self.stream.span_from(span);
                return Ok(self.node(NodeKind::List { items }, span));
            }
            Some(TokenKind::LBrace) => return self.dict_literal(),
            Some(TokenKind::Func) => return self.func(true),
            Some(TokenKind::Error(text)) => {
                return Err(ParseError::invalid_syntax(
                    format!("unrecognized input: `{text}`"),
                    span,
                ));
            }
            found => {
                return Err(ParseError::unexpected_token(found, "in expression", span));
            }
        };
        Ok(self.node(kind, span))
    }

    /// Comma-separated expressions up to and including `close`.
    ///
    /// Newlines are free inside the brackets; a trailing comma is allowed.
    pub(crate) fn expr_list(&mut self, close: &TokenKind) -> Result<Vec<Node>, ParseError> {
        let mut items = Vec::new();
        loop {
            self.stream.skip_newlines();
            if self.stream.eat(close) {
                return Ok(items);
            }
            items.push(self.expr()?);
            self.stream.skip_newlines();
            if !self.stream.eat(&TokenKind::Comma) {
                self.stream.skip_newlines();
                self.stream.expect(close)?;
                return Ok(items);
            }
        }
    }

    /// Dictionary literal `{key: value, ...}`.
    ///
    /// A key that is a bare identifier immediately followed by `:` becomes
    /// a string key; any other key is a general expression.
    fn dict_literal(&mut self) -> Result<Node, ParseError> {
        let start = self.stream.current_span();
        self.stream.expect(&TokenKind::LBrace)?;
        let mut entries = Vec::new();
        loop {
            self.stream.skip_newlines();
            if self.stream.eat(&TokenKind::RBrace) {
                break;
            }
            let key = match (self.stream.peek(), self.stream.peek_nth(1)) {
                (Some(TokenKind::Ident(name)), Some(TokenKind::Colon)) => {
                    let name = name.clone();
                    let key_span = self.stream.current_span();
                    self.stream.advance();
                    self.node(NodeKind::Str { value: name }, key_span)
                }
                _ => self.expr()?,
            };
            self.stream.skip_newlines();
            self.stream.expect(&TokenKind::Colon)?;
            self.stream.skip_newlines();
            let value = self.expr()?;
            entries.push((key, value));
            self.stream.skip_newlines();
            if !self.stream.eat(&TokenKind::Comma) {
                self.stream.skip_newlines();
                self.stream.expect(&TokenKind::RBrace)?;
                break;
            }
        }
        let span = self.stream.span_from(start);
        Ok(self.node(NodeKind::Dict { entries }, span))
    }

    /// Expect an identifier and return its text.
    pub(crate) fn ident(&mut self, context: &str) -> Result<String, ParseError> {
        match self.stream.peek() {
            Some(TokenKind::Ident(name)) => {
                let name = name.clone();
                self.stream.advance();
                Ok(name)
            }
            found => Err(ParseError::unexpected_token(
                found,
                &format!("where an identifier is expected {context}"),
                self.stream.current_span(),
            )),
        }
    }
}
