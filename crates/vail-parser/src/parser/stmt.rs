//! Statement and top-level unit parsing.
//!
//! Statements are line-terminated. A block is `{ ... }` with one statement
//! per line; comments are statements of their own so the pretty-printer
//! can reproduce them.

use super::{ParseError, Parser};
use vail_ast::{
    Binding, ElseBranch, FuncModifier, ImportName, Node, NodeKind, Param, Pattern, Span,
};
use vail_lexer::TokenKind;

impl Parser<'_, '_> {
    /// Parse the whole token stream as one top-level unit.
    ///
    /// On a syntax error the body ends with an `Error` node and parsing of
    /// this unit stops.
    pub(crate) fn program(&mut self, file_id: u16) -> Node {
        let start = if self.stream.at_end() {
            Span::zero(file_id)
        } else {
            self.stream.current_span()
        };
        let mut body = Vec::new();
        loop {
            self.stream.skip_newlines();
            if self.stream.at_end() {
                break;
            }
            match self.statement_line(&mut body) {
                Ok(()) => {}
                Err(err) => {
                    let node = self.node(NodeKind::Error { message: err.message }, err.span);
                    body.push(node);
                    break;
                }
            }
        }
        let span = self.stream.span_from(start);
        self.node(NodeKind::Program { body }, span)
    }

    /// Parse one statement plus its line terminator, pushing the results.
    ///
    /// Pushes zero nodes (discarded no-op), one, or two (statement plus a
    /// trailing comment).
    fn statement_line(&mut self, out: &mut Vec<Node>) -> Result<(), ParseError> {
        if let Some(stmt) = self.statement()? {
            out.push(stmt);
        }
        if let Some(TokenKind::Comment(text)) = self.stream.peek() {
            let text = text.clone();
            let span = self.stream.current_span();
            self.stream.advance();
            out.push(self.node(NodeKind::Comment { text }, span));
        }
        let terminated = self.stream.eat(&TokenKind::Newline)
            || self.stream.check(&TokenKind::RBrace)
            || self.stream.at_end();
        if terminated {
            Ok(())
        } else {
            Err(ParseError::unexpected_token(
                self.stream.peek(),
                "after statement",
                self.stream.current_span(),
            ))
        }
    }

    /// Parse one statement. `None` means a parsed-but-discarded no-op
    /// (an anonymous function in statement position).
    fn statement(&mut self) -> Result<Option<Node>, ParseError> {
        match self.stream.peek() {
            Some(TokenKind::Comment(text)) => {
                let text = text.clone();
                let span = self.stream.current_span();
                self.stream.advance();
                Ok(Some(self.node(NodeKind::Comment { text }, span)))
            }
            Some(TokenKind::Import) => self.import_stmt().map(Some),
            Some(TokenKind::From) => self.from_import_stmt().map(Some),
            Some(TokenKind::Const) | Some(TokenKind::Let) => self.decl_stmt().map(Some),
            Some(TokenKind::Func) => {
                let func = self.func(false)?;
                // An anonymous function statement declares nothing and
                // has no effect; it parses and is dropped.
                match func.terminal() {
                    NodeKind::Func { name: None, .. } => Ok(None),
                    _ => Ok(Some(func)),
                }
            }
            Some(TokenKind::Return) => self.return_stmt().map(Some),
            Some(TokenKind::If) => self.if_stmt().map(Some),
            Some(TokenKind::While) => self.while_stmt().map(Some),
            Some(TokenKind::For) => self.for_stmt().map(Some),
            _ => self.expr_stmt().map(Some),
        }
    }

    /// `import "pkg"` / `import "pkg" as alias`
    fn import_stmt(&mut self) -> Result<Node, ParseError> {
        let start = self.stream.current_span();
        self.stream.expect(&TokenKind::Import)?;
        let package = self.string_literal("after `import`")?;
        let alias = if self.stream.eat(&TokenKind::As) {
            Some(self.ident("after `as`")?)
        } else {
            None
        };
        let span = self.stream.span_from(start);
        Ok(self.node(
            NodeKind::Import {
                package,
                alias,
                names: Vec::new(),
            },
            span,
        ))
    }

    /// `from "pkg" import a, b as c`
    fn from_import_stmt(&mut self) -> Result<Node, ParseError> {
        let start = self.stream.current_span();
        self.stream.expect(&TokenKind::From)?;
        let package = self.string_literal("after `from`")?;
        self.stream.expect(&TokenKind::Import)?;
        let mut names = Vec::new();
        loop {
            let name = self.ident("in import list")?;
            let rename = if self.stream.eat(&TokenKind::As) {
                Some(self.ident("after `as`")?)
            } else {
                None
            };
            names.push(ImportName { name, rename });
            if !self.stream.eat(&TokenKind::Comma) {
                break;
            }
        }
        let span = self.stream.span_from(start);
        Ok(self.node(
            NodeKind::Import {
                package,
                alias: None,
                names,
            },
            span,
        ))
    }

    /// `const pattern = expr` / `let pattern = expr`
    fn decl_stmt(&mut self) -> Result<Node, ParseError> {
        let start = self.stream.current_span();
        let is_const = match self.stream.advance() {
            Some(TokenKind::Const) => true,
            _ => false,
        };
        let pattern = self.pattern()?;
        self.stream.expect(&TokenKind::Assign)?;
        self.stream.skip_newlines();
        let value = self.expr()?;
        let span = self.stream.span_from(start);
        Ok(self.node(
            NodeKind::Decl {
                is_const,
                pattern,
                value: Box::new(value),
            },
            span,
        ))
    }

    /// A binding pattern: one name or `[a, b, _]`.
    fn pattern(&mut self) -> Result<Pattern, ParseError> {
        if self.stream.eat(&TokenKind::LBracket) {
            let mut bindings = Vec::new();
            loop {
                self.stream.skip_newlines();
                let span = self.stream.current_span();
                let name = self.ident("in destructuring pattern")?;
                bindings.push(Binding::new(name, span));
                self.stream.skip_newlines();
                if !self.stream.eat(&TokenKind::Comma) {
                    self.stream.expect(&TokenKind::RBracket)?;
                    break;
                }
            }
            Ok(Pattern::List(bindings))
        } else {
            let span = self.stream.current_span();
            let name = self.ident("in declaration")?;
            Ok(Pattern::Ident(Binding::new(name, span)))
        }
    }

    /// `return` / `return expr`
    fn return_stmt(&mut self) -> Result<Node, ParseError> {
        let start = self.stream.current_span();
        self.stream.expect(&TokenKind::Return)?;
        let at_line_end = self.stream.check(&TokenKind::Newline)
            || self.stream.check(&TokenKind::RBrace)
            || matches!(self.stream.peek(), Some(TokenKind::Comment(_)))
            || self.stream.at_end();
        let value = if at_line_end {
            None
        } else {
            Some(Box::new(self.expr()?))
        };
        let span = self.stream.span_from(start);
        Ok(self.node(NodeKind::Return { value }, span))
    }

    /// `if cond { ... } else if ... else { ... }`
    fn if_stmt(&mut self) -> Result<Node, ParseError> {
        let start = self.stream.current_span();
        self.stream.expect(&TokenKind::If)?;
        let cond = self.expr()?;
        let body = self.block()?;
        let else_branch = if self.stream.eat(&TokenKind::Else) {
            if self.stream.check(&TokenKind::If) {
                ElseBranch::ElseIf(Box::new(self.if_stmt()?))
            } else {
                ElseBranch::Else(self.block()?)
            }
        } else {
            ElseBranch::None
        };
        let span = self.stream.span_from(start);
        Ok(self.node(
            NodeKind::If {
                cond: Box::new(cond),
                body,
                else_branch,
            },
            span,
        ))
    }

    /// `while cond { ... }`
    fn while_stmt(&mut self) -> Result<Node, ParseError> {
        let start = self.stream.current_span();
        self.stream.expect(&TokenKind::While)?;
        let cond = self.expr()?;
        let body = self.block()?;
        let span = self.stream.span_from(start);
        Ok(self.node(
            NodeKind::While {
                cond: Box::new(cond),
                body,
            },
            span,
        ))
    }

    /// `for pattern in expr { ... }`
    fn for_stmt(&mut self) -> Result<Node, ParseError> {
        let start = self.stream.current_span();
        self.stream.expect(&TokenKind::For)?;
        let pattern = self.pattern()?;
        self.stream.expect(&TokenKind::In)?;
        let iter = self.expr()?;
        let body = self.block()?;
        let span = self.stream.span_from(start);
        Ok(self.node(
            NodeKind::For {
                pattern,
                iter: Box::new(iter),
                body,
            },
            span,
        ))
    }

    /// Expression statement, optionally an assignment.
    fn expr_stmt(&mut self) -> Result<Node, ParseError> {
        let start = self.stream.current_span();
        let expr = self.expr()?;
        if !self.stream.check(&TokenKind::Assign) {
            return Ok(expr);
        }
        match expr.terminal() {
            NodeKind::Ident { .. }
            | NodeKind::Dot { .. }
            | NodeKind::Subscript { .. }
            | NodeKind::Slice { .. }
            | NodeKind::OptionVar { .. }
            | NodeKind::Env { .. }
            | NodeKind::Reg { .. } => {}
            _ => {
                return Err(ParseError::invalid_syntax(
                    "invalid assignment target",
                    self.stream.current_span(),
                ));
            }
        }
        self.stream.advance();
        self.stream.skip_newlines();
        let value = self.expr()?;
        let span = self.stream.span_from(start);
        Ok(self.node(
            NodeKind::Assign {
                target: Box::new(expr),
                value: Box::new(value),
            },
            span,
        ))
    }

    /// `{ ... }` with one statement per line.
    pub(crate) fn block(&mut self) -> Result<Vec<Node>, ParseError> {
        self.stream.expect(&TokenKind::LBrace)?;
        let mut body = Vec::new();
        loop {
            self.stream.skip_newlines();
            if self.stream.eat(&TokenKind::RBrace) {
                return Ok(body);
            }
            if self.stream.at_end() {
                return Err(ParseError::unexpected_token(
                    None,
                    "while a block is still open",
                    self.stream.current_span(),
                ));
            }
            self.statement_line(&mut body)?;
        }
    }

    /// Shared function parser for statement and expression position.
    ///
    /// `func [mods] name(params): Ret { body }` in full; a name-less
    /// function with a bare expression body is a lambda.
    pub(crate) fn func(&mut self, is_expr: bool) -> Result<Node, ParseError> {
        let start = self.stream.current_span();
        self.stream.expect(&TokenKind::Func)?;

        let mut mods = Vec::new();
        if self.stream.eat(&TokenKind::LBracket) {
            loop {
                let span = self.stream.current_span();
                let word = self.ident("in modifier list")?;
                match FuncModifier::from_word(&word) {
                    Some(m) => mods.push(m),
                    None => {
                        return Err(ParseError::invalid_syntax(
                            format!("unknown function modifier `{word}`"),
                            span,
                        ));
                    }
                }
                if !self.stream.eat(&TokenKind::Comma) {
                    self.stream.expect(&TokenKind::RBracket)?;
                    break;
                }
            }
        }

        let name = match self.stream.peek() {
            Some(TokenKind::Ident(name)) => {
                let name = name.clone();
                self.stream.advance();
                Some(name)
            }
            _ => None,
        };

        self.stream.expect(&TokenKind::LParen)?;
        let mut params = Vec::new();
        loop {
            self.stream.skip_newlines();
            if self.stream.eat(&TokenKind::RParen) {
                break;
            }
            let span = self.stream.current_span();
            let pname = self.ident("in parameter list")?;
            let ty = if self.stream.eat(&TokenKind::Colon) {
                Some(self.ident("as a parameter type")?)
            } else {
                None
            };
            let default = if self.stream.eat(&TokenKind::Assign) {
                Some(self.expr()?)
            } else {
                None
            };
            params.push(Param {
                name: Binding::new(pname, span),
                ty,
                default,
            });
            self.stream.skip_newlines();
            if !self.stream.eat(&TokenKind::Comma) {
                self.stream.skip_newlines();
                self.stream.expect(&TokenKind::RParen)?;
                break;
            }
        }

        let ret = if self.stream.eat(&TokenKind::Colon) {
            Some(self.ident("as a return type")?)
        } else {
            None
        };

        let (is_block, body) = if self.stream.check(&TokenKind::LBrace) {
            (true, self.block()?)
        } else if name.is_none() {
            // Lambda: a single expression body.
            (false, vec![self.expr()?])
        } else {
            return Err(ParseError::expected_token(
                &TokenKind::LBrace,
                self.stream.peek(),
                self.stream.current_span(),
            ));
        };

        let span = self.stream.span_from(start);
        Ok(self.node(
            NodeKind::Func {
                mods,
                name,
                params,
                ret,
                is_block,
                body,
                is_expr,
            },
            span,
        ))
    }

    /// Expect a string literal token and decode it.
    fn string_literal(&mut self, context: &str) -> Result<String, ParseError> {
        let span = self.stream.current_span();
        match self.stream.peek() {
            Some(TokenKind::Str(raw)) => {
                let raw = raw.clone();
                self.stream.advance();
                vail_ast::strings::eval_quoted(&raw).map_err(|err| {
                    ParseError::invalid_syntax(format!("invalid string literal: {err}"), span)
                })
            }
            found => Err(ParseError::unexpected_token(
                found,
                &format!("where a string literal is expected {context}"),
                span,
            )),
        }
    }
}
