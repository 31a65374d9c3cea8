//! Hand-written recursive descent parser for Vail.
//!
//! ## Architecture
//!
//! - `stream`: TokenStream wrapper with lookahead
//! - `error`: ParseError types
//! - `expr`: precedence-climbing expression parser (expr1 through expr9)
//! - `stmt`: statement and top-level unit parsers
//!
//! One source file parses to one `Program` node. A syntax error aborts the
//! unit: the program body ends with a terminal `Error` node carrying the
//! message and location, and no recovery is attempted.

mod error;
mod stream;

pub use error::{ParseError, ParseErrorKind};
use stream::TokenStream;

mod expr;
mod stmt;

use vail_ast::{Diagnostic, Node, NodeIdGen, NodeKind, Span};
use vail_lexer::Token;

/// Shared parser state for the recursive descent routines.
pub(crate) struct Parser<'src, 'ids> {
    pub(crate) stream: TokenStream<'src>,
    pub(crate) ids: &'ids mut NodeIdGen,
}

impl Parser<'_, '_> {
    pub(crate) fn node(&mut self, kind: NodeKind, span: Span) -> Node {
        Node::new(self.ids.fresh(), kind, span)
    }
}

/// Parse one file's tokens into a `Program` node.
///
/// Never fails: a syntax error becomes a trailing `Error` node in the
/// program body. Use [`collect_errors`] to turn those into diagnostics.
pub fn parse(tokens: &[Token], file_id: u16, ids: &mut NodeIdGen) -> Node {
    let mut parser = Parser {
        stream: TokenStream::new(tokens, file_id),
        ids,
    };
    parser.program(file_id)
}

/// Collect the diagnostics for every `Error` node in a parsed tree.
pub fn collect_errors(program: &Node) -> Vec<Diagnostic> {
    let mut errors = Vec::new();
    vail_ast::ast::walk::walk(program, &mut |node| {
        if let NodeKind::Error { message } = node.terminal() {
            errors.push(match node.span {
                Some(span) => Diagnostic::error(span, message.clone()),
                None => Diagnostic::error_nospan(message.clone()),
            });
        }
        vail_ast::ast::walk::Flow::Continue
    });
    errors
}
