// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Recursive descent parser for Vail.
//!
//! Consumes the token stream produced by `vail-lexer` and builds one
//! `Program` node per source file. Syntax errors become terminal `Error`
//! nodes in the tree rather than early returns, so a file with a bad unit
//! still yields a tree the driver can report diagnostics from.

pub mod parser;

pub use parser::{collect_errors, parse, ParseError, ParseErrorKind};
