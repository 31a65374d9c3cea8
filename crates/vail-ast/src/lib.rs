// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! AST types for the Vail compiler
//!
//! This crate contains the node definitions, source-location foundation,
//! diagnostics, string-literal evaluation, and the tree-walking utilities
//! shared by the parser, analyzer, and generators.

pub mod ast;
pub mod diag;
pub mod foundation;
pub mod strings;

// Re-export commonly used types
pub use ast::{
    BinaryOp, Binding, CmpOp, ElseBranch, FuncModifier, ImportName, Node, NodeId, NodeIdGen,
    NodeKind, Param, Pattern, TypeTag, UnaryOp,
};
pub use diag::{Diagnostic, Severity};
pub use foundation::{SourceFile, SourceMap, Span};
