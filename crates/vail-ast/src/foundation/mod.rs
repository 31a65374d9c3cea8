//! Foundation types shared across the compiler.

pub mod span;

pub use span::{SourceFile, SourceMap, Span};
