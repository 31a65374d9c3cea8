// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Semantic analysis for Vail.
//!
//! Runs the configurable check and rewrite passes over a parsed tree:
//! scope-based variable resolution, duplicate/undeclared/const-violation
//! diagnostics, underscore-binding rewrites, and a placeholder
//! type-tagging pass.

pub mod analyze;

pub use analyze::{analyze_source, Analyzer, Policy};
