// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! The Vail compiler driver.
//!
//! Wires the pipeline crates together: one concurrent pipeline per input
//! file, stages connected by single-item channels, output written through
//! a temp file and an atomic rename.

pub mod build;

pub use build::{build, BuildOptions};
