// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Code generation for Vail.
//!
//! Three generators share one contract: `render(program) -> Vec<Chunk>`,
//! a lazily-consumable sequence of text chunks. A chunk is either target
//! text or an [`emit::EmitError`]; the output writer stops at the first
//! error chunk and discards the file.

pub mod emit;

pub use emit::{Chunk, EmitError, Format};
