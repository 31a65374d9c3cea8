//! Type tagging around the rewrite passes.
//!
//! Inference itself is not implemented yet, so every node gets the
//! [`TypeTag::Unknown`] placeholder (statements included; a real pass
//! would tag them with a void type). The tag/untag pair still runs so
//! the rewrite passes operate on the same tagged shape a real inference
//! pass will produce, and so untagging is exercised as the inverse of
//! tagging.

use vail_ast::ast::walk::{walk_mut, Flow};
use vail_ast::{Node, TypeTag};

/// Attach a type tag to every node.
pub(crate) fn tag(program: &mut Node) {
    walk_mut(program, &mut |node| {
        node.ty = Some(TypeTag::Unknown);
        Flow::Continue
    });
}

/// Strip all type tags, restoring the untagged tree shape.
pub(crate) fn untag(program: &mut Node) {
    walk_mut(program, &mut |node| {
        node.ty = None;
        Flow::Continue
    });
}
