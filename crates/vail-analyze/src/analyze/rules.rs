//! Structural check passes composed into one traversal.
//!
//! Two rules share a single walk over each top-level statement via
//! `walk_multi`, each with its own pruning:
//!
//! - *toplevel-return* prunes function bodies (a `return` inside a
//!   function is fine) and expression subtrees (a `return` cannot appear
//!   inside an expression in this grammar, so pruning is an optimization)
//! - *underscore-variable-reference* never prunes: `_` binds in
//!   declaration patterns, which are not identifier nodes, so any `Ident`
//!   named `_` is a read of a discarded value

use super::policy::{self, Policy};
use vail_ast::ast::walk::{walk, walk_multi, Flow};
use vail_ast::{Diagnostic, Node, NodeKind};

/// Run the structural rules over one top-level unit.
pub(crate) fn check_structure(program: &Node, policy: &Policy, diags: &mut Vec<Diagnostic>) {
    let NodeKind::Program { body } = program.terminal() else {
        return;
    };

    let check_return = policy.enabled(policy::TOPLEVEL_RETURN);
    let check_underscore = policy.enabled(policy::UNDERSCORE_REFERENCE);
    if !check_return && !check_underscore {
        return;
    }

    let mut return_diags = Vec::new();
    let mut underscore_diags = Vec::new();
    for stmt in body {
        let mut on_return = |node: &Node| toplevel_return_visit(node, &mut return_diags);
        let mut on_underscore = |node: &Node| underscore_visit(node, &mut underscore_diags);
        match (check_return, check_underscore) {
            (true, true) => walk_multi(stmt, &mut [&mut on_return, &mut on_underscore]),
            (true, false) => walk(stmt, &mut on_return),
            (false, true) => walk(stmt, &mut on_underscore),
            (false, false) => unreachable!(),
        }
    }
    diags.append(&mut return_diags);
    diags.append(&mut underscore_diags);
}

fn toplevel_return_visit(node: &Node, diags: &mut Vec<Diagnostic>) -> Flow {
    match node.terminal() {
        NodeKind::Func { .. } => Flow::SkipChildren,
        NodeKind::Return { .. } => {
            diags.push(diag(node, "return outside of a function"));
            Flow::SkipChildren
        }
        _ if node.is_expr() => Flow::SkipChildren,
        _ => Flow::Continue,
    }
}

fn underscore_visit(node: &Node, diags: &mut Vec<Diagnostic>) -> Flow {
    if matches!(node.terminal(), NodeKind::Ident { name } if name == "_") {
        diags.push(diag(node, "cannot reference the value of `_`"));
    }
    Flow::Continue
}

fn diag(node: &Node, message: &str) -> Diagnostic {
    match node.span {
        Some(span) => Diagnostic::error(span, message),
        None => Diagnostic::error_nospan(message),
    }
}
