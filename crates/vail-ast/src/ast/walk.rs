//! Tree walking utilities.
//!
//! Provides shared traversal logic so validation and rewrite passes never
//! duplicate the recursive descent over `NodeKind`.
//!
//! # Design
//!
//! - **Closure visitors** - Caller provides `FnMut(&Node) -> Flow`, not a
//!   trait implementation
//! - **Pre-order traversal** - Visitor called before recursing into children
//! - **Subtree pruning** - Returning [`Flow::SkipChildren`] stops descent
//!   below the current node without ending the walk
//! - **Multi-visitor composition** - [`walk_multi`] runs several visitors in
//!   one pass; each visitor's skip applies only to itself, and children are
//!   skipped only once every visitor has pruned
//!
//! Child enumeration lives in [`for_each_child`] / [`for_each_child_mut`];
//! both match exhaustively so adding a `NodeKind` variant without updating
//! them fails to compile.

use super::node::{ElseBranch, Node, NodeKind};

/// Visitor verdict for the subtree below the current node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Descend into children
    Continue,
    /// Skip the current node's children; siblings are still visited
    SkipChildren,
}

/// Apply `f` to each direct child of `node`, left to right.
pub fn for_each_child<'a>(node: &'a Node, f: &mut impl FnMut(&'a Node)) {
    match &node.kind {
        NodeKind::Program { body } => {
            for stmt in body {
                f(stmt);
            }
        }
        NodeKind::Func { params, body, .. } => {
            for param in params {
                if let Some(default) = &param.default {
                    f(default);
                }
            }
            for stmt in body {
                f(stmt);
            }
        }
        NodeKind::Return { value } => {
            if let Some(value) = value {
                f(value);
            }
        }
        NodeKind::Decl { value, .. } => f(value),
        NodeKind::Assign { target, value } => {
            f(target);
            f(value);
        }
        NodeKind::If {
            cond,
            body,
            else_branch,
        } => {
            f(cond);
            for stmt in body {
                f(stmt);
            }
            match else_branch {
                ElseBranch::None => {}
                ElseBranch::ElseIf(chained) => f(chained),
                ElseBranch::Else(stmts) => {
                    for stmt in stmts {
                        f(stmt);
                    }
                }
            }
        }
        NodeKind::While { cond, body } => {
            f(cond);
            for stmt in body {
                f(stmt);
            }
        }
        NodeKind::For { iter, body, .. } => {
            f(iter);
            for stmt in body {
                f(stmt);
            }
        }
        NodeKind::Ternary { cond, then, else_ } => {
            f(cond);
            f(then);
            f(else_);
        }
        NodeKind::Binary { left, right, .. } => {
            f(left);
            f(right);
        }
        NodeKind::Unary { operand, .. } => f(operand),
        NodeKind::Slice { base, from, to } => {
            f(base);
            if let Some(from) = from {
                f(from);
            }
            if let Some(to) = to {
                f(to);
            }
        }
        NodeKind::Call { callee, args } => {
            f(callee);
            for arg in args {
                f(arg);
            }
        }
        NodeKind::Subscript { base, index } => {
            f(base);
            f(index);
        }
        NodeKind::Dot { base, .. } => f(base),
        NodeKind::List { items } => {
            for item in items {
                f(item);
            }
        }
        NodeKind::Dict { entries } => {
            for (key, value) in entries {
                f(key);
                f(value);
            }
        }
        NodeKind::Comment { .. }
        | NodeKind::Import { .. }
        | NodeKind::Ident { .. }
        | NodeKind::Int { .. }
        | NodeKind::Float { .. }
        | NodeKind::Bool { .. }
        | NodeKind::Null
        | NodeKind::Str { .. }
        | NodeKind::OptionVar { .. }
        | NodeKind::Env { .. }
        | NodeKind::Reg { .. }
        | NodeKind::Error { .. } => {}
    }
}

/// Apply `f` to each direct child of `node` mutably, left to right.
pub fn for_each_child_mut(node: &mut Node, f: &mut impl FnMut(&mut Node)) {
    match &mut node.kind {
        NodeKind::Program { body } => {
            for stmt in body {
                f(stmt);
            }
        }
        NodeKind::Func { params, body, .. } => {
            for param in params {
                if let Some(default) = &mut param.default {
                    f(default);
                }
            }
            for stmt in body {
                f(stmt);
            }
        }
        NodeKind::Return { value } => {
            if let Some(value) = value {
                f(value);
            }
        }
        NodeKind::Decl { value, .. } => f(value),
        NodeKind::Assign { target, value } => {
            f(target);
            f(value);
        }
        NodeKind::If {
            cond,
            body,
            else_branch,
        } => {
            f(cond);
            for stmt in body {
                f(stmt);
            }
            match else_branch {
                ElseBranch::None => {}
                ElseBranch::ElseIf(chained) => f(chained),
                ElseBranch::Else(stmts) => {
                    for stmt in stmts {
                        f(stmt);
                    }
                }
            }
        }
        NodeKind::While { cond, body } => {
            f(cond);
            for stmt in body {
                f(stmt);
            }
        }
        NodeKind::For { iter, body, .. } => {
            f(iter);
            for stmt in body {
                f(stmt);
            }
        }
        NodeKind::Ternary { cond, then, else_ } => {
            f(cond);
            f(then);
            f(else_);
        }
        NodeKind::Binary { left, right, .. } => {
            f(left);
            f(right);
        }
        NodeKind::Unary { operand, .. } => f(operand),
        NodeKind::Slice { base, from, to } => {
            f(base);
            if let Some(from) = from {
                f(from);
            }
            if let Some(to) = to {
                f(to);
            }
        }
        NodeKind::Call { callee, args } => {
            f(callee);
            for arg in args {
                f(arg);
            }
        }
        NodeKind::Subscript { base, index } => {
            f(base);
            f(index);
        }
        NodeKind::Dot { base, .. } => f(base),
        NodeKind::List { items } => {
            for item in items {
                f(item);
            }
        }
        NodeKind::Dict { entries } => {
            for (key, value) in entries {
                f(key);
                f(value);
            }
        }
        NodeKind::Comment { .. }
        | NodeKind::Import { .. }
        | NodeKind::Ident { .. }
        | NodeKind::Int { .. }
        | NodeKind::Float { .. }
        | NodeKind::Bool { .. }
        | NodeKind::Null
        | NodeKind::Str { .. }
        | NodeKind::OptionVar { .. }
        | NodeKind::Env { .. }
        | NodeKind::Reg { .. }
        | NodeKind::Error { .. } => {}
    }
}

/// Walk a tree in pre-order, calling the visitor for each node.
///
/// Returning [`Flow::SkipChildren`] prunes the subtree below the current
/// node; the walk continues with its siblings. The visitor receives
/// references that live as long as the tree, so it may collect them.
pub fn walk<'a, V>(node: &'a Node, visitor: &mut V)
where
    V: FnMut(&'a Node) -> Flow,
{
    if visitor(node) == Flow::SkipChildren {
        return;
    }
    for_each_child(node, &mut |child| walk(child, visitor));
}

/// Walk a tree in pre-order with mutable access to each node.
///
/// The visitor sees each node before its children, so a rewrite that
/// replaces a subtree also controls what gets descended into.
pub fn walk_mut<V>(node: &mut Node, visitor: &mut V)
where
    V: FnMut(&mut Node) -> Flow,
{
    if visitor(node) == Flow::SkipChildren {
        return;
    }
    for_each_child_mut(node, &mut |child| walk_mut(child, visitor));
}

/// Walk a tree once while running several visitors.
///
/// Each visitor's [`Flow::SkipChildren`] silences that visitor for the
/// pruned subtree only; the others keep seeing it. Descent stops only when
/// every visitor has pruned.
pub fn walk_multi(node: &Node, visitors: &mut [&mut dyn FnMut(&Node) -> Flow]) {
    let active = vec![true; visitors.len()];
    walk_multi_inner(node, visitors, &active);
}

fn walk_multi_inner(
    node: &Node,
    visitors: &mut [&mut dyn FnMut(&Node) -> Flow],
    active: &[bool],
) {
    let mut next: Vec<bool> = active.to_vec();
    for (idx, visitor) in visitors.iter_mut().enumerate() {
        if active[idx] {
            next[idx] = visitor(node) == Flow::Continue;
        }
    }
    if next.iter().any(|&on| on) {
        for_each_child(node, &mut |child| walk_multi_inner(child, visitors, &next));
    }
}
