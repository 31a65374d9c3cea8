//! The convert-underscore-variable rewrite.
//!
//! Underscore-prefixed bindings are legal in the source language but not
//! in the target language, so the analyzer rewrites them on its cloned
//! tree:
//!
//! - a declared `_foo` becomes `__foo`, and every reference in the same
//!   scope follows the rename
//! - a literal `_` binding becomes a fresh `_unusedN` name, `N` counting
//!   up per function scope and skipping any name already present in the
//!   unit, so generated names never collide with real identifiers
//!
//! Runs only after checking succeeded, so every `_foo` reference has a
//! matching declaration and no bare `_` reference exists.

use std::collections::{HashMap, HashSet};
use vail_ast::ast::walk::{for_each_child_mut, walk, Flow};
use vail_ast::{Node, NodeKind, Pattern};

/// Rewrite one checked top-level unit in place.
pub(crate) fn run(program: &mut Node) {
    let used = used_names(program);
    let mut cx = Convert {
        used,
        renames: vec![HashMap::new()],
        counter: 0,
    };
    let NodeKind::Program { body } = &mut program.kind else {
        return;
    };
    cx.seed_toplevel_renames(body);
    for stmt in body {
        cx.convert_stmt(stmt);
    }
}

/// Every identifier-shaped name in the unit, for collision avoidance.
fn used_names(program: &Node) -> HashSet<String> {
    let mut used = HashSet::new();
    walk(program, &mut |node| {
        match node.terminal() {
            NodeKind::Ident { name } | NodeKind::Dot { name, .. } => {
                used.insert(name.clone());
            }
            NodeKind::Decl { pattern, .. } | NodeKind::For { pattern, .. } => {
                for binding in pattern.bindings() {
                    used.insert(binding.name.clone());
                }
            }
            NodeKind::Func { name, params, .. } => {
                if let Some(name) = name {
                    used.insert(name.clone());
                }
                for param in params {
                    used.insert(param.name.name.clone());
                }
            }
            _ => {}
        }
        Flow::Continue
    });
    used
}

struct Convert {
    used: HashSet<String>,
    /// One rename map per scope frame, innermost last.
    renames: Vec<HashMap<String, String>>,
    /// Fresh-name counter for the current function scope.
    counter: u32,
}

impl Convert {
    /// Record the rename for every top-level `_foo` declaration up front.
    ///
    /// Function bodies see top-level names regardless of declaration
    /// order, so their references must follow a rename even when the
    /// declaration comes later in the unit. Literal `_` bindings are
    /// skipped here: they have no references to follow and their fresh
    /// names are minted at the declaration site.
    fn seed_toplevel_renames(&mut self, body: &[Node]) {
        for stmt in body {
            let NodeKind::Decl { pattern, .. } = stmt.terminal() else {
                continue;
            };
            for binding in pattern.bindings() {
                let name = &binding.name;
                if name != "_" && name.starts_with('_') {
                    let new = format!("_{name}");
                    self.renames[0].insert(name.clone(), new.clone());
                    self.used.insert(new);
                }
            }
        }
    }

    fn convert_stmt(&mut self, stmt: &mut Node) {
        match &mut stmt.kind {
            NodeKind::Decl { pattern, value, .. } => {
                self.convert_expr(value);
                self.convert_pattern(pattern);
            }
            NodeKind::Func { params, body, .. } => self.convert_function(params, body),
            NodeKind::Assign { target, value } => {
                self.convert_expr(target);
                self.convert_expr(value);
            }
            NodeKind::Return { value } => {
                if let Some(value) = value {
                    self.convert_expr(value);
                }
            }
            NodeKind::If {
                cond,
                body,
                else_branch,
            } => {
                self.convert_expr(cond);
                self.convert_block(body);
                match else_branch {
                    vail_ast::ElseBranch::None => {}
                    vail_ast::ElseBranch::ElseIf(chained) => self.convert_stmt(chained),
                    vail_ast::ElseBranch::Else(stmts) => self.convert_block(stmts),
                }
            }
            NodeKind::While { cond, body } => {
                self.convert_expr(cond);
                self.convert_block(body);
            }
            NodeKind::For {
                pattern,
                iter,
                body,
            } => {
                self.convert_expr(iter);
                // The loop pattern binds inside the body's frame.
                self.renames.push(HashMap::new());
                self.convert_pattern(pattern);
                for stmt in body.iter_mut() {
                    self.convert_stmt(stmt);
                }
                self.renames.pop();
            }
            NodeKind::Comment { .. } | NodeKind::Import { .. } | NodeKind::Error { .. } => {}
            _ => self.convert_expr(stmt),
        }
    }

    fn convert_block(&mut self, stmts: &mut [Node]) {
        self.renames.push(HashMap::new());
        for stmt in stmts {
            self.convert_stmt(stmt);
        }
        self.renames.pop();
    }

    /// Rewrite references in an expression; nested function literals get
    /// their own scope.
    fn convert_expr(&mut self, expr: &mut Node) {
        match &mut expr.kind {
            NodeKind::Ident { name } => {
                if let Some(new) = self.lookup(name) {
                    *name = new;
                }
            }
            // Renames of enclosing-function locals do not reach a nested
            // function body, matching reference visibility; only the
            // outermost (top-level) frame carries through.
            NodeKind::Func { params, body, .. } => self.convert_function(params, body),
            _ => for_each_child_mut(expr, &mut |child| self.convert_expr(child)),
        }
    }

    /// Convert a function: fresh scope over the top-level frame, fresh
    /// counter for generated names.
    fn convert_function(&mut self, params: &mut [vail_ast::Param], body: &mut [Node]) {
        let saved_frames = self.renames.split_off(1);
        let saved_counter = std::mem::replace(&mut self.counter, 0);

        self.renames.push(HashMap::new());
        for param in params.iter_mut() {
            self.rename_binding_name(&mut param.name.name);
        }
        for param in params.iter_mut() {
            if let Some(default) = &mut param.default {
                self.convert_expr(default);
            }
        }
        for stmt in body {
            self.convert_stmt(stmt);
        }
        self.renames.pop();

        self.counter = saved_counter;
        self.renames.truncate(1);
        self.renames.extend(saved_frames);
    }

    fn convert_pattern(&mut self, pattern: &mut Pattern) {
        for binding in pattern.bindings_mut() {
            self.rename_binding_name(&mut binding.name);
        }
    }

    fn rename_binding_name(&mut self, name: &mut String) {
        if name == "_" {
            *name = self.fresh_unused();
        } else if name.starts_with('_') {
            let new = format!("_{name}");
            self.renames
                .last_mut()
                .expect("rename stack never empty")
                .insert(name.clone(), new.clone());
            self.used.insert(new.clone());
            *name = new;
        }
    }

    fn fresh_unused(&mut self) -> String {
        loop {
            let candidate = format!("_unused{}", self.counter);
            self.counter += 1;
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    fn lookup(&self, name: &str) -> Option<String> {
        for frame in self.renames.iter().rev() {
            if let Some(new) = frame.get(name) {
                return Some(new.clone());
            }
        }
        None
    }
}
