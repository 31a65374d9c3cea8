//! Scope-based variable checking.
//!
//! # What This Pass Does
//!
//! 1. **Declaration tracking** - One scope frame per lexical block; a
//!    declaration may appear once per block (`duplicate-declaration`)
//! 2. **Reference resolution** - A reference must find a declaration in an
//!    enclosing frame of the same function (`undeclared-variable`)
//! 3. **Const enforcement** - The root of an assignment target may not be
//!    a `const` binding (`assignment-to-const-variable`)
//!
//! # Scoping Rules
//!
//! - Inner blocks (if/while/for bodies) see outer declarations; sibling
//!   blocks do not see each other
//! - Function bodies get a fresh scope stack seeded with the unit's
//!   top-level names, the function's own name, and its parameters;
//!   enclosing-function locals are not visible
//! - `_` is never added to scope, never a duplicate, and never resolved
//!   (reading it is a separate structural rule)
//! - Top-level code resolves in program order; function bodies may refer
//!   to top-level names declared later in the file

use super::policy::{self, Policy};
use indexmap::IndexMap;
use vail_ast::ast::walk::{walk, Flow};
use vail_ast::{Diagnostic, ElseBranch, Node, NodeKind, Param, Pattern, Span};

/// What one frame knows about a binding.
#[derive(Debug, Clone, Copy)]
struct VarInfo {
    is_const: bool,
}

type Frame = IndexMap<String, VarInfo>;

/// Run the scope rules over one top-level unit.
pub(crate) fn check_scopes(program: &Node, policy: &Policy, diags: &mut Vec<Diagnostic>) {
    let NodeKind::Program { body } = program.terminal() else {
        return;
    };
    if !policy.enabled(policy::UNDECLARED_VARIABLE)
        && !policy.enabled(policy::DUPLICATE_DECLARATION)
        && !policy.enabled(policy::CONST_ASSIGNMENT)
    {
        return;
    }

    let mut checker = ScopeChecker {
        policy,
        globals: collect_globals(body),
        diags,
    };
    let mut scopes = vec![Frame::default()];
    for stmt in body {
        checker.check_stmt(stmt, &mut scopes);
    }
}

/// Names visible from every function body: the unit's top-level
/// declarations, order-independent.
fn collect_globals(body: &[Node]) -> Frame {
    let mut globals = Frame::default();
    for stmt in body {
        match stmt.terminal() {
            NodeKind::Decl {
                is_const, pattern, ..
            } => {
                for binding in pattern.bindings() {
                    if binding.name != "_" {
                        globals.insert(
                            binding.name.clone(),
                            VarInfo {
                                is_const: *is_const,
                            },
                        );
                    }
                }
            }
            NodeKind::Func {
                name: Some(name), ..
            } => {
                globals.insert(name.clone(), VarInfo { is_const: false });
            }
            NodeKind::Import { alias, names, .. } => {
                if let Some(alias) = alias {
                    globals.insert(alias.clone(), VarInfo { is_const: false });
                }
                for import in names {
                    let local = import.rename.as_ref().unwrap_or(&import.name);
                    globals.insert(local.clone(), VarInfo { is_const: false });
                }
            }
            _ => {}
        }
    }
    globals
}

struct ScopeChecker<'a> {
    policy: &'a Policy,
    globals: Frame,
    diags: &'a mut Vec<Diagnostic>,
}

impl ScopeChecker<'_> {
    fn check_stmt(&mut self, stmt: &Node, scopes: &mut Vec<Frame>) {
        match stmt.terminal() {
            NodeKind::Decl {
                is_const,
                pattern,
                value,
            } => {
                // The value is checked first: `let x = x` does not
                // resolve to its own binding.
                self.check_expr(value, scopes);
                for binding in pattern.bindings() {
                    self.declare(&binding.name, binding.span, *is_const, scopes);
                }
            }
            NodeKind::Func {
                name: Some(name),
                params,
                body,
                ..
            } => {
                self.declare(name, stmt.span, false, scopes);
                self.check_function(Some(name), params, body);
            }
            NodeKind::Assign { target, value } => {
                self.check_assign_target(target, scopes);
                self.check_expr(value, scopes);
            }
            NodeKind::Return { value } => {
                if let Some(value) = value {
                    self.check_expr(value, scopes);
                }
            }
            NodeKind::If {
                cond,
                body,
                else_branch,
            } => {
                self.check_expr(cond, scopes);
                self.check_block(body, scopes, &[]);
                match else_branch {
                    ElseBranch::None => {}
                    ElseBranch::ElseIf(chained) => self.check_stmt(chained, scopes),
                    ElseBranch::Else(stmts) => self.check_block(stmts, scopes, &[]),
                }
            }
            NodeKind::While { cond, body } => {
                self.check_expr(cond, scopes);
                self.check_block(body, scopes, &[]);
            }
            NodeKind::For {
                pattern,
                iter,
                body,
            } => {
                self.check_expr(iter, scopes);
                let seed: Vec<_> = pattern.bindings().cloned().collect();
                self.check_block(body, scopes, &seed);
            }
            NodeKind::Import { alias, names, .. } => {
                if let Some(alias) = alias {
                    self.declare(alias, stmt.span, false, scopes);
                }
                for import in names {
                    let local = import.rename.as_ref().unwrap_or(&import.name);
                    self.declare(local, stmt.span, false, scopes);
                }
            }
            NodeKind::Comment { .. }
            | NodeKind::Error { .. }
            | NodeKind::Func { name: None, .. } => {}
            // A bare expression statement.
            _ => self.check_expr(stmt, scopes),
        }
    }

    /// Check a nested block: inner frames see outer declarations.
    fn check_block(&mut self, stmts: &[Node], scopes: &mut Vec<Frame>, seed: &[vail_ast::Binding]) {
        scopes.push(Frame::default());
        for binding in seed {
            self.declare(&binding.name, binding.span, false, scopes);
        }
        for stmt in stmts {
            self.check_stmt(stmt, scopes);
        }
        scopes.pop();
    }

    /// Check a function body on a fresh scope stack.
    fn check_function(&mut self, name: Option<&str>, params: &[Param], body: &[Node]) {
        let mut scopes = vec![self.globals.clone(), Frame::default()];
        if let Some(name) = name {
            scopes
                .last_mut()
                .expect("scope stack never empty")
                .insert(name.to_string(), VarInfo { is_const: false });
        }
        for param in params {
            if let Some(default) = &param.default {
                self.check_expr(default, &mut scopes);
            }
            self.declare(&param.name.name, param.name.span, false, &mut scopes);
        }
        for stmt in body {
            self.check_stmt(stmt, &mut scopes);
        }
    }

    /// Collect references in an expression subtree.
    ///
    /// Function literals get their own fresh stack and are pruned from
    /// this walk.
    fn check_expr(&mut self, expr: &Node, scopes: &mut Vec<Frame>) {
        let mut nested: Vec<&Node> = Vec::new();
        walk(expr, &mut |node| match node.terminal() {
            NodeKind::Func { .. } => {
                nested.push(node);
                Flow::SkipChildren
            }
            NodeKind::Ident { name } => {
                self.reference(name, node.span, scopes, false);
                Flow::Continue
            }
            _ => Flow::Continue,
        });
        for func in nested {
            if let NodeKind::Func {
                name, params, body, ..
            } = func.terminal()
            {
                self.check_function(name.as_deref(), params, body);
            }
        }
    }

    /// Check an assignment target, flagging const roots.
    fn check_assign_target(&mut self, target: &Node, scopes: &mut Vec<Frame>) {
        match target.terminal() {
            NodeKind::Ident { name } => self.reference(name, target.span, scopes, true),
            NodeKind::Dot { base, .. } => self.check_assign_target(base, scopes),
            NodeKind::Subscript { base, index } => {
                self.check_assign_target(base, scopes);
                self.check_expr(index, scopes);
            }
            NodeKind::Slice { base, from, to } => {
                self.check_assign_target(base, scopes);
                if let Some(from) = from {
                    self.check_expr(from, scopes);
                }
                if let Some(to) = to {
                    self.check_expr(to, scopes);
                }
            }
            // Editor globals are always assignable.
            NodeKind::OptionVar { .. } | NodeKind::Env { .. } | NodeKind::Reg { .. } => {}
            _ => self.check_expr(target, scopes),
        }
    }

    fn declare(&mut self, name: &str, span: Option<Span>, is_const: bool, scopes: &mut Vec<Frame>) {
        if name == "_" {
            return;
        }
        let frame = scopes.last_mut().expect("scope stack never empty");
        if frame.contains_key(name) {
            if self.policy.enabled(policy::DUPLICATE_DECLARATION) {
                self.push_diag(span, format!("duplicate declaration of `{name}`"));
            }
            return;
        }
        frame.insert(name.to_string(), VarInfo { is_const });
    }

    fn reference(
        &mut self,
        name: &str,
        span: Option<Span>,
        scopes: &[Frame],
        is_assign_target: bool,
    ) {
        if name == "_" {
            // Reading `_` is the underscore-variable-reference rule's
            // business; it is never in scope here.
            return;
        }
        for frame in scopes.iter().rev() {
            if let Some(info) = frame.get(name) {
                if is_assign_target
                    && info.is_const
                    && self.policy.enabled(policy::CONST_ASSIGNMENT)
                {
                    self.push_diag(span, format!("cannot assign to constant `{name}`"));
                }
                return;
            }
        }
        if self.policy.enabled(policy::UNDECLARED_VARIABLE) {
            self.push_diag(span, format!("undeclared variable `{name}`"));
        }
    }

    fn push_diag(&mut self, span: Option<Span>, message: String) {
        self.diags.push(match span {
            Some(span) => Diagnostic::error(span, message),
            None => Diagnostic::error_nospan(message),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vail_ast::NodeIdGen;

    fn check(src: &str) -> Vec<Diagnostic> {
        let tokens = vail_lexer::lex(src, 0);
        let mut ids = NodeIdGen::new();
        let program = vail_parser::parse(&tokens, 0, &mut ids);
        assert!(vail_parser::collect_errors(&program).is_empty(), "{src:?}");
        let mut diags = Vec::new();
        check_scopes(&program, &Policy::all(), &mut diags);
        diags
    }

    #[test]
    fn duplicate_declaration_in_one_block() {
        let diags = check("const x = 1\nconst x = 2\n");
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("duplicate declaration of `x`"));
        assert_eq!(diags[0].span.unwrap().start_line, 2);
    }

    #[test]
    fn redeclaration_in_an_inner_block_is_allowed() {
        assert!(check("let x = 1\nif x {\n  let x = 2\n}\n").is_empty());
    }

    #[test]
    fn inner_blocks_see_outer_declarations() {
        assert!(check("let x = 1\nif x {\n  let y = x + 1\n  while y {\n    y = y - 1\n  }\n}\n")
            .is_empty());
    }

    #[test]
    fn sibling_blocks_do_not_share_scope() {
        let diags = check("let a = 1\nif a {\n  let b = 2\n}\nif a {\n  let c = b\n}\n");
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("undeclared variable `b`"));
    }

    #[test]
    fn reference_before_declaration_fails_at_top_level() {
        let diags = check("let y = x\nlet x = 1\n");
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("undeclared variable `x`"));
    }

    #[test]
    fn declaration_value_does_not_see_its_own_binding() {
        let diags = check("let x = x\n");
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn function_bodies_see_toplevel_names_in_any_order() {
        assert!(check("func f() {\n  return g()\n}\nfunc g() {\n  return 1\n}\n").is_empty());
    }

    #[test]
    fn function_bodies_do_not_see_enclosing_locals() {
        let src = "func outer() {\n  let secret = 1\n  func inner() {\n    return secret\n  }\n  return inner()\n}\n";
        let diags = check(src);
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("undeclared variable `secret`"));
    }

    #[test]
    fn parameters_and_own_name_are_in_scope() {
        assert!(check("func fact(n) {\n  if n < 2 {\n    return 1\n  }\n  return n * fact(n - 1)\n}\n")
            .is_empty());
    }

    #[test]
    fn const_assignment_is_flagged() {
        let diags = check("const x = 1\nx = 2\n");
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("cannot assign to constant `x`"));
    }

    #[test]
    fn const_element_assignment_flags_the_root() {
        let diags = check("const xs = [1, 2]\nxs[0] = 3\n");
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("constant `xs`"));
    }

    #[test]
    fn let_assignment_is_fine() {
        assert!(check("let x = 1\nx = 2\nx.y = 3\n").is_empty());
    }

    #[test]
    fn for_pattern_binds_in_the_body() {
        assert!(check("let xs = [1, 2]\nfor [i, v] in xs {\n  let y = i + v\n}\n").is_empty());
    }

    #[test]
    fn underscore_is_never_declared_and_never_duplicate() {
        assert!(check("const [a, _, b] = [1, 2, 3]\nlet _ = 4\nlet c = a + b\n").is_empty());
    }

    #[test]
    fn import_names_are_visible() {
        assert!(check("import \"pkg\" as p\nfrom \"util\" import f, g as h\nlet x = p\nf(h(x))\n")
            .is_empty());
    }

    #[test]
    fn lambda_parameters_resolve_in_lambda_body() {
        let diags = check("let f = func(x) x + y\n");
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("undeclared variable `y`"));
    }

    #[test]
    fn disabled_rules_stay_silent() {
        let tokens = vail_lexer::lex("const x = 1\nconst x = 2\nx = 3\ny\n", 0);
        let mut ids = NodeIdGen::new();
        let program = vail_parser::parse(&tokens, 0, &mut ids);
        let mut policy = Policy::all();
        policy.set(policy::DUPLICATE_DECLARATION, false).unwrap();
        policy.set(policy::CONST_ASSIGNMENT, false).unwrap();
        policy.set(policy::UNDECLARED_VARIABLE, false).unwrap();
        let mut diags = Vec::new();
        check_scopes(&program, &policy, &mut diags);
        assert!(diags.is_empty());
    }
}
