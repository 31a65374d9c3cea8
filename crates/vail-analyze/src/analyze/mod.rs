//! Semantic analysis over parsed trees.
//!
//! # What This Pass Does
//!
//! Runs the configured rules over one top-level unit and, when checking
//! is clean, produces a rewritten tree ready for code generation:
//!
//! 1. **Check** - structural rules ([`rules`]) and scope rules ([`scope`])
//!    collect diagnostics without touching the tree
//! 2. **Tag** - every node gets a type tag ([`typetag`])
//! 3. **Convert** - underscore bindings are mangled into target-legal
//!    names ([`convert`])
//! 4. **Untag** - tags are stripped again
//!
//! Any diagnostic from step 1 aborts the pipeline before step 2: rewrites
//! assume a well-formed unit. The input tree is never mutated; rewrites
//! happen on a clone so callers keep the tree the parser produced.

pub mod policy;

mod convert;
mod rules;
mod scope;
mod typetag;

pub use policy::Policy;

use vail_ast::{Diagnostic, Node, NodeIdGen};

/// Checks and rewrites one top-level unit according to a [`Policy`].
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    policy: Policy,
}

impl Analyzer {
    pub fn new(policy: Policy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Check `program` and, if clean, return the rewritten tree.
    ///
    /// Diagnostics are ordered structural-first, then scope, each in
    /// source order within its pass.
    pub fn analyze(&self, program: &Node) -> Result<Node, Vec<Diagnostic>> {
        let mut diags = Vec::new();
        rules::check_structure(program, &self.policy, &mut diags);
        scope::check_scopes(program, &self.policy, &mut diags);
        if !diags.is_empty() {
            return Err(diags);
        }

        let mut rewritten = program.clone();
        typetag::tag(&mut rewritten);
        if self.policy.enabled(policy::CONVERT_UNDERSCORE) {
            convert::run(&mut rewritten);
        }
        typetag::untag(&mut rewritten);
        Ok(rewritten)
    }
}

/// Lex, parse, and analyze one source file in a single call.
///
/// Parse errors short-circuit analysis; a tree that failed to parse is
/// reported through its own diagnostics.
pub fn analyze_source(
    source: &str,
    file_id: u16,
    policy: &Policy,
    ids: &mut NodeIdGen,
) -> Result<Node, Vec<Diagnostic>> {
    let tokens = vail_lexer::lex(source, file_id);
    let program = vail_parser::parse(&tokens, file_id, ids);
    let parse_errors = vail_parser::collect_errors(&program);
    if !parse_errors.is_empty() {
        return Err(parse_errors);
    }
    Analyzer::new(policy.clone()).analyze(&program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vail_ast::ast::walk::{walk, Flow};
    use vail_ast::NodeKind;

    fn analyze(src: &str) -> Result<Node, Vec<Diagnostic>> {
        let mut ids = NodeIdGen::new();
        analyze_source(src, 0, &Policy::all(), &mut ids)
    }

    #[test]
    fn clean_input_comes_back_rewritten() {
        let rewritten = analyze("let _keep = 1\nlet x = _keep\n").unwrap();
        let mut names = Vec::new();
        walk(&rewritten, &mut |node| {
            if let NodeKind::Ident { name } = node.terminal() {
                names.push(name.clone());
            }
            Flow::Continue
        });
        assert_eq!(names, ["__keep"]);
    }

    #[test]
    fn diagnostics_from_both_passes_are_aggregated() {
        let diags = analyze("return 1\nlet y = missing\n").unwrap_err();
        assert_eq!(diags.len(), 2);
        assert!(diags[0].message.contains("outside of a function"));
        assert!(diags[1].message.contains("undeclared"));
    }

    #[test]
    fn checking_failure_skips_the_rewrite() {
        // `_` is both referenced (error) and declared; the error must
        // surface instead of a converted tree.
        assert!(analyze("let _ = _ + 1\n").is_err());
    }

    #[test]
    fn rewrites_leave_no_type_tags_behind() {
        let rewritten = analyze("func f(a) {\n  return a\n}\n").unwrap();
        walk(&rewritten, &mut |node| {
            assert!(node.ty.is_none());
            Flow::Continue
        });
    }

    #[test]
    fn input_tree_is_not_mutated() {
        let tokens = vail_lexer::lex("let _a = 1\n", 0);
        let mut ids = NodeIdGen::new();
        let program = vail_parser::parse(&tokens, 0, &mut ids);
        let before = program.clone();
        let _ = Analyzer::new(Policy::all()).analyze(&program).unwrap();
        assert_eq!(program, before);
    }

    #[test]
    fn conversion_respects_the_policy() {
        let mut policy = Policy::all();
        policy.set(policy::CONVERT_UNDERSCORE, false).unwrap();
        let mut ids = NodeIdGen::new();
        let rewritten = analyze_source("let _a = 1\n", 0, &policy, &mut ids).unwrap();
        let NodeKind::Program { body } = rewritten.terminal() else {
            panic!()
        };
        let NodeKind::Decl { pattern, .. } = body[0].terminal() else {
            panic!()
        };
        let names: Vec<_> = pattern.bindings().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["_a"]);
    }

    #[test]
    fn parse_errors_short_circuit_analysis() {
        let diags = analyze("let x = (\n").unwrap_err();
        assert_eq!(diags.len(), 1);
    }
}
