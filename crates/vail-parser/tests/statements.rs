//! Statement-level parsing tests.

use vail_ast::{ElseBranch, FuncModifier, Node, NodeIdGen, NodeKind, Pattern};
use vail_lexer::lex;
use vail_parser::{collect_errors, parse};

fn parse_src(src: &str) -> Node {
    let tokens = lex(src, 0);
    let mut ids = NodeIdGen::new();
    parse(&tokens, 0, &mut ids)
}

fn body(program: &Node) -> &[Node] {
    match program.terminal() {
        NodeKind::Program { body } => body,
        other => panic!("expected Program, got {other:?}"),
    }
}

#[test]
fn declarations_and_constness() {
    let program = parse_src("const x = 1\nlet y = 2\n");
    let stmts = body(&program);
    assert_eq!(stmts.len(), 2);
    let NodeKind::Decl {
        is_const, pattern, ..
    } = stmts[0].terminal()
    else {
        panic!("expected Decl");
    };
    assert!(is_const);
    assert!(matches!(pattern, Pattern::Ident(b) if b.name == "x"));
    let NodeKind::Decl { is_const, .. } = stmts[1].terminal() else {
        panic!("expected Decl");
    };
    assert!(!is_const);
}

#[test]
fn destructuring_declaration() {
    let program = parse_src("const [a, _, b] = [1, 2, 3]\n");
    let NodeKind::Decl { pattern, .. } = body(&program)[0].terminal() else {
        panic!("expected Decl");
    };
    let Pattern::List(bindings) = pattern else {
        panic!("expected list pattern");
    };
    let names: Vec<_> = bindings.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, ["a", "_", "b"]);
}

#[test]
fn if_else_chain() {
    let program = parse_src("if a {\n  x = 1\n} else if b {\n  x = 2\n} else {\n  x = 3\n}\n");
    let NodeKind::If { else_branch, .. } = body(&program)[0].terminal() else {
        panic!("expected If");
    };
    let ElseBranch::ElseIf(chained) = else_branch else {
        panic!("expected else-if chain");
    };
    let NodeKind::If { else_branch, .. } = chained.terminal() else {
        panic!("expected nested If");
    };
    assert!(matches!(else_branch, ElseBranch::Else(stmts) if stmts.len() == 1));
}

#[test]
fn while_and_for_loops() {
    let program = parse_src("while x < 10 {\n  x = x + 1\n}\nfor [k, v] in pairs {\n  f(k, v)\n}\n");
    let stmts = body(&program);
    assert!(matches!(stmts[0].terminal(), NodeKind::While { .. }));
    let NodeKind::For { pattern, .. } = stmts[1].terminal() else {
        panic!("expected For");
    };
    assert!(matches!(pattern, Pattern::List(bs) if bs.len() == 2));
}

#[test]
fn import_forms() {
    let program = parse_src("import \"pkg\"\nimport \"pkg\" as p\nfrom \"pkg\" import a, b as c\n");
    let stmts = body(&program);
    let NodeKind::Import { package, alias, names } = stmts[0].terminal() else {
        panic!("expected Import");
    };
    assert_eq!(package, "pkg");
    assert!(alias.is_none() && names.is_empty());

    let NodeKind::Import { alias, .. } = stmts[1].terminal() else {
        panic!("expected Import");
    };
    assert_eq!(alias.as_deref(), Some("p"));

    let NodeKind::Import { names, .. } = stmts[2].terminal() else {
        panic!("expected Import");
    };
    assert_eq!(names.len(), 2);
    assert_eq!(names[0].name, "a");
    assert!(names[0].rename.is_none());
    assert_eq!(names[1].rename.as_deref(), Some("c"));
}

#[test]
fn function_declaration_with_modifiers_types_and_defaults() {
    let program = parse_src("func [global, noabort] greet(name: Str, count = 1): Str {\n  return name\n}\n");
    let NodeKind::Func {
        mods,
        name,
        params,
        ret,
        is_block,
        is_expr,
        ..
    } = body(&program)[0].terminal()
    else {
        panic!("expected Func");
    };
    assert_eq!(*mods, [FuncModifier::Global, FuncModifier::NoAbort]);
    assert_eq!(name.as_deref(), Some("greet"));
    assert_eq!(params.len(), 2);
    assert_eq!(params[0].ty.as_deref(), Some("Str"));
    assert!(params[1].default.is_some());
    assert_eq!(ret.as_deref(), Some("Str"));
    assert!(is_block);
    assert!(!is_expr);
}

#[test]
fn anonymous_function_statement_is_discarded() {
    let program = parse_src("func() { return 1 }\nlet x = 1\n");
    let stmts = body(&program);
    assert_eq!(stmts.len(), 1);
    assert!(matches!(stmts[0].terminal(), NodeKind::Decl { .. }));
    assert!(collect_errors(&program).is_empty());
}

#[test]
fn return_with_and_without_value() {
    let program = parse_src("func f() {\n  return\n}\nfunc g() {\n  return 1\n}\n");
    let stmts = body(&program);
    let NodeKind::Func { body: fbody, .. } = stmts[0].terminal() else {
        panic!("expected Func");
    };
    assert!(matches!(fbody[0].terminal(), NodeKind::Return { value: None }));
    let NodeKind::Func { body: gbody, .. } = stmts[1].terminal() else {
        panic!("expected Func");
    };
    assert!(matches!(gbody[0].terminal(), NodeKind::Return { value: Some(_) }));
}

#[test]
fn assignment_targets() {
    let program = parse_src("x = 1\na.b = 2\nc[0] = 3\n");
    let stmts = body(&program);
    assert_eq!(stmts.len(), 3);
    for stmt in stmts {
        assert!(matches!(stmt.terminal(), NodeKind::Assign { .. }));
    }
}

#[test]
fn assignment_to_a_literal_is_an_error() {
    let program = parse_src("1 = 2\n");
    let errors = collect_errors(&program);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("assignment target"));
}

#[test]
fn comments_are_preserved_as_statements() {
    let program = parse_src("# leading note\nlet x = 1 # trailing note\n");
    let stmts = body(&program);
    assert_eq!(stmts.len(), 3);
    assert!(matches!(stmts[0].terminal(), NodeKind::Comment { text } if text == "leading note"));
    assert!(matches!(stmts[1].terminal(), NodeKind::Decl { .. }));
    assert!(matches!(stmts[2].terminal(), NodeKind::Comment { text } if text == "trailing note"));
}

#[test]
fn every_parsed_node_has_a_span() {
    let program = parse_src("func f(a) {\n  if a > 1 {\n    return a\n  }\n  return 0\n}\n");
    vail_ast::ast::walk::walk(&program, &mut |node| {
        assert!(node.span.is_some(), "missing span on {:?}", node.terminal());
        vail_ast::ast::walk::Flow::Continue
    });
}

#[test]
fn node_ids_are_unique_within_a_unit() {
    let program = parse_src("let x = 1 + 2\nlet y = [x, x]\n");
    let mut seen = std::collections::HashSet::new();
    vail_ast::ast::walk::walk(&program, &mut |node| {
        assert!(seen.insert(node.id), "duplicate id {:?}", node.id);
        vail_ast::ast::walk::Flow::Continue
    });
}
