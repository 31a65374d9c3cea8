//! Expression precedence and associativity tests.

use vail_ast::{BinaryOp, CmpOp, Node, NodeIdGen, NodeKind, UnaryOp};
use vail_lexer::lex;
use vail_parser::parse;

/// Parse a source string and return the first statement.
fn parse_stmt(src: &str) -> Node {
    let tokens = lex(src, 0);
    let mut ids = NodeIdGen::new();
    let program = parse(&tokens, 0, &mut ids);
    match program.terminal() {
        NodeKind::Program { body } => {
            assert!(!body.is_empty(), "no statements parsed from {src:?}");
            body[0].clone()
        }
        other => panic!("expected Program, got {other:?}"),
    }
}

fn binary(node: &Node) -> (&BinaryOp, &Node, &Node) {
    match node.terminal() {
        NodeKind::Binary { op, left, right } => (op, left, right),
        other => panic!("expected Binary, got {other:?}"),
    }
}

fn int_value(node: &Node) -> i64 {
    match node.terminal() {
        NodeKind::Int { value } => *value,
        other => panic!("expected Int, got {other:?}"),
    }
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    let expr = parse_stmt("1 + 2 * 3");
    let (op, left, right) = binary(&expr);
    assert_eq!(*op, BinaryOp::Add);
    assert_eq!(int_value(left), 1);
    let (op, left, right) = binary(right);
    assert_eq!(*op, BinaryOp::Mul);
    assert_eq!(int_value(left), 2);
    assert_eq!(int_value(right), 3);
}

#[test]
fn parentheses_override_precedence() {
    let expr = parse_stmt("(1 + 2) * 3");
    let (op, left, right) = binary(&expr);
    assert_eq!(*op, BinaryOp::Mul);
    assert_eq!(int_value(right), 3);
    let (op, ..) = binary(left);
    assert_eq!(*op, BinaryOp::Add);
}

#[test]
fn additive_is_left_associative() {
    // 1 - 2 + 3 parses as (1 - 2) + 3
    let expr = parse_stmt("1 - 2 + 3");
    let (op, left, right) = binary(&expr);
    assert_eq!(*op, BinaryOp::Add);
    assert_eq!(int_value(right), 3);
    let (op, left, right) = binary(left);
    assert_eq!(*op, BinaryOp::Sub);
    assert_eq!(int_value(left), 1);
    assert_eq!(int_value(right), 2);
}

#[test]
fn and_binds_tighter_than_or() {
    let expr = parse_stmt("a || b && c");
    let (op, _, right) = binary(&expr);
    assert_eq!(*op, BinaryOp::Or);
    let (op, ..) = binary(right);
    assert_eq!(*op, BinaryOp::And);
}

#[test]
fn comparison_sits_between_logic_and_arithmetic() {
    // a + 1 == b && c parses as ((a + 1) == b) && c
    let expr = parse_stmt("a + 1 == b && c");
    let (op, left, _) = binary(&expr);
    assert_eq!(*op, BinaryOp::And);
    let (op, left, _) = binary(left);
    assert_eq!(
        *op,
        BinaryOp::Cmp {
            op: CmpOp::Eq,
            ignore_case: false
        }
    );
    let (op, ..) = binary(left);
    assert_eq!(*op, BinaryOp::Add);
}

#[test]
fn case_insensitive_comparison_flag() {
    let expr = parse_stmt("a ==? b");
    let (op, ..) = binary(&expr);
    assert_eq!(
        *op,
        BinaryOp::Cmp {
            op: CmpOp::Eq,
            ignore_case: true
        }
    );
}

#[test]
fn ternary_is_right_associative() {
    let expr = parse_stmt("a ? b : c ? d : e");
    match expr.terminal() {
        NodeKind::Ternary { else_, .. } => {
            assert!(matches!(else_.terminal(), NodeKind::Ternary { .. }));
        }
        other => panic!("expected Ternary, got {other:?}"),
    }
}

#[test]
fn unary_binds_tighter_than_multiplication() {
    let expr = parse_stmt("-a * b");
    let (op, left, _) = binary(&expr);
    assert_eq!(*op, BinaryOp::Mul);
    match left.terminal() {
        NodeKind::Unary { op, .. } => assert_eq!(*op, UnaryOp::Minus),
        other => panic!("expected Unary, got {other:?}"),
    }
}

#[test]
fn prefix_not_stacks_by_recursion() {
    let expr = parse_stmt("!!a");
    match expr.terminal() {
        NodeKind::Unary { op, operand } => {
            assert_eq!(*op, UnaryOp::Not);
            assert!(matches!(operand.terminal(), NodeKind::Unary { .. }));
        }
        other => panic!("expected Unary, got {other:?}"),
    }
}

#[test]
fn postfix_chain_is_left_to_right() {
    // a.b[1](2) parses as Call(Subscript(Dot(a, b), 1), [2])
    let expr = parse_stmt("a.b[1](2)");
    let NodeKind::Call { callee, args } = expr.terminal() else {
        panic!("expected Call");
    };
    assert_eq!(args.len(), 1);
    let NodeKind::Subscript { base, .. } = callee.terminal() else {
        panic!("expected Subscript");
    };
    let NodeKind::Dot { name, .. } = base.terminal() else {
        panic!("expected Dot");
    };
    assert_eq!(name, "b");
}

#[test]
fn slice_bounds_are_optional() {
    for (src, has_from, has_to) in [
        ("a[1:2]", true, true),
        ("a[1:]", true, false),
        ("a[:2]", false, true),
        ("a[:]", false, false),
    ] {
        let expr = parse_stmt(src);
        let NodeKind::Slice { from, to, .. } = expr.terminal() else {
            panic!("expected Slice for {src:?}");
        };
        assert_eq!(from.is_some(), has_from, "{src:?}");
        assert_eq!(to.is_some(), has_to, "{src:?}");
    }
}

#[test]
fn subscript_is_not_a_slice() {
    let expr = parse_stmt("a[1]");
    assert!(matches!(expr.terminal(), NodeKind::Subscript { .. }));
}

#[test]
fn dict_bare_identifier_keys_become_strings() {
    let expr = parse_stmt(r#"{name: 1, "lit": 2, 1 + 2: 3}"#);
    let NodeKind::Dict { entries } = expr.terminal() else {
        panic!("expected Dict");
    };
    assert_eq!(entries.len(), 3);
    assert!(matches!(entries[0].0.terminal(), NodeKind::Str { value } if value == "name"));
    assert!(matches!(entries[1].0.terminal(), NodeKind::Str { value } if value == "lit"));
    assert!(matches!(entries[2].0.terminal(), NodeKind::Binary { .. }));
}

#[test]
fn editor_references_parse_as_atoms() {
    let expr = parse_stmt("&wrap && $HOME == @a");
    let (op, left, right) = binary(&expr);
    assert_eq!(*op, BinaryOp::And);
    assert!(matches!(left.terminal(), NodeKind::OptionVar { name } if name == "wrap"));
    let (_, left, right) = binary(right);
    assert!(matches!(left.terminal(), NodeKind::Env { name } if name == "HOME"));
    assert!(matches!(right.terminal(), NodeKind::Reg { name } if name == "a"));
}

#[test]
fn string_literals_are_decoded() {
    let expr = parse_stmt(r#""a\tb""#);
    assert!(matches!(expr.terminal(), NodeKind::Str { value } if value == "a\tb"));
    let expr = parse_stmt("'it''s'");
    assert!(matches!(expr.terminal(), NodeKind::Str { value } if value == "it's"));
}

#[test]
fn lambda_parses_in_expression_position() {
    let stmt = parse_stmt("let f = func(x) x + 1");
    let NodeKind::Decl { value, .. } = stmt.terminal() else {
        panic!("expected Decl");
    };
    let NodeKind::Func {
        name,
        params,
        is_block,
        body,
        is_expr,
        ..
    } = value.terminal()
    else {
        panic!("expected Func");
    };
    assert!(name.is_none());
    assert_eq!(params.len(), 1);
    assert!(!is_block);
    assert!(*is_expr);
    assert_eq!(body.len(), 1);
    assert!(value.is_expr());
}
