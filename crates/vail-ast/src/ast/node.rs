//! The Vail AST.
//!
//! The node set is closed: every construct the parser can produce is a
//! `NodeKind` variant, and every pass dispatches with an exhaustive match,
//! so adding a variant without updating a consumer fails to compile.
//!
//! # Design
//!
//! - `Node` — one tree node: stable id, kind, optional source span,
//!   optional inferred-type tag
//! - `NodeId` — per-run identity, preserved by `Clone`, so composed passes
//!   can recognize "the same" subtree across walks and across the
//!   analyzer's non-destructive copy
//! - `TypeTag` — the typed-AST layer folded into the node; `terminal()`
//!   ignores it so downstream consumers never need to know it exists
//!
//! Declaration left-hand sides are `Binding`s, not `Ident` nodes: a
//! reference collector walking expressions can never mistake a name being
//! declared for a use of that name.

use crate::foundation::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable per-run node identity.
///
/// Assigned at construction by a `NodeIdGen` and preserved by `Clone`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// Monotonic `NodeId` source. One per file pipeline.
#[derive(Debug, Default)]
pub struct NodeIdGen {
    next: u32,
}

impl NodeIdGen {
    /// Create a generator starting at id 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the next id.
    pub fn fresh(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }
}

/// Placeholder inferred-type tag.
///
/// The inference pass is structural for now: it tags every node `Unknown`
/// and the unwrap pass strips the tag again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeTag {
    /// Not yet inferred
    Unknown,
}

/// One AST node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Stable identity within one compilation of one file
    pub id: NodeId,
    /// What this node is
    pub kind: NodeKind,
    /// Source location; `None` for synthesized nodes
    pub span: Option<Span>,
    /// Inferred-type tag set by the analyzer's placeholder pass
    pub ty: Option<TypeTag>,
}

impl Node {
    /// Create a node with a source location.
    pub fn new(id: NodeId, kind: NodeKind, span: Span) -> Self {
        Self {
            id,
            kind,
            span: Some(span),
            ty: None,
        }
    }

    /// Create a synthesized node with no source location.
    ///
    /// Callers must treat the absent span as "no diagnostic location".
    pub fn synthetic(id: NodeId, kind: NodeKind) -> Self {
        Self {
            id,
            kind,
            span: None,
            ty: None,
        }
    }

    /// Unwrap any transparent decoration down to the concrete variant.
    ///
    /// All pattern-matching dispatch goes through this so consumers stay
    /// agnostic of the type-tag layer.
    pub fn terminal(&self) -> &NodeKind {
        &self.kind
    }

    /// Whether this node is valid in expression position.
    ///
    /// `Func` is valid in both statement and expression position and
    /// carries the answer as a parse-time flag.
    pub fn is_expr(&self) -> bool {
        match &self.kind {
            NodeKind::Program { .. }
            | NodeKind::Comment { .. }
            | NodeKind::Import { .. }
            | NodeKind::Return { .. }
            | NodeKind::Decl { .. }
            | NodeKind::If { .. }
            | NodeKind::While { .. }
            | NodeKind::For { .. }
            | NodeKind::Error { .. } => false,
            NodeKind::Func { is_expr, .. } => *is_expr,
            NodeKind::Assign { .. }
            | NodeKind::Ternary { .. }
            | NodeKind::Binary { .. }
            | NodeKind::Unary { .. }
            | NodeKind::Slice { .. }
            | NodeKind::Call { .. }
            | NodeKind::Subscript { .. }
            | NodeKind::Dot { .. }
            | NodeKind::Ident { .. }
            | NodeKind::Int { .. }
            | NodeKind::Float { .. }
            | NodeKind::Bool { .. }
            | NodeKind::Null
            | NodeKind::Str { .. }
            | NodeKind::List { .. }
            | NodeKind::Dict { .. }
            | NodeKind::OptionVar { .. }
            | NodeKind::Env { .. }
            | NodeKind::Reg { .. } => true,
        }
    }
}

/// A declared name with its own location.
///
/// Used for declaration patterns and function parameters; deliberately not
/// an `Ident` node (see module docs).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    /// Declared identifier text
    pub name: String,
    /// Location of the identifier, if parsed from source
    pub span: Option<Span>,
}

impl Binding {
    /// Create a binding with a location.
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span: Some(span),
        }
    }
}

/// Declaration left-hand side: one name or a destructuring list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Pattern {
    /// `const x = ...`
    Ident(Binding),
    /// `const [a, b, _] = ...`
    List(Vec<Binding>),
}

impl Pattern {
    /// Iterate over all bound names.
    pub fn bindings(&self) -> impl Iterator<Item = &Binding> {
        match self {
            Pattern::Ident(b) => std::slice::from_ref(b).iter(),
            Pattern::List(bs) => bs.iter(),
        }
    }

    /// Iterate mutably over all bound names.
    pub fn bindings_mut(&mut self) -> impl Iterator<Item = &mut Binding> {
        match self {
            Pattern::Ident(b) => std::slice::from_mut(b).iter_mut(),
            Pattern::List(bs) => bs.iter_mut(),
        }
    }
}

/// Function parameter: a name plus either a declared type or a default
/// value expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    /// Parameter name
    pub name: Binding,
    /// Declared type, e.g. `a: Int`
    pub ty: Option<String>,
    /// Default value expression, e.g. `b = 10`
    pub default: Option<Node>,
}

/// One entry of a named-import list: `from "p" import orig as renamed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportName {
    /// Name as exported by the package
    pub name: String,
    /// Local rename, if any
    pub rename: Option<String>,
}

/// Function annotation controlling target-language visibility and calling
/// convention keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FuncModifier {
    Autoload,
    Global,
    Range,
    Dict,
    Closure,
    NoAbort,
}

impl FuncModifier {
    /// Parse a modifier word; `None` for unknown words.
    pub fn from_word(word: &str) -> Option<Self> {
        match word {
            "autoload" => Some(FuncModifier::Autoload),
            "global" => Some(FuncModifier::Global),
            "range" => Some(FuncModifier::Range),
            "dict" => Some(FuncModifier::Dict),
            "closure" => Some(FuncModifier::Closure),
            "noabort" => Some(FuncModifier::NoAbort),
            _ => None,
        }
    }

    /// Source spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            FuncModifier::Autoload => "autoload",
            FuncModifier::Global => "global",
            FuncModifier::Range => "range",
            FuncModifier::Dict => "dict",
            FuncModifier::Closure => "closure",
            FuncModifier::NoAbort => "noabort",
        }
    }
}

/// Else-branch of an `if`: absent, another `if` (an `else if` chain), or a
/// plain block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ElseBranch {
    None,
    ElseIf(Box<Node>),
    Else(Vec<Node>),
}

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    /// `!`
    Not,
    /// `-`
    Minus,
    /// `+`
    Plus,
}

impl UnaryOp {
    /// Source spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Minus => "-",
            UnaryOp::Plus => "+",
        }
    }
}

/// Comparison-family operator (the non-chaining expr4 level).
///
/// Each operator pairs with a case-insensitive `?`-suffixed variant,
/// carried as the `ignore_case` flag on [`BinaryOp::Cmp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CmpOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    /// `=~` regexp match
    Match,
    /// `!~` regexp no-match
    NoMatch,
    Is,
    IsNot,
}

impl CmpOp {
    /// Source spelling without any case suffix.
    pub fn base_str(&self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Match => "=~",
            CmpOp::NoMatch => "!~",
            CmpOp::Is => "is",
            CmpOp::IsNot => "isnot",
        }
    }
}

/// Binary operators across precedence levels 2..6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    /// `||`
    Or,
    /// `&&`
    And,
    /// Comparison family, optionally case-insensitive (`==?` etc.)
    Cmp { op: CmpOp, ignore_case: bool },
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryOp::Or => write!(f, "||"),
            BinaryOp::And => write!(f, "&&"),
            BinaryOp::Cmp { op, ignore_case } => {
                write!(f, "{}{}", op.base_str(), if *ignore_case { "?" } else { "" })
            }
            BinaryOp::Add => write!(f, "+"),
            BinaryOp::Sub => write!(f, "-"),
            BinaryOp::Mul => write!(f, "*"),
            BinaryOp::Div => write!(f, "/"),
            BinaryOp::Mod => write!(f, "%"),
        }
    }
}

/// Every construct of the language. Closed set; see module docs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    /// One source file: the top-level unit
    Program { body: Vec<Node> },
    /// `# ...` comment, preserved for pretty-printing
    Comment { text: String },
    /// `import "pkg" as p` / `from "pkg" import a, b as c`
    Import {
        package: String,
        alias: Option<String>,
        names: Vec<ImportName>,
    },
    /// Function declaration or literal
    Func {
        mods: Vec<FuncModifier>,
        name: Option<String>,
        params: Vec<Param>,
        ret: Option<String>,
        /// Block body (`{ ... }`) vs single-expression lambda body
        is_block: bool,
        body: Vec<Node>,
        /// Parsed in expression position
        is_expr: bool,
    },
    /// `return` / `return expr`
    Return { value: Option<Box<Node>> },
    /// `const`/`let` declaration
    Decl {
        is_const: bool,
        pattern: Pattern,
        value: Box<Node>,
    },
    /// Assignment expression `target = value`
    Assign { target: Box<Node>, value: Box<Node> },
    If {
        cond: Box<Node>,
        body: Vec<Node>,
        else_branch: ElseBranch,
    },
    While { cond: Box<Node>, body: Vec<Node> },
    For {
        pattern: Pattern,
        iter: Box<Node>,
        body: Vec<Node>,
    },
    /// `cond ? then : else`
    Ternary {
        cond: Box<Node>,
        then: Box<Node>,
        else_: Box<Node>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    Unary { op: UnaryOp, operand: Box<Node> },
    /// `base[from : to]`; either bound may be absent
    Slice {
        base: Box<Node>,
        from: Option<Box<Node>>,
        to: Option<Box<Node>>,
    },
    Call { callee: Box<Node>, args: Vec<Node> },
    /// `base[index]`
    Subscript { base: Box<Node>, index: Box<Node> },
    /// `base.name`
    Dot { base: Box<Node>, name: String },
    Ident { name: String },
    Int { value: i64 },
    Float { value: f64 },
    Bool { value: bool },
    Null,
    /// Decoded string value (escapes already evaluated)
    Str { value: String },
    List { items: Vec<Node> },
    /// Ordered key/value pairs; bare-identifier keys are parsed as `Str`
    Dict { entries: Vec<(Node, Node)> },
    /// `&option` editor option reference
    OptionVar { name: String },
    /// `$NAME` environment variable reference
    Env { name: String },
    /// `@r` register reference
    Reg { name: String },
    /// Inline parse failure; terminal, never an expression
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> NodeIdGen {
        NodeIdGen::new()
    }

    #[test]
    fn node_ids_are_monotonic_and_survive_clone() {
        let mut gen = ids();
        let a = Node::synthetic(gen.fresh(), NodeKind::Null);
        let b = Node::synthetic(gen.fresh(), NodeKind::Null);
        assert_ne!(a.id, b.id);
        assert_eq!(a.clone().id, a.id);
    }

    #[test]
    fn clone_is_deep() {
        let mut gen = ids();
        let inner = Node::synthetic(gen.fresh(), NodeKind::Int { value: 1 });
        let list = Node::synthetic(
            gen.fresh(),
            NodeKind::List {
                items: vec![inner.clone()],
            },
        );
        let mut copy = list.clone();
        if let NodeKind::List { items } = &mut copy.kind {
            items[0].kind = NodeKind::Int { value: 2 };
        }
        assert!(matches!(
            &list.kind,
            NodeKind::List { items } if matches!(items[0].kind, NodeKind::Int { value: 1 })
        ));
    }

    #[test]
    fn func_is_expr_is_a_runtime_flag() {
        let mut gen = ids();
        let stmt = Node::synthetic(
            gen.fresh(),
            NodeKind::Func {
                mods: vec![],
                name: Some("f".into()),
                params: vec![],
                ret: None,
                is_block: true,
                body: vec![],
                is_expr: false,
            },
        );
        let lambda = Node::synthetic(
            gen.fresh(),
            NodeKind::Func {
                mods: vec![],
                name: None,
                params: vec![],
                ret: None,
                is_block: false,
                body: vec![],
                is_expr: true,
            },
        );
        assert!(!stmt.is_expr());
        assert!(lambda.is_expr());
    }

    #[test]
    fn error_node_is_never_an_expression() {
        let mut gen = ids();
        let err = Node::synthetic(
            gen.fresh(),
            NodeKind::Error {
                message: "boom".into(),
            },
        );
        assert!(!err.is_expr());
    }

    #[test]
    fn binary_op_display() {
        assert_eq!(
            BinaryOp::Cmp {
                op: CmpOp::Eq,
                ignore_case: true
            }
            .to_string(),
            "==?"
        );
        assert_eq!(
            BinaryOp::Cmp {
                op: CmpOp::IsNot,
                ignore_case: false
            }
            .to_string(),
            "isnot"
        );
        assert_eq!(BinaryOp::Mod.to_string(), "%");
    }

    #[test]
    fn modifier_words_round_trip() {
        for word in ["autoload", "global", "range", "dict", "closure", "noabort"] {
            let m = FuncModifier::from_word(word).unwrap();
            assert_eq!(m.as_str(), word);
        }
        assert!(FuncModifier::from_word("static").is_none());
    }

    #[test]
    fn pattern_bindings_iterate_all_names() {
        let pat = Pattern::List(vec![
            Binding {
                name: "a".into(),
                span: None,
            },
            Binding {
                name: "_".into(),
                span: None,
            },
        ]);
        let names: Vec<_> = pat.bindings().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["a", "_"]);
    }
}
