//! Shared generator machinery.
//!
//! # Design
//!
//! - **Chunked output** - Generators produce `Vec<Chunk>` (one chunk per
//!   top-level statement plus any hoisted definitions) so the writer can
//!   stream output and abort on the first error chunk
//! - **One precedence table** - The parenthesization policy lives here;
//!   the Vim and pretty generators both consult it so neither can drift
//! - **Errors as data** - A malformed tree (an error node reaching
//!   generation) becomes an [`EmitError`] chunk, never a panic

pub mod pretty;
pub mod sexp;
pub mod vim;

use vail_ast::{BinaryOp, Node, NodeKind};

/// One piece of generated output.
pub type Chunk = Result<String, EmitError>;

/// A generation failure. These indicate a bug in an earlier stage (a
/// tree that checking should have rejected), so messages carry a
/// `fatal:` prefix to set them apart from user-facing diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmitError {
    #[error("fatal: cannot generate code from a unit with parse errors: {0}")]
    ErrorNode(String),
    #[error("fatal: {0}")]
    Internal(String),
}

/// Output flavor selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Target editor script
    Vim,
    /// Debug s-expression dump
    Sexp,
    /// Canonical source form, round-trippable
    Pretty,
}

impl Format {
    /// Output file extension for this format.
    pub fn extension(self) -> &'static str {
        match self {
            Format::Vim => "vim",
            Format::Sexp => "sexp",
            Format::Pretty => "pretty",
        }
    }

    /// Render one top-level unit.
    ///
    /// `stem` is the source file's basename without extension; the Vim
    /// generator uses it to build autoload function names.
    pub fn render(self, program: &Node, stem: &str) -> Vec<Chunk> {
        match self {
            Format::Vim => vim::render(program, stem),
            Format::Sexp => sexp::render(program),
            Format::Pretty => pretty::render(program),
        }
    }
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vim" => Ok(Format::Vim),
            "sexp" => Ok(Format::Sexp),
            "pretty" => Ok(Format::Pretty),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

/// Spell a float so it reads back as a float literal.
///
/// `Debug` drops the fractional part in exponent form (`1e-8`), but both
/// the source grammar and the target language require a digit-dot-digit
/// mantissa, so the `.0` is restored.
pub(crate) fn float_literal(value: f64) -> String {
    let text = format!("{value:?}");
    match text.find(['e', 'E']) {
        Some(split) if !text[..split].contains('.') => {
            format!("{}.0{}", &text[..split], &text[split..])
        }
        _ => text,
    }
}

/// Binding strength of an expression when nested inside another.
/// Higher binds tighter. Statements and function literals get the
/// weakest rank so they are parenthesized anywhere precedence matters.
pub(crate) fn prec(node: &Node) -> u8 {
    match node.terminal() {
        NodeKind::Func { .. } => 0,
        NodeKind::Ternary { .. } => 1,
        NodeKind::Binary { op, .. } => binary_prec(op),
        NodeKind::Unary { .. } => 7,
        NodeKind::Call { .. }
        | NodeKind::Subscript { .. }
        | NodeKind::Slice { .. }
        | NodeKind::Dot { .. } => 8,
        _ => 9,
    }
}

pub(crate) fn binary_prec(op: &BinaryOp) -> u8 {
    match op {
        BinaryOp::Or => 2,
        BinaryOp::And => 3,
        BinaryOp::Cmp { .. } => 4,
        BinaryOp::Add | BinaryOp::Sub => 5,
        BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => 6,
    }
}

/// Whether a binary operand must be parenthesized.
///
/// Lower-precedence children always need parens. At equal precedence the
/// left child of a left-associative operator re-parses identically, so
/// only the right side needs parens; the comparison family does not
/// associate at all, so both sides do.
pub(crate) fn binary_child_parens(op: &BinaryOp, child: &Node, is_right: bool) -> bool {
    let parent = binary_prec(op);
    let child_prec = prec(child);
    if child_prec != parent {
        return child_prec < parent;
    }
    match op {
        BinaryOp::Cmp { .. } => true,
        _ => is_right,
    }
}

/// Parens for a ternary's condition: `?:` is right-associative, so a
/// ternary (or anything weaker) in condition position must be grouped.
pub(crate) fn ternary_cond_parens(cond: &Node) -> bool {
    prec(cond) <= 1
}

/// Parens for a ternary's branches: the `?`/`:` delimiters disambiguate
/// nested ternaries, so only weaker-than-ternary children need grouping.
pub(crate) fn ternary_branch_parens(branch: &Node) -> bool {
    prec(branch) < 1
}

pub(crate) fn unary_operand_parens(operand: &Node) -> bool {
    prec(operand) < 7
}

pub(crate) fn postfix_base_parens(base: &Node) -> bool {
    prec(base) < 8
}
