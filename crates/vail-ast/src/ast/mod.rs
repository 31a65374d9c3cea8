//! AST node definitions and traversal utilities.

pub mod node;
pub mod walk;

pub use node::{
    BinaryOp, Binding, CmpOp, ElseBranch, FuncModifier, ImportName, Node, NodeId, NodeIdGen,
    NodeKind, Param, Pattern, TypeTag, UnaryOp,
};
