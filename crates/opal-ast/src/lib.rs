//! Expression tree for the Opal round-trip decompiler
//!
//! The tree is built bottom-up during decompilation and walked top-down during
//! compilation. Every node has two projections: `to_ir` renders it into the
//! nested tree-IR consumed by external serializers, and `lower` emits the flat
//! instruction sequence that reproduces its runtime effect.

#![warn(rust_2018_idioms)]

pub mod error;
pub mod ir;
pub mod lower;
pub mod node;
pub mod pool;
pub mod render;
pub mod value;

pub use error::AstError;
pub use ir::{IrNode, IrValue};
pub use lower::LowerCtx;
pub use node::{Ast, AstNode, Callee, CmpOp};
pub use pool::{RefId, RefPool};
pub use render::RenderCtx;
pub use value::Value;
