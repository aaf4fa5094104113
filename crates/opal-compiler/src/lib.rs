//! Compiler from tree-IR back to Opal bytecode
//!
//! The inverse of the decompiler: parses the nested tree-IR into the
//! expression tree and lowers it to a flat instruction sequence. Lowering is
//! semantic, not positional; branch labels come out fresh and duplicated
//! values are recomputed once and shared.

#![warn(rust_2018_idioms)]

pub mod compiler;
pub mod error;
pub mod parser;

pub use compiler::Compiler;
pub use error::CompileError;
pub use parser::parse;
