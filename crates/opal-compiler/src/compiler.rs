//! The compiler facade

use crate::error::CompileError;
use crate::parser;
use opal_ast::{Ast, IrNode};
use opal_bytecode::Instruction;

/// Lowers tree-IR to a flat instruction sequence
#[derive(Debug, Default)]
pub struct Compiler;

impl Compiler {
    pub fn new() -> Self {
        Self
    }

    /// Parse a rendered tree without lowering it
    pub fn parse(&self, root: &IrNode) -> Result<Ast, CompileError> {
        parser::parse(root)
    }

    /// Parse and lower in one step
    pub fn compile(&self, root: &IrNode) -> Result<Vec<Instruction>, CompileError> {
        let ast = parser::parse(root)?;
        tracing::debug!(statements = ast.statements().len(), "lowering tree");
        Ok(ast.lower()?)
    }
}
