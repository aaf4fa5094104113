//! Type conversion opcodes

use super::DecompilationAgent;
use crate::error::DecompileError;
use crate::state::DecompilerState;
use opal_ast::AstNode;
use opal_bytecode::Opcode;

pub struct CastsAgent;

impl DecompilationAgent for CastsAgent {
    fn name(&self) -> &'static str {
        "casts"
    }

    fn supported(&self) -> &'static [Opcode] {
        &[Opcode::Cast, Opcode::CheckCast]
    }

    fn handle(&self, state: &mut DecompilerState) -> Result<(), DecompileError> {
        let target = state.operand_type(0)?;
        let value = Box::new(state.pop()?);
        let node = match state.current().opcode() {
            Opcode::Cast => AstNode::Cast { target, value },
            _ => AstNode::CheckCast { target, value },
        };
        state.stack.push(node);
        Ok(())
    }
}
