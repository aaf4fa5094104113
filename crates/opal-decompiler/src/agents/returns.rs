//! Return opcodes

use super::DecompilationAgent;
use crate::error::DecompileError;
use crate::state::DecompilerState;
use opal_ast::AstNode;
use opal_bytecode::Opcode;

pub struct ReturnAgent;

impl DecompilationAgent for ReturnAgent {
    fn name(&self) -> &'static str {
        "returns"
    }

    fn supported(&self) -> &'static [Opcode] {
        &[Opcode::Return, Opcode::ReturnValue]
    }

    fn handle(&self, state: &mut DecompilerState) -> Result<(), DecompileError> {
        let value = match state.current().opcode() {
            Opcode::ReturnValue => Some(Box::new(state.pop()?)),
            _ => None,
        };
        state.emit(AstNode::Return { value });
        Ok(())
    }
}
