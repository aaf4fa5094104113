//! Verbatim fallback
//!
//! Instructions no agent claims are preserved as opaque nodes, so the output
//! stays faithful even for opcodes the decompiler cannot structure. The node
//! joins the stack when values are pending and the statement list otherwise,
//! which keeps its position in the sequence.

use super::DecompilationAgent;
use crate::error::DecompileError;
use crate::state::DecompilerState;
use opal_ast::AstNode;
use opal_bytecode::Opcode;

pub struct RawAgent;

impl DecompilationAgent for RawAgent {
    fn name(&self) -> &'static str {
        "raw"
    }

    fn supported(&self) -> &'static [Opcode] {
        &[]
    }

    fn handle(&self, state: &mut DecompilerState) -> Result<(), DecompileError> {
        let node = AstNode::Raw(state.current().clone());
        if state.stack.is_empty() {
            state.emit(node);
        } else {
            state.stack.push(node);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opal_ast::Value;
    use opal_bytecode::Instruction;

    #[test]
    fn keeps_the_instruction_verbatim() {
        let mut state = DecompilerState::new(vec![Instruction::bare(Opcode::Throw)]);
        RawAgent.handle(&mut state).unwrap();
        let ast = state.into_ast();
        assert_eq!(
            ast.statements(),
            &[AstNode::Raw(Instruction::bare(Opcode::Throw))]
        );
    }

    #[test]
    fn joins_the_stack_when_values_are_pending() {
        let mut state = DecompilerState::new(vec![Instruction::bare(Opcode::Neg)]);
        state.stack.push(AstNode::Literal(Value::Int(1)));
        RawAgent.handle(&mut state).unwrap();
        assert_eq!(state.stack.len(), 2);
    }
}
