//! Binary arithmetic opcodes
//!
//! Only the operators with tree counterparts are claimed here; the remaining
//! arithmetic opcodes stay verbatim through the fallback.

use super::DecompilationAgent;
use crate::error::DecompileError;
use crate::state::DecompilerState;
use opal_ast::AstNode;
use opal_bytecode::Opcode;

pub struct ArithmeticAgent;

impl DecompilationAgent for ArithmeticAgent {
    fn name(&self) -> &'static str {
        "arithmetic"
    }

    fn supported(&self) -> &'static [Opcode] {
        &[Opcode::Add, Opcode::Sub, Opcode::Mul]
    }

    fn handle(&self, state: &mut DecompilerState) -> Result<(), DecompileError> {
        let opcode = state.current().opcode();
        let right = Box::new(state.pop()?);
        let left = Box::new(state.pop()?);
        let node = match opcode {
            Opcode::Add => AstNode::Add { left, right },
            Opcode::Sub => AstNode::Sub { left, right },
            _ => AstNode::Mul { left, right },
        };
        state.stack.push(node);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opal_ast::Value;
    use opal_bytecode::Instruction;

    #[test]
    fn operand_order_survives_the_stack() {
        let mut state = DecompilerState::new(vec![Instruction::bare(Opcode::Sub)]);
        state.stack.push(AstNode::Literal(Value::Int(10)));
        state.stack.push(AstNode::Literal(Value::Int(3)));
        ArithmeticAgent.handle(&mut state).unwrap();
        assert_eq!(
            state.stack.pop(),
            Some(AstNode::Sub {
                left: Box::new(AstNode::Literal(Value::Int(10))),
                right: Box::new(AstNode::Literal(Value::Int(3))),
            })
        );
    }

    #[test]
    fn underflow_is_reported() {
        let mut state = DecompilerState::new(vec![Instruction::bare(Opcode::Add)]);
        state.stack.push(AstNode::Literal(Value::Int(1)));
        assert!(matches!(
            ArithmeticAgent.handle(&mut state),
            Err(DecompileError::StackUnderflow { .. })
        ));
    }
}
