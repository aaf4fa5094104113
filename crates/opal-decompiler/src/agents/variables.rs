//! Local variable opcodes

use super::DecompilationAgent;
use crate::error::DecompileError;
use crate::state::DecompilerState;
use opal_ast::AstNode;
use opal_bytecode::Opcode;

pub struct VariablesAgent;

impl DecompilationAgent for VariablesAgent {
    fn name(&self) -> &'static str {
        "variables"
    }

    fn supported(&self) -> &'static [Opcode] {
        &[Opcode::Load, Opcode::Store]
    }

    fn handle(&self, state: &mut DecompilerState) -> Result<(), DecompileError> {
        let slot = state.operand_slot(0)?;
        let ty = state.operand_type(1)?;
        match state.current().opcode() {
            Opcode::Load => {
                let node = state.locals.variable(slot, ty);
                state.stack.push(node);
            }
            _ => {
                let value = Box::new(state.pop()?);
                state.emit(AstNode::StoreLocal { slot, ty, value });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opal_ast::Value;
    use opal_bytecode::{DataType, Instruction, Operand};

    #[test]
    fn store_becomes_a_statement() {
        let mut state = DecompilerState::new(vec![Instruction::new(
            Opcode::Store,
            vec![Operand::Int(3), Operand::Type(DataType::Str)],
        )]);
        state.stack.push(AstNode::Literal(Value::Str("x".into())));
        VariablesAgent.handle(&mut state).unwrap();
        let ast = state.into_ast();
        assert_eq!(
            ast.statements(),
            &[AstNode::StoreLocal {
                slot: 3,
                ty: DataType::Str,
                value: Box::new(AstNode::Literal(Value::Str("x".into()))),
            }]
        );
    }

    #[test]
    fn load_keys_variables_by_slot_and_type() {
        let mut state = DecompilerState::new(vec![
            Instruction::new(
                Opcode::Load,
                vec![Operand::Int(0), Operand::Type(DataType::Long)],
            ),
            Instruction::new(
                Opcode::Load,
                vec![Operand::Int(0), Operand::Type(DataType::Int)],
            ),
        ]);
        VariablesAgent.handle(&mut state).unwrap();
        state.advance();
        VariablesAgent.handle(&mut state).unwrap();
        assert_eq!(
            state.stack.pop(),
            Some(AstNode::LocalVar {
                slot: 0,
                ty: DataType::Int
            })
        );
        assert_eq!(
            state.stack.pop(),
            Some(AstNode::LocalVar {
                slot: 0,
                ty: DataType::Long
            })
        );
        assert_eq!(state.locals.len(), 2);
    }
}
