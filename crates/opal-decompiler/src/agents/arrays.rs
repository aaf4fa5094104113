//! Array opcodes

use super::DecompilationAgent;
use crate::error::DecompileError;
use crate::state::DecompilerState;
use opal_ast::AstNode;
use opal_bytecode::Opcode;

pub struct ArraysAgent;

impl DecompilationAgent for ArraysAgent {
    fn name(&self) -> &'static str {
        "arrays"
    }

    fn supported(&self) -> &'static [Opcode] {
        &[Opcode::NewArray, Opcode::LoadArray, Opcode::StoreArray]
    }

    fn handle(&self, state: &mut DecompilerState) -> Result<(), DecompileError> {
        match state.current().opcode() {
            Opcode::NewArray => {
                let elem = state.operand_type(0)?;
                let length = Box::new(state.pop()?);
                state.stack.push(AstNode::NewArray { elem, length });
            }
            Opcode::LoadArray => {
                let index = Box::new(state.pop()?);
                let array = Box::new(state.pop()?);
                state.stack.push(AstNode::ArrayGet { array, index });
            }
            _ => {
                let value = Box::new(state.pop()?);
                let index = Box::new(state.pop()?);
                let array = Box::new(state.pop()?);
                state.emit(AstNode::ArraySet {
                    array,
                    index,
                    value,
                });
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
    fn allocation_consumes_the_length() {
        let mut state = DecompilerState::new(vec![Instruction::new(
            Opcode::NewArray,
            vec![Operand::Type(DataType::Int)],
        )]);
        state.stack.push(AstNode::Literal(Value::Int(8)));
        ArraysAgent.handle(&mut state).unwrap();
        assert_eq!(
            state.stack.pop(),
            Some(AstNode::NewArray {
                elem: DataType::Int,
                length: Box::new(AstNode::Literal(Value::Int(8))),
            })
        );
    }

    #[test]
    fn element_write_pops_in_declaration_order() {
        let mut state = DecompilerState::new(vec![Instruction::bare(Opcode::StoreArray)]);
        state.stack.push(AstNode::LocalVar {
            slot: 0,
            ty: DataType::Array(Box::new(DataType::Int)),
        });
        state.stack.push(AstNode::Literal(Value::Int(2)));
        state.stack.push(AstNode::Literal(Value::Int(99)));
        ArraysAgent.handle(&mut state).unwrap();
        let ast = state.into_ast();
        match &ast.statements()[0] {
            AstNode::ArraySet { array, index, value } => {
                assert!(matches!(**array, AstNode::LocalVar { slot: 0, .. }));
                assert_eq!(**index, AstNode::Literal(Value::Int(2)));
                assert_eq!(**value, AstNode::Literal(Value::Int(99)));
            }
            other => panic!("unexpected statement: {other:?}"),
        }
    }
}
