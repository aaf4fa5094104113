//! Field access opcodes

use super::DecompilationAgent;
use crate::error::DecompileError;
use crate::state::DecompilerState;
use opal_ast::AstNode;
use opal_bytecode::Opcode;

pub struct FieldsAgent;

impl DecompilationAgent for FieldsAgent {
    fn name(&self) -> &'static str {
        "fields"
    }

    fn supported(&self) -> &'static [Opcode] {
        &[
            Opcode::GetField,
            Opcode::PutField,
            Opcode::GetStatic,
            Opcode::PutStatic,
        ]
    }

    fn handle(&self, state: &mut DecompilerState) -> Result<(), DecompileError> {
        let owner = state.operand_str(0)?.to_string();
        let name = state.operand_str(1)?.to_string();
        let ty = state.operand_type(2)?;
        match state.current().opcode() {
            Opcode::GetField => {
                let instance = Box::new(state.pop()?);
                state.stack.push(AstNode::FieldGet {
                    owner,
                    name,
                    ty,
                    instance,
                });
            }
            Opcode::PutField => {
                let value = Box::new(state.pop()?);
                let instance = Box::new(state.pop()?);
                state.emit(AstNode::FieldSet {
                    owner,
                    name,
                    ty,
                    instance,
                    value,
                });
            }
            Opcode::GetStatic => {
                state.stack.push(AstNode::StaticGet { owner, name, ty });
            }
            _ => {
                let value = Box::new(state.pop()?);
                state.emit(AstNode::StaticSet {
                    owner,
                    name,
                    ty,
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

    fn field_instruction(opcode: Opcode) -> Instruction {
        Instruction::new(
            opcode,
            vec![
                Operand::Str("geo.Point".into()),
                Operand::Str("x".into()),
                Operand::Type(DataType::Int),
            ],
        )
    }

    #[test]
    fn put_field_pops_value_then_instance() {
        let mut state = DecompilerState::new(vec![field_instruction(Opcode::PutField)]);
        state.stack.push(AstNode::LocalVar {
            slot: 0,
            ty: DataType::Object("geo.Point".into()),
        });
        state.stack.push(AstNode::Literal(Value::Int(5)));
        FieldsAgent.handle(&mut state).unwrap();
        let ast = state.into_ast();
        match &ast.statements()[0] {
            AstNode::FieldSet { instance, value, .. } => {
                assert!(matches!(**instance, AstNode::LocalVar { slot: 0, .. }));
                assert_eq!(**value, AstNode::Literal(Value::Int(5)));
            }
            other => panic!("unexpected statement: {other:?}"),
        }
    }

    #[test]
    fn static_get_needs_no_stack_input() {
        let mut state = DecompilerState::new(vec![field_instruction(Opcode::GetStatic)]);
        FieldsAgent.handle(&mut state).unwrap();
        assert_eq!(state.stack.len(), 1);
    }
}
