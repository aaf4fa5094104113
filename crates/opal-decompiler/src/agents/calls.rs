//! Invocation opcodes
//!
//! Argument counts come from the signature operand; arguments pop in reverse
//! push order and are restored to declaration order. Calls that return a
//! value go back on the stack, void calls become statements.
//!
//! Constructor calls close the allocation protocol opened by `NEW`. A plain
//! address becomes a `Construct` statement. A duplicated address means the
//! constructed value is used later, so the pool slot the handles point at is
//! rebound from the bare address to the finished `Construct`.

use super::DecompilationAgent;
use crate::error::DecompileError;
use crate::state::DecompilerState;
use opal_ast::{AstNode, Callee};
use opal_bytecode::Opcode;

pub struct CallsAgent;

impl CallsAgent {
    fn method_call(&self, state: &mut DecompilerState) -> Result<(), DecompileError> {
        let opcode = state.current().opcode();
        let callee = Callee::new(
            state.operand_str(0)?,
            state.operand_str(1)?,
            state.operand_signature(2)?,
        );
        let args = state.pop_n(callee.signature.argument_count())?;
        let returns_value = callee.signature.returns_value();
        let node = match opcode {
            Opcode::InvokeStatic => AstNode::InvokeStatic { callee, args },
            Opcode::InvokeInterface => AstNode::InvokeInterface {
                receiver: Box::new(state.pop()?),
                callee,
                args,
            },
            _ => AstNode::Invoke {
                receiver: Box::new(state.pop()?),
                callee,
                args,
            },
        };
        if returns_value {
            state.stack.push(node);
        } else {
            state.emit(node);
        }
        Ok(())
    }

    fn dynamic_call(&self, state: &mut DecompilerState) -> Result<(), DecompileError> {
        let name = state.operand_str(0)?.to_string();
        let signature = state.operand_signature(1)?;
        let args = state.pop_n(signature.argument_count())?;
        let returns_value = signature.returns_value();
        let node = AstNode::InvokeDynamic {
            name,
            signature,
            args,
        };
        if returns_value {
            state.stack.push(node);
        } else {
            state.emit(node);
        }
        Ok(())
    }

    fn super_call(&self, state: &mut DecompilerState) -> Result<(), DecompileError> {
        let callee = Callee::constructor(state.operand_str(0)?, state.operand_signature(1)?);
        let args = state.pop_n(callee.signature.argument_count())?;
        let receiver = Box::new(state.pop()?);
        state.emit(AstNode::SuperCall {
            receiver,
            callee,
            args,
        });
        Ok(())
    }

    fn constructor_call(&self, state: &mut DecompilerState) -> Result<(), DecompileError> {
        let callee = Callee::constructor(state.operand_str(0)?, state.operand_signature(1)?);
        let args = state.pop_n(callee.signature.argument_count())?;
        match state.pop()? {
            AstNode::Duplicate(id) => {
                let address = state.pool.get(id)?.clone();
                if !matches!(address, AstNode::NewAddress { .. }) {
                    return Err(DecompileError::UnexpectedReceiver {
                        index: state.index(),
                    });
                }
                let construct = AstNode::Construct {
                    target: Box::new(address),
                    callee,
                    args,
                };
                state.pool.rebind(id, construct)?;
            }
            address @ AstNode::NewAddress { .. } => {
                state.emit(AstNode::Construct {
                    target: Box::new(address),
                    callee,
                    args,
                });
            }
            _ => {
                return Err(DecompileError::UnexpectedReceiver {
                    index: state.index(),
                })
            }
        }
        Ok(())
    }
}

impl DecompilationAgent for CallsAgent {
    fn name(&self) -> &'static str {
        "calls"
    }

    fn supported(&self) -> &'static [Opcode] {
        &[
            Opcode::Invoke,
            Opcode::InvokeStatic,
            Opcode::InvokeInterface,
            Opcode::InvokeDynamic,
            Opcode::InvokeCtor,
            Opcode::InvokeSuper,
        ]
    }

    fn handle(&self, state: &mut DecompilerState) -> Result<(), DecompileError> {
        match state.current().opcode() {
            Opcode::InvokeDynamic => self.dynamic_call(state),
            Opcode::InvokeCtor => self.constructor_call(state),
            Opcode::InvokeSuper => self.super_call(state),
            _ => self.method_call(state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opal_ast::Value;
    use opal_bytecode::{Instruction, Operand};

    fn invoke(opcode: Opcode, owner: &str, name: &str, signature: &str) -> Instruction {
        Instruction::new(
            opcode,
            vec![
                Operand::Str(owner.into()),
                Operand::Str(name.into()),
                Operand::Str(signature.into()),
            ],
        )
    }

    #[test]
    fn valued_call_pushes_and_keeps_argument_order() {
        let mut state = DecompilerState::new(vec![invoke(
            Opcode::InvokeStatic,
            "math.Ops",
            "max",
            "(II)I",
        )]);
        state.stack.push(AstNode::Literal(Value::Int(1)));
        state.stack.push(AstNode::Literal(Value::Int(2)));
        CallsAgent.handle(&mut state).unwrap();
        match state.stack.pop() {
            Some(AstNode::InvokeStatic { args, .. }) => {
                assert_eq!(
                    args,
                    vec![
                        AstNode::Literal(Value::Int(1)),
                        AstNode::Literal(Value::Int(2))
                    ]
                );
            }
            other => panic!("unexpected node: {other:?}"),
        }
    }

    #[test]
    fn void_call_becomes_a_statement() {
        let mut state = DecompilerState::new(vec![invoke(Opcode::Invoke, "io.Sink", "flush", "()V")]);
        state.stack.push(AstNode::LocalVar {
            slot: 0,
            ty: opal_bytecode::DataType::Object("io.Sink".into()),
        });
        CallsAgent.handle(&mut state).unwrap();
        assert!(state.stack.is_empty());
        let ast = state.into_ast();
        assert!(matches!(ast.statements()[0], AstNode::Invoke { .. }));
    }

    #[test]
    fn constructor_over_plain_address_is_a_statement() {
        let mut state = DecompilerState::new(vec![Instruction::new(
            Opcode::InvokeCtor,
            vec![Operand::Str("geo.Point".into()), Operand::Str("(I)V".into())],
        )]);
        state.stack.push(AstNode::NewAddress {
            class: "geo.Point".into(),
        });
        state.stack.push(AstNode::Literal(Value::Int(4)));
        CallsAgent.handle(&mut state).unwrap();
        let ast = state.into_ast();
        match &ast.statements()[0] {
            AstNode::Construct { target, args, .. } => {
                assert!(matches!(**target, AstNode::NewAddress { .. }));
                assert_eq!(args.len(), 1);
            }
            other => panic!("unexpected statement: {other:?}"),
        }
    }

    #[test]
    fn constructor_over_duplicated_address_rebinds_the_slot() {
        let mut state = DecompilerState::new(vec![Instruction::new(
            Opcode::InvokeCtor,
            vec![Operand::Str("geo.Point".into()), Operand::Str("()V".into())],
        )]);
        state.stack.push(AstNode::NewAddress {
            class: "geo.Point".into(),
        });
        let id = state.stack.dup(&mut state.pool).unwrap();
        CallsAgent.handle(&mut state).unwrap();
        assert!(matches!(
            state.pool.get(id).unwrap(),
            AstNode::Construct { .. }
        ));
        // the surviving handle now resolves to the constructed value
        assert_eq!(state.stack.pop(), Some(AstNode::Duplicate(id)));
    }

    #[test]
    fn constructor_over_non_allocation_fails() {
        let mut state = DecompilerState::new(vec![Instruction::new(
            Opcode::InvokeCtor,
            vec![Operand::Str("geo.Point".into()), Operand::Str("()V".into())],
        )]);
        state.stack.push(AstNode::Literal(Value::Int(1)));
        assert!(matches!(
            CallsAgent.handle(&mut state),
            Err(DecompileError::UnexpectedReceiver { .. })
        ));
    }
}
