//! Constant-pushing opcodes

use super::DecompilationAgent;
use crate::error::DecompileError;
use crate::state::DecompilerState;
use opal_ast::{AstNode, Value};
use opal_bytecode::Opcode;

pub struct ConstAgent;

impl DecompilationAgent for ConstAgent {
    fn name(&self) -> &'static str {
        "consts"
    }

    fn supported(&self) -> &'static [Opcode] {
        &[
            Opcode::ConstNull,
            Opcode::ConstBool,
            Opcode::ConstI32,
            Opcode::ConstI64,
            Opcode::ConstF32,
            Opcode::ConstF64,
            Opcode::ConstStr,
        ]
    }

    fn handle(&self, state: &mut DecompilerState) -> Result<(), DecompileError> {
        let value = match state.current().opcode() {
            Opcode::ConstNull => Value::Null,
            Opcode::ConstBool => Value::Bool(state.operand_int(0)? != 0),
            Opcode::ConstI32 => Value::Int(state.operand_int(0)?),
            Opcode::ConstI64 => Value::Long(state.operand_int(0)?),
            Opcode::ConstF32 => Value::Float(state.operand_float(0)?),
            Opcode::ConstF64 => Value::Double(state.operand_float(0)?),
            _ => Value::Str(state.operand_str(0)?.to_string()),
        };
        state.stack.push(AstNode::Literal(value));
        Ok(())
    }
}
