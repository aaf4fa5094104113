//! Conditional branch opcodes
//!
//! A branch is only well-formed if some later instruction declares its target
//! label; a dangling target means the input sequence is malformed and the run
//! aborts.

use super::DecompilationAgent;
use crate::error::DecompileError;
use crate::state::DecompilerState;
use opal_ast::{AstNode, CmpOp};
use opal_bytecode::Opcode;

pub struct BranchAgent;

impl DecompilationAgent for BranchAgent {
    fn name(&self) -> &'static str {
        "branches"
    }

    fn supported(&self) -> &'static [Opcode] {
        &[
            Opcode::IfEq,
            Opcode::IfNe,
            Opcode::IfLt,
            Opcode::IfLe,
            Opcode::IfGt,
            Opcode::IfGe,
        ]
    }

    fn handle(&self, state: &mut DecompilerState) -> Result<(), DecompileError> {
        let opcode = state.current().opcode();
        let op = CmpOp::from_opcode(opcode).ok_or(DecompileError::BadOperand {
            index: state.index(),
            opcode,
        })?;
        let target = state.operand_label(0)?;
        if !state.label_declared_ahead(&target) {
            return Err(DecompileError::MalformedInput {
                index: state.index(),
                label: target.as_str().to_string(),
            });
        }
        let right = Box::new(state.pop()?);
        let left = Box::new(state.pop()?);
        state.emit(AstNode::If {
            op,
            left,
            right,
            target,
        });
        Ok(())
    }
}
