//! Label markers
//!
//! A marker over an empty stack is a standalone statement. A marker over a
//! pending value rides on the stack until the next pop folds it into a
//! `Labeled` wrapper, keeping the marker attached to the value it precedes.

use super::DecompilationAgent;
use crate::error::DecompileError;
use crate::state::DecompilerState;
use opal_ast::AstNode;
use opal_bytecode::Opcode;

pub struct LabelAgent;

impl DecompilationAgent for LabelAgent {
    fn name(&self) -> &'static str {
        "labels"
    }

    fn supported(&self) -> &'static [Opcode] {
        &[Opcode::Label]
    }

    fn handle(&self, state: &mut DecompilerState) -> Result<(), DecompileError> {
        let id = state.operand_label(0)?;
        if state.stack.is_empty() {
            state.emit(AstNode::Label(id));
        } else {
            state.stack.push(AstNode::Label(id));
        }
        Ok(())
    }
}
