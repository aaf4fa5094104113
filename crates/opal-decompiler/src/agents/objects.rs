//! Object allocation
//!
//! `NEW` only reserves an address; the value is not usable until the matching
//! `INVOKE_CTOR` arrives, which the calls agent resolves.

use super::DecompilationAgent;
use crate::error::DecompileError;
use crate::state::DecompilerState;
use opal_ast::AstNode;
use opal_bytecode::Opcode;

pub struct ObjectsAgent;

impl DecompilationAgent for ObjectsAgent {
    fn name(&self) -> &'static str {
        "objects"
    }

    fn supported(&self) -> &'static [Opcode] {
        &[Opcode::New]
    }

    fn handle(&self, state: &mut DecompilerState) -> Result<(), DecompileError> {
        let class = state.operand_str(0)?.to_string();
        state.stack.push(AstNode::NewAddress { class });
        Ok(())
    }
}
