//! Pure stack manipulation opcodes
//!
//! `SWAP` is deliberately unclaimed: dissolving it by reordering subtrees
//! would flip the observable evaluation order of side-effecting operands, so
//! it rides through the verbatim fallback instead.

use super::DecompilationAgent;
use crate::error::DecompileError;
use crate::state::DecompilerState;
use opal_ast::AstNode;
use opal_bytecode::Opcode;

pub struct StackAgent;

impl DecompilationAgent for StackAgent {
    fn name(&self) -> &'static str {
        "stack"
    }

    fn supported(&self) -> &'static [Opcode] {
        &[Opcode::Nop, Opcode::Pop, Opcode::Dup]
    }

    fn handle(&self, state: &mut DecompilerState) -> Result<(), DecompileError> {
        match state.current().opcode() {
            Opcode::Nop => {}
            Opcode::Pop => {
                let node = state.pop()?;
                state.emit(AstNode::Popped(Box::new(node)));
            }
            _ => {
                let duplicated = state.stack.dup(&mut state.pool).is_some();
                if !duplicated {
                    return Err(DecompileError::StackUnderflow {
                        index: state.index(),
                        opcode: Opcode::Dup,
                    });
                }
            }
        }
        Ok(())
    }
}
