//! Decompilation errors

use opal_ast::AstError;
use opal_bytecode::{DescriptorError, Opcode};
use thiserror::Error;

/// Failure while lifting an instruction sequence
#[derive(Debug, Error)]
pub enum DecompileError {
    /// An instruction needed more stack values than were available.
    #[error("operand stack underflow at instruction {index} ({opcode})")]
    StackUnderflow { index: usize, opcode: Opcode },

    /// A branch names a label no later instruction declares.
    #[error("branch at instruction {index} targets unknown label '{label}'")]
    MalformedInput { index: usize, label: String },

    /// An operand was missing or of the wrong kind for its opcode.
    #[error("missing or ill-typed operand at instruction {index} ({opcode})")]
    BadOperand { index: usize, opcode: Opcode },

    /// A constructor call popped something that is not an allocation.
    #[error("constructor at instruction {index} applied to a non-allocation receiver")]
    UnexpectedReceiver { index: usize },

    #[error(transparent)]
    Ast(#[from] AstError),

    #[error(transparent)]
    Descriptor(#[from] DescriptorError),
}
