//! Compilation errors

use opal_ast::AstError;
use opal_bytecode::DescriptorError;
use thiserror::Error;

/// Failure while turning tree-IR back into instructions
#[derive(Debug, Error)]
pub enum CompileError {
    /// The IR names a node kind this compiler does not know.
    #[error("unknown node kind '{name}'")]
    UnknownNode { name: String },

    /// A known node kind is missing attributes or children it requires.
    #[error("malformed '{name}' node: {reason}")]
    MalformedIr { name: String, reason: String },

    #[error(transparent)]
    Descriptor(#[from] DescriptorError),

    #[error(transparent)]
    Ast(#[from] AstError),
}
