//! Tree errors

use thiserror::Error;

/// Contract violations inside the tree
///
/// These are defects in agent sequencing or in a hand-built tree, not
/// recoverable runtime conditions. They abort the unit being processed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AstError {
    #[error("reference '{alias}' read before it was linked")]
    UnlinkedReference { alias: String },

    #[error("reference '{alias}' linked twice")]
    AlreadyLinked { alias: String },
}
