//! Local variable tracking

use opal_ast::AstNode;
use opal_bytecode::DataType;
use rustc_hash::FxHashMap;

/// Variable nodes keyed by (slot, declared type)
///
/// Created on first use and reused for the same pair afterwards. Slots are
/// not globally typed: the same slot read under a different declared type is
/// a distinct variable.
#[derive(Debug, Default)]
pub struct LocalVariables {
    cache: FxHashMap<(u16, DataType), AstNode>,
}

impl LocalVariables {
    pub fn new() -> Self {
        Self::default()
    }

    /// The variable node for a (slot, type) pair
    pub fn variable(&mut self, slot: u16, ty: DataType) -> AstNode {
        self.cache
            .entry((slot, ty.clone()))
            .or_insert_with(|| AstNode::LocalVar { slot, ty })
            .clone()
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
