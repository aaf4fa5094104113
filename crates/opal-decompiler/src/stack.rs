//! The symbolic operand stack
//!
//! Holds reconstructed subtrees instead of runtime values. Popping looks
//! through label markers: a marker sitting on top of a value means the value
//! is a branch target, so the pop folds both into one `Labeled` node.

use opal_ast::{AstNode, RefId, RefPool};

/// Stack of partially built expression trees
#[derive(Debug, Default)]
pub struct OperandStack {
    values: Vec<AstNode>,
}

impl OperandStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: AstNode) {
        self.values.push(node);
    }

    /// Pop one value, folding a label marker into the value beneath it
    pub fn pop(&mut self) -> Option<AstNode> {
        match self.values.pop()? {
            AstNode::Label(label) => {
                let node = self.pop()?;
                Some(AstNode::Labeled {
                    node: Box::new(node),
                    label,
                })
            }
            node => Some(node),
        }
    }

    /// Pop `count` values, returned in push order
    pub fn pop_n(&mut self, count: usize) -> Option<Vec<AstNode>> {
        let mut nodes = Vec::with_capacity(count);
        for _ in 0..count {
            nodes.push(self.pop()?);
        }
        nodes.reverse();
        Some(nodes)
    }

    /// Duplicate the top value through the pool
    ///
    /// The original moves into a fresh pool slot and two `Duplicate` handles
    /// take its place, so both consumers resolve to the same shared value.
    /// Duplicating a handle nests it in a new slot, one slot per duplication
    /// point, so lowering emits exactly one `DUP` per point.
    pub fn dup(&mut self, pool: &mut RefPool) -> Option<RefId> {
        let top = self.pop()?;
        let id = pool.insert(top);
        self.values.push(AstNode::Duplicate(id));
        self.values.push(AstNode::Duplicate(id));
        Some(id)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Drain all values, bottom of the stack first
    pub fn drain_bottom_up(&mut self) -> Vec<AstNode> {
        std::mem::take(&mut self.values)
    }

    /// Snapshot for tracing
    pub fn describe(&self) -> String {
        let parts: Vec<String> = self.values.iter().map(|node| format!("{:?}", node)).collect();
        format!("[{}]", parts.join(", "))
    }
}
