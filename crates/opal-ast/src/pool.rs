//! Once-settable reference slots
//!
//! A duplicated stack value can be consumed by two subtrees built at
//! different times. Keeping a shared pointer between tree positions would
//! make the ownership graph cyclic, so shared values live in a pool and the
//! tree stores indices into it. The ownership graph stays a tree; only the
//! logical value graph shares.

use crate::error::AstError;
use crate::node::AstNode;

/// Index of a pool slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RefId(u32);

impl RefId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Slot {
    alias: String,
    node: Option<AstNode>,
    /// Set when a duplicated allocation has been bound to its constructor.
    rebound: bool,
}

/// Arena of shared values referenced by `Duplicate` and `Reference` nodes
///
/// Slot state machine: Unlinked → `link` → Linked, terminal. Reading an
/// unlinked slot is a fatal contract violation, not a recoverable condition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefPool {
    slots: Vec<Slot>,
}

impl RefPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an unlinked slot with a generated alias
    pub fn reserve(&mut self) -> RefId {
        let alias = format!("ref-{}", self.slots.len());
        self.reserve_named(alias)
    }

    /// Allocate an unlinked slot with the given alias
    pub fn reserve_named(&mut self, alias: impl Into<String>) -> RefId {
        let id = RefId(self.slots.len() as u32);
        self.slots.push(Slot {
            alias: alias.into(),
            node: None,
            rebound: false,
        });
        id
    }

    /// Allocate a slot already linked to `node`
    pub fn insert(&mut self, node: AstNode) -> RefId {
        let id = self.reserve();
        self.slots[id.index()].node = Some(node);
        id
    }

    /// Allocate a linked slot under the given alias
    pub fn insert_named(&mut self, alias: impl Into<String>, node: AstNode) -> RefId {
        let id = self.reserve_named(alias);
        self.slots[id.index()].node = Some(node);
        id
    }

    /// Bind an unlinked slot, exactly once
    pub fn link(&mut self, id: RefId, node: AstNode) -> Result<(), AstError> {
        let slot = &mut self.slots[id.index()];
        if slot.node.is_some() {
            return Err(AstError::AlreadyLinked {
                alias: slot.alias.clone(),
            });
        }
        slot.node = Some(node);
        Ok(())
    }

    /// Replace a duplicated allocation with its constructed value
    ///
    /// Allowed exactly once per slot, and only on a slot that is linked.
    pub fn rebind(&mut self, id: RefId, node: AstNode) -> Result<(), AstError> {
        let slot = &mut self.slots[id.index()];
        if slot.node.is_none() {
            return Err(AstError::UnlinkedReference {
                alias: slot.alias.clone(),
            });
        }
        if slot.rebound {
            return Err(AstError::AlreadyLinked {
                alias: slot.alias.clone(),
            });
        }
        slot.node = Some(node);
        slot.rebound = true;
        Ok(())
    }

    /// Read a slot; unlinked slots are a contract violation
    pub fn get(&self, id: RefId) -> Result<&AstNode, AstError> {
        let slot = &self.slots[id.index()];
        slot.node.as_ref().ok_or_else(|| AstError::UnlinkedReference {
            alias: slot.alias.clone(),
        })
    }

    pub fn alias(&self, id: RefId) -> &str {
        &self.slots[id.index()].alias
    }

    pub fn is_linked(&self, id: RefId) -> bool {
        self.slots[id.index()].node.is_some()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Find a slot by alias, if present
    pub fn by_alias(&self, alias: &str) -> Option<RefId> {
        self.slots
            .iter()
            .position(|slot| slot.alias == alias)
            .map(|index| RefId(index as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn reading_unlinked_slot_fails() {
        let mut pool = RefPool::new();
        let id = pool.reserve();
        assert!(!pool.is_linked(id));
        let err = pool.get(id).unwrap_err();
        assert!(matches!(err, AstError::UnlinkedReference { .. }));
    }

    #[test]
    fn link_is_terminal() {
        let mut pool = RefPool::new();
        let id = pool.reserve();
        pool.link(id, AstNode::Literal(Value::Int(1))).unwrap();
        assert_eq!(pool.get(id).unwrap(), &AstNode::Literal(Value::Int(1)));
        let err = pool.link(id, AstNode::Literal(Value::Int(2))).unwrap_err();
        assert!(matches!(err, AstError::AlreadyLinked { .. }));
    }

    #[test]
    fn rebind_requires_linked_slot_and_happens_once() {
        let mut pool = RefPool::new();
        let unlinked = pool.reserve();
        assert!(pool
            .rebind(unlinked, AstNode::Literal(Value::Int(1)))
            .is_err());

        let id = pool.insert(AstNode::Literal(Value::Int(1)));
        pool.rebind(id, AstNode::Literal(Value::Int(2))).unwrap();
        assert_eq!(pool.get(id).unwrap(), &AstNode::Literal(Value::Int(2)));
        let err = pool.rebind(id, AstNode::Literal(Value::Int(3))).unwrap_err();
        assert!(matches!(err, AstError::AlreadyLinked { .. }));
    }

    #[test]
    fn aliases_are_stable_and_searchable() {
        let mut pool = RefPool::new();
        let first = pool.reserve();
        let named = pool.insert_named("dup-x", AstNode::Empty);
        assert_eq!(pool.alias(first), "ref-0");
        assert_eq!(pool.by_alias("dup-x"), Some(named));
        assert_eq!(pool.by_alias("missing"), None);
    }
}
