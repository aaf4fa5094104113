//! Tree-IR value model
//!
//! The nested, named-node format exchanged with external serializers. The
//! core only guarantees that node name, typed attributes and ordered children
//! round-trip; everything else (on-disk framing, caching) is the adapter's
//! business.

use serde::{Deserialize, Serialize};

/// A typed attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IrValue {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

impl IrValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            IrValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            IrValue::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            IrValue::Str(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            IrValue::Bool(value) => Some(*value),
            _ => None,
        }
    }
}

/// One tree-IR node: a name, ordered attributes, ordered children
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrNode {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attrs: Vec<(String, IrValue)>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<IrNode>,
}

impl IrNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder: append an attribute
    pub fn attr(mut self, key: impl Into<String>, value: IrValue) -> Self {
        self.attrs.push((key.into(), value));
        self
    }

    /// Builder: append a child
    pub fn child(mut self, node: IrNode) -> Self {
        self.children.push(node);
        self
    }

    /// Look up an attribute by key
    pub fn get(&self, key: &str) -> Option<&IrValue> {
        self.attrs
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(IrValue::as_str)
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(IrValue::as_int)
    }
}
