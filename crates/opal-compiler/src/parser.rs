//! Tree-IR parsing
//!
//! Rebuilds the expression tree from its rendered form. Node kinds dispatch
//! on the IR name; every arm is the inverse of the corresponding render arm.
//! Shared values reappear as a `duplicated` node at their first occurrence
//! and as `ref` aliases afterwards, so aliases must resolve backwards only.

use crate::error::CompileError;
use opal_ast::{Ast, AstNode, Callee, CmpOp, IrNode, RefId, RefPool, Value};
use opal_bytecode::{DataType, Instruction, LabelId, Opcode, Operand, Signature};
use rustc_hash::FxHashMap;

/// Parse a rendered `root` node back into a tree
pub fn parse(root: &IrNode) -> Result<Ast, CompileError> {
    let mut parser = IrParser::new();
    let mut statements = Vec::with_capacity(root.children.len());
    for child in &root.children {
        statements.push(parser.node(child)?);
    }
    Ok(Ast::new(statements, parser.pool))
}

struct IrParser {
    pool: RefPool,
    aliases: FxHashMap<String, RefId>,
}

fn malformed(node: &IrNode, reason: impl Into<String>) -> CompileError {
    CompileError::MalformedIr {
        name: node.name.clone(),
        reason: reason.into(),
    }
}

fn req_str<'a>(node: &'a IrNode, key: &str) -> Result<&'a str, CompileError> {
    node.get_str(key)
        .ok_or_else(|| malformed(node, format!("missing '{key}' attribute")))
}

fn req_int(node: &IrNode, key: &str) -> Result<i64, CompileError> {
    node.get_int(key)
        .ok_or_else(|| malformed(node, format!("missing '{key}' attribute")))
}

fn req_float(node: &IrNode, key: &str) -> Result<f64, CompileError> {
    node.get(key)
        .and_then(|value| value.as_float())
        .ok_or_else(|| malformed(node, format!("missing '{key}' attribute")))
}

fn req_bool(node: &IrNode, key: &str) -> Result<bool, CompileError> {
    node.get(key)
        .and_then(|value| value.as_bool())
        .ok_or_else(|| malformed(node, format!("missing '{key}' attribute")))
}

fn req_type(node: &IrNode, key: &str) -> Result<DataType, CompileError> {
    Ok(DataType::parse(req_str(node, key)?)?)
}

fn req_signature(node: &IrNode, key: &str) -> Result<Signature, CompileError> {
    Ok(Signature::parse(req_str(node, key)?)?)
}

fn req_slot(node: &IrNode, key: &str) -> Result<u16, CompileError> {
    u16::try_from(req_int(node, key)?)
        .map_err(|_| malformed(node, format!("'{key}' out of slot range")))
}

fn child(node: &IrNode, index: usize) -> Result<&IrNode, CompileError> {
    node.children
        .get(index)
        .ok_or_else(|| malformed(node, format!("missing child {index}")))
}

impl IrParser {
    fn new() -> Self {
        Self {
            pool: RefPool::new(),
            aliases: FxHashMap::default(),
        }
    }

    fn boxed(&mut self, node: &IrNode, index: usize) -> Result<Box<AstNode>, CompileError> {
        Ok(Box::new(self.node(child(node, index)?)?))
    }

    fn rest(&mut self, node: &IrNode, from: usize) -> Result<Vec<AstNode>, CompileError> {
        node.children[from.min(node.children.len())..]
            .iter()
            .map(|arg| self.node(arg))
            .collect()
    }

    fn literal(&self, node: &IrNode) -> Result<AstNode, CompileError> {
        let ty = req_type(node, "type")?;
        let value = match ty {
            DataType::Int => Value::Int(req_int(node, "value")?),
            DataType::Long => Value::Long(req_int(node, "value")?),
            DataType::Float => Value::Float(req_float(node, "value")?),
            DataType::Double => Value::Double(req_float(node, "value")?),
            DataType::Bool => Value::Bool(req_bool(node, "value")?),
            DataType::Str => Value::Str(req_str(node, "value")?.to_string()),
            DataType::Object(_) => Value::Null,
            other => return Err(malformed(node, format!("non-literal type {other}"))),
        };
        Ok(AstNode::Literal(value))
    }

    fn raw(&self, node: &IrNode) -> Result<AstNode, CompileError> {
        let name = req_str(node, "name")?;
        let opcode = Opcode::from_name(name)
            .ok_or_else(|| malformed(node, format!("unknown opcode '{name}'")))?;
        let mut operands = Vec::with_capacity(node.children.len());
        for operand in &node.children {
            operands.push(self.raw_operand(operand)?);
        }
        Ok(AstNode::Raw(Instruction::new(opcode, operands)))
    }

    fn raw_operand(&self, node: &IrNode) -> Result<Operand, CompileError> {
        let operand = match req_str(node, "kind")? {
            "int" => Operand::Int(req_int(node, "value")?),
            "float" => Operand::Float(req_float(node, "value")?),
            "str" => Operand::Str(req_str(node, "value")?.to_string()),
            "type" => Operand::Type(req_type(node, "value")?),
            "label" => Operand::Label(LabelId::new(req_str(node, "value")?)),
            other => return Err(malformed(node, format!("unknown operand kind '{other}'"))),
        };
        Ok(operand)
    }

    fn node(&mut self, node: &IrNode) -> Result<AstNode, CompileError> {
        let parsed = match node.name.as_str() {
            "empty" => AstNode::Empty,
            "literal" => self.literal(node)?,
            "local" => AstNode::LocalVar {
                slot: req_slot(node, "slot")?,
                ty: req_type(node, "type")?,
            },
            "store-local" => AstNode::StoreLocal {
                slot: req_slot(node, "slot")?,
                ty: req_type(node, "type")?,
                value: self.boxed(node, 0)?,
            },
            "plus" => AstNode::Add {
                left: self.boxed(node, 0)?,
                right: self.boxed(node, 1)?,
            },
            "minus" => AstNode::Sub {
                left: self.boxed(node, 0)?,
                right: self.boxed(node, 1)?,
            },
            "times" => AstNode::Mul {
                left: self.boxed(node, 0)?,
                right: self.boxed(node, 1)?,
            },
            "field-get" => AstNode::FieldGet {
                owner: req_str(node, "owner")?.to_string(),
                name: req_str(node, "name")?.to_string(),
                ty: req_type(node, "type")?,
                instance: self.boxed(node, 0)?,
            },
            "field-set" => AstNode::FieldSet {
                owner: req_str(node, "owner")?.to_string(),
                name: req_str(node, "name")?.to_string(),
                ty: req_type(node, "type")?,
                instance: self.boxed(node, 0)?,
                value: self.boxed(node, 1)?,
            },
            "static-get" => AstNode::StaticGet {
                owner: req_str(node, "owner")?.to_string(),
                name: req_str(node, "name")?.to_string(),
                ty: req_type(node, "type")?,
            },
            "static-set" => AstNode::StaticSet {
                owner: req_str(node, "owner")?.to_string(),
                name: req_str(node, "name")?.to_string(),
                ty: req_type(node, "type")?,
                value: self.boxed(node, 0)?,
            },
            "new-array" => AstNode::NewArray {
                elem: req_type(node, "type")?,
                length: self.boxed(node, 0)?,
            },
            "array-get" => AstNode::ArrayGet {
                array: self.boxed(node, 0)?,
                index: self.boxed(node, 1)?,
            },
            "array-set" => AstNode::ArraySet {
                array: self.boxed(node, 0)?,
                index: self.boxed(node, 1)?,
                value: self.boxed(node, 2)?,
            },
            "cast" => AstNode::Cast {
                target: req_type(node, "type")?,
                value: self.boxed(node, 0)?,
            },
            "check-cast" => AstNode::CheckCast {
                target: req_type(node, "type")?,
                value: self.boxed(node, 0)?,
            },
            "new-address" => AstNode::NewAddress {
                class: req_str(node, "class")?.to_string(),
            },
            "construct" => AstNode::Construct {
                target: self.boxed(node, 0)?,
                callee: Callee::constructor(
                    req_str(node, "class")?,
                    req_signature(node, "signature")?,
                ),
                args: self.rest(node, 1)?,
            },
            "super" => AstNode::SuperCall {
                receiver: self.boxed(node, 0)?,
                callee: Callee::constructor(
                    req_str(node, "owner")?,
                    req_signature(node, "signature")?,
                ),
                args: self.rest(node, 1)?,
            },
            "invoke" => AstNode::Invoke {
                receiver: self.boxed(node, 0)?,
                callee: self.callee(node)?,
                args: self.rest(node, 1)?,
            },
            "invoke-static" => AstNode::InvokeStatic {
                callee: self.callee(node)?,
                args: self.rest(node, 0)?,
            },
            "invoke-interface" => AstNode::InvokeInterface {
                receiver: self.boxed(node, 0)?,
                callee: self.callee(node)?,
                args: self.rest(node, 1)?,
            },
            "invoke-dynamic" => AstNode::InvokeDynamic {
                name: req_str(node, "name")?.to_string(),
                signature: req_signature(node, "signature")?,
                args: self.rest(node, 0)?,
            },
            "duplicated" => {
                let alias = req_str(node, "name")?.to_string();
                let shared = self.node(child(node, 0)?)?;
                let id = self.pool.insert_named(alias.clone(), shared);
                self.aliases.insert(alias, id);
                AstNode::Duplicate(id)
            }
            "ref" => {
                let alias = req_str(node, "name")?;
                let id = self
                    .aliases
                    .get(alias)
                    .copied()
                    .ok_or_else(|| malformed(node, format!("alias '{alias}' not yet declared")))?;
                AstNode::Duplicate(id)
            }
            "label" => AstNode::Label(LabelId::new(req_str(node, "id")?)),
            "labeled" => AstNode::Labeled {
                label: LabelId::new(req_str(node, "label")?),
                node: self.boxed(node, 0)?,
            },
            "if" => {
                let op_name = req_str(node, "op")?;
                let op = CmpOp::from_name(op_name)
                    .ok_or_else(|| malformed(node, format!("unknown operator '{op_name}'")))?;
                AstNode::If {
                    op,
                    left: self.boxed(node, 0)?,
                    right: self.boxed(node, 1)?,
                    target: LabelId::new(req_str(node, "target")?),
                }
            }
            "return" => AstNode::Return {
                value: match node.children.first() {
                    Some(inner) => Some(Box::new(self.node(inner)?)),
                    None => None,
                },
            },
            "ignore-result" => AstNode::Popped(self.boxed(node, 0)?),
            "opcode" => self.raw(node)?,
            other => {
                return Err(CompileError::UnknownNode {
                    name: other.to_string(),
                })
            }
        };
        Ok(parsed)
    }

    fn callee(&self, node: &IrNode) -> Result<Callee, CompileError> {
        Ok(Callee::new(
            req_str(node, "owner")?,
            req_str(node, "name")?,
            req_signature(node, "signature")?,
        ))
    }
}
