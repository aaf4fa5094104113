//! Rendering nodes into tree-IR
//!
//! The walk context tracks which pool slots have already been rendered: the
//! first occurrence of a duplicated value renders in full under its alias,
//! later occurrences render as a bare alias reference.

use crate::error::AstError;
use crate::ir::{IrNode, IrValue};
use crate::node::AstNode;
use crate::pool::{RefId, RefPool};
use opal_bytecode::{Instruction, Operand};
use rustc_hash::FxHashSet;

/// State of one rendering walk
pub struct RenderCtx<'a> {
    pool: &'a RefPool,
    seen: FxHashSet<RefId>,
}

impl<'a> RenderCtx<'a> {
    pub fn new(pool: &'a RefPool) -> Self {
        Self {
            pool,
            seen: FxHashSet::default(),
        }
    }

    fn first_visit(&mut self, id: RefId) -> bool {
        self.seen.insert(id)
    }
}

fn raw_operand(operand: &Operand) -> IrNode {
    let node = IrNode::new("operand");
    match operand {
        Operand::Int(value) => node
            .attr("kind", IrValue::Str("int".into()))
            .attr("value", IrValue::Int(*value)),
        Operand::Float(value) => node
            .attr("kind", IrValue::Str("float".into()))
            .attr("value", IrValue::Float(*value)),
        Operand::Str(value) => node
            .attr("kind", IrValue::Str("str".into()))
            .attr("value", IrValue::Str(value.clone())),
        Operand::Type(value) => node
            .attr("kind", IrValue::Str("type".into()))
            .attr("value", IrValue::Str(value.descriptor())),
        Operand::Label(value) => node
            .attr("kind", IrValue::Str("label".into()))
            .attr("value", IrValue::Str(value.as_str().to_string())),
    }
}

/// Render a verbatim instruction
pub(crate) fn raw_to_ir(instruction: &Instruction) -> IrNode {
    let mut node =
        IrNode::new("opcode").attr("name", IrValue::Str(instruction.opcode().name().into()));
    for operand in instruction.operands() {
        node.children.push(raw_operand(operand));
    }
    node
}

impl AstNode {
    /// Render this node into its tree-IR representation
    pub fn to_ir(&self, ctx: &mut RenderCtx<'_>) -> Result<IrNode, AstError> {
        let ir = match self {
            AstNode::Empty => IrNode::new("empty"),
            AstNode::Literal(value) => {
                let node = IrNode::new("literal")
                    .attr("type", IrValue::Str(value.data_type().descriptor()));
                match value {
                    crate::value::Value::Null => node,
                    crate::value::Value::Bool(v) => node.attr("value", IrValue::Bool(*v)),
                    crate::value::Value::Int(v) | crate::value::Value::Long(v) => {
                        node.attr("value", IrValue::Int(*v))
                    }
                    crate::value::Value::Float(v) | crate::value::Value::Double(v) => {
                        node.attr("value", IrValue::Float(*v))
                    }
                    crate::value::Value::Str(v) => node.attr("value", IrValue::Str(v.clone())),
                }
            }
            AstNode::LocalVar { slot, ty } => IrNode::new("local")
                .attr("slot", IrValue::Int(i64::from(*slot)))
                .attr("type", IrValue::Str(ty.descriptor())),
            AstNode::StoreLocal { slot, ty, value } => IrNode::new("store-local")
                .attr("slot", IrValue::Int(i64::from(*slot)))
                .attr("type", IrValue::Str(ty.descriptor()))
                .child(value.to_ir(ctx)?),
            AstNode::Add { left, right } => IrNode::new("plus")
                .child(left.to_ir(ctx)?)
                .child(right.to_ir(ctx)?),
            AstNode::Sub { left, right } => IrNode::new("minus")
                .child(left.to_ir(ctx)?)
                .child(right.to_ir(ctx)?),
            AstNode::Mul { left, right } => IrNode::new("times")
                .child(left.to_ir(ctx)?)
                .child(right.to_ir(ctx)?),
            AstNode::FieldGet {
                owner,
                name,
                ty,
                instance,
            } => IrNode::new("field-get")
                .attr("owner", IrValue::Str(owner.clone()))
                .attr("name", IrValue::Str(name.clone()))
                .attr("type", IrValue::Str(ty.descriptor()))
                .child(instance.to_ir(ctx)?),
            AstNode::FieldSet {
                owner,
                name,
                ty,
                instance,
                value,
            } => IrNode::new("field-set")
                .attr("owner", IrValue::Str(owner.clone()))
                .attr("name", IrValue::Str(name.clone()))
                .attr("type", IrValue::Str(ty.descriptor()))
                .child(instance.to_ir(ctx)?)
                .child(value.to_ir(ctx)?),
            AstNode::StaticGet { owner, name, ty } => IrNode::new("static-get")
                .attr("owner", IrValue::Str(owner.clone()))
                .attr("name", IrValue::Str(name.clone()))
                .attr("type", IrValue::Str(ty.descriptor())),
            AstNode::StaticSet {
                owner,
                name,
                ty,
                value,
            } => IrNode::new("static-set")
                .attr("owner", IrValue::Str(owner.clone()))
                .attr("name", IrValue::Str(name.clone()))
                .attr("type", IrValue::Str(ty.descriptor()))
                .child(value.to_ir(ctx)?),
            AstNode::NewArray { elem, length } => IrNode::new("new-array")
                .attr("type", IrValue::Str(elem.descriptor()))
                .child(length.to_ir(ctx)?),
            AstNode::ArrayGet { array, index } => IrNode::new("array-get")
                .child(array.to_ir(ctx)?)
                .child(index.to_ir(ctx)?),
            AstNode::ArraySet {
                array,
                index,
                value,
            } => IrNode::new("array-set")
                .child(array.to_ir(ctx)?)
                .child(index.to_ir(ctx)?)
                .child(value.to_ir(ctx)?),
            AstNode::Cast { target, value } => IrNode::new("cast")
                .attr("type", IrValue::Str(target.descriptor()))
                .child(value.to_ir(ctx)?),
            AstNode::CheckCast { target, value } => IrNode::new("check-cast")
                .attr("type", IrValue::Str(target.descriptor()))
                .child(value.to_ir(ctx)?),
            AstNode::NewAddress { class } => {
                IrNode::new("new-address").attr("class", IrValue::Str(class.clone()))
            }
            AstNode::Construct {
                target,
                callee,
                args,
            } => {
                let mut node = IrNode::new("construct")
                    .attr("class", IrValue::Str(callee.owner.clone()))
                    .attr("signature", IrValue::Str(callee.signature.descriptor()))
                    .child(target.to_ir(ctx)?);
                for arg in args {
                    node.children.push(arg.to_ir(ctx)?);
                }
                node
            }
            AstNode::SuperCall {
                receiver,
                callee,
                args,
            } => {
                let mut node = IrNode::new("super")
                    .attr("owner", IrValue::Str(callee.owner.clone()))
                    .attr("signature", IrValue::Str(callee.signature.descriptor()))
                    .child(receiver.to_ir(ctx)?);
                for arg in args {
                    node.children.push(arg.to_ir(ctx)?);
                }
                node
            }
            AstNode::Invoke {
                receiver,
                callee,
                args,
            } => {
                let mut node = invocation_ir("invoke", callee).child(receiver.to_ir(ctx)?);
                for arg in args {
                    node.children.push(arg.to_ir(ctx)?);
                }
                node
            }
            AstNode::InvokeStatic { callee, args } => {
                let mut node = invocation_ir("invoke-static", callee);
                for arg in args {
                    node.children.push(arg.to_ir(ctx)?);
                }
                node
            }
            AstNode::InvokeInterface {
                receiver,
                callee,
                args,
            } => {
                let mut node =
                    invocation_ir("invoke-interface", callee).child(receiver.to_ir(ctx)?);
                for arg in args {
                    node.children.push(arg.to_ir(ctx)?);
                }
                node
            }
            AstNode::InvokeDynamic {
                name,
                signature,
                args,
            } => {
                let mut node = IrNode::new("invoke-dynamic")
                    .attr("name", IrValue::Str(name.clone()))
                    .attr("signature", IrValue::Str(signature.descriptor()));
                for arg in args {
                    node.children.push(arg.to_ir(ctx)?);
                }
                node
            }
            AstNode::Duplicate(id) => {
                let alias = ctx.pool.alias(*id).to_string();
                if ctx.first_visit(*id) {
                    let original = ctx.pool.get(*id)?.clone();
                    IrNode::new("duplicated")
                        .attr("name", IrValue::Str(alias))
                        .child(original.to_ir(ctx)?)
                } else {
                    IrNode::new("ref").attr("name", IrValue::Str(alias))
                }
            }
            AstNode::Reference(id) => {
                let target = ctx.pool.get(*id)?.clone();
                target.to_ir(ctx)?
            }
            AstNode::Label(id) => {
                IrNode::new("label").attr("id", IrValue::Str(id.as_str().to_string()))
            }
            AstNode::Labeled { node, label } => IrNode::new("labeled")
                .attr("label", IrValue::Str(label.as_str().to_string()))
                .child(node.to_ir(ctx)?),
            AstNode::If {
                op,
                left,
                right,
                target,
            } => IrNode::new("if")
                .attr("op", IrValue::Str(op.name().into()))
                .attr("target", IrValue::Str(target.as_str().to_string()))
                .child(left.to_ir(ctx)?)
                .child(right.to_ir(ctx)?),
            AstNode::Return { value } => {
                let node = IrNode::new("return");
                match value {
                    Some(inner) => node.child(inner.to_ir(ctx)?),
                    None => node,
                }
            }
            AstNode::Popped(node) => IrNode::new("ignore-result").child(node.to_ir(ctx)?),
            AstNode::Raw(instruction) => raw_to_ir(instruction),
        };
        Ok(ir)
    }
}

fn invocation_ir(name: &str, callee: &crate::node::Callee) -> IrNode {
    IrNode::new(name)
        .attr("owner", IrValue::Str(callee.owner.clone()))
        .attr("name", IrValue::Str(callee.name.clone()))
        .attr("signature", IrValue::Str(callee.signature.descriptor()))
}
