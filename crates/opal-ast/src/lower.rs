//! Lowering nodes back into instructions
//!
//! Children lower before the instruction that consumes them, mirroring the
//! evaluation order the decompiler recovered them from. Branch labels are
//! renamed through a per-walk map, so markers and jump targets stay paired
//! while the emitted names are fresh.

use crate::error::AstError;
use crate::node::AstNode;
use crate::pool::{RefId, RefPool};
use crate::value::Value;
use opal_bytecode::{Instruction, LabelId, Opcode, Operand};
use rustc_hash::{FxHashMap, FxHashSet};

/// State of one lowering walk
pub struct LowerCtx<'a> {
    pool: &'a RefPool,
    seen: FxHashSet<RefId>,
    labels: FxHashMap<LabelId, LabelId>,
    next_label: u32,
}

impl<'a> LowerCtx<'a> {
    pub fn new(pool: &'a RefPool) -> Self {
        Self {
            pool,
            seen: FxHashSet::default(),
            labels: FxHashMap::default(),
            next_label: 0,
        }
    }

    fn first_visit(&mut self, id: RefId) -> bool {
        self.seen.insert(id)
    }

    /// Fresh name for a label, stable within the walk
    fn label(&mut self, source: &LabelId) -> LabelId {
        if let Some(mapped) = self.labels.get(source) {
            return mapped.clone();
        }
        let fresh = LabelId::new(format!("L{}", self.next_label));
        self.next_label += 1;
        self.labels.insert(source.clone(), fresh.clone());
        fresh
    }
}

fn literal(value: &Value) -> Instruction {
    match value {
        Value::Null => Instruction::bare(Opcode::ConstNull),
        Value::Bool(v) => Instruction::new(Opcode::ConstBool, vec![Operand::Int(i64::from(*v))]),
        Value::Int(v) => Instruction::new(Opcode::ConstI32, vec![Operand::Int(*v)]),
        Value::Long(v) => Instruction::new(Opcode::ConstI64, vec![Operand::Int(*v)]),
        Value::Float(v) => Instruction::new(Opcode::ConstF32, vec![Operand::Float(*v)]),
        Value::Double(v) => Instruction::new(Opcode::ConstF64, vec![Operand::Float(*v)]),
        Value::Str(v) => Instruction::new(Opcode::ConstStr, vec![Operand::Str(v.clone())]),
    }
}

impl AstNode {
    /// Emit the instructions computing this node, children first
    pub fn lower(&self, ctx: &mut LowerCtx<'_>, out: &mut Vec<Instruction>) -> Result<(), AstError> {
        match self {
            AstNode::Empty => {}
            AstNode::Literal(value) => out.push(literal(value)),
            AstNode::LocalVar { slot, ty } => out.push(Instruction::new(
                Opcode::Load,
                vec![Operand::Int(i64::from(*slot)), Operand::Type(ty.clone())],
            )),
            AstNode::StoreLocal { slot, ty, value } => {
                value.lower(ctx, out)?;
                out.push(Instruction::new(
                    Opcode::Store,
                    vec![Operand::Int(i64::from(*slot)), Operand::Type(ty.clone())],
                ));
            }
            AstNode::Add { left, right } => {
                left.lower(ctx, out)?;
                right.lower(ctx, out)?;
                out.push(Instruction::bare(Opcode::Add));
            }
            AstNode::Sub { left, right } => {
                left.lower(ctx, out)?;
                right.lower(ctx, out)?;
                out.push(Instruction::bare(Opcode::Sub));
            }
            AstNode::Mul { left, right } => {
                left.lower(ctx, out)?;
                right.lower(ctx, out)?;
                out.push(Instruction::bare(Opcode::Mul));
            }
            AstNode::FieldGet {
                owner,
                name,
                ty,
                instance,
            } => {
                instance.lower(ctx, out)?;
                out.push(Instruction::new(
                    Opcode::GetField,
                    vec![
                        Operand::Str(owner.clone()),
                        Operand::Str(name.clone()),
                        Operand::Type(ty.clone()),
                    ],
                ));
            }
            AstNode::FieldSet {
                owner,
                name,
                ty,
                instance,
                value,
            } => {
                instance.lower(ctx, out)?;
                value.lower(ctx, out)?;
                out.push(Instruction::new(
                    Opcode::PutField,
                    vec![
                        Operand::Str(owner.clone()),
                        Operand::Str(name.clone()),
                        Operand::Type(ty.clone()),
                    ],
                ));
            }
            AstNode::StaticGet { owner, name, ty } => out.push(Instruction::new(
                Opcode::GetStatic,
                vec![
                    Operand::Str(owner.clone()),
                    Operand::Str(name.clone()),
                    Operand::Type(ty.clone()),
                ],
            )),
            AstNode::StaticSet {
                owner,
                name,
                ty,
                value,
            } => {
                value.lower(ctx, out)?;
                out.push(Instruction::new(
                    Opcode::PutStatic,
                    vec![
                        Operand::Str(owner.clone()),
                        Operand::Str(name.clone()),
                        Operand::Type(ty.clone()),
                    ],
                ));
            }
            AstNode::NewArray { elem, length } => {
                length.lower(ctx, out)?;
                out.push(Instruction::new(
                    Opcode::NewArray,
                    vec![Operand::Type(elem.clone())],
                ));
            }
            AstNode::ArrayGet { array, index } => {
                array.lower(ctx, out)?;
                index.lower(ctx, out)?;
                out.push(Instruction::bare(Opcode::LoadArray));
            }
            AstNode::ArraySet {
                array,
                index,
                value,
            } => {
                array.lower(ctx, out)?;
                index.lower(ctx, out)?;
                value.lower(ctx, out)?;
                out.push(Instruction::bare(Opcode::StoreArray));
            }
            AstNode::Cast { target, value } => {
                value.lower(ctx, out)?;
                out.push(Instruction::new(
                    Opcode::Cast,
                    vec![Operand::Type(target.clone())],
                ));
            }
            AstNode::CheckCast { target, value } => {
                value.lower(ctx, out)?;
                out.push(Instruction::new(
                    Opcode::CheckCast,
                    vec![Operand::Type(target.clone())],
                ));
            }
            AstNode::NewAddress { class } => out.push(Instruction::new(
                Opcode::New,
                vec![Operand::Str(class.clone())],
            )),
            AstNode::Construct {
                target,
                callee,
                args,
            } => {
                target.lower(ctx, out)?;
                for arg in args {
                    arg.lower(ctx, out)?;
                }
                out.push(Instruction::new(
                    Opcode::InvokeCtor,
                    vec![
                        Operand::Str(callee.owner.clone()),
                        Operand::Str(callee.signature.descriptor()),
                    ],
                ));
            }
            AstNode::SuperCall {
                receiver,
                callee,
                args,
            } => {
                receiver.lower(ctx, out)?;
                for arg in args {
                    arg.lower(ctx, out)?;
                }
                out.push(Instruction::new(
                    Opcode::InvokeSuper,
                    vec![
                        Operand::Str(callee.owner.clone()),
                        Operand::Str(callee.signature.descriptor()),
                    ],
                ));
            }
            AstNode::Invoke {
                receiver,
                callee,
                args,
            } => {
                receiver.lower(ctx, out)?;
                for arg in args {
                    arg.lower(ctx, out)?;
                }
                out.push(invocation(Opcode::Invoke, callee));
            }
            AstNode::InvokeStatic { callee, args } => {
                for arg in args {
                    arg.lower(ctx, out)?;
                }
                out.push(invocation(Opcode::InvokeStatic, callee));
            }
            AstNode::InvokeInterface {
                receiver,
                callee,
                args,
            } => {
                receiver.lower(ctx, out)?;
                for arg in args {
                    arg.lower(ctx, out)?;
                }
                out.push(invocation(Opcode::InvokeInterface, callee));
            }
            AstNode::InvokeDynamic {
                name,
                signature,
                args,
            } => {
                for arg in args {
                    arg.lower(ctx, out)?;
                }
                out.push(Instruction::new(
                    Opcode::InvokeDynamic,
                    vec![
                        Operand::Str(name.clone()),
                        Operand::Str(signature.descriptor()),
                    ],
                ));
            }
            AstNode::Duplicate(id) => {
                // First consumer computes the value; every later consumer
                // finds its copy already on the stack. A constructed value
                // follows the allocation protocol: the address is duplicated
                // before the constructor consumes one copy, so no extra DUP
                // is needed afterwards.
                if ctx.first_visit(*id) {
                    let original = ctx.pool.get(*id)?.clone();
                    if let AstNode::Construct {
                        target,
                        callee,
                        args,
                    } = &original
                    {
                        target.lower(ctx, out)?;
                        out.push(Instruction::bare(Opcode::Dup));
                        for arg in args {
                            arg.lower(ctx, out)?;
                        }
                        out.push(Instruction::new(
                            Opcode::InvokeCtor,
                            vec![
                                Operand::Str(callee.owner.clone()),
                                Operand::Str(callee.signature.descriptor()),
                            ],
                        ));
                    } else {
                        original.lower(ctx, out)?;
                        out.push(Instruction::bare(Opcode::Dup));
                    }
                }
            }
            AstNode::Reference(id) => {
                let target = ctx.pool.get(*id)?.clone();
                target.lower(ctx, out)?;
            }
            AstNode::Label(id) => {
                let fresh = ctx.label(id);
                out.push(Instruction::new(
                    Opcode::Label,
                    vec![Operand::Label(fresh)],
                ));
            }
            AstNode::Labeled { node, label } => {
                node.lower(ctx, out)?;
                let fresh = ctx.label(label);
                out.push(Instruction::new(
                    Opcode::Label,
                    vec![Operand::Label(fresh)],
                ));
            }
            AstNode::If {
                op,
                left,
                right,
                target,
            } => {
                left.lower(ctx, out)?;
                right.lower(ctx, out)?;
                let fresh = ctx.label(target);
                out.push(Instruction::new(
                    op.opcode(),
                    vec![Operand::Label(fresh)],
                ));
            }
            AstNode::Return { value } => match value {
                Some(inner) => {
                    inner.lower(ctx, out)?;
                    let ty = inner.data_type(ctx.pool);
                    out.push(Instruction::new(
                        Opcode::ReturnValue,
                        vec![Operand::Type(ty)],
                    ));
                }
                None => out.push(Instruction::bare(Opcode::Return)),
            },
            AstNode::Popped(node) => {
                node.lower(ctx, out)?;
                out.push(Instruction::bare(Opcode::Pop));
            }
            AstNode::Raw(instruction) => {
                // Label operands go through the walk's rename map so verbatim
                // branches stay paired with renamed markers.
                let operands = instruction
                    .operands()
                    .iter()
                    .map(|operand| match operand {
                        Operand::Label(label) => Operand::Label(ctx.label(label)),
                        other => other.clone(),
                    })
                    .collect();
                out.push(Instruction::new(instruction.opcode(), operands));
            }
        }
        Ok(())
    }
}

fn invocation(opcode: Opcode, callee: &crate::node::Callee) -> Instruction {
    Instruction::new(
        opcode,
        vec![
            Operand::Str(callee.owner.clone()),
            Operand::Str(callee.name.clone()),
            Operand::Str(callee.signature.descriptor()),
        ],
    )
}
