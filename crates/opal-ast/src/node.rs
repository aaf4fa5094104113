//! The node family
//!
//! A closed tagged union: adding an opcode means one new variant plus match
//! arms in `render` and `lower`. Composite nodes own their children; the one
//! exception is the pool-indexed `Duplicate`/`Reference` pair, which shares a
//! value between tree positions without sharing ownership.

use crate::error::AstError;
use crate::ir::IrNode;
use crate::lower::LowerCtx;
use crate::pool::{RefId, RefPool};
use crate::render::RenderCtx;
use crate::value::Value;
use opal_bytecode::{DataType, Instruction, LabelId, Opcode, Signature};

/// Callee descriptor of an invocation: owner class, method name, signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Callee {
    pub owner: String,
    pub name: String,
    pub signature: Signature,
}

impl Callee {
    pub fn new(owner: impl Into<String>, name: impl Into<String>, signature: Signature) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            signature,
        }
    }

    /// Constructor callee: the method name is fixed
    pub fn constructor(owner: impl Into<String>, signature: Signature) -> Self {
        Self::new(owner, "init", signature)
    }
}

/// Comparison operator of a conditional branch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    pub fn name(self) -> &'static str {
        match self {
            CmpOp::Eq => "eq",
            CmpOp::Ne => "ne",
            CmpOp::Lt => "lt",
            CmpOp::Le => "le",
            CmpOp::Gt => "gt",
            CmpOp::Ge => "ge",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "eq" => Some(CmpOp::Eq),
            "ne" => Some(CmpOp::Ne),
            "lt" => Some(CmpOp::Lt),
            "le" => Some(CmpOp::Le),
            "gt" => Some(CmpOp::Gt),
            "ge" => Some(CmpOp::Ge),
            _ => None,
        }
    }

    /// The branch opcode carrying this comparison
    pub fn opcode(self) -> Opcode {
        match self {
            CmpOp::Eq => Opcode::IfEq,
            CmpOp::Ne => Opcode::IfNe,
            CmpOp::Lt => Opcode::IfLt,
            CmpOp::Le => Opcode::IfLe,
            CmpOp::Gt => Opcode::IfGt,
            CmpOp::Ge => Opcode::IfGe,
        }
    }

    pub fn from_opcode(opcode: Opcode) -> Option<Self> {
        match opcode {
            Opcode::IfEq => Some(CmpOp::Eq),
            Opcode::IfNe => Some(CmpOp::Ne),
            Opcode::IfLt => Some(CmpOp::Lt),
            Opcode::IfLe => Some(CmpOp::Le),
            Opcode::IfGt => Some(CmpOp::Gt),
            Opcode::IfGe => Some(CmpOp::Ge),
            _ => None,
        }
    }
}

/// One reconstructed tree node
#[derive(Debug, Clone, PartialEq)]
pub enum AstNode {
    /// No-op placeholder
    Empty,
    /// Typed constant
    Literal(Value),
    /// Local variable read
    LocalVar { slot: u16, ty: DataType },
    /// Local variable write; a statement
    StoreLocal {
        slot: u16,
        ty: DataType,
        value: Box<AstNode>,
    },
    /// Addition
    Add {
        left: Box<AstNode>,
        right: Box<AstNode>,
    },
    /// Subtraction
    Sub {
        left: Box<AstNode>,
        right: Box<AstNode>,
    },
    /// Multiplication
    Mul {
        left: Box<AstNode>,
        right: Box<AstNode>,
    },
    /// Instance field read
    FieldGet {
        owner: String,
        name: String,
        ty: DataType,
        instance: Box<AstNode>,
    },
    /// Instance field write; a statement
    FieldSet {
        owner: String,
        name: String,
        ty: DataType,
        instance: Box<AstNode>,
        value: Box<AstNode>,
    },
    /// Static field read
    StaticGet {
        owner: String,
        name: String,
        ty: DataType,
    },
    /// Static field write; a statement
    StaticSet {
        owner: String,
        name: String,
        ty: DataType,
        value: Box<AstNode>,
    },
    /// Array allocation with a computed length
    NewArray {
        elem: DataType,
        length: Box<AstNode>,
    },
    /// Array element read
    ArrayGet {
        array: Box<AstNode>,
        index: Box<AstNode>,
    },
    /// Array element write; a statement
    ArraySet {
        array: Box<AstNode>,
        index: Box<AstNode>,
        value: Box<AstNode>,
    },
    /// Numeric conversion
    Cast {
        target: DataType,
        value: Box<AstNode>,
    },
    /// Runtime type check
    CheckCast {
        target: DataType,
        value: Box<AstNode>,
    },
    /// Address of an allocated but unconstructed object
    NewAddress { class: String },
    /// Constructor invocation over an allocation target
    Construct {
        target: Box<AstNode>,
        callee: Callee,
        args: Vec<AstNode>,
    },
    /// Super-constructor invocation; a statement
    SuperCall {
        receiver: Box<AstNode>,
        callee: Callee,
        args: Vec<AstNode>,
    },
    /// Virtual method call
    Invoke {
        receiver: Box<AstNode>,
        callee: Callee,
        args: Vec<AstNode>,
    },
    /// Static method call
    InvokeStatic { callee: Callee, args: Vec<AstNode> },
    /// Interface method call
    InvokeInterface {
        receiver: Box<AstNode>,
        callee: Callee,
        args: Vec<AstNode>,
    },
    /// Dynamically-bound call
    InvokeDynamic {
        name: String,
        signature: Signature,
        args: Vec<AstNode>,
    },
    /// Shared value produced by a `dup`; resolves through the pool
    Duplicate(RefId),
    /// Deferred binding to a pool slot
    Reference(RefId),
    /// Branch target marker
    Label(LabelId),
    /// A value preceded by a branch target
    Labeled {
        node: Box<AstNode>,
        label: LabelId,
    },
    /// Conditional branch; a statement
    If {
        op: CmpOp,
        left: Box<AstNode>,
        right: Box<AstNode>,
        target: LabelId,
    },
    /// Method return; a statement
    Return { value: Option<Box<AstNode>> },
    /// Discarded expression result; a statement
    Popped(Box<AstNode>),
    /// Verbatim instruction with no structural reconstruction
    Raw(Instruction),
}

impl AstNode {
    /// Static type of the value this node leaves on the stack
    ///
    /// Statements are `Void`. The pool is needed to look through duplicates;
    /// an unlinked slot falls back to `Void` (reading it properly is the
    /// render/lower walk's job, which reports the violation).
    pub fn data_type(&self, pool: &RefPool) -> DataType {
        match self {
            AstNode::Literal(value) => value.data_type(),
            AstNode::LocalVar { ty, .. } => ty.clone(),
            AstNode::Add { left, right }
            | AstNode::Sub { left, right }
            | AstNode::Mul { left, right } => {
                left.data_type(pool).wider(&right.data_type(pool))
            }
            AstNode::FieldGet { ty, .. } | AstNode::StaticGet { ty, .. } => ty.clone(),
            AstNode::NewArray { elem, .. } => DataType::Array(Box::new(elem.clone())),
            AstNode::ArrayGet { array, .. } => match array.data_type(pool) {
                DataType::Array(elem) => *elem,
                other => other,
            },
            AstNode::Cast { target, .. } | AstNode::CheckCast { target, .. } => target.clone(),
            AstNode::NewAddress { class } | AstNode::Construct {
                callee: Callee { owner: class, .. },
                ..
            } => DataType::Object(class.clone()),
            AstNode::Invoke { callee, .. }
            | AstNode::InvokeStatic { callee, .. }
            | AstNode::InvokeInterface { callee, .. } => callee.signature.ret().clone(),
            AstNode::InvokeDynamic { signature, .. } => signature.ret().clone(),
            AstNode::Duplicate(id) | AstNode::Reference(id) => match pool.get(*id) {
                Ok(node) => node.data_type(pool),
                Err(_) => DataType::Void,
            },
            AstNode::Labeled { node, .. } => node.data_type(pool),
            AstNode::Popped(node) => node.data_type(pool),
            AstNode::Empty
            | AstNode::StoreLocal { .. }
            | AstNode::FieldSet { .. }
            | AstNode::StaticSet { .. }
            | AstNode::ArraySet { .. }
            | AstNode::SuperCall { .. }
            | AstNode::Label(_)
            | AstNode::If { .. }
            | AstNode::Return { .. }
            | AstNode::Raw(_) => DataType::Void,
        }
    }
}

/// The reconstructed method body: ordered statements plus the value pool
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Ast {
    statements: Vec<AstNode>,
    pool: RefPool,
}

impl Ast {
    pub fn new(statements: Vec<AstNode>, pool: RefPool) -> Self {
        Self { statements, pool }
    }

    pub fn statements(&self) -> &[AstNode] {
        &self.statements
    }

    pub fn pool(&self) -> &RefPool {
        &self.pool
    }

    /// Render the whole tree into tree-IR
    ///
    /// Each call starts a fresh walk, so rendering twice yields identical
    /// output.
    pub fn to_ir(&self) -> Result<IrNode, AstError> {
        let mut ctx = RenderCtx::new(&self.pool);
        let mut root = IrNode::new("root");
        for statement in &self.statements {
            root.children.push(statement.to_ir(&mut ctx)?);
        }
        Ok(root)
    }

    /// Lower the whole tree into a flat instruction sequence
    ///
    /// Branch labels are synthesized fresh on every walk.
    pub fn lower(&self) -> Result<Vec<Instruction>, AstError> {
        let mut ctx = LowerCtx::new(&self.pool);
        let mut out = Vec::new();
        for statement in &self.statements {
            statement.lower(&mut ctx, &mut out)?;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_nodes_take_the_wider_type() {
        let pool = RefPool::new();
        let node = AstNode::Add {
            left: Box::new(AstNode::Literal(Value::Int(1))),
            right: Box::new(AstNode::Literal(Value::Double(2.0))),
        };
        assert_eq!(node.data_type(&pool), DataType::Double);
    }

    #[test]
    fn statements_are_void() {
        let pool = RefPool::new();
        let node = AstNode::StoreLocal {
            slot: 0,
            ty: DataType::Int,
            value: Box::new(AstNode::Literal(Value::Int(1))),
        };
        assert_eq!(node.data_type(&pool), DataType::Void);
    }

    #[test]
    fn duplicates_see_through_the_pool() {
        let mut pool = RefPool::new();
        let id = pool.insert(AstNode::Literal(Value::Long(7)));
        assert_eq!(AstNode::Duplicate(id).data_type(&pool), DataType::Long);
    }

    #[test]
    fn array_reads_strip_one_dimension() {
        let pool = RefPool::new();
        let node = AstNode::ArrayGet {
            array: Box::new(AstNode::LocalVar {
                slot: 1,
                ty: DataType::Array(Box::new(DataType::Int)),
            }),
            index: Box::new(AstNode::Literal(Value::Int(0))),
        };
        assert_eq!(node.data_type(&pool), DataType::Int);
    }
}
