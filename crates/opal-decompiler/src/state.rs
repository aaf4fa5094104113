//! Mutable decompilation state
//!
//! One state per instruction sequence. Agents read the current instruction
//! and mutate the stack, locals, pool and statement sink; only the machine
//! moves the cursor.

use crate::error::DecompileError;
use crate::locals::LocalVariables;
use crate::stack::OperandStack;
use opal_ast::{Ast, AstNode, RefPool};
use opal_bytecode::{DataType, Instruction, LabelId, Opcode, Signature};

pub struct DecompilerState {
    instructions: Vec<Instruction>,
    cursor: usize,
    pub stack: OperandStack,
    pub locals: LocalVariables,
    pub pool: RefPool,
    statements: Vec<AstNode>,
}

impl DecompilerState {
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self {
            instructions,
            cursor: 0,
            stack: OperandStack::new(),
            locals: LocalVariables::new(),
            pool: RefPool::new(),
            statements: Vec::new(),
        }
    }

    pub fn has_more(&self) -> bool {
        self.cursor < self.instructions.len()
    }

    /// The instruction under the cursor
    pub fn current(&self) -> &Instruction {
        &self.instructions[self.cursor]
    }

    /// Position of the cursor, used in error reports
    pub fn index(&self) -> usize {
        self.cursor
    }

    pub fn advance(&mut self) {
        self.cursor += 1;
    }

    /// Append a finished statement
    pub fn emit(&mut self, node: AstNode) {
        self.statements.push(node);
    }

    /// Whether any later instruction declares `label`
    pub fn label_declared_ahead(&self, label: &LabelId) -> bool {
        self.instructions[self.cursor + 1..].iter().any(|instruction| {
            instruction.opcode() == Opcode::Label
                && instruction.operand(0).and_then(|op| op.as_label()) == Some(label)
        })
    }

    /// Pop one stack value; underflow names the offending instruction
    pub fn pop(&mut self) -> Result<AstNode, DecompileError> {
        self.stack.pop().ok_or(DecompileError::StackUnderflow {
            index: self.cursor,
            opcode: self.current().opcode(),
        })
    }

    /// Pop `count` values in push order
    pub fn pop_n(&mut self, count: usize) -> Result<Vec<AstNode>, DecompileError> {
        self.stack.pop_n(count).ok_or(DecompileError::StackUnderflow {
            index: self.cursor,
            opcode: self.current().opcode(),
        })
    }

    fn bad_operand(&self) -> DecompileError {
        DecompileError::BadOperand {
            index: self.cursor,
            opcode: self.current().opcode(),
        }
    }

    pub fn operand_int(&self, position: usize) -> Result<i64, DecompileError> {
        self.current()
            .operand(position)
            .and_then(|op| op.as_int())
            .ok_or_else(|| self.bad_operand())
    }

    pub fn operand_float(&self, position: usize) -> Result<f64, DecompileError> {
        self.current()
            .operand(position)
            .and_then(|op| op.as_float())
            .ok_or_else(|| self.bad_operand())
    }

    pub fn operand_str(&self, position: usize) -> Result<&str, DecompileError> {
        self.current()
            .operand(position)
            .and_then(|op| op.as_str())
            .ok_or_else(|| self.bad_operand())
    }

    pub fn operand_type(&self, position: usize) -> Result<DataType, DecompileError> {
        self.current()
            .operand(position)
            .and_then(|op| op.as_type())
            .cloned()
            .ok_or_else(|| self.bad_operand())
    }

    pub fn operand_label(&self, position: usize) -> Result<LabelId, DecompileError> {
        self.current()
            .operand(position)
            .and_then(|op| op.as_label())
            .cloned()
            .ok_or_else(|| self.bad_operand())
    }

    /// Slot index operand, range-checked
    pub fn operand_slot(&self, position: usize) -> Result<u16, DecompileError> {
        let raw = self.operand_int(position)?;
        u16::try_from(raw).map_err(|_| self.bad_operand())
    }

    /// Signature operand, parsed
    pub fn operand_signature(&self, position: usize) -> Result<Signature, DecompileError> {
        let raw = self.operand_str(position)?;
        Ok(Signature::parse(raw)?)
    }

    /// Finish: leftover stack values become trailing statements, bottom first
    pub fn into_ast(mut self) -> Ast {
        let mut statements = self.statements;
        statements.extend(self.stack.drain_bottom_up());
        Ast::new(statements, self.pool)
    }
}
