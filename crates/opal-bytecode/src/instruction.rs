//! Instructions and operands
//!
//! An [`Instruction`] is an opcode plus an ordered operand list. Instructions
//! are immutable values: external adapters build them, the decompiler only
//! reads them, and lowering produces fresh ones.

use crate::opcode::Opcode;
use crate::types::DataType;
use serde::{Deserialize, Serialize};

/// Identifier of a branch target
///
/// Label identities are only meaningful within one instruction sequence;
/// lowering re-synthesizes them rather than reusing the source identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LabelId(String);

impl LabelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LabelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One typed instruction operand
///
/// The operand kind is fixed by the opcode, never inferred.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operand {
    /// Integer literal or slot index
    Int(i64),
    /// Floating-point literal
    Float(f64),
    /// String literal, symbol name or call signature
    Str(String),
    /// Type descriptor
    Type(DataType),
    /// Branch target identifier
    Label(LabelId),
}

impl Operand {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Operand::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Operand::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Operand::Str(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_type(&self) -> Option<&DataType> {
        match self {
            Operand::Type(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_label(&self) -> Option<&LabelId> {
        match self {
            Operand::Label(value) => Some(value),
            _ => None,
        }
    }
}

impl std::fmt::Display for Operand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operand::Int(value) => write!(f, "{}", value),
            Operand::Float(value) => write!(f, "{}", value),
            Operand::Str(value) => write!(f, "{:?}", value),
            Operand::Type(value) => write!(f, "{}", value),
            Operand::Label(value) => write!(f, ":{}", value),
        }
    }
}

/// One stack-machine instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    opcode: Opcode,
    operands: Vec<Operand>,
}

impl Instruction {
    pub fn new(opcode: Opcode, operands: Vec<Operand>) -> Self {
        Self { opcode, operands }
    }

    /// Instruction without operands
    pub fn bare(opcode: Opcode) -> Self {
        Self::new(opcode, Vec::new())
    }

    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    pub fn operands(&self) -> &[Operand] {
        &self.operands
    }

    pub fn operand(&self, index: usize) -> Option<&Operand> {
        self.operands.get(index)
    }
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.opcode.name())?;
        for operand in &self.operands {
            write!(f, " {}", operand)?;
        }
        Ok(())
    }
}
