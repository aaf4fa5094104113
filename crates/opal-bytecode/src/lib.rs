//! Opal stack-machine instruction definitions
//!
//! This crate provides the instruction set of the Opal virtual machine:
//! opcodes, instructions with their typed operand lists, and the type
//! descriptor grammar used by loads, casts and call signatures.

#![warn(rust_2018_idioms)]

pub mod instruction;
pub mod opcode;
pub mod types;

pub use instruction::{Instruction, LabelId, Operand};
pub use opcode::Opcode;
pub use types::{DataType, DescriptorError, Signature};
