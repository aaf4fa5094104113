//! Symbolic decompiler for Opal bytecode
//!
//! Executes an instruction sequence over a stack of expression subtrees
//! instead of runtime values. Each opcode family is handled by an agent;
//! unclaimed opcodes pass through verbatim, so coverage gaps degrade the
//! output instead of failing it.

#![warn(rust_2018_idioms)]

pub mod agents;
pub mod error;
pub mod locals;
pub mod machine;
pub mod stack;
pub mod state;

pub use agents::{AgentRouter, DecompilationAgent, TraceOutput, TracedAgent};
pub use error::DecompileError;
pub use locals::LocalVariables;
pub use machine::DecompilerMachine;
pub use stack::OperandStack;
pub use state::DecompilerState;
