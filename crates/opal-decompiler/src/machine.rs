//! The decompiler driver
//!
//! Walks the instruction sequence once, dispatching every instruction through
//! the router. Only the machine moves the cursor; agents see a fixed current
//! instruction.

use crate::agents::{AgentRouter, TraceOutput};
use crate::error::DecompileError;
use crate::state::DecompilerState;
use once_cell::sync::Lazy;
use opal_ast::Ast;
use opal_bytecode::Instruction;
use std::sync::Arc;

static DEFAULT_ROUTER: Lazy<Arc<AgentRouter>> = Lazy::new(|| Arc::new(AgentRouter::new()));

pub struct DecompilerMachine {
    router: Arc<AgentRouter>,
}

impl DecompilerMachine {
    /// Machine with the full agent set
    pub fn new() -> Self {
        Self {
            router: Arc::clone(&DEFAULT_ROUTER),
        }
    }

    /// Machine that keeps every instruction verbatim
    pub fn passthrough() -> Self {
        Self::with_router(AgentRouter::passthrough())
    }

    /// Machine that traces every agent invocation
    pub fn traced(output: TraceOutput) -> Self {
        Self::with_router(AgentRouter::traced(output))
    }

    pub fn with_router(router: AgentRouter) -> Self {
        Self {
            router: Arc::new(router),
        }
    }

    /// Lift an instruction sequence into a tree
    pub fn decompile(&self, instructions: Vec<Instruction>) -> Result<Ast, DecompileError> {
        let mut state = DecompilerState::new(instructions);
        while state.has_more() {
            tracing::trace!(index = state.index(), instruction = %state.current(), "lifting");
            self.router.handle(&mut state)?;
            state.advance();
        }
        Ok(state.into_ast())
    }
}

impl Default for DecompilerMachine {
    fn default() -> Self {
        Self::new()
    }
}
