//! Tracing shim around an agent
//!
//! Records the operand stack before and after the wrapped agent runs. The
//! default sink is the `tracing` subscriber; tests capture into a shared
//! buffer instead.

use super::DecompilationAgent;
use crate::error::DecompileError;
use crate::state::DecompilerState;
use opal_bytecode::Opcode;
use parking_lot::Mutex;
use std::sync::Arc;

/// Where trace lines go
#[derive(Clone)]
pub enum TraceOutput {
    /// Emit through the `tracing` subscriber
    Log,
    /// Append to a shared buffer
    Capture(Arc<Mutex<Vec<String>>>),
}

impl TraceOutput {
    /// Fresh capture buffer
    pub fn capture() -> (Self, Arc<Mutex<Vec<String>>>) {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        (Self::Capture(Arc::clone(&buffer)), buffer)
    }

    fn record(&self, line: String) {
        match self {
            TraceOutput::Log => tracing::debug!("{line}"),
            TraceOutput::Capture(buffer) => buffer.lock().push(line),
        }
    }
}

pub struct TracedAgent {
    inner: Box<dyn DecompilationAgent>,
    output: TraceOutput,
}

impl TracedAgent {
    pub fn new(inner: Box<dyn DecompilationAgent>, output: TraceOutput) -> Self {
        Self { inner, output }
    }
}

impl DecompilationAgent for TracedAgent {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn supported(&self) -> &'static [Opcode] {
        self.inner.supported()
    }

    fn handle(&self, state: &mut DecompilerState) -> Result<(), DecompileError> {
        let opcode = state.current().opcode();
        self.output.record(format!(
            "{} #{} before {}",
            opcode,
            state.index(),
            state.stack.describe()
        ));
        let result = self.inner.handle(state);
        self.output.record(format!(
            "{} #{} after {}",
            opcode,
            state.index(),
            state.stack.describe()
        ));
        result
    }
}
