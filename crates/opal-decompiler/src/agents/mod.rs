//! Per-opcode decompilation agents
//!
//! Each agent owns a small family of opcodes and knows how to turn one
//! instruction of that family into tree structure. The router dispatches the
//! current instruction to the owning agent; opcodes no agent claims fall back
//! to a verbatim passthrough, so an unknown instruction degrades the output
//! instead of failing the run.

use crate::error::DecompileError;
use crate::state::DecompilerState;
use opal_bytecode::Opcode;
use rustc_hash::FxHashMap;

mod arithmetic;
mod arrays;
mod branches;
mod calls;
mod casts;
mod consts;
mod fields;
mod labels;
mod objects;
mod raw;
mod returns;
mod stack_ops;
mod traced;
mod variables;

pub use arithmetic::ArithmeticAgent;
pub use arrays::ArraysAgent;
pub use branches::BranchAgent;
pub use calls::CallsAgent;
pub use casts::CastsAgent;
pub use consts::ConstAgent;
pub use fields::FieldsAgent;
pub use labels::LabelAgent;
pub use objects::ObjectsAgent;
pub use raw::RawAgent;
pub use returns::ReturnAgent;
pub use stack_ops::StackAgent;
pub use traced::{TraceOutput, TracedAgent};
pub use variables::VariablesAgent;

/// One unit of decompilation knowledge
pub trait DecompilationAgent: Send + Sync {
    /// Agent name, for tracing
    fn name(&self) -> &'static str;

    /// The opcodes this agent claims
    fn supported(&self) -> &'static [Opcode];

    /// Process the instruction under the cursor
    fn handle(&self, state: &mut DecompilerState) -> Result<(), DecompileError>;
}

fn default_agents() -> Vec<Box<dyn DecompilationAgent>> {
    vec![
        Box::new(ConstAgent),
        Box::new(ArithmeticAgent),
        Box::new(VariablesAgent),
        Box::new(FieldsAgent),
        Box::new(ArraysAgent),
        Box::new(CastsAgent),
        Box::new(ObjectsAgent),
        Box::new(CallsAgent),
        Box::new(BranchAgent),
        Box::new(LabelAgent),
        Box::new(ReturnAgent),
        Box::new(StackAgent),
    ]
}

/// Dispatch table over the agent set
pub struct AgentRouter {
    table: FxHashMap<Opcode, usize>,
    agents: Vec<Box<dyn DecompilationAgent>>,
    fallback: RawAgent,
}

impl AgentRouter {
    /// Router with the full agent set
    pub fn new() -> Self {
        Self::with_agents(default_agents())
    }

    /// Router that routes everything to the verbatim fallback
    pub fn passthrough() -> Self {
        Self::with_agents(Vec::new())
    }

    /// Router with the full agent set, each wrapped in a tracing shim
    pub fn traced(output: TraceOutput) -> Self {
        let agents = default_agents()
            .into_iter()
            .map(|agent| Box::new(TracedAgent::new(agent, output.clone())) as Box<dyn DecompilationAgent>)
            .collect();
        Self::with_agents(agents)
    }

    pub fn with_agents(agents: Vec<Box<dyn DecompilationAgent>>) -> Self {
        let mut table = FxHashMap::default();
        for (index, agent) in agents.iter().enumerate() {
            for opcode in agent.supported() {
                table.insert(*opcode, index);
            }
        }
        Self {
            table,
            agents,
            fallback: RawAgent,
        }
    }

    /// Route the instruction under the cursor to its agent
    pub fn handle(&self, state: &mut DecompilerState) -> Result<(), DecompileError> {
        let opcode = state.current().opcode();
        match self.table.get(&opcode) {
            Some(&index) => self.agents[index].handle(state),
            None => {
                tracing::debug!(index = state.index(), %opcode, "no agent, keeping verbatim");
                self.fallback.handle(state)
            }
        }
    }

    /// Names of all claimed opcodes, sorted
    pub fn recognized(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.table.keys().map(|opcode| opcode.name()).collect();
        names.sort_unstable();
        names
    }
}

impl Default for AgentRouter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_agent_claims_disjoint_opcodes() {
        let agents = default_agents();
        let mut seen = FxHashMap::default();
        for agent in &agents {
            for opcode in agent.supported() {
                let previous = seen.insert(*opcode, agent.name());
                assert!(
                    previous.is_none(),
                    "{} claimed by both {} and {}",
                    opcode,
                    previous.unwrap(),
                    agent.name()
                );
            }
        }
    }

    #[test]
    fn router_recognizes_the_core_set() {
        let router = AgentRouter::new();
        let names = router.recognized();
        for name in ["ADD", "CONST_I32", "DUP", "INVOKE_CTOR", "IF_LT", "LABEL"] {
            assert!(names.contains(&name), "missing {name}");
        }
        // SWAP is left to the verbatim fallback on purpose
        assert!(!names.contains(&"SWAP"));
    }

    #[test]
    fn passthrough_router_recognizes_nothing() {
        assert!(AgentRouter::passthrough().recognized().is_empty());
    }
}
