//! Agent module - the bounded model/tool loop
//!
//! Conversation log, action parser, tool dispatcher, run state machine and
//! the controller that drives them.

pub mod controller;
pub mod conversation;
pub mod dispatcher;
pub mod loop_state;
pub mod orchestrator;
pub mod parser;

#[cfg(test)]
mod proptests;

pub use controller::{run, AgentLoop};
pub use conversation::Conversation;
pub use dispatcher::{ToolDispatcher, TOOL_NOT_FOUND};
pub use loop_state::{Outcome, Phase, RunState, FALLBACK_ANSWER};
pub use orchestrator::Agent;
pub use parser::{ActionParser, Decision, FINAL_ANSWER_MARKER};
