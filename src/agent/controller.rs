//! Loop controller
//!
//! Drives a [`RunState`] from the user's question to its final message:
//! model turn, parse, optional tool dispatch, repeat. The turn limit is
//! checked before every model invocation, so a run always terminates no
//! matter what the model says.

use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::agent::conversation::Conversation;
use crate::agent::dispatcher::ToolDispatcher;
use crate::agent::loop_state::{Outcome, Phase, RunState};
use crate::agent::parser::ActionParser;
use crate::core::{AgentConfig, RunError};
use crate::llm::ModelInvoker;
use crate::tools::ToolRegistry;

/// The bounded model/tool loop
pub struct AgentLoop {
    model: Arc<dyn ModelInvoker>,
    tools: Arc<ToolRegistry>,
    config: AgentConfig,
    parser: ActionParser,
}

impl AgentLoop {
    /// Create a loop over the given model and tools
    pub fn new(model: Arc<dyn ModelInvoker>, tools: Arc<ToolRegistry>, config: AgentConfig) -> Self {
        let parser = ActionParser::new(tools.names());
        Self {
            model,
            tools,
            config,
            parser,
        }
    }

    /// Loop limits in effect
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Registered tools
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Answer one question.
    ///
    /// Returns the full conversation, which always ends with exactly one
    /// final assistant message. Only a model failure is an error; the
    /// conversation up to that point travels inside the [`RunError`].
    pub async fn run(&self, user_query: &str) -> Result<Conversation, RunError> {
        let descriptions = self.tools.descriptions();
        let dispatcher = ToolDispatcher::new(&self.tools);
        let mut state = RunState::new(user_query);

        info!(
            model = self.model.name(),
            max_turns = self.config.max_turns,
            max_tool_calls = self.config.max_tool_calls,
            "Starting agent loop"
        );

        loop {
            state = match state.phase() {
                Phase::Done => break,
                Phase::AwaitingModel => {
                    let state = state.enforce_turn_limit(self.config.max_turns);
                    if state.is_done() {
                        warn!(turns = state.turns_taken(), "Turn limit reached");
                        state
                    } else {
                        debug!(turn = state.turns_taken() + 1, "Invoking model");
                        let raw = match self.model.invoke(state.conversation(), &descriptions).await {
                            Ok(raw) => raw,
                            Err(e) => {
                                error!(error = %e, "Model invocation failed");
                                return Err(RunError::new(state.into_conversation(), e));
                            }
                        };

                        let decision = self.parser.parse(&raw);
                        debug!(decision = decision.kind(), "Model output:\n{}", raw);
                        state.on_model_output(&raw, decision, self.config.max_tool_calls)
                    }
                }
                Phase::AwaitingTool { name, argument } => {
                    let message = dispatcher.dispatch(name, argument).await;
                    state.on_tool_result(message)
                }
            };
        }

        match state.outcome() {
            Some(Outcome::ToolBudgetExhausted) => {
                warn!(max_tool_calls = self.config.max_tool_calls, "Tool budget exhausted")
            }
            Some(Outcome::Unrecognized) => debug!("Model output not understood, using fallback"),
            _ => {}
        }

        info!(
            turns = state.turns_taken(),
            tool_calls = state.tool_calls_made(),
            outcome = %state.outcome().unwrap_or(Outcome::Answered),
            "Agent loop complete"
        );

        Ok(state.into_conversation())
    }
}

/// Run one question through a freshly built loop
pub async fn run(
    user_query: &str,
    model: Arc<dyn ModelInvoker>,
    registry: Arc<ToolRegistry>,
    config: AgentConfig,
) -> Result<Conversation, RunError> {
    AgentLoop::new(model, registry, config).run(user_query).await
}
