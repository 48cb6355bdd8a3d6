//! Agent loop state management
//!
//! [`RunState`] is the whole state of one run. Each transition consumes the
//! state and returns the next one; once the phase is [`Phase::Done`] every
//! transition is a no-op, so nothing can be appended after the final message.

use crate::agent::conversation::Conversation;
use crate::agent::parser::Decision;
use crate::core::{Message, Role};

/// Reply used when the model output cannot be understood
pub const FALLBACK_ANSWER: &str = "I cannot help with that request.";

/// Where the loop is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Next step is a model invocation
    AwaitingModel,
    /// Next step is dispatching this tool call
    AwaitingTool { name: String, argument: String },
    /// Terminal; the conversation ends with its final message
    Done,
}

/// Why a run finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The model gave a final answer
    Answered,
    /// The model output matched no action; the fallback reply was used
    Unrecognized,
    /// The model asked for a tool after `max_tool_calls` was spent
    ToolBudgetExhausted,
    /// `max_turns` was reached
    TurnLimitReached,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Answered => write!(f, "answered"),
            Outcome::Unrecognized => write!(f, "unrecognized"),
            Outcome::ToolBudgetExhausted => write!(f, "tool_budget_exhausted"),
            Outcome::TurnLimitReached => write!(f, "turn_limit_reached"),
        }
    }
}

/// State of one run of the agent loop
#[derive(Debug, Clone)]
pub struct RunState {
    conversation: Conversation,
    turns_taken: usize,
    tool_calls_made: usize,
    phase: Phase,
    outcome: Option<Outcome>,
}

impl RunState {
    /// Start a run for the given question
    pub fn new(user_query: impl Into<String>) -> Self {
        let mut conversation = Conversation::new();
        conversation.append(Message::user(user_query));

        Self {
            conversation,
            turns_taken: 0,
            tool_calls_made: 0,
            phase: Phase::AwaitingModel,
            outcome: None,
        }
    }

    /// Stop with a diagnostic if the turn budget is spent.
    ///
    /// Must be applied before every model invocation.
    pub fn enforce_turn_limit(self, max_turns: usize) -> Self {
        if self.phase != Phase::AwaitingModel || self.turns_taken < max_turns {
            return self;
        }

        let mut text = format!(
            "Stopped after {} turn(s) without reaching a final answer.",
            self.turns_taken
        );
        if let Some(result) = self.last_tool_result() {
            text.push_str("\nLast tool result:\n");
            text.push_str(result);
        }
        self.finish(text, Outcome::TurnLimitReached)
    }

    /// Apply the parsed model reply
    pub fn on_model_output(mut self, raw: &str, decision: Decision, max_tool_calls: usize) -> Self {
        if self.phase != Phase::AwaitingModel {
            return self;
        }
        self.turns_taken += 1;

        match decision {
            Decision::FinalAnswer(answer) => self.finish(answer, Outcome::Answered),
            Decision::Unrecognized(_) => self.finish(FALLBACK_ANSWER, Outcome::Unrecognized),
            Decision::ToolCall { name, argument } if self.tool_calls_made < max_tool_calls => {
                self.conversation.append(Message::assistant(raw));
                self.phase = Phase::AwaitingTool { name, argument };
                self
            }
            Decision::ToolCall { .. } => {
                let mut text = format!("Tool budget of {} call(s) is spent.", max_tool_calls);
                match self.last_tool_result() {
                    Some(result) => {
                        text.push_str(" Last tool result:\n");
                        text.push_str(result);
                    }
                    None => text.push_str(" No tool result is available."),
                }
                self.finish(text, Outcome::ToolBudgetExhausted)
            }
        }
    }

    /// Record the result of the pending tool call
    pub fn on_tool_result(mut self, message: Message) -> Self {
        if !matches!(self.phase, Phase::AwaitingTool { .. }) {
            return self;
        }

        self.conversation.append(message);
        self.tool_calls_made += 1;
        self.phase = Phase::AwaitingModel;
        self
    }

    fn finish(mut self, text: impl Into<String>, outcome: Outcome) -> Self {
        self.conversation.append(Message::assistant(text));
        self.phase = Phase::Done;
        self.outcome = Some(outcome);
        self
    }

    fn last_tool_result(&self) -> Option<&str> {
        self.conversation
            .last(Role::Tool)
            .map(|m| m.content.as_str())
    }

    /// Current phase
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Whether the run has finished
    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    /// Why the run finished, once it has
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Model invocations so far
    pub fn turns_taken(&self) -> usize {
        self.turns_taken
    }

    /// Tool dispatches so far
    pub fn tool_calls_made(&self) -> usize {
        self.tool_calls_made
    }

    /// Conversation so far
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Take the conversation, ending the state
    pub fn into_conversation(self) -> Conversation {
        self.conversation
    }
}
