//! Property-based tests for the action parser and the run state machine
//!
//! These check that, for any model output and any limits:
//! - a run stops within `max_turns` model invocations
//! - a run ends exactly once, with one final assistant message
//! - tool failures come back as `Error: ` messages and never end the run
//! - the final answer is whatever follows the last marker, trimmed

use async_trait::async_trait;
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::controller::AgentLoop;
use super::conversation::Conversation;
use super::loop_state::{Phase, RunState};
use super::parser::{ActionParser, Decision, FINAL_ANSWER_MARKER};
use crate::core::{AgentConfig, Message, ModelError, Role, ToolDescription, ToolError};
use crate::llm::ModelInvoker;
use crate::tools::{Tool, ToolRegistry};

// ============================================================================
// Generators
// ============================================================================

fn arb_decision() -> impl Strategy<Value = Decision> {
    prop_oneof![
        "[a-zA-Z0-9 $.]{0,30}".prop_map(Decision::FinalAnswer),
        "[A-Z]{1,5}".prop_map(|argument| Decision::ToolCall {
            name: "StockData".to_string(),
            argument,
        }),
        "[a-z ]{0,30}".prop_map(Decision::Unrecognized),
    ]
}

/// Raw model text that parses to the given decision
fn raw_text(decision: &Decision) -> String {
    match decision {
        Decision::FinalAnswer(answer) => format!("{} {}", FINAL_ANSWER_MARKER, answer),
        Decision::ToolCall { name, argument } => format!("{}({})", name, argument),
        Decision::Unrecognized(text) => text.clone(),
    }
}

fn arb_model_reply() -> impl Strategy<Value = String> {
    prop_oneof![
        "[A-Z]{1,5}".prop_map(|symbol| format!("StockData({})", symbol)),
        "[A-Z]{1,5}".prop_map(|symbol| format!("Thought: check\nStockData({})", symbol)),
        "[a-zA-Z0-9 ]{0,20}".prop_map(|answer| format!("Final Answer: {}", answer)),
        "[a-zA-Z() ]{0,30}",
    ]
}

// ============================================================================
// Helpers
// ============================================================================

/// Drive a state the way the controller does, with scripted decisions and
/// tool outcomes. Returns the finished state and the number of model turns.
fn drive(
    decisions: &[Decision],
    tool_failures: &[bool],
    max_turns: usize,
    max_tool_calls: usize,
) -> (RunState, usize) {
    let mut state = RunState::new("question");
    let mut invocations = 0;
    let mut dispatches = 0;

    loop {
        state = match state.phase().clone() {
            Phase::Done => break,
            Phase::AwaitingModel => {
                let state = state.enforce_turn_limit(max_turns);
                if state.is_done() {
                    state
                } else {
                    let decision = decisions[invocations % decisions.len()].clone();
                    invocations += 1;
                    state.on_model_output(&raw_text(&decision), decision, max_tool_calls)
                }
            }
            Phase::AwaitingTool { name, argument } => {
                let failed = tool_failures[dispatches % tool_failures.len()];
                dispatches += 1;
                let content = if failed {
                    format!("Error: {}", ToolError::Timeout(1))
                } else {
                    format!("Price of {}: $5", argument)
                };
                state.on_tool_result(Message::tool(name, content))
            }
        };
    }

    (state, invocations)
}

/// Every assistant message except the last one must be a tool-call echo
fn ends_exactly_once(conversation: &Conversation) -> bool {
    let messages = conversation.messages();
    let Some(last) = messages.last() else {
        return false;
    };
    if last.role != Role::Assistant {
        return false;
    }

    messages[..messages.len() - 1]
        .windows(2)
        .all(|pair| pair[0].role != Role::Assistant || pair[1].role == Role::Tool)
}

/// Model that replays its script in a loop
struct CyclingModel {
    replies: Vec<String>,
    calls: AtomicUsize,
}

#[async_trait]
impl ModelInvoker for CyclingModel {
    async fn invoke(
        &self,
        _conversation: &Conversation,
        _tools: &[ToolDescription],
    ) -> Result<String, ModelError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.replies[n % self.replies.len()].clone())
    }

    fn name(&self) -> &str {
        "cycling"
    }
}

/// Tool that fails on the calls marked in its script
struct FlakyTool {
    failures: Vec<bool>,
    calls: Mutex<usize>,
}

#[async_trait]
impl Tool for FlakyTool {
    fn name(&self) -> &str {
        "StockData"
    }

    fn description(&self) -> &str {
        "Stock quote"
    }

    async fn invoke(&self, argument: &str) -> Result<String, ToolError> {
        let mut calls = self.calls.lock().unwrap();
        let failed = self.failures[*calls % self.failures.len()];
        *calls += 1;
        if failed {
            Err(ToolError::upstream(503, "busy"))
        } else {
            Ok(format!("Price of {}: $5", argument))
        }
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn prop_final_answer_is_trimmed_tail(answer in any::<String>()) {
        prop_assume!(!answer.contains(FINAL_ANSWER_MARKER));
        let parser = ActionParser::new(["StockData"]);

        prop_assert_eq!(
            parser.parse(&format!("{}{} ", FINAL_ANSWER_MARKER, answer)),
            Decision::FinalAnswer(answer.trim().to_string())
        );
    }

    #[test]
    fn prop_last_final_answer_marker_wins(prefix in any::<String>(), answer in any::<String>()) {
        prop_assume!(!answer.contains(FINAL_ANSWER_MARKER));
        let parser = ActionParser::new(["StockData"]);

        prop_assert_eq!(
            parser.parse(&format!("{}{}{}", prefix, FINAL_ANSWER_MARKER, answer)),
            Decision::FinalAnswer(answer.trim().to_string())
        );
    }

    #[test]
    fn prop_tool_argument_is_verbatim(argument in "[^()\n]*") {
        prop_assume!(!argument.contains(FINAL_ANSWER_MARKER));
        let parser = ActionParser::new(["StockData"]);

        prop_assert_eq!(
            parser.parse(&format!("StockData({})", argument)),
            Decision::ToolCall { name: "StockData".to_string(), argument }
        );
    }

    #[test]
    fn prop_parse_only_names_registered_tools(text in any::<String>()) {
        let parser = ActionParser::new(["StockData", "Search"]);

        if let Decision::ToolCall { name, .. } = parser.parse(&text) {
            prop_assert!(name == "StockData" || name == "Search");
        }
    }

    #[test]
    fn prop_run_state_terminates_within_turn_limit(
        decisions in proptest::collection::vec(arb_decision(), 1..8),
        tool_failures in proptest::collection::vec(any::<bool>(), 1..4),
        max_turns in 0usize..8,
        max_tool_calls in 0usize..5,
    ) {
        let (state, invocations) = drive(&decisions, &tool_failures, max_turns, max_tool_calls);

        prop_assert!(state.is_done());
        prop_assert!(state.outcome().is_some());
        prop_assert!(invocations <= max_turns);
        prop_assert_eq!(state.turns_taken(), invocations);
        prop_assert!(state.tool_calls_made() <= max_tool_calls);
        prop_assert!(ends_exactly_once(state.conversation()));
    }

    #[test]
    fn prop_done_state_ignores_further_transitions(
        decisions in proptest::collection::vec(arb_decision(), 1..8),
        extra in proptest::collection::vec(arb_decision(), 0..4),
        max_turns in 1usize..6,
    ) {
        let (state, _) = drive(&decisions, &[false], max_turns, 2);
        let finished = state.conversation().clone();
        let outcome = state.outcome();

        let mut state = state;
        for decision in extra {
            state = state
                .enforce_turn_limit(0)
                .on_model_output(&raw_text(&decision), decision, usize::MAX)
                .on_tool_result(Message::tool("StockData", "late"));
        }

        prop_assert_eq!(state.conversation(), &finished);
        prop_assert_eq!(state.outcome(), outcome);
    }

    #[test]
    fn prop_tool_failures_stay_in_conversation(
        decisions in proptest::collection::vec(arb_decision(), 1..8),
        tool_failures in proptest::collection::vec(any::<bool>(), 1..4),
        max_turns in 1usize..8,
    ) {
        let (state, _) = drive(&decisions, &tool_failures, max_turns, usize::MAX);

        // Every dispatched call left exactly one tool message behind
        let tool_messages: Vec<_> = state
            .conversation()
            .messages()
            .iter()
            .filter(|m| m.role == Role::Tool)
            .collect();
        prop_assert_eq!(tool_messages.len(), state.tool_calls_made());
        for message in tool_messages {
            prop_assert!(message.is_tool_error() || message.content.starts_with("Price of"));
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_agent_loop_never_raises_tool_failures(
        replies in proptest::collection::vec(arb_model_reply(), 1..6),
        failures in proptest::collection::vec(any::<bool>(), 1..4),
        max_turns in 1usize..6,
        max_tool_calls in 0usize..4,
    ) {
        let model = Arc::new(CyclingModel { replies, calls: AtomicUsize::new(0) });
        let mut registry = ToolRegistry::new();
        registry.register(FlakyTool { failures, calls: Mutex::new(0) }).unwrap();
        let config = AgentConfig { max_turns, max_tool_calls, ..AgentConfig::default() };

        let agent_loop = AgentLoop::new(model.clone(), Arc::new(registry), config);
        let conversation = tokio_test::block_on(agent_loop.run("What is AAPL at?")).unwrap();

        prop_assert!(model.calls.load(Ordering::SeqCst) <= max_turns);
        prop_assert!(ends_exactly_once(&conversation));
        for message in conversation.messages().iter().filter(|m| m.role == Role::Tool) {
            prop_assert!(
                message.is_tool_error() || message.content.starts_with("Price of"),
                "unexpected tool message: {}",
                message.content
            );
        }
    }
}
