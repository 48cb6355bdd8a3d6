//! CLI commands
//!
//! Special commands that can be executed in the REPL.

use crate::agent::Agent;
use crate::core::Result;

/// Result of parsing a command
pub enum CommandResult {
    /// Continue processing as normal input
    Continue(String),
    /// Command was handled, show output
    Handled(String),
    /// Exit the REPL
    Exit,
}

/// Parse and handle special commands
pub async fn handle_command(input: &str, agent: &Agent) -> Result<CommandResult> {
    let input = input.trim();

    match input.to_lowercase().as_str() {
        "exit" | "quit" => Ok(CommandResult::Exit),

        "help" | "?" => Ok(CommandResult::Handled(help_text())),

        "tools" => Ok(CommandResult::Handled(tools_text(agent))),

        "config" => Ok(CommandResult::Handled(agent.config().to_toml())),

        "models" => {
            let models = agent.list_models().await?;
            Ok(CommandResult::Handled(format!(
                "Available models:\n{}\n\nCurrent: {}",
                models
                    .iter()
                    .map(|m| format!("  - {}", m))
                    .collect::<Vec<_>>()
                    .join("\n"),
                agent.config().model.name
            )))
        }

        _ => Ok(CommandResult::Continue(input.to_string())),
    }
}

fn tools_text(agent: &Agent) -> String {
    let descriptions = agent.tools().descriptions();
    if descriptions.is_empty() {
        return "No tools configured. Add [[tools]] entries to the config file.".to_string();
    }

    let mut output = String::from("Registered tools:\n");
    for tool in descriptions {
        output.push_str(&format!("  {}: {}\n", tool.name, tool.description));
    }
    output.push_str(&format!(
        "\nLimits: {} turn(s), {} tool call(s) per question",
        agent.config().agent.max_turns,
        agent.config().agent.max_tool_calls
    ));
    output
}

/// Get help text
pub fn help_text() -> String {
    r#"Commands:
  help, ?      Show this help
  tools        List registered tools and loop limits
  config       Show the effective configuration
  models       List models available in Ollama
  exit, quit   Leave

Anything else is sent to the agent as a question."#
        .to_string()
}
