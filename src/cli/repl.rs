//! Interactive REPL for stepwise
//!
//! Reads one question per line until `exit` or end of input.

use std::io::{self, BufRead, Write};

use crate::agent::{Agent, Conversation};
use crate::cli::commands::{handle_command, CommandResult};
use crate::core::{Config, Result, Role};

/// Interactive REPL (Read-Eval-Print Loop)
pub struct Repl {
    agent: Agent,
    transcript: bool,
}

impl Repl {
    /// Create a REPL with custom configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self {
            agent: Agent::with_config(config)?,
            transcript: false,
        })
    }

    /// Print the whole conversation after each answer, not only the final message
    pub fn show_transcript(mut self, enabled: bool) -> Self {
        self.transcript = enabled;
        self
    }

    /// Run the REPL
    pub async fn run(&mut self) -> Result<()> {
        self.print_banner();

        if let Err(e) = self.agent.initialize().await {
            println!("Initialization error: {}\n", e);
            return Ok(());
        }

        let stdin = io::stdin();
        let mut stdout = io::stdout();

        loop {
            print!("Enter a query: ");
            stdout.flush()?;

            let mut input = String::new();
            match stdin.lock().read_line(&mut input) {
                Ok(0) => {
                    println!();
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    eprintln!("Error reading input: {}", e);
                    continue;
                }
            }

            let input = input.trim();
            if input.is_empty() {
                continue;
            }

            match handle_command(input, &self.agent).await {
                Ok(CommandResult::Exit) => break,
                Ok(CommandResult::Handled(output)) => println!("{}\n", output),
                Ok(CommandResult::Continue(question)) => match self.agent.ask(&question).await {
                    Ok(conversation) => {
                        println!("{}\n", format_response(&conversation, self.transcript))
                    }
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        eprintln!("Please try again or type 'exit' to quit\n");
                    }
                },
                Err(e) => eprintln!("Command error: {}\n", e),
            }
        }

        Ok(())
    }

    /// Print the startup banner
    fn print_banner(&self) {
        let config = self.agent.config();
        println!("stepwise - local model/tool agent");
        println!("Ollama: {}", config.ollama_url());
        println!("Model:  {}", config.model.name);
        println!("Tools:  {}", self.agent.tools().len());
        println!("Type 'help' for commands, 'exit' to quit.\n");
    }
}

/// Format a finished conversation for the terminal
pub fn format_response(conversation: &Conversation, transcript: bool) -> String {
    if !transcript {
        return format!(
            "Response: {}",
            conversation.final_answer().unwrap_or_default()
        );
    }

    conversation
        .messages()
        .iter()
        .map(|m| match m.role {
            Role::User => format!("[user] {}", m.content),
            Role::Assistant => format!("[assistant] {}", m.content),
            Role::Tool => format!(
                "[tool:{}] {}",
                m.tool_name.as_deref().unwrap_or("?"),
                m.content
            ),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
