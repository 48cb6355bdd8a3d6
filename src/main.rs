//! stepwise - bounded model/tool agent for local language models
//!
//! Main entry point for the CLI application.

use clap::Parser;
use std::path::PathBuf;
use stepwise::{format_response, Agent, Config, Repl};

/// stepwise - bounded model/tool agent for local language models
#[derive(Parser, Debug)]
#[command(name = "stepwise")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file (default: ~/.config/stepwise/config.toml)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Ollama model to use
    #[arg(long, short = 'm')]
    model: Option<String>,

    /// Maximum model turns per question
    #[arg(long)]
    max_turns: Option<usize>,

    /// Maximum tool calls per question
    #[arg(long)]
    max_tool_calls: Option<usize>,

    /// Enable debug output (prompts and raw model replies)
    #[arg(long, short = 'd')]
    debug: bool,

    /// Print the whole conversation instead of only the answer
    #[arg(long, short = 't')]
    transcript: bool,

    /// Print the default configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Write the default configuration to the config file and exit
    #[arg(long)]
    init_config: bool,

    /// Single prompt mode (non-interactive)
    #[arg(long, short = 'p')]
    prompt: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_config {
        println!("{}", Config::default_config_toml());
        return Ok(());
    }

    if args.init_config {
        let path = args.config.clone().unwrap_or_else(Config::config_file);
        if path.exists() {
            anyhow::bail!("{} already exists", path.display());
        }
        Config::default().save_to_path(&path)?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(());
    }

    // Build configuration
    let mut config = Config::load(args.config.as_deref())?;

    // Apply CLI overrides
    if let Some(model) = args.model {
        config.model.name = model;
    }
    if let Some(max_turns) = args.max_turns {
        config.agent.max_turns = max_turns;
    }
    if let Some(max_tool_calls) = args.max_tool_calls {
        config.agent.max_tool_calls = max_tool_calls;
    }
    if args.debug {
        config.agent.debug = true;
    }

    let filter = if config.agent.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Single prompt mode
    if let Some(prompt) = args.prompt {
        let agent = Agent::with_config(config)?;
        agent.initialize().await?;

        let conversation = agent.ask(&prompt).await?;
        println!("{}", format_response(&conversation, args.transcript));
        return Ok(());
    }

    // Interactive REPL mode
    let mut repl = Repl::with_config(config)?.show_transcript(args.transcript);
    repl.run().await?;

    Ok(())
}
