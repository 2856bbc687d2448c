//! agent-chat: terminal chat agent with tool use
//!
//! Talks to an OpenAI-compatible model that can call a calculator, a clock
//! and web search while answering.

mod agent;
mod app;
mod classify;
mod commands;
mod conversation;
mod presentation;
mod progress;
mod repl;
mod server;
mod tools;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use llm_core::Config;
use tracing_subscriber::EnvFilter;

use crate::app::App;

#[derive(Debug, Parser)]
#[command(name = "agent-chat")]
#[command(about = "Chat with a tool-using LLM agent", version)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Start the interactive chat shell (default)
    Chat,

    /// One-shot question answered by the agent
    Ask {
        /// The prompt to send (read from stdin when omitted)
        prompt: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Classify a request as multi step task, information retrieval or single task
    Classify {
        /// Text to classify (read from stdin when omitted)
        text: Vec<String>,

        /// Score the built-in labelled examples instead
        #[arg(long)]
        eval: bool,
    },

    /// Serve the static web front end
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "PORT", default_value_t = 3000)]
        port: u16,

        /// Directory to serve
        #[arg(short, long, default_value = "public")]
        dir: PathBuf,
    },
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load();

    match cli.command {
        Some(Commands::Serve { port, dir }) => commands::serve(port, dir).await,
        Some(Commands::Ask { prompt, json }) => {
            commands::ask(App::from_config(config)?, prompt, json).await
        }
        Some(Commands::Classify { text, eval }) => {
            commands::classify(App::from_config(config)?, text, eval).await
        }
        Some(Commands::Chat) | None => repl::run(App::from_config(config)?).await,
    }
}
