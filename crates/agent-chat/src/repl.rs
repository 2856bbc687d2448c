//! Interactive chat shell
//!
//! Reads lines with history, runs each message through the agent while a
//! spinner tracks progress, then prints the answer. `/clear` resets the
//! conversation and `/exit`, Ctrl+C or Ctrl+D leave.

use std::io::{stdout, IsTerminal, Write};

use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info};

use crate::agent::{AgentError, AgentLoop, AgentOutcome, AgentStep};
use crate::app::App;
use crate::conversation::Conversation;
use crate::presentation::{self, DisplayEvent, Indicator, THINKING};
use crate::progress::{Spinner, StatusLine};

// ANSI colors
const GREEN: &str = "\x1b[92m";
const BLUE: &str = "\x1b[94m";
const CYAN: &str = "\x1b[96m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const RED: &str = "\x1b[91m";
const RESET: &str = "\x1b[0m";

/// What a line of input asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellInput {
    Empty,
    Exit,
    Clear,
    Message(String),
}

/// Classify one line. Only `/clear` and `/exit` are local commands; any
/// other text, slash-prefixed or not, goes to the model.
pub fn parse_input(line: &str) -> ShellInput {
    match line.trim() {
        "" => ShellInput::Empty,
        "/exit" => ShellInput::Exit,
        "/clear" => ShellInput::Clear,
        text => ShellInput::Message(text.to_string()),
    }
}

/// One chat session: the agent and its conversation
pub struct Session {
    agent: AgentLoop,
    conversation: Conversation,
}

impl Session {
    pub fn new(agent: AgentLoop) -> Self {
        Self {
            agent,
            conversation: Conversation::new(),
        }
    }

    #[cfg(test)]
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn clear(&mut self) {
        if self.conversation.is_empty() {
            debug!(conversation = %self.conversation.id, "Conversation already empty");
            return;
        }
        self.conversation.clear();
        debug!(conversation = %self.conversation.id, "Conversation cleared");
    }

    /// Append the user turn and run the agent to completion
    pub async fn submit(
        &mut self,
        input: &str,
        steps: UnboundedSender<AgentStep>,
    ) -> Result<AgentOutcome, AgentError> {
        self.conversation.push(llm_core::ChatMessage::user(input));
        self.agent.run(&mut self.conversation, steps).await
    }
}

/// Run the interactive shell until the user leaves
pub async fn run(app: App) -> Result<()> {
    let status = StatusLine::new();
    if !app.search_enabled() {
        status.warning("TAVILY_API_KEY not set; web search will report it is not configured");
    }

    let mut session = Session::new(app.agent());
    let mut rl = DefaultEditor::new()?;

    print_welcome(&app.config.model);

    loop {
        let prompt = format!("{}you>{} ", CYAN, RESET);

        let line = match rl.readline(&prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };

        match parse_input(&line) {
            ShellInput::Empty => continue,
            ShellInput::Exit => break,
            ShellInput::Clear => {
                session.clear();
                status.success("Conversation cleared");
            }
            ShellInput::Message(text) => {
                let _ = rl.add_history_entry(text.as_str());
                render(&presentation::user_echo(&text));

                let (tx, rx) = mpsc::unbounded_channel();
                let turn = async { tokio::join!(session.submit(&text, tx), render_steps(rx)) };

                tokio::select! {
                    (result, ()) = turn => report(result),
                    _ = tokio::signal::ctrl_c() => {
                        info!("Interrupted during request");
                        println!();
                        break;
                    }
                }
            }
        }
    }

    println!("{}Goodbye!{}", DIM, RESET);
    Ok(())
}

/// Show the spinner and final answer for one turn's steps
async fn render_steps(mut rx: UnboundedReceiver<AgentStep>) {
    let mut spinner = Spinner::new(THINKING);
    let mut indicator = Indicator::new();
    spinner.start();

    while let Some(step) = rx.recv().await {
        if let Some(text) = indicator.observe(&step) {
            spinner.set_message(text);
        }

        let events = presentation::present(&step);
        let only_tool_starts = events
            .iter()
            .all(|e| matches!(e, DisplayEvent::ToolStarted { .. }));
        if only_tool_starts {
            // Printed above the running spinner
            for event in &events {
                render(event);
            }
            continue;
        }

        spinner.stop().await;
        for event in &events {
            render(event);
        }
    }

    spinner.stop().await;
}

fn report(result: Result<AgentOutcome, AgentError>) {
    match result {
        Ok(outcome) => {
            println!(
                "{}[{} tool round(s), {} tokens]{}",
                DIM,
                outcome.tool_rounds,
                outcome.usage.total(),
                RESET
            );
        }
        Err(e) => render(&presentation::error_event(&e)),
    }
    println!();
}

/// Print one display event
pub fn render(event: &DisplayEvent) {
    match event {
        DisplayEvent::UserEcho(text) => {
            // Replace the raw input line with the formatted echo
            if stdout().is_terminal() {
                print!("\x1b[1A\x1b[2K\r");
            }
            println!("{}{}You:{} {}", BOLD, BLUE, RESET, text);
        }
        DisplayEvent::ToolStarted { label, .. } => {
            println!("\x1b[2K\r{}{}...{}", DIM, label, RESET);
        }
        DisplayEvent::AssistantReasoning(text) => {
            println!("{}Thinking{}", DIM, RESET);
            println!("{}{}{}", DIM, text, RESET);
        }
        DisplayEvent::AssistantText(text) => {
            println!("{}{}Agent:{} {}{}{}", BOLD, GREEN, RESET, GREEN, text, RESET);
        }
        DisplayEvent::Error(text) => {
            println!("{}Error:{} {}", RED, RESET, text);
        }
    }
    let _ = stdout().flush();
}

fn print_welcome(model: &str) {
    println!();
    println!("{}agent-chat{} {}({}){}", BOLD, RESET, DIM, model, RESET);
    println!(
        "{}Type a message, {}/clear{}{} to start over, {}/exit{}{} to quit.{}",
        DIM, CYAN, RESET, DIM, CYAN, RESET, DIM, RESET
    );
    println!();
}
