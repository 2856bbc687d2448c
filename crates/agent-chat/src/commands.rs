//! Non-interactive subcommands

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tokio::sync::mpsc;

use crate::agent::AgentStep;
use crate::app::App;
use crate::classify::{self, Intent};
use crate::conversation::Conversation;
use crate::presentation::{self, DisplayEvent};
use crate::progress::StatusLine;
use crate::server;

// ANSI color codes
const GREEN: &str = "\x1b[92m";
const RED: &str = "\x1b[91m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

/// Join argument words, or read stdin when none were given and it is piped
fn prompt_from(words: Vec<String>) -> Result<String> {
    let mut prompt = words.join(" ");
    if prompt.trim().is_empty() && !io::stdin().is_terminal() {
        io::stdin()
            .read_to_string(&mut prompt)
            .context("Failed to read prompt from stdin")?;
    }
    Ok(prompt.trim().to_string())
}

/// Run one user turn through the agent and print the answer
pub async fn ask(app: App, words: Vec<String>, json_output: bool) -> Result<()> {
    let prompt = prompt_from(words)?;
    if prompt.is_empty() {
        bail!("No prompt given. Usage: agent-chat ask <prompt>");
    }

    let agent = app.agent();
    let mut conversation = Conversation::new();
    conversation.push(llm_core::ChatMessage::user(prompt));

    let (tx, mut rx) = mpsc::unbounded_channel();
    let outcome = agent.run(&mut conversation, tx).await?;

    let mut tools = Vec::new();
    while let Some(step) = rx.recv().await {
        if let AgentStep::ToolFinished { tool, .. } = step {
            tools.push(tool);
        }
    }

    if json_output {
        let output = serde_json::json!({
            "model": app.config.model,
            "response": outcome.message.text(),
            "tools": tools,
            "tool_rounds": outcome.tool_rounds,
            "prompt_tokens": outcome.usage.prompt_tokens,
            "completion_tokens": outcome.usage.completion_tokens,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    for event in presentation::present(&AgentStep::ModelResponded(outcome.message)) {
        match event {
            DisplayEvent::AssistantReasoning(text) => eprintln!("{}{}{}", DIM, text, RESET),
            DisplayEvent::AssistantText(text) => println!("{}", text),
            _ => {}
        }
    }

    Ok(())
}

/// Label one request, or score the labelled examples with `eval`
pub async fn classify(app: App, words: Vec<String>, eval: bool) -> Result<()> {
    let provider = app.provider();
    let model = app.config.model.as_str();

    if !eval {
        let input = prompt_from(words)?;
        if input.is_empty() {
            bail!("No text given. Usage: agent-chat classify <text> or --eval");
        }
        let intent: Intent = classify::classify(provider.as_ref(), model, &input).await?;
        println!("{}", intent);
        return Ok(());
    }

    let cases = classify::evaluate(provider.as_ref(), model).await;
    for case in &cases {
        let (mark, predicted) = match &case.predicted {
            Ok(intent) if case.passed() => (format!("{}✓{}", GREEN, RESET), intent.to_string()),
            Ok(intent) => (format!("{}✗{}", RED, RESET), intent.to_string()),
            Err(e) => (format!("{}✗{}", RED, RESET), e.clone()),
        };
        println!(
            "{} {} {}-> {} (expected {}, {:.2}s){}",
            mark,
            case.input,
            DIM,
            predicted,
            case.expected,
            case.elapsed.as_secs_f64(),
            RESET
        );
    }

    let passed = cases.iter().filter(|c| c.passed()).count();
    let summary = format!(
        "Accuracy: {}/{} ({:.0}%)",
        passed,
        cases.len(),
        classify::accuracy(&cases) * 100.0
    );
    println!();
    let status = StatusLine::new();
    match passed {
        0 => status.error(summary),
        n if n == cases.len() => status.success(summary),
        _ => status.warning(summary),
    }
    Ok(())
}

/// Serve the static front end
pub async fn serve(port: u16, dir: PathBuf) -> Result<()> {
    server::serve(port, dir).await
}
