//! Request intent classification
//!
//! A single few-shot completion labels a request as a multi step task,
//! information retrieval or a single task.

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use llm_core::{ChatMessage, ChatProvider, ChatRequest};
use tracing::{debug, instrument};

/// Request category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    MultiStepTask,
    InformationRetrieval,
    SingleTask,
}

impl Intent {
    pub fn label(&self) -> &'static str {
        match self {
            Intent::MultiStepTask => "multi step task",
            Intent::InformationRetrieval => "information retrieval",
            Intent::SingleTask => "single task",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Intent {
    type Err = anyhow::Error;

    /// Accepts the bare label, case-insensitively, with an optional
    /// `Output:` prefix and surrounding quotes or punctuation
    fn from_str(s: &str) -> Result<Self> {
        let mut text = s.trim();
        if let Some(prefix) = text.get(..7) {
            if prefix.eq_ignore_ascii_case("output:") {
                text = &text[7..];
            }
        }
        let normalized = text
            .trim_matches(|c: char| c.is_whitespace() || c.is_ascii_punctuation())
            .to_lowercase()
            .replace(['-', '_'], " ");

        match normalized.as_str() {
            "multi step task" => Ok(Intent::MultiStepTask),
            "information retrieval" => Ok(Intent::InformationRetrieval),
            "single task" => Ok(Intent::SingleTask),
            _ => bail!("unrecognized intent label: {:?}", s.trim()),
        }
    }
}

/// Labelled requests, used both as few-shot examples and for evaluation
pub const EXAMPLES: [(&str, Intent); 12] = [
    (
        "Extract all the requirements from this file and then check how to handle them in my library.",
        Intent::MultiStepTask,
    ),
    ("What is the capital of Belgium?", Intent::InformationRetrieval),
    ("Summarize this paragraph.", Intent::SingleTask),
    (
        "Generate 5 slides, then add icons and diagrams after writing the text.",
        Intent::MultiStepTask,
    ),
    ("List all HTTP status codes with their meaning.", Intent::InformationRetrieval),
    ("Translate this sentence into French.", Intent::SingleTask),
    (
        "Pull the sales data for Q2, then create a chart comparing it with Q1.",
        Intent::MultiStepTask,
    ),
    ("Who won the FIFA World Cup in 2018?", Intent::InformationRetrieval),
    ("Resize this image to 512x512.", Intent::SingleTask),
    (
        "Search for all .pdf files in my drive, extract the titles, and compile them into a list.",
        Intent::MultiStepTask,
    ),
    ("Define polymorphism in object-oriented programming.", Intent::InformationRetrieval),
    ("Delete row 3 from this spreadsheet.", Intent::SingleTask),
];

const INSTRUCTIONS: &str = "You are a text classification model.
Your only task is to classify a user request into one of three categories:

- multi step task → requests that require a sequence of actions or planning.
- information retrieval → requests that primarily ask for facts, data, or knowledge.
- single task → requests that can be done in one direct step without planning.

Rules:
- Output only the category name. No explanation, no extra text.
- Never invent categories beyond the three given.
- If uncertain, choose the closest match.

Examples:
";

/// Instructions followed by every labelled example
pub fn system_prompt() -> String {
    let mut prompt = INSTRUCTIONS.to_string();
    for &(input, intent) in EXAMPLES.iter() {
        prompt.push_str(&format!("User: \"{}\"\nOutput: {}\n\n", input, intent));
    }
    prompt
}

/// Ask the model for the intent of `input`
#[instrument(skip(provider, input), fields(input_len = input.len()))]
pub async fn classify(provider: &dyn ChatProvider, model: &str, input: &str) -> Result<Intent> {
    let request = ChatRequest::new(
        model,
        vec![ChatMessage::system(system_prompt()), ChatMessage::user(input)],
    );

    let response = provider
        .complete(&request)
        .await
        .context("Classification request failed")?;
    let answer = response.message.text();
    debug!(answer = %answer, "Classifier replied");

    answer.parse()
}

/// Outcome of one labelled example
#[derive(Debug)]
pub struct EvalCase {
    pub input: &'static str,
    pub expected: Intent,
    /// Parsed prediction, or the error text
    pub predicted: std::result::Result<Intent, String>,
    pub elapsed: Duration,
}

impl EvalCase {
    pub fn passed(&self) -> bool {
        self.predicted.as_ref().ok() == Some(&self.expected)
    }
}

/// Classify every labelled example in order
pub async fn evaluate(provider: &dyn ChatProvider, model: &str) -> Vec<EvalCase> {
    let mut cases = Vec::with_capacity(EXAMPLES.len());
    for &(input, expected) in EXAMPLES.iter() {
        let start = Instant::now();
        let predicted = classify(provider, model, input)
            .await
            .map_err(|e| format!("{:#}", e));
        cases.push(EvalCase {
            input,
            expected,
            predicted,
            elapsed: start.elapsed(),
        });
    }
    cases
}

/// Fraction of cases classified correctly
pub fn accuracy(cases: &[EvalCase]) -> f64 {
    if cases.is_empty() {
        return 0.0;
    }
    cases.iter().filter(|c| c.passed()).count() as f64 / cases.len() as f64
}
