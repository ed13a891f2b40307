// ============================================================================
// File: src/decision.rs
// Asks the model whether a question needs a web search
// ============================================================================

use serde_json::Value;
use thiserror::Error;

use crate::llm_client::{LanguageModel, LlmError};
use crate::models::Decision;

const DECISION_INSTRUCTIONS: &str = "You are an assistant that decides whether answering a question \
requires a web search. Reply with JSON only, in the form {\"need_search\": true|false, \"query\": \"...\"}. \
If no search is needed, set need_search to false and use an empty string for query.";

/// Neither the whole reply nor its outermost braces parsed as a decision
#[derive(Debug, Error, PartialEq, Eq)]
#[error("no decision JSON found in model output: {snippet}")]
pub struct DecisionParseError {
    snippet: String,
}

#[derive(Debug, Error)]
pub enum DecisionError {
    #[error(transparent)]
    Model(#[from] LlmError),

    #[error(transparent)]
    Parse(#[from] DecisionParseError),
}

pub fn decision_prompt(question: &str) -> String {
    format!(
        "{}\n\nQuestion: {}\n\nReply with the JSON described above.",
        DECISION_INSTRUCTIONS, question
    )
}

/// Parse model output into a decision.
///
/// The trimmed text is tried as JSON first. Failing that, the span from the
/// first `{` to the last `}` is tried, which recovers objects wrapped in prose
/// or code fences.
pub fn parse_decision(text: &str) -> Result<Decision, DecisionParseError> {
    let text = text.trim();

    if let Some(decision) = parse_object(text) {
        return Ok(decision);
    }

    if let Some(decision) = outermost_braces(text).and_then(parse_object) {
        return Ok(decision);
    }

    Err(DecisionParseError {
        snippet: text.chars().take(120).collect(),
    })
}

// Only a JSON object counts; serde would otherwise accept `[true, "q"]` as a struct.
fn parse_object(text: &str) -> Option<Decision> {
    match serde_json::from_str::<Value>(text).ok()? {
        object @ Value::Object(_) => serde_json::from_value(object).ok(),
        _ => None,
    }
}

fn outermost_braces(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// One model call; the caller picks the fallback
pub async fn decide<M>(model: &M, question: &str) -> Result<Decision, DecisionError>
where
    M: LanguageModel + ?Sized,
{
    let reply = model.generate(&decision_prompt(question)).await?;
    Ok(parse_decision(&reply)?)
}
