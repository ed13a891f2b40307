// ============================================================================
// File: src/synthesis.rs
// Final answer generation, optionally grounded in search results
// ============================================================================

use crate::llm_client::{LanguageModel, LlmError};
use crate::models::SearchResultItem;

/// Snippets beyond this are dropped from the prompt
pub const MAX_CONTEXT_ITEMS: usize = 8;

/// Printed in place of an answer when the model call fails
pub const FALLBACK_ANSWER: &str = "Unable to generate an answer from the language model (an error occurred).";

const SYNTHESIS_INSTRUCTIONS: &str = "You are a professional research assistant. Find the factual \
information in the web search results provided and use it to answer the original question. \
Base your answer on the search results, and state at the end how many search sources you used.";

/// Numbered `[i] title: snippet (link)` lines for the first few items
pub fn build_context(items: &[SearchResultItem]) -> String {
    items
        .iter()
        .take(MAX_CONTEXT_ITEMS)
        .enumerate()
        .map(|(i, item)| format!("[{}] {}: {} ({})", i + 1, item.title, item.snippet, item.link))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn synthesis_prompt(question: &str, items: &[SearchResultItem]) -> String {
    format!(
        "{}\n\nOriginal question: {}\n\n\
         Below are the raw search results that were retrieved; produce a concise, fact-oriented answer based on them.\
         \n\n{}\n\nAnswer:",
        SYNTHESIS_INSTRUCTIONS,
        question,
        build_context(items)
    )
}

pub async fn synthesize<M>(
    model: &M,
    question: &str,
    items: &[SearchResultItem],
) -> Result<String, LlmError>
where
    M: LanguageModel + ?Sized,
{
    model.generate(&synthesis_prompt(question, items)).await
}
