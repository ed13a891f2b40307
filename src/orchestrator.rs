// ============================================================================
// File: src/orchestrator.rs
// Interactive question loop: decide, optionally search, then answer
// ============================================================================

use std::io::Write;
use std::time::{Duration, Instant};

use anyhow::Result;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

use crate::decision::{decide, DecisionError};
use crate::llm_client::LanguageModel;
use crate::models::{Decision, SearchResultItem};
use crate::search_client::WebSearch;
use crate::synthesis::{synthesize, FALLBACK_ANSWER, MAX_CONTEXT_ITEMS};

/// Outcome of one question
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub decision: Decision,
    /// A search request actually went out
    pub searched: bool,
    pub items: Vec<SearchResultItem>,
    pub answer: String,
}

pub struct Agent<M, S> {
    model: M,
    search: Option<S>,
    num_results: u8,
    verbose: bool,
}

impl<M, S> Agent<M, S>
where
    M: LanguageModel,
    S: WebSearch,
{
    /// `search` is `None` when search credentials are missing
    pub fn new(model: M, search: Option<S>, num_results: u8, verbose: bool) -> Self {
        Self {
            model,
            search,
            num_results,
            verbose,
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn search_client(&self) -> Option<&S> {
        self.search.as_ref()
    }

    /// Read questions line by line until exit, quit or end of input
    pub async fn run<R, W>(&self, mut input: R, out: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        self.print_header(out)?;

        let mut buf = Vec::new();
        loop {
            write!(out, "{} ", "You:".green().bold())?;
            out.flush()?;

            buf.clear();
            if input.read_until(b'\n', &mut buf).await? == 0 {
                writeln!(out)?;
                break;
            }

            // Invalid UTF-8 in pasted text is replaced, not fatal.
            let raw = String::from_utf8_lossy(&buf);
            let line = raw.trim_end_matches(['\n', '\r']);

            if is_exit_command(line) {
                writeln!(out, "Goodbye")?;
                break;
            }
            if line.trim().is_empty() {
                continue;
            }

            let start = Instant::now();
            let turn = self.answer(line, out).await?;
            self.display_answer(&turn, start.elapsed(), out)?;
        }

        Ok(())
    }

    /// Process one question end to end. Provider failures never surface
    /// here; only writing to `out` can fail.
    pub async fn answer<W: Write>(&self, question: &str, out: &mut W) -> Result<Turn> {
        let spinner = Self::create_spinner("Deciding whether to search...");
        let decision = match decide(&self.model, question).await {
            Ok(decision) => decision,
            Err(DecisionError::Parse(e)) => {
                debug!(error = %e, "unparsable decision, answering without search");
                Decision::default()
            }
            Err(DecisionError::Model(e)) => {
                warn!(error = %e, "decision call failed, answering without search");
                Decision::default()
            }
        };
        spinner.finish_and_clear();

        if self.verbose {
            writeln!(
                out,
                "  {} decision: {}",
                "→".yellow(),
                serde_json::to_string(&decision).unwrap_or_default().bright_black()
            )?;
        }

        let query = decision.query.trim();
        let wants_search = decision.need_search && !query.is_empty();

        let mut searched = false;
        let mut items = Vec::new();

        match &self.search {
            Some(search) if wants_search => {
                writeln!(out, "{} Searching the web for: {}", "►".yellow().bold(), query.cyan())?;
                searched = true;

                let spinner = Self::create_spinner("Searching...");
                match search.search(query, self.num_results).await {
                    Ok(found) => items = found,
                    Err(e) => warn!(error = %e, query, "web search failed"),
                }
                spinner.finish_and_clear();

                if items.is_empty() {
                    writeln!(
                        out,
                        "{} Search returned no results or failed, answering without search results",
                        "⚠".yellow()
                    )?;
                }
            }
            None if wants_search => {
                writeln!(
                    out,
                    "{} Search would help but is not configured, answering directly...",
                    "⚠".yellow()
                )?;
            }
            _ => {
                writeln!(out, "{} No search needed, answering directly...", "●".bright_cyan())?;
            }
        }

        let spinner = Self::create_spinner("Writing answer...");
        let answer = match synthesize(&self.model, question, &items).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!(error = %e, "answer generation failed");
                FALLBACK_ANSWER.to_string()
            }
        };
        spinner.finish_and_clear();

        Ok(Turn {
            decision,
            searched,
            items,
            answer,
        })
    }

    fn print_header<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "{}", "═══════════════════════════════════════".bright_blue())?;
        writeln!(out, "{}", "      ASKWEB: search-grounded answers".bright_white().bold())?;
        writeln!(out, "{}", "═══════════════════════════════════════".bright_blue())?;
        if self.search.is_none() {
            writeln!(
                out,
                "{} Custom Search API key or engine id not found; web search is disabled.",
                "⚠".yellow()
            )?;
        }
        writeln!(out, "Agent ready. Ask a question (type exit or quit to leave).\n")?;
        Ok(())
    }

    fn display_answer<W: Write>(&self, turn: &Turn, elapsed: Duration, out: &mut W) -> Result<()> {
        let sources = turn.items.len().min(MAX_CONTEXT_ITEMS);

        writeln!(out, "\n{}", "=== Answer ===".bright_white().bold())?;
        writeln!(out, "{}", turn.answer.trim_end())?;
        writeln!(
            out,
            "{}",
            format!("({:.1}s, {} search sources)", elapsed.as_secs_f32(), sources).bright_black()
        )?;
        writeln!(out, "{}\n", "==============".bright_white().bold())?;
        Ok(())
    }

    fn create_spinner(message: &'static str) -> ProgressBar {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(message);
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    }
}

pub fn is_exit_command(input: &str) -> bool {
    let input = input.trim();
    input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit")
}
