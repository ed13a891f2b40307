// ============================================================================
// File: src/main.rs
// Entry point and CLI handling
// ============================================================================

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

use askweb::config::{Config, MAX_NUM_RESULTS};
use askweb::llm_client::GeminiClient;
use askweb::orchestrator::Agent;
use askweb::search_client::{SearchClient, WebSearch};

/// Command-line arguments for the search agent
#[derive(Parser, Debug)]
#[command(name = "askweb")]
#[command(about = "Ask a Gemini model questions, grounding answers in web search when needed", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Model to use (overrides MODEL_NAME)
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Number of search results to request per query
    #[arg(short, long, global = true,
          value_parser = clap::value_parser!(u8).range(1..=MAX_NUM_RESULTS as i64))]
    num_results: Option<u8>,

    /// Enable verbose output (shows decisions and debug logs)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive question loop (default)
    Chat,
    /// Run one web search and print the normalized results
    Search {
        /// Search query
        #[arg(required = true)]
        query: Vec<String>,
    },
    /// List the models available to the API key
    Models,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut config = Config::from_env();
    if let Some(model) = args.model {
        config.model_name = model;
    }
    if let Some(num_results) = args.num_results {
        config.num_results = num_results;
    }
    config.validate()?;

    match args.command.unwrap_or(Command::Chat) {
        Command::Chat => run_chat(config, args.verbose).await,
        Command::Search { query } => run_search(&config, &query.join(" ")).await,
        Command::Models => list_models(&config).await,
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "askweb=debug" } else { "askweb=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .init();
}

fn gemini_client(config: &Config) -> Result<GeminiClient> {
    let api_key = config
        .require_gemini_key()
        .context("Agent initialization failed")?;
    Ok(GeminiClient::new(
        api_key.to_string(),
        config.gemini_base_url.clone(),
        &config.model_name,
    ))
}

async fn run_chat(config: Config, verbose: bool) -> Result<()> {
    let model = gemini_client(&config)?;
    let search = config
        .search
        .clone()
        .map(|credentials| SearchClient::new(config.search_endpoint.clone(), credentials));

    if verbose {
        println!("  {} Using model: {}", "→".yellow(), model.model().cyan());
    }

    let agent = Agent::new(model, search, config.num_results, verbose);
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    agent.run(stdin, &mut stdout).await
}

async fn run_search(config: &Config, query: &str) -> Result<()> {
    let credentials = config.require_search()?.clone();
    let client = SearchClient::new(config.search_endpoint.clone(), credentials);

    println!("\n{} Searching the web for '{}'...", "►".yellow().bold(), query.cyan());
    let items = client
        .search(query, config.num_results)
        .await
        .context("Web search failed")?;

    if items.is_empty() {
        println!("No matching search results found.");
        return Ok(());
    }

    println!("\n{}", "--- Search results ---".bright_white().bold());
    for (i, item) in items.iter().enumerate() {
        println!("\n[{}] {}", i + 1, item.title.bright_white().bold());
        println!("    {}", item.link.bright_cyan());
        println!("    {}", item.snippet);
    }

    Ok(())
}

async fn list_models(config: &Config) -> Result<()> {
    let client = gemini_client(config)?;
    let models = client
        .list_models()
        .await
        .context("Failed to list models")?;

    println!("{}", "Available models:".green().bold());
    for model in models {
        println!(
            "  {} {} {}",
            "●".bright_cyan(),
            model.name.bright_white().bold(),
            format!("({})", model.display_name).bright_black()
        );
        if !model.supported_generation_methods.is_empty() {
            println!("      methods: {}", model.supported_generation_methods.join(", "));
        }
    }

    Ok(())
}
