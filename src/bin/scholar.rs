//! CLI binary: search a research topic and print reranked results as JSON.

use std::path::PathBuf;

use clap::Parser;
use scholar::{AppConfig, init_logging};
use scholar_rank::{Reranker, ScoringMethod};
use tracing::info;

/// Search academic sources for a topic and rerank the results.
#[derive(Parser)]
#[command(name = "scholar", version, about)]
struct Cli {
    /// Research topic to search for.
    topic: String,

    /// Number of results to return (defaults to `max_results` from config).
    #[arg(short = 'n', long)]
    count: Option<usize>,

    /// Scoring strategy: `rule_based` or `llm_based`.
    #[arg(short, long, default_value = "rule_based")]
    method: ScoringMethod,

    /// Path to TOML configuration file.
    #[arg(short, long, env = "SCHOLAR_CONFIG")]
    config: Option<PathBuf>,

    /// Search the open web instead of academic domains only.
    #[arg(long)]
    general: bool,

    /// Let the oracle's model propose query variants.
    #[arg(long)]
    generated_queries: bool,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_env_overrides();
    init_logging(&config.logging.filter);

    if cli.general {
        config.rerank.academic_only = false;
    }
    if cli.generated_queries {
        config.rerank.generated_queries = true;
    }

    info!(method = %cli.method, count = ?cli.count, "starting search");
    let reranker = Reranker::from_config(config.rerank)?;
    let set = reranker.rerank(&cli.topic, cli.count, cli.method).await?;

    let json = if cli.pretty {
        serde_json::to_string_pretty(&set)?
    } else {
        serde_json::to_string(&set)?
    };
    println!("{json}");
    Ok(())
}
