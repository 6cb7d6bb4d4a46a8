use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use yojana_core::{MatchResult, UserProfile};
use yojana_engine::{EngineConfig, SchemeEngine};
use yojana_storage::{SessionId, SharedCorpus};

/// Find government schemes through a conversation
#[derive(Parser, Debug)]
#[command(name = "yojana")]
#[command(about = "Conversational government-scheme finder", long_about = None)]
struct Args {
    /// JSON file with the scheme corpus
    #[arg(short, long)]
    corpus: PathBuf,

    /// JSON engine configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of schemes shown by :schemes
    #[arg(long)]
    top_k: Option<usize>,

    /// Rank with the built-in hashing embedder instead of keyword overlap
    #[arg(long)]
    embeddings: bool,

    /// Log level (ignored when RUST_LOG is set)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder().with_writer(std::io::stderr);
    match EnvFilter::try_from_default_env() {
        Ok(filter) => tracing::subscriber::set_global_default(builder.with_env_filter(filter).finish())?,
        Err(_) => tracing::subscriber::set_global_default(builder.with_max_level(log_level).finish())?,
    }

    info!("Starting Yojana v{}", env!("CARGO_PKG_VERSION"));

    let mut config = match &args.config {
        Some(path) => EngineConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(top_k) = args.top_k {
        config.default_top_k = top_k;
    }

    let corpus = SharedCorpus::from_json_file(&args.corpus)
        .with_context(|| format!("loading corpus {}", args.corpus.display()))?;
    let mut engine = SchemeEngine::new(config, Arc::new(corpus))?;
    if args.embeddings {
        engine = engine.with_hashing_embedder()?;
    }
    info!(schemes = engine.snapshot().len(), "Corpus loaded");

    let _eviction = engine.start_eviction();
    let session = SessionId::generate();

    println!("Tell me about yourself and the support you need. Commands: :schemes :menu :reset :profile :quit");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
            line = lines.next_line() => line?,
        };
        let Some(line) = line else { break };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line {
            ":quit" | ":q" => break,
            ":profile" => match engine.profile(&session).await {
                Ok(profile) => println!("{}", serde_json::to_string_pretty(&profile)?),
                Err(_) => println!("Nothing recorded yet."),
            },
            ":reset" => {
                if engine.reset(&session).await.is_ok() {
                    println!("Starting over.");
                }
            }
            ":menu" => match engine.catalog(&session).await {
                Ok(catalog) if catalog.is_empty() => println!("No categories for this state and scope."),
                Ok(catalog) => {
                    for entry in catalog.entries() {
                        println!("{:>3}. {} ({:?})", entry.index, entry.name, entry.origin);
                    }
                }
                Err(e) => println!("{e}"),
            },
            ":schemes" => match engine.find_schemes(&session, None).await {
                Ok(results) if results.is_empty() => println!("No matching schemes."),
                Ok(results) => print_results(&results),
                Err(e) => println!("{e}"),
            },
            turn => match engine.interpret_turn(&session, turn).await {
                Ok(profile) => println!("{}", describe(&profile)),
                Err(e) => println!("{e}"),
            },
        }
    }

    info!("Shutting down...");
    Ok(())
}

fn describe(profile: &UserProfile) -> String {
    if let Some(clarification) = &profile.clarification {
        return clarification.to_string();
    }

    let mut parts = Vec::new();
    if let Some(state) = &profile.state {
        parts.push(format!("state: {state}"));
    }
    parts.push(format!("scope: {}", profile.scope));
    if let Some(subcategory) = &profile.subcategory {
        parts.push(format!("looking for: {subcategory}"));
    }
    if let Some(age) = profile.age {
        parts.push(format!("age: {age}"));
    }
    if let Some(land) = profile.land_size_acres {
        parts.push(format!("land: {land:.2} acres"));
    }
    if let Some(income) = profile.income {
        parts.push(format!("income: Rs {income:.0}"));
    }
    if let Some(group) = profile.target_group {
        parts.push(format!("group: {group}"));
    }
    if !profile.crops.is_empty() {
        parts.push(format!("crops: {}", profile.crops.join(", ")));
    }
    parts.join(" | ")
}

fn print_results(results: &[MatchResult]) {
    for (rank, result) in results.iter().enumerate() {
        println!(
            "{:>2}. {} [{}] score {:.3}",
            rank + 1,
            result.scheme_name,
            result.eligibility_status,
            result.relevance_score
        );
        for reason in &result.reasons {
            println!("      - {reason}");
        }
    }
}
