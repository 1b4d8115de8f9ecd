//! memopad - personal memo board with AI summaries and keyword tags
//!
//! `memopad serve` runs the REST API; the other subcommands talk to a
//! running server.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use memopad::{
    api::build_app,
    client::{HttpMemoApi, MemoApi, MemoBoard},
    config::MemopadConfig,
    generation::GeminiGenerator,
    memos::{types::CategoryFilter, MemoService, MemosState, SqliteMemoStore},
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "memopad")]
#[command(version)]
#[command(about = "Personal memo board with AI summaries and keyword tags")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "MEMOPAD_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    /// Server URL for client commands (defaults to the configured host/port)
    #[arg(long, env = "MEMOPAD_SERVER")]
    server: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the REST API server
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Insert sample memos if the store is empty
    Seed,

    /// List memos
    List {
        /// Category (personal, work, study, idea, other, all)
        #[arg(short, long)]
        category: Option<String>,

        /// Match against title, content and tags
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show one memo with its cached summary
    Show { id: String },

    /// Generate and cache a summary
    Summarize { id: String },

    /// Generate keyword tags
    Tag { id: String },

    /// Delete every memo
    Clear {
        /// Skip the confirmation check
        #[arg(long)]
        yes: bool,
    },

    /// Show configuration
    Config {
        /// Show default configuration
        #[arg(long)]
        default: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    let config = MemopadConfig::load(cli.config.as_deref())?;
    let server = cli
        .server
        .clone()
        .unwrap_or_else(|| format!("http://{}:{}", config.server.host, config.server.port));

    match cli.command {
        Commands::Serve { host, port } => run_server(config, host, port).await?,
        Commands::Seed => {
            let outcome = HttpMemoApi::new(server).seed().await?;
            println!("{}", outcome.message);
            if let Some(count) = outcome.count {
                println!("Created {} memos", count);
            }
        }
        Commands::List { category, search } => {
            let mut board = MemoBoard::new(HttpMemoApi::new(server));
            board.refresh().await?;
            board.filter_by_category(CategoryFilter::parse(category.as_deref()));
            if let Some(search) = search {
                board.search(search);
            }
            for memo in board.view() {
                println!(
                    "{}  [{}]  {}{}",
                    memo.id,
                    memo.category,
                    memo.title,
                    format_tags(&memo.tags)
                );
            }
            let stats = board.stats();
            println!();
            println!("{} of {} memos", stats.filtered, stats.total);
        }
        Commands::Show { id } => {
            let board = MemoBoard::new(HttpMemoApi::new(server));
            let memo = board.api().get(&id).await?;
            println!("{}{}", memo.title, format_tags(&memo.tags));
            println!("category: {}", memo.category);
            println!("created:  {}", memo.created_at.to_rfc3339());
            println!("updated:  {}", memo.updated_at.to_rfc3339());
            println!();
            println!("{}", memo.content);
            if let Some(summary) = board.summary(&id).await {
                println!();
                println!("Summary: {}", summary);
            }
        }
        Commands::Summarize { id } => {
            let summary = HttpMemoApi::new(server).summarize(&id).await?;
            println!("{}", summary);
        }
        Commands::Tag { id } => {
            let memo = HttpMemoApi::new(server).generate_tags(&id).await?;
            println!("{}", memo.tags.join(", "));
        }
        Commands::Clear { yes } => {
            if !yes {
                anyhow::bail!("Refusing to delete every memo without --yes");
            }
            let mut board = MemoBoard::new(HttpMemoApi::new(server));
            board.refresh().await?;
            let count = board.clear_all().await?;
            println!("Deleted {} memos", count);
        }
        Commands::Config { default } => {
            let shown = if default {
                MemopadConfig::default()
            } else {
                config
            };
            println!("{}", toml::to_string_pretty(&shown.redacted())?);
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool, json: bool) {
    let log_level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("memopad={},tower_http=debug", log_level).into());
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn run_server(config: MemopadConfig, host: Option<String>, port: Option<u16>) -> Result<()> {
    let url = config
        .store
        .resolve_url()
        .context("Memo store is not configured")?;
    let store = Arc::new(SqliteMemoStore::open(&url)?);
    let generator = Arc::new(GeminiGenerator::new(config.generation.clone()));
    let service = Arc::new(MemoService::new(store, generator));

    let app = build_app(MemosState { service }, &config.server.cors_origins);

    let host = host.unwrap_or(config.server.host);
    let port = port.unwrap_or(config.server.port);
    let listener = tokio::net::TcpListener::bind((host.as_str(), port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", host, port))?;

    tracing::info!(addr = %listener.local_addr()?, store = %url, "memopad listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}

fn format_tags(tags: &[String]) -> String {
    if tags.is_empty() {
        String::new()
    } else {
        format!("  #{}", tags.join(" #"))
    }
}
