//! ledgerlens CLI entry point

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use ledgerlens::{
    commands::{
        cmd_ingest, cmd_init, cmd_query, cmd_status, print_ingest_stats, print_init,
        print_query_results, print_status, QueryOptions,
    },
    config::Config,
    embed::HttpEmbedder,
    error::Result,
    store::QdrantChunkStore,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "ledgerlens")]
#[command(version, about = "Filing retrieval pipeline with two-stage reranked search", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize ledgerlens configuration
    Init {
        /// Force overwrite existing config
        #[arg(long)]
        force: bool,
    },

    /// Ingest a filing into the chunk store
    Ingest {
        /// Path to the source document
        path: PathBuf,

        /// Treat the file as already-normalized markdown, skipping the
        /// conversion service
        #[arg(long)]
        markdown: bool,
    },

    /// Query the chunk store
    Query {
        /// The search query
        query: String,

        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<usize>,

        /// Overall deadline in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Disable paraphrase query expansion
        #[arg(long)]
        no_expand: bool,

        /// Disable the density filter
        #[arg(long)]
        no_density_filter: bool,

        /// Return raw similarity hits without widening to sections
        #[arg(long)]
        raw: bool,
    },

    /// Show system status
    Status,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    // Init doesn't need existing config
    if let Commands::Init { force } = cli.command {
        let base_dir = cli.config.as_ref().and_then(|p| p.parent().map(PathBuf::from));
        let config = cmd_init(base_dir, force)?;
        print_init(&config);
        return Ok(());
    }

    // Completions don't need config or store
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "ledgerlens", &mut std::io::stdout());
        return Ok(());
    }

    // Load configuration
    let config = match cli.config.as_deref() {
        Some(path) => Config::load(path)?,
        None => Config::load_from(None)?,
    };

    // Initialize the store behind its embedding backend
    let embedder = Arc::new(HttpEmbedder::new(
        &config.embedding,
        config.request_timeout(),
    )?);
    let store = QdrantChunkStore::connect(&config, embedder).await?;

    match cli.command {
        Commands::Init { .. } | Commands::Completions { .. } => unreachable!(),

        Commands::Ingest { path, markdown } => {
            store.ensure_collection().await?;
            let stats = cmd_ingest(&config, &store, &path, markdown).await?;

            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "expected": stats.expected,
                        "parents_written": stats.parents_written,
                        "children_written": stats.children_written,
                        "partial": stats.is_partial(),
                        "errors": stats.errors,
                    })
                );
            } else {
                print_ingest_stats(&stats);
            }
        }

        Commands::Query {
            query,
            limit,
            timeout,
            no_expand,
            no_density_filter,
            raw,
        } => {
            let options = QueryOptions {
                top_k: limit,
                no_expand,
                no_density_filter,
                raw_chunks: raw,
                timeout_secs: timeout,
            };

            let output = cmd_query(&config, Arc::new(store), &query, options).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                print_query_results(&output);
            }
        }

        Commands::Status => {
            let status = cmd_status(&config, &store).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                print_status(&status);
            }
        }
    }

    Ok(())
}
